//! Lazily read random-walk corpora.
//!
//! A corpus file holds one walk per line as whitespace-separated vertex
//! identifiers. The corpus is never materialised: [`WalkCorpus::iter`] opens
//! the file afresh and yields walks one line at a time, so a consumer that
//! needs a second pass simply asks for a new iterator.

use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::{VertexId, error::WalkError};

/// Handle to a random-walk corpus on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkCorpus {
    path: PathBuf,
}

impl WalkCorpus {
    /// Wraps `path` without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Wraps `path` after checking the file can be opened.
    ///
    /// # Errors
    /// Returns [`WalkError::Io`] when the file cannot be opened.
    #[instrument(name = "walks.open", err, skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WalkError> {
        let corpus = Self::new(path.as_ref());
        corpus.iter()?;
        debug!("walk corpus is readable");
        Ok(corpus)
    }

    /// Returns the corpus path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the corpus and returns a lazy iterator over its walks.
    ///
    /// Each call starts again from the first line.
    ///
    /// # Errors
    /// Returns [`WalkError::Io`] when the file cannot be opened.
    ///
    /// # Examples
    /// ```no_run
    /// use graphprep_core::WalkCorpus;
    ///
    /// let corpus = WalkCorpus::new("walks.txt");
    /// for walk in corpus.iter()? {
    ///     let walk = walk?;
    ///     println!("{} steps", walk.len());
    /// }
    /// # Ok::<(), graphprep_core::WalkError>(())
    /// ```
    pub fn iter(&self) -> Result<WalkReader<BufReader<File>>, WalkError> {
        let file = File::open(&self.path).map_err(|source| WalkError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(WalkReader::with_path(BufReader::new(file), self.path.clone()))
    }
}

/// Iterator that parses one walk per line from a buffered reader.
///
/// Blank lines yield empty walks. After the first error the iterator is
/// fused and yields nothing further.
#[derive(Debug)]
pub struct WalkReader<R> {
    lines: Lines<R>,
    path: PathBuf,
    line: usize,
    failed: bool,
}

impl<R: BufRead> WalkReader<R> {
    /// Reads walks from an arbitrary buffered reader.
    ///
    /// # Examples
    /// ```
    /// use graphprep_core::WalkReader;
    ///
    /// let walks: Vec<_> = WalkReader::new("0 1 2\n\n2 1\n".as_bytes())
    ///     .collect::<Result<_, _>>()?;
    /// assert_eq!(walks, vec![vec![0, 1, 2], vec![], vec![2, 1]]);
    /// # Ok::<(), graphprep_core::WalkError>(())
    /// ```
    pub fn new(reader: R) -> Self {
        Self::with_path(reader, PathBuf::from("<reader>"))
    }

    fn with_path(reader: R, path: PathBuf) -> Self {
        Self {
            lines: reader.lines(),
            path,
            line: 0,
            failed: false,
        }
    }

    fn parse_line(&self, text: &str) -> Result<Vec<VertexId>, WalkError> {
        text.split_whitespace()
            .map(|token| {
                token
                    .parse::<VertexId>()
                    .map_err(|_| WalkError::InvalidVertex {
                        line: self.line,
                        token: token.to_owned(),
                    })
            })
            .collect()
    }
}

impl<R: BufRead> Iterator for WalkReader<R> {
    type Item = Result<Vec<VertexId>, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let line = self.lines.next()?;
        self.line += 1;
        let result = match line {
            Ok(text) => self.parse_line(&text),
            Err(source) => Err(WalkError::Io {
                path: self.path.clone(),
                source,
            }),
        };
        self.failed = result.is_err();
        Some(result)
    }
}

impl<R: BufRead> std::iter::FusedIterator for WalkReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn corpus_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write corpus");
        file
    }

    #[rstest]
    fn corpus_is_restartable_by_reopening() {
        let file = corpus_file("0 1 2\n3 4\n");
        let corpus = WalkCorpus::open(file.path()).expect("corpus opens");
        let first: Vec<_> = corpus
            .iter()
            .expect("reopen")
            .collect::<Result<_, _>>()
            .expect("walks parse");
        let second: Vec<_> = corpus
            .iter()
            .expect("reopen")
            .collect::<Result<_, _>>()
            .expect("walks parse");
        assert_eq!(first, vec![vec![0, 1, 2], vec![3, 4]]);
        assert_eq!(first, second);
    }

    #[rstest]
    fn reading_is_lazy() {
        let mut walks = WalkReader::new("5 6\nnot-a-vertex\n".as_bytes());
        assert_eq!(walks.next().map(Result::ok), Some(Some(vec![5, 6])));
        let err = walks
            .next()
            .expect("second line is present")
            .expect_err("second line is invalid");
        assert_eq!(err.code().as_str(), "WALKS_INVALID_VERTEX");
        assert!(walks.next().is_none());
    }

    #[rstest]
    #[case::blank("\n", vec![Vec::new()])]
    #[case::empty("", Vec::new())]
    #[case::padded("  7\t8  \n", vec![vec![7, 8]])]
    fn lines_map_to_walks(#[case] input: &str, #[case] expected: Vec<Vec<VertexId>>) {
        let walks: Vec<_> = WalkReader::new(input.as_bytes())
            .collect::<Result<_, _>>()
            .expect("input is valid");
        assert_eq!(walks, expected);
    }

    #[rstest]
    fn invalid_token_reports_line_number() {
        let result: Result<Vec<_>, _> = WalkReader::new("1 2\n3 -4\n".as_bytes()).collect();
        match result {
            Err(WalkError::InvalidVertex { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "-4");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    fn missing_corpus_fails_on_open() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = WalkCorpus::open(dir.path().join("absent.txt")).expect_err("file is missing");
        assert_eq!(err.code().as_str(), "WALKS_IO");
    }
}
