//! Sparse adjacency matrices and the loaders that materialise them.
//!
//! Matrices are stored in compressed sparse row form via [`sprs::CsMat`] so
//! row slicing and matrix addition stay cheap. Every constructor enforces
//! squareness before any conversion work is done.

mod matrix_market;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use sprs::{CsMat, TriMat};
use tracing::{debug, instrument};

use crate::{VertexId, error::AdjacencyError};

pub(crate) use matrix_market::parse_matrix_market;

/// Square sparse matrix whose entry `(i, j)` holds the weight of the edge
/// `i -> j`.
///
/// # Examples
/// ```
/// use graphprep_core::AdjacencyMatrix;
///
/// let adjacency = AdjacencyMatrix::try_from_triplets((2, 2), [(0, 1, 1.0)])?;
/// assert_eq!(adjacency.vertex_count(), 2);
/// assert_eq!(adjacency.get(0, 1), Some(1.0));
/// assert_eq!(adjacency.get(1, 0), None);
/// # Ok::<(), graphprep_core::AdjacencyError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyMatrix {
    csr: CsMat<f64>,
}

impl AdjacencyMatrix {
    pub(crate) fn from_csr(csr: CsMat<f64>) -> Self {
        debug_assert_eq!(csr.rows(), csr.cols());
        debug_assert!(csr.is_csr());
        Self { csr }
    }

    /// Builds a matrix from zero-based `(row, col, weight)` coordinates.
    ///
    /// Repeated coordinates are summed.
    ///
    /// # Errors
    /// Returns [`AdjacencyError::NotSquare`] when `shape` is not square,
    /// [`AdjacencyError::TooLarge`] when it cannot be indexed in memory and
    /// [`AdjacencyError::EntryOutOfBounds`] when a coordinate falls outside it.
    pub fn try_from_triplets<T>(
        shape: (usize, usize),
        triplets: T,
    ) -> Result<Self, AdjacencyError>
    where
        T: IntoIterator<Item = (VertexId, VertexId, f64)>,
    {
        let (rows, cols) = shape;
        ensure_shape(rows, cols)?;
        let mut coordinates = TriMat::new(shape);
        for (row, col, weight) in triplets {
            if row >= rows || col >= cols {
                return Err(AdjacencyError::EntryOutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            coordinates.add_triplet(row, col, weight);
        }
        Ok(Self::from_csr(coordinates.to_csr()))
    }

    /// Loads a matrix from a Matrix Market coordinate file.
    ///
    /// # Errors
    /// Returns [`AdjacencyError::Io`] when the file cannot be read, a parse
    /// error when its contents are malformed and
    /// [`AdjacencyError::NotSquare`] or [`AdjacencyError::TooLarge`] when the
    /// declared shape is not square or cannot be allocated.
    #[instrument(name = "adjacency.load", err, skip_all, fields(path = %path.as_ref().display()))]
    pub fn try_from_matrix_market_path(path: impl AsRef<Path>) -> Result<Self, AdjacencyError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| AdjacencyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::try_from_matrix_market_reader(BufReader::new(file)).map_err(|err| match err {
            AdjacencyError::Io { source, .. } => AdjacencyError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Loads a matrix from any buffered reader yielding Matrix Market text.
    ///
    /// The whole matrix is materialised before returning.
    ///
    /// # Errors
    /// See [`Self::try_from_matrix_market_path`].
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    /// use graphprep_core::AdjacencyMatrix;
    ///
    /// let text = "%%MatrixMarket matrix coordinate pattern general\n2 2 1\n1 2\n";
    /// let adjacency = AdjacencyMatrix::try_from_matrix_market_reader(Cursor::new(text))?;
    /// assert_eq!(adjacency.get(0, 1), Some(1.0));
    /// # Ok::<(), graphprep_core::AdjacencyError>(())
    /// ```
    pub fn try_from_matrix_market_reader<R: BufRead>(reader: R) -> Result<Self, AdjacencyError> {
        let coordinates = parse_matrix_market(reader)?;
        let csr: CsMat<f64> = coordinates.to_csr();
        debug!(
            vertices = csr.rows(),
            nnz = csr.nnz(),
            "materialised adjacency matrix"
        );
        Ok(Self::from_csr(csr))
    }

    /// Returns the number of vertices (rows and columns).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.csr.rows()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.csr.nnz()
    }

    /// Returns the weight stored at `(row, col)`, if any.
    #[must_use]
    pub fn get(&self, row: VertexId, col: VertexId) -> Option<f64> {
        self.csr.get(row, col).copied()
    }

    /// Returns the `(column, weight)` pairs stored in `row`, ordered by column.
    ///
    /// Rows outside the matrix are empty.
    #[must_use]
    pub fn row(&self, row: VertexId) -> Vec<(VertexId, f64)> {
        self.csr
            .outer_view(row)
            .map(|view| view.iter().map(|(col, &weight)| (col, weight)).collect())
            .unwrap_or_default()
    }

    /// Iterates every stored entry as `(row, col, weight)` in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = (VertexId, VertexId, f64)> + '_ {
        self.csr.iter().map(|(&weight, (row, col))| (row, col, weight))
    }

    /// Returns whether `A[i][j] == A[j][i]` holds for every stored entry.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.entries()
            .all(|(row, col, weight)| self.get(col, row) == Some(weight))
    }

    /// Borrows the underlying CSR matrix.
    #[must_use]
    pub fn as_csr(&self) -> &CsMat<f64> {
        &self.csr
    }

    /// Consumes the wrapper and returns the underlying CSR matrix.
    #[must_use]
    pub fn into_csr(self) -> CsMat<f64> {
        self.csr
    }
}

/// Resource that can be materialised into an [`AdjacencyMatrix`].
///
/// # Examples
/// ```
/// use graphprep_core::{AdjacencyMatrix, AdjacencySource};
///
/// let adjacency = AdjacencyMatrix::try_from_triplets((1, 1), [])?;
/// let loaded = adjacency.load()?;
/// assert_eq!(loaded.vertex_count(), 1);
/// assert_eq!(adjacency.name(), "in-memory");
/// # Ok::<(), graphprep_core::AdjacencyError>(())
/// ```
pub trait AdjacencySource {
    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Reads the resource into memory.
    ///
    /// # Errors
    /// Returns an [`AdjacencyError`] when the resource is unreadable,
    /// malformed, or not square.
    fn load(&self) -> Result<AdjacencyMatrix, AdjacencyError>;
}

impl AdjacencySource for AdjacencyMatrix {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn load(&self) -> Result<AdjacencyMatrix, AdjacencyError> {
        Ok(self.clone())
    }
}

/// Matrix Market file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixMarketFile {
    path: PathBuf,
    name: String,
}

impl MatrixMarketFile {
    /// Creates a source for `path`, named after the file stem.
    ///
    /// # Examples
    /// ```
    /// use graphprep_core::{AdjacencySource, MatrixMarketFile};
    ///
    /// let source = MatrixMarketFile::new("data/medium-graph.mtx");
    /// assert_eq!(source.name(), "medium-graph");
    /// ```
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map_or_else(|| "adjacency".to_owned(), ToOwned::to_owned);
        Self { path, name }
    }

    /// Overrides the diagnostic name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the path that will be read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AdjacencySource for MatrixMarketFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<AdjacencyMatrix, AdjacencyError> {
        AdjacencyMatrix::try_from_matrix_market_path(&self.path)
    }
}

/// Rejects non-square shapes and shapes whose CSR row pointers (`rows + 1`
/// offsets) cannot be allocated.
pub(crate) fn ensure_shape(rows: usize, cols: usize) -> Result<(), AdjacencyError> {
    if rows != cols {
        return Err(AdjacencyError::NotSquare { rows, cols });
    }
    let too_large = || AdjacencyError::TooLarge { vertices: rows };
    let offsets = rows.checked_add(1).ok_or_else(too_large)?;
    Vec::<usize>::new()
        .try_reserve_exact(offsets)
        .map_err(|_| too_large())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use rstest::rstest;

    #[rstest]
    fn triplets_sum_repeated_coordinates() {
        let adjacency =
            AdjacencyMatrix::try_from_triplets((3, 3), [(0, 1, 1.0), (0, 1, 2.5), (2, 0, 1.0)])
                .expect("triplets are valid");
        assert_eq!(adjacency.get(0, 1), Some(3.5));
        assert_eq!(adjacency.get(2, 0), Some(1.0));
        assert_eq!(adjacency.nnz(), 2);
    }

    #[rstest]
    #[case((2, 3))]
    #[case((4, 1))]
    fn triplets_reject_non_square_shape(#[case] shape: (usize, usize)) {
        let err = AdjacencyMatrix::try_from_triplets(shape, [])
            .expect_err("non-square shape must fail");
        assert!(matches!(
            err,
            AdjacencyError::NotSquare { rows, cols } if (rows, cols) == shape
        ));
    }

    #[rstest]
    fn triplets_reject_out_of_bounds_entries() {
        let err = AdjacencyMatrix::try_from_triplets((2, 2), [(0, 2, 1.0)])
            .expect_err("column 2 is outside a 2x2 matrix");
        assert!(matches!(
            err,
            AdjacencyError::EntryOutOfBounds { row: 0, col: 2, .. }
        ));
    }

    #[rstest]
    #[case(usize::MAX)]
    #[case(usize::MAX / 2)]
    fn triplets_reject_unallocatable_shape(#[case] vertices: usize) {
        let err = AdjacencyMatrix::try_from_triplets((vertices, vertices), [])
            .expect_err("shape cannot be indexed");
        assert!(matches!(err, AdjacencyError::TooLarge { vertices: v } if v == vertices));
        assert_eq!(err.code().as_str(), "ADJACENCY_TOO_LARGE");
    }

    #[rstest]
    fn row_and_entries_follow_storage_order() {
        let adjacency =
            AdjacencyMatrix::try_from_triplets((3, 3), [(1, 2, 4.0), (1, 0, 3.0), (0, 1, 1.0)])
                .expect("triplets are valid");
        assert_eq!(adjacency.row(1), vec![(0, 3.0), (2, 4.0)]);
        assert!(adjacency.row(7).is_empty());
        let entries: Vec<_> = adjacency.entries().collect();
        assert_eq!(entries, vec![(0, 1, 1.0), (1, 0, 3.0), (1, 2, 4.0)]);
    }

    #[rstest]
    fn reader_rejects_non_square_matrix() {
        let text = "%%MatrixMarket matrix coordinate real general\n2 3 1\n1 3 1.0\n";
        let err = AdjacencyMatrix::try_from_matrix_market_reader(Cursor::new(text))
            .expect_err("2x3 matrix must be rejected");
        assert!(matches!(err, AdjacencyError::NotSquare { rows: 2, cols: 3 }));
        assert_eq!(err.to_string(), "adjacency matrix is not square (2 x 3)");
    }

    #[rstest]
    fn missing_file_reports_path() {
        let source = MatrixMarketFile::new("/definitely/missing/graph.mtx");
        let err = source.load().expect_err("missing file must fail");
        match err {
            AdjacencyError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/definitely/missing/graph.mtx"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case("graphs/karate.mtx", "karate")]
    #[case("plain", "plain")]
    #[case("", "adjacency")]
    fn file_source_is_named_after_stem(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(MatrixMarketFile::new(path).name(), expected);
    }

    #[rstest]
    fn symmetry_check_inspects_weights() {
        let symmetric =
            AdjacencyMatrix::try_from_triplets((2, 2), [(0, 1, 2.0), (1, 0, 2.0)])
                .expect("triplets are valid");
        let skewed = AdjacencyMatrix::try_from_triplets((2, 2), [(0, 1, 2.0), (1, 0, 1.0)])
            .expect("triplets are valid");
        assert!(symmetric.is_symmetric());
        assert!(!skewed.is_symmetric());
    }
}
