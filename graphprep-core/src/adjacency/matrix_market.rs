//! Reader for the Matrix Market coordinate exchange format.
//!
//! Only the `matrix coordinate` object is accepted. `real` and `integer`
//! fields are read as `f64`; `pattern` entries weigh `1.0`. `symmetric`
//! storage is expanded so the returned coordinates describe the full matrix.
//!
//! The shape is validated from the size line alone, so non-square or
//! unallocatable inputs fail before any entry is read.

use std::{io::BufRead, path::PathBuf};

use sprs::TriMat;

use crate::error::AdjacencyError;

use super::ensure_shape;

const BANNER: &str = "%%matrixmarket";
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Real,
    Pattern,
}

#[derive(Clone, Copy, Debug)]
struct Header {
    field: Field,
    symmetric: bool,
}

#[derive(Clone, Copy, Debug)]
struct Size {
    rows: usize,
    cols: usize,
    entries: usize,
}

/// Parses Matrix Market text into zero-based coordinates.
///
/// The shape is checked as soon as the size line is read.
pub(crate) fn parse_matrix_market<R: BufRead>(reader: R) -> Result<TriMat<f64>, AdjacencyError> {
    let mut lines = reader.lines().enumerate().map(|(index, line)| {
        line.map(|text| (index + 1, text))
            .map_err(|source| AdjacencyError::Io {
                path: PathBuf::from("<reader>"),
                source,
            })
    });

    let (_, banner) = lines
        .next()
        .transpose()?
        .ok_or_else(|| AdjacencyError::InvalidHeader {
            reason: "input is empty".to_owned(),
        })?;
    let header = parse_banner(&banner)?;

    let size = loop {
        let Some((number, text)) = lines.next().transpose()? else {
            return Err(AdjacencyError::InvalidHeader {
                reason: "missing size line".to_owned(),
            });
        };
        if is_skippable(&text) {
            continue;
        }
        break parse_size(number, &text)?;
    };
    ensure_shape(size.rows, size.cols)?;

    let mut coordinates = TriMat::with_capacity(
        (size.rows, size.cols),
        size.entries.min(MAX_PREALLOCATED_ENTRIES),
    );
    let mut read = 0_usize;
    for item in lines {
        let (number, text) = item?;
        if is_skippable(&text) {
            continue;
        }
        let (row, col, weight) = parse_entry(number, &text, header.field, size)?;
        coordinates.add_triplet(row, col, weight);
        if header.symmetric && row != col {
            coordinates.add_triplet(col, row, weight);
        }
        read += 1;
    }

    if read != size.entries {
        return Err(AdjacencyError::EntryCountMismatch {
            expected: size.entries,
            actual: read,
        });
    }
    Ok(coordinates)
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('%')
}

fn parse_banner(line: &str) -> Result<Header, AdjacencyError> {
    let lowered = line.trim().to_ascii_lowercase();
    let mut tokens = lowered.split_whitespace();
    if tokens.next() != Some(BANNER) {
        return Err(AdjacencyError::InvalidHeader {
            reason: format!("expected `%%MatrixMarket` banner, found `{}`", line.trim()),
        });
    }
    let (Some(object), Some(format), Some(field), Some(symmetry)) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(AdjacencyError::InvalidHeader {
            reason: "banner must name object, format, field and symmetry".to_owned(),
        });
    };
    if object != "matrix" {
        return Err(AdjacencyError::UnsupportedFormat {
            detail: object.to_owned(),
        });
    }
    if format != "coordinate" {
        return Err(AdjacencyError::UnsupportedFormat {
            detail: format.to_owned(),
        });
    }
    let field = match field {
        "real" | "double" | "integer" => Field::Real,
        "pattern" => Field::Pattern,
        other => {
            return Err(AdjacencyError::UnsupportedFormat {
                detail: other.to_owned(),
            });
        }
    };
    let symmetric = match symmetry {
        "general" => false,
        "symmetric" => true,
        other => {
            return Err(AdjacencyError::UnsupportedFormat {
                detail: other.to_owned(),
            });
        }
    };
    Ok(Header { field, symmetric })
}

fn parse_size(line: usize, text: &str) -> Result<Size, AdjacencyError> {
    let values: Vec<usize> = text
        .split_whitespace()
        .map(|token| parse_count(line, token))
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        &[rows, cols, entries] => Ok(Size {
            rows,
            cols,
            entries,
        }),
        _ => Err(AdjacencyError::InvalidHeader {
            reason: format!("size line {line} must hold `rows cols entries`"),
        }),
    }
}

fn parse_count(line: usize, token: &str) -> Result<usize, AdjacencyError> {
    token.parse().map_err(|_| AdjacencyError::Parse {
        line,
        reason: format!("`{token}` is not a non-negative integer"),
    })
}

fn parse_entry(
    line: usize,
    text: &str,
    field: Field,
    size: Size,
) -> Result<(usize, usize, f64), AdjacencyError> {
    let mut tokens = text.split_whitespace();
    let (Some(row), Some(col)) = (tokens.next(), tokens.next()) else {
        return Err(AdjacencyError::Parse {
            line,
            reason: "entry must hold a row and a column".to_owned(),
        });
    };
    let row = to_zero_based(line, parse_count(line, row)?)?;
    let col = to_zero_based(line, parse_count(line, col)?)?;
    if row >= size.rows || col >= size.cols {
        return Err(AdjacencyError::EntryOutOfBounds {
            row,
            col,
            rows: size.rows,
            cols: size.cols,
        });
    }
    let weight = match (field, tokens.next()) {
        (Field::Pattern, None) => 1.0,
        (Field::Real, Some(token)) => parse_weight(line, token)?,
        (Field::Pattern, Some(token)) => {
            return Err(AdjacencyError::Parse {
                line,
                reason: format!("pattern entry carries unexpected value `{token}`"),
            });
        }
        (Field::Real, None) => {
            return Err(AdjacencyError::Parse {
                line,
                reason: "entry is missing its value".to_owned(),
            });
        }
    };
    if let Some(extra) = tokens.next() {
        return Err(AdjacencyError::Parse {
            line,
            reason: format!("unexpected trailing token `{extra}`"),
        });
    }
    Ok((row, col, weight))
}

fn to_zero_based(line: usize, index: usize) -> Result<usize, AdjacencyError> {
    index.checked_sub(1).ok_or_else(|| AdjacencyError::Parse {
        line,
        reason: "indices are one-based; found 0".to_owned(),
    })
}

fn parse_weight(line: usize, token: &str) -> Result<f64, AdjacencyError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite())
        .ok_or_else(|| AdjacencyError::Parse {
            line,
            reason: format!("`{token}` is not a finite weight"),
        })
}
