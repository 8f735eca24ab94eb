//! Dense per-vertex feature storage.

use crate::{VertexId, error::ProviderError};

/// Dense row-major feature matrix holding one row per vertex.
///
/// # Examples
/// ```
/// use graphprep_core::FeatureMatrix;
///
/// let features = FeatureMatrix::try_from_rows(vec![vec![1.0, 0.5], vec![0.0, 2.0]])?;
/// assert_eq!(features.rows(), 2);
/// assert_eq!(features.dimension(), 2);
/// assert_eq!(features.row(1), Some(&[0.0, 2.0][..]));
/// # Ok::<(), graphprep_core::ProviderError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    dimension: usize,
    values: Vec<f32>,
}

impl FeatureMatrix {
    /// Creates a matrix where every value equals `value`.
    ///
    /// # Errors
    /// Returns [`ProviderError::ZeroDimension`] when `dimension` is zero.
    pub fn filled(rows: usize, dimension: usize, value: f32) -> Result<Self, ProviderError> {
        if dimension == 0 {
            return Err(ProviderError::ZeroDimension);
        }
        let len = rows
            .checked_mul(dimension)
            .ok_or(ProviderError::CapacityOverflow { rows, dimension })?;
        Ok(Self {
            rows,
            dimension,
            values: vec![value; len],
        })
    }

    /// Creates a matrix from explicit rows after checking they share a width.
    ///
    /// An empty row list yields a matrix with zero rows and dimension one.
    ///
    /// # Errors
    /// Returns [`ProviderError::ZeroDimension`] when the rows are empty vectors
    /// and [`ProviderError::InconsistentWidth`] when widths differ.
    pub fn try_from_rows(rows: Vec<Vec<f32>>) -> Result<Self, ProviderError> {
        let Some(first) = rows.first() else {
            return Ok(Self {
                rows: 0,
                dimension: 1,
                values: Vec::new(),
            });
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(ProviderError::ZeroDimension);
        }
        let mut values = Vec::with_capacity(rows.len().saturating_mul(dimension));
        for (index, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(ProviderError::InconsistentWidth {
                    row: index,
                    expected: dimension,
                    actual: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            dimension,
            values,
        })
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the width of every row.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the feature row for `vertex`.
    #[must_use]
    pub fn row(&self, vertex: VertexId) -> Option<&[f32]> {
        let start = vertex.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.values.get(start..end)
    }

    /// Returns the underlying row-major buffer.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    fn filled_matrix_has_constant_rows() {
        let features = FeatureMatrix::filled(3, 1, 1.0).expect("dimension is positive");
        assert_eq!(features.rows(), 3);
        assert_eq!(features.data(), &[1.0, 1.0, 1.0]);
        assert_eq!(features.row(2), Some(&[1.0][..]));
        assert_eq!(features.row(3), None);
    }

    #[rstest]
    fn filled_rejects_zero_dimension() {
        assert_eq!(
            FeatureMatrix::filled(3, 0, 1.0),
            Err(ProviderError::ZeroDimension)
        );
    }

    #[rstest]
    fn rows_must_share_width() {
        let err = FeatureMatrix::try_from_rows(vec![vec![1.0, 2.0], vec![3.0]])
            .expect_err("ragged rows must fail");
        assert_eq!(
            err,
            ProviderError::InconsistentWidth {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[rstest]
    fn empty_rows_produce_empty_matrix() {
        let features = FeatureMatrix::try_from_rows(Vec::new()).expect("empty input is valid");
        assert_eq!(features.rows(), 0);
        assert!(features.data().is_empty());
    }
}
