//! Derivation of an undirected adjacency view.

use sprs::{CsMat, TriMat};
use tracing::debug;

use crate::adjacency::AdjacencyMatrix;

/// Returns `A + Aᵗ`.
///
/// The sum is additive rather than a logical OR: an edge present in both
/// directions, or on the diagonal, doubles its weight. Any scaling is left to
/// the consumer of the matrix.
///
/// # Examples
/// ```
/// use graphprep_core::{AdjacencyMatrix, symmetrize};
///
/// let directed = AdjacencyMatrix::try_from_triplets((2, 2), [(0, 1, 1.0)])?;
/// let undirected = symmetrize(&directed);
/// assert_eq!(undirected.get(0, 1), Some(1.0));
/// assert_eq!(undirected.get(1, 0), Some(1.0));
/// assert!(undirected.is_symmetric());
/// # Ok::<(), graphprep_core::AdjacencyError>(())
/// ```
#[must_use]
pub fn symmetrize(adjacency: &AdjacencyMatrix) -> AdjacencyMatrix {
    let n = adjacency.vertex_count();
    // Coordinates are summed on conversion, so pushing every entry and its
    // mirror yields exactly A + Aᵗ.
    let mut coordinates = TriMat::with_capacity((n, n), adjacency.nnz().saturating_mul(2));
    for (row, col, weight) in adjacency.entries() {
        coordinates.add_triplet(row, col, weight);
        coordinates.add_triplet(col, row, weight);
    }
    let csr: CsMat<f64> = coordinates.to_csr();
    debug!(vertices = n, nnz = csr.nnz(), "symmetrised adjacency matrix");
    AdjacencyMatrix::from_csr(csr)
}

impl AdjacencyMatrix {
    /// Convenience wrapper around [`symmetrize`].
    #[must_use]
    pub fn symmetrized(&self) -> Self {
        symmetrize(self)
    }
}
