//! Result types for pipeline runs.
//!
//! A [`PipelineResult`] is only ever built from a run that completed every
//! stage, so consumers never observe a partially prepared graph.

use crate::{
    VertexId,
    adjacency::AdjacencyMatrix,
    error::PipelineError,
    features::FeatureMatrix,
    labels::LabelMap,
    partition::{SplitLabels, VertexPartition},
    walks::WalkCorpus,
};

/// Mapping from external vertex identifiers to matrix rows.
///
/// Vertex identifiers are dense and contiguous, so the mapping is the
/// identity over `[0, n)`.
///
/// # Examples
/// ```
/// use graphprep_core::IdMap;
///
/// let ids = IdMap::identity(3);
/// assert_eq!(ids.get(2), Some(2));
/// assert_eq!(ids.get(3), None);
/// assert_eq!(ids.iter().collect::<Vec<_>>(), vec![(0, 0), (1, 1), (2, 2)]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdMap {
    len: usize,
}

impl IdMap {
    /// Creates the identity mapping over `[0, len)`.
    #[must_use]
    pub const fn identity(len: usize) -> Self {
        Self { len }
    }

    /// Returns the row for `id`, if it is in range.
    #[must_use]
    pub const fn get(&self, id: VertexId) -> Option<VertexId> {
        if id < self.len { Some(id) } else { None }
    }

    /// Returns the number of mapped identifiers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the mapping is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates `(id, row)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, VertexId)> {
        (0..self.len).map(|id| (id, id))
    }
}

/// Everything the learning algorithm needs from one pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineResult {
    pub(crate) adjacency: AdjacencyMatrix,
    pub(crate) features: FeatureMatrix,
    pub(crate) id_map: IdMap,
    pub(crate) walks: Option<WalkCorpus>,
    pub(crate) labels: LabelMap,
    pub(crate) partition: VertexPartition,
    pub(crate) split_labels: SplitLabels,
    pub(crate) seed: u64,
}

impl PipelineResult {
    /// Returns the symmetrised adjacency matrix.
    #[must_use]
    pub fn adjacency(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    /// Returns the per-vertex features.
    #[must_use]
    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    /// Returns the identity id-map.
    #[must_use]
    pub fn id_map(&self) -> IdMap {
        self.id_map
    }

    /// Returns the walk corpus, or `None` when no corpus was configured.
    #[must_use]
    pub fn walks(&self) -> Option<&WalkCorpus> {
        self.walks.as_ref()
    }

    /// Returns the labels produced by the label provider.
    #[must_use]
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Returns the train/validation/test vertex split.
    #[must_use]
    pub fn partition(&self) -> &VertexPartition {
        &self.partition
    }

    /// Returns the labels aligned with each split.
    #[must_use]
    pub fn split_labels(&self) -> &SplitLabels {
        &self.split_labels
    }

    /// Returns the base seed the run used, whether configured or drawn.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Recomputes the split labels against another label map.
    ///
    /// # Errors
    /// Returns [`PipelineError::MissingLabel`] when a split vertex is absent
    /// from `labels`.
    pub fn split_labels_with(&self, labels: &LabelMap) -> Result<SplitLabels, PipelineError> {
        self.partition.labels(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(5)]
    fn identity_map_covers_every_vertex(#[case] len: usize) {
        let ids = IdMap::identity(len);
        assert_eq!(ids.len(), len);
        assert_eq!(ids.is_empty(), len == 0);
        assert!(ids.iter().all(|(id, row)| id == row && ids.get(id) == Some(row)));
        assert_eq!(ids.get(len), None);
    }
}
