//! Vertex labels and the ordered label map consumed by the partitioner.

use std::collections::HashMap;

use crate::{VertexId, error::ProviderError};

/// Class label attached to a vertex.
///
/// # Examples
/// ```
/// use graphprep_core::Label;
///
/// let label = Label::new(1);
/// assert_eq!(label.get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    /// Creates a new label.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Returns the underlying label value.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}

/// Mapping from vertex to label that remembers insertion order.
///
/// Vertices without a label are simply absent. The insertion order is the
/// order in which [`LabelMap::keys`] reports vertices, which in turn is the
/// split order used by [`crate::Partitioner`].
///
/// # Examples
/// ```
/// use graphprep_core::{Label, LabelMap};
///
/// let mut labels = LabelMap::new();
/// labels.insert(4, Label::new(1))?;
/// labels.insert(2, Label::new(0))?;
/// assert_eq!(labels.keys(), &[4, 2]);
/// assert_eq!(labels.get(2), Some(Label::new(0)));
/// assert_eq!(labels.get(3), None);
/// # Ok::<(), graphprep_core::ProviderError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelMap {
    order: Vec<VertexId>,
    labels: HashMap<VertexId, Label>,
}

impl LabelMap {
    /// Creates an empty label map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label for `vertex`.
    ///
    /// # Errors
    /// Returns [`ProviderError::DuplicateLabel`] when `vertex` already has a
    /// label.
    pub fn insert(&mut self, vertex: VertexId, label: Label) -> Result<(), ProviderError> {
        if self.labels.contains_key(&vertex) {
            return Err(ProviderError::DuplicateLabel { vertex });
        }
        self.labels.insert(vertex, label);
        self.order.push(vertex);
        Ok(())
    }

    /// Builds a map from `(vertex, label)` pairs, rejecting repeats.
    ///
    /// Providers should prefer this (or [`Self::insert`]) over `collect`,
    /// which keeps the first label of a repeated vertex.
    ///
    /// # Errors
    /// Returns [`ProviderError::DuplicateLabel`] for the first repeated vertex.
    ///
    /// # Examples
    /// ```
    /// use graphprep_core::{Label, LabelMap, ProviderError};
    ///
    /// let err = LabelMap::try_from_pairs([(3, Label::new(1)), (3, Label::new(0))])
    ///     .expect_err("vertex 3 is labelled twice");
    /// assert_eq!(err, ProviderError::DuplicateLabel { vertex: 3 });
    /// ```
    pub fn try_from_pairs<T>(pairs: T) -> Result<Self, ProviderError>
    where
        T: IntoIterator<Item = (VertexId, Label)>,
    {
        let mut map = Self::new();
        for (vertex, label) in pairs {
            map.insert(vertex, label)?;
        }
        Ok(map)
    }

    /// Returns the label for `vertex`, if it has one.
    #[must_use]
    pub fn get(&self, vertex: VertexId) -> Option<Label> {
        self.labels.get(&vertex).copied()
    }

    /// Returns the labelled vertices in insertion order.
    #[must_use]
    pub fn keys(&self) -> &[VertexId] {
        &self.order
    }

    /// Iterates `(vertex, label)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, Label)> + '_ {
        self.order
            .iter()
            .filter_map(|vertex| self.get(*vertex).map(|label| (*vertex, label)))
    }

    /// Returns the number of labelled vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns whether no vertex is labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Checks that every key lies in `[0, vertices)`.
    ///
    /// # Errors
    /// Returns [`ProviderError::LabelOutOfRange`] for the first offending key.
    pub fn ensure_within(&self, vertices: usize) -> Result<(), ProviderError> {
        match self.order.iter().find(|&&vertex| vertex >= vertices) {
            Some(&vertex) => Err(ProviderError::LabelOutOfRange { vertex, vertices }),
            None => Ok(()),
        }
    }
}

impl FromIterator<(VertexId, Label)> for LabelMap {
    /// Collects pairs, keeping the first label seen for a repeated vertex.
    ///
    /// Use [`LabelMap::try_from_pairs`] to reject repeats instead.
    fn from_iter<T: IntoIterator<Item = (VertexId, Label)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (vertex, label) in iter {
            if !map.labels.contains_key(&vertex) {
                map.labels.insert(vertex, label);
                map.order.push(vertex);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    fn insert_rejects_duplicates_and_keeps_original() {
        let mut labels = LabelMap::new();
        labels.insert(1, Label::new(0)).expect("first insert succeeds");
        let err = labels
            .insert(1, Label::new(1))
            .expect_err("second insert must fail");
        assert_eq!(err, ProviderError::DuplicateLabel { vertex: 1 });
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.keys(), &[1]);
        assert_eq!(labels.get(1), Some(Label::new(0)));
    }

    #[rstest]
    fn try_from_pairs_rejects_repeated_vertices() {
        let pairs = [(4, Label::new(1)), (2, Label::new(0)), (4, Label::new(0))];
        let err = LabelMap::try_from_pairs(pairs).expect_err("vertex 4 is labelled twice");
        assert_eq!(err, ProviderError::DuplicateLabel { vertex: 4 });

        let labels = LabelMap::try_from_pairs([(4, Label::new(1)), (2, Label::new(0))])
            .expect("distinct vertices are accepted");
        assert_eq!(labels.keys(), &[4, 2]);
    }

    #[rstest]
    fn collect_keeps_the_first_label_of_a_repeated_vertex() {
        let labels: LabelMap = [(7, Label::new(1)), (7, Label::new(0))].into_iter().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get(7), Some(Label::new(1)));
    }

    #[rstest]
    fn iteration_follows_insertion_order() {
        let labels: LabelMap = [(9, Label::new(1)), (3, Label::new(0)), (9, Label::new(0))]
            .into_iter()
            .collect();
        let pairs: Vec<_> = labels.iter().collect();
        assert_eq!(pairs, vec![(9, Label::new(1)), (3, Label::new(0))]);
    }

    #[rstest]
    #[case(10, None)]
    #[case(9, Some(9))]
    #[case(3, Some(9))]
    fn ensure_within_reports_first_out_of_range_key(
        #[case] vertices: usize,
        #[case] offending: Option<VertexId>,
    ) {
        let labels: LabelMap = [(2, Label::new(1)), (9, Label::new(0)), (5, Label::new(1))]
            .into_iter()
            .collect();
        let result = labels.ensure_within(vertices);
        match offending {
            None => assert_eq!(result, Ok(())),
            Some(vertex) => assert_eq!(
                result,
                Err(ProviderError::LabelOutOfRange { vertex, vertices })
            ),
        }
    }
}
