//! Ordered property lists used as key, foreign key and index identity.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::ids::PropertyId;

/// An ordered, immutable list of property ids.
///
/// Order matters: `[A, B]` and `[B, A]` are different lists. Lists order
/// by length first, then element-wise by id.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PropertyList(Arc<[PropertyId]>);

impl PropertyList {
    /// Creates a list from ids.
    #[must_use]
    pub fn new(ids: &[PropertyId]) -> Self {
        Self(Arc::from(ids))
    }

    /// Returns the ids in order.
    #[must_use]
    pub fn as_slice(&self) -> &[PropertyId] {
        &self.0
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `id` is in the list.
    #[must_use]
    pub fn contains(&self, id: PropertyId) -> bool {
        self.0.contains(&id)
    }

    /// Returns the position of `id` in the list.
    #[must_use]
    pub fn position(&self, id: PropertyId) -> Option<usize> {
        self.0.iter().position(|p| *p == id)
    }

    /// Iterates the ids in order.
    pub fn iter(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.0.iter().copied()
    }
}

impl Ord for PropertyList {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.iter().cmp(other.0.iter()))
    }
}

impl PartialOrd for PropertyList {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&[PropertyId]> for PropertyList {
    fn from(ids: &[PropertyId]) -> Self {
        Self::new(ids)
    }
}

impl fmt::Debug for PropertyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}
