//! Per-kind node storage.
//!
//! An [`Arena`] hands out dense ids in creation order. Removing a node
//! leaves a tombstone so ids are never reused and stale ids stop
//! resolving instead of aliasing a newer node.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::ids::ArenaId;

pub(crate) struct Arena<I, T> {
    slots: Vec<Option<T>>,
    live: usize,
    _id: PhantomData<fn() -> I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            _id: PhantomData,
        }
    }

    /// Returns the id the next insert will receive.
    pub(crate) fn next_id(&self) -> I {
        I::from_index(self.slots.len())
    }

    pub(crate) fn insert(&mut self, value: T) -> I {
        let id = self.next_id();
        self.slots.push(Some(value));
        self.live += 1;
        id
    }

    pub(crate) fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub(crate) fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn remove(&mut self, id: I) -> Option<T> {
        let removed = self.slots.get_mut(id.index()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Iterates live nodes in creation order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (I::from_index(index), value)))
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Live ids are an invariant of the graph: every id stored in a node
/// refers to a live node, so indexing with a stale id is a bug.
impl<I: ArenaId + fmt::Debug, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("stale graph id {id:?}"),
        }
    }
}

impl<I: ArenaId + fmt::Debug, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("stale graph id {id:?}"),
        }
    }
}

impl<I, T> fmt::Debug for Arena<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arena({} live of {})", self.live, self.slots.len())
    }
}
