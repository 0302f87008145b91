//! Compute-once cells with race-to-publish semantics.
//!
//! A [`LazyCell`] never blocks: concurrent first readers may each run the
//! initializer, the first to publish wins and the others drop their result.

use std::fmt;

use once_cell::race::OnceBox;

/// A cell initialized at most once, without locking.
pub struct LazyCell<T> {
    inner: OnceBox<T>,
}

impl<T> LazyCell<T> {
    /// Creates an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: OnceBox::new(),
        }
    }

    /// Returns the published value, if any.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.inner.get()
    }

    /// Publishes `value` if the cell is empty.
    ///
    /// # Errors
    ///
    /// Returns `value` back if the cell was already initialized.
    pub fn set(&self, value: T) -> Result<(), T> {
        self.inner.set(Box::new(value)).map_err(|boxed| *boxed)
    }

    /// Returns the published value, computing it first if needed.
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.inner.get_or_init(|| Box::new(init()))
    }

    /// Like [`LazyCell::get_or_init`], but nothing is published on failure.
    ///
    /// # Errors
    ///
    /// Returns the initializer's error.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.inner.get_or_try_init(|| init().map(Box::new))
    }
}

impl<T> Default for LazyCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => write!(f, "LazyCell({value:?})"),
            None => write!(f, "LazyCell(<uninit>)"),
        }
    }
}
