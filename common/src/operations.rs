//! Operations a [`Handler`] may be executed with, mostly by a database.

use std::marker::PhantomData;

use crate::Handler;

/// Stores a value, overwriting the one with the same ID.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Removes a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation to replace a value only if its current state matches the
/// `expected` one.
///
/// Resolves to whether the value was replaced.
#[derive(Clone, Copy, Debug)]
pub struct CompareAndSwap<T, E> {
    /// State the stored value is expected to be in.
    pub expected: E,

    /// New value to store.
    pub new: T,
}

/// Reads a value by some selector, usually a [`By`].
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Reads a value locking it until the current transaction ends.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Operation to open a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// [`Transact`]ed value.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation to commit a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selects `W` by some `B`, like an ID or an owner.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the value to select.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the value to select by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
