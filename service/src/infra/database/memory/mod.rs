//! In-memory [`Database`] implementation.

mod impls;

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::Database;
use crate::{
    domain::{
        listing, notification, rental, rental_request, Listing, Notification,
        Rental, RentalRequest,
    },
    infra::database,
};

/// In-memory [`Database`] client.
///
/// Keeps everything in the process memory, so is intended for tests and
/// local experiments only.
#[derive(Clone, Debug, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx {
            shared: Arc::default(),
        })
    }

    /// Makes all the following [`Notification`] writes fail, or succeed again.
    pub fn fail_notifications(&self, fail: bool) {
        self.0.shared.fail_notifications.store(fail, Ordering::SeqCst);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared between all the clients of the same [`Memory`] database.
#[derive(Debug, Default)]
struct Shared {
    /// Committed [`Storage`].
    storage: Arc<Mutex<Storage>>,

    /// Indicator whether [`Notification`] writes should fail.
    fail_notifications: AtomicBool,
}

/// Collections of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct Storage {
    /// Stored [`Listing`]s.
    listings: HashMap<listing::Id, Listing>,

    /// Stored [`RentalRequest`]s.
    rental_requests: HashMap<rental_request::Id, RentalRequest>,

    /// Stored [`Rental`]s.
    rentals: HashMap<rental::Id, Rental>,

    /// Stored [`Notification`]s.
    notifications: HashMap<notification::Id, Notification>,
}

/// Non-transactional [`Memory`] client, applying every operation at once.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`Shared`] state of the database.
    shared: Arc<Shared>,
}

/// Transactional [`Memory`] client.
///
/// Owns the [`Storage`] exclusively until committed or dropped, so
/// transactions never interleave. Operations are applied to a working copy,
/// replacing the committed [`Storage`] on commit only.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`Shared`] state of the database.
    shared: Arc<Shared>,

    /// State of the transaction, if it's not committed yet.
    state: Arc<Mutex<Option<TxState>>>,
}

/// State of an uncommitted [`Tx`].
#[derive(Debug)]
struct TxState {
    /// Exclusive access to the committed [`Storage`].
    guard: OwnedMutexGuard<Storage>,

    /// Working copy of the [`Storage`] the operations are applied to.
    working: Storage,
}

impl Tx {
    /// Starts a new [`Tx`] waiting for all other [`Tx`]s to finish.
    async fn begin(non_tx: &NonTx) -> Self {
        let guard = Arc::clone(&non_tx.shared.storage).lock_owned().await;
        let working = Storage::clone(&guard);
        Self {
            shared: Arc::clone(&non_tx.shared),
            state: Arc::new(Mutex::new(Some(TxState { guard, working }))),
        }
    }

    /// Commits this [`Tx`], releasing the [`Storage`].
    async fn commit(&self) {
        if let Some(TxState { mut guard, working }) =
            self.state.lock().await.take()
        {
            *guard = working;
        }
    }
}

/// Access to the [`Storage`] of a [`Memory`] database.
pub trait Access {
    /// Runs the provided function over the [`Storage`] for reading.
    ///
    /// # Errors
    ///
    /// If the [`Storage`] is not accessible anymore.
    fn read<R>(
        &self,
        f: impl FnOnce(&Storage) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Runs the provided function over the [`Storage`] for writing.
    ///
    /// # Errors
    ///
    /// If the [`Storage`] is not accessible anymore.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut Storage) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Indicates whether [`Notification`] writes should fail.
    fn fails_notifications(&self) -> bool;
}

impl Access for NonTx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Storage) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*self.shared.storage.lock().await))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Storage) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&mut *self.shared.storage.lock().await))
    }

    fn fails_notifications(&self) -> bool {
        self.shared.fail_notifications.load(Ordering::SeqCst)
    }
}

impl Access for Tx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Storage) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let state = self.state.lock().await;
        let Some(state) = state.as_ref() else {
            return Err(tracerr::new!(database::Error::from(
                Error::TxCommitted
            )));
        };
        Ok(f(&state.working))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Storage) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut state = self.state.lock().await;
        let Some(state) = state.as_mut() else {
            return Err(tracerr::new!(database::Error::from(
                Error::TxCommitted
            )));
        };
        Ok(f(&mut state.working))
    }

    fn fails_notifications(&self) -> bool {
        self.shared.fail_notifications.load(Ordering::SeqCst)
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Operation is performed on an already committed [`Tx`].
    #[display("`Tx` is already committed")]
    TxCommitted,

    /// Write violates a uniqueness constraint.
    #[display("unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),

    /// [`Notification`]s storage is unavailable.
    #[display("`Notification`s storage is unavailable")]
    Unavailable,
}
