//! Postgres database client definitions.

pub mod non_tx;
pub mod tx;

use std::future::Future;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database;

pub use self::{non_tx::NonTx, tx::Tx};

/// Lazily acquired [`Connection`] of a client.
///
/// [`Connection`]: super::Connection
#[derive(Debug)]
struct Slot<C>(RwLock<Option<C>>);

impl<C> Slot<C> {
    /// Creates a new empty [`Slot`].
    fn empty() -> Self {
        Self(RwLock::new(None))
    }

    /// Returns the [`Connection`] held in this [`Slot`], acquiring it with
    /// the provided `acquire` function if there is none yet.
    ///
    /// [`Connection`]: super::Connection
    async fn get_or_acquire<F, Fut>(
        &self,
        acquire: F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let read = self.0.read().await;
        let guard = if read.is_some() {
            read
        } else {
            drop(read);

            let mut write = self.0.write().await;
            if write.is_none() {
                *write = Some(acquire().await.map_err(tracerr::wrap!())?);
            }
            write.downgrade()
        };

        Ok(RwLockReadGuard::map(guard, |conn| {
            conn.as_ref().expect("filled before downgrading")
        }))
    }

    /// Takes the [`Connection`] out of this [`Slot`], so the next use
    /// acquires a new one.
    ///
    /// [`Connection`]: super::Connection
    async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}
