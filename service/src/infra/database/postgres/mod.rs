//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::{Config, PoolConfig};

/// [`Database`] persisting the marketplace in Postgres.
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Connects a pool of [`Postgres`] connections described by the provided
    /// [`Config`].
    ///
    /// Connections are established lazily, on first use.
    ///
    /// # Errors
    ///
    /// If the [`Config`] doesn't describe a valid pool.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        conf.create_pool(Some(Runtime::Tokio1), NoTls)
            .map(|pool| Self(NonTx::from_pool(pool)))
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Failure of talking to Postgres.
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement or transaction failed.
    #[display("Postgres statement failed: {_0}")]
    Statement(connection::Error),

    /// [`Config`] doesn't describe a valid pool.
    #[display("Invalid Postgres pool config: {_0}")]
    InvalidPool(connection::PoolCreationError),

    /// No [`Connection`] could be taken from the pool.
    #[display("Failed to take Postgres connection from pool: {_0}")]
    Unavailable(connection::PoolError),
}
