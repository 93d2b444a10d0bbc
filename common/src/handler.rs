//! [`Handler`] of commands, queries and database operations.

use std::future::Future;

/// Something executing `Args` asynchronously.
///
/// Implemented once per kind of `Args`, so a single type (like a service or a
/// database) handles a whole family of commands or operations.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes the provided `Args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
