//! [`User`] definitions.
//!
//! Users are managed by an external identity provider, so the marketplace
//! only knows them by their [`Id`].

pub mod session;

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Marketplace user, either owning dogs, renting them or both.
#[derive(Clone, Copy, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,
}

/// ID of a [`User`], as issued by the identity provider.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}
