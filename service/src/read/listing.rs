//! [`Listing`] read model definitions.

#[cfg(doc)]
use crate::domain::{Listing, User};
use crate::domain::user;

/// Selector of all [`Listing`]s owned by a [`User`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OwnedBy(pub user::Id);

/// Selector of all [`Listing`]s which may be requested for rent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Available;
