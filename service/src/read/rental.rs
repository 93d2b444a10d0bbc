//! [`Rental`] read model definitions.

#[cfg(doc)]
use crate::domain::{Rental, User};
use crate::domain::user;

/// Selector of all [`Rental`]s where a [`User`] is the renter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RentedBy(pub user::Id);

/// Selector of all [`Rental`]s where a [`User`] is the owner.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OwnedBy(pub user::Id);
