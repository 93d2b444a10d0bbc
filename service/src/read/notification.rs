//! [`Notification`] read model definitions.

#[cfg(doc)]
use crate::domain::{Notification, User};
use crate::domain::user;

/// Selector of all [`Notification`]s addressed to a [`User`], newest first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AddressedTo(pub user::Id);
