//! [`RentalRequest`] read model definitions.

#[cfg(doc)]
use crate::domain::{rental_request::Status, RentalRequest, User};
use crate::domain::user;

/// Selector of all [`RentalRequest`]s submitted by a [`User`] as a renter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RequestedBy(pub user::Id);

/// Selector of [`Status::Pending`] [`RentalRequest`]s awaiting a decision of a
/// [`User`] as an owner.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingFor(pub user::Id);
