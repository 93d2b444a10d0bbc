//! [`Query`] collection related to the multiple [`Rental`]s.

use common::operations::By;

use crate::{domain::Rental, read};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all [`Rental`]s of a [`User`] as a renter, newest first.
pub type RentedBy = DatabaseQuery<By<Vec<Rental>, read::rental::RentedBy>>;

/// Queries all [`Rental`]s of a [`User`] as an owner, newest first.
pub type OwnedBy = DatabaseQuery<By<Vec<Rental>, read::rental::OwnedBy>>;
