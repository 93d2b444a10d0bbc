//! [`Query`] collection related to a single [`RentalRequest`].

use common::operations::By;

use crate::domain::{rental_request, RentalRequest};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`RentalRequest`] by its [`rental_request::Id`].
pub type ById = DatabaseQuery<By<Option<RentalRequest>, rental_request::Id>>;
