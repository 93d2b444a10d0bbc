//! [`Query`] collection related to a single [`Rental`].

use common::operations::By;

use crate::domain::{rental_request, Rental};
#[cfg(doc)]
use crate::{domain::RentalRequest, Query};

use super::DatabaseQuery;

/// Queries a [`Rental`] by the ID of the [`RentalRequest`] it was approved
/// from.
pub type ByRequestId = DatabaseQuery<By<Option<Rental>, rental_request::Id>>;
