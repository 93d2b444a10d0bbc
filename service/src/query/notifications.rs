//! [`Query`] collection related to the multiple [`Notification`]s.

use common::operations::By;

use crate::{domain::Notification, read};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all [`Notification`]s of a [`User`], newest first.
pub type AddressedTo =
    DatabaseQuery<By<Vec<Notification>, read::notification::AddressedTo>>;
