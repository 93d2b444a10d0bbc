//! [`Query`] collection related to the multiple [`Listing`]s.

use common::operations::By;

use crate::{domain::Listing, read};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all [`Listing`]s of a [`User`], newest first.
pub type OwnedBy = DatabaseQuery<By<Vec<Listing>, read::listing::OwnedBy>>;

/// Queries all [`Listing`]s that may be requested for rent, newest first.
pub type Available = DatabaseQuery<By<Vec<Listing>, read::listing::Available>>;
