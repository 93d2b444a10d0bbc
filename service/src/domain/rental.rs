//! [`Rental`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Listing, User};
use crate::domain::{
    listing,
    rental_request::{self, RentalRequest, Window},
    user,
};

/// Confirmed rent of a [`Listing`], created by approving a [`RentalRequest`].
#[derive(Clone, Debug)]
pub struct Rental {
    /// ID of this [`Rental`].
    pub id: Id,

    /// ID of the approved [`RentalRequest`].
    ///
    /// Unique across all [`Rental`]s.
    pub request_id: rental_request::Id,

    /// ID of the rented [`Listing`].
    pub listing_id: listing::Id,

    /// ID of the [`User`] owning the rented [`Listing`].
    pub owner_id: user::Id,

    /// ID of the [`User`] renting the [`Listing`].
    pub renter_id: user::Id,

    /// [`Window`] of days this [`Rental`] spans.
    pub window: Window,

    /// Total cost, as frozen in the [`RentalRequest`].
    pub total_cost: Money,

    /// [`Status`] of this [`Rental`].
    pub status: Status,

    /// [`DateTime`] when this [`Rental`] was created.
    pub created_at: CreationDateTime,
}

impl Rental {
    /// Creates a new [`Status::Active`] [`Rental`] out of the provided
    /// approved [`RentalRequest`].
    #[must_use]
    pub fn approved(request: &RentalRequest) -> Self {
        Self {
            id: Id::new(),
            request_id: request.id,
            listing_id: request.listing_id,
            owner_id: request.owner_id,
            renter_id: request.renter_id,
            window: request.window,
            total_cost: request.total_cost,
            status: Status::Active,
            created_at: CreationDateTime::now(),
        }
    }
}

define_kind! {
    #[doc = "Status of a [`Rental`]."]
    enum Status {
        #[doc = "[`Rental`] is ongoing or upcoming."]
        Active = 1,

        #[doc = "Dog is returned to its owner."]
        Completed = 2,
    }
}

/// ID of a [`Rental`].
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

/// [`DateTime`] when a [`Rental`] was created.
pub type CreationDateTime = DateTimeOf<(Rental, unit::Creation)>;
