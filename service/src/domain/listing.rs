//! [`Listing`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{RentalRequest, User};
use crate::domain::{rental_request::Days, user};

/// Dog offered for rent by its owner.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the [`User`] owning the listed dog.
    pub owner_id: user::Id,

    /// [`Name`] of the listed dog.
    pub name: Name,

    /// [`Description`] of the listed dog, if any.
    pub description: Option<Description>,

    /// [`DailyPrice`] of renting the listed dog.
    pub price_per_day: DailyPrice,

    /// Current [`State`] of this [`Listing`] in the rental lifecycle.
    pub state: State,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,
}

impl Listing {
    /// Returns [`Status`] of this [`Listing`].
    #[must_use]
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Indicates whether this [`Listing`] may be requested for rent.
    ///
    /// Always agrees with the [`Status::Available`].
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status() == Status::Available
    }

    /// Returns ID of the [`User`] who requested this [`Listing`], if it's
    /// [`State::Requested`].
    #[must_use]
    pub fn requested_by(&self) -> Option<user::Id> {
        match self.state {
            State::Requested { by, .. } => Some(by),
            State::Available | State::Rented { .. } => None,
        }
    }

    /// Returns ID of the [`User`] who rents this [`Listing`], if it's
    /// [`State::Rented`].
    #[must_use]
    pub fn rented_by(&self) -> Option<user::Id> {
        match self.state {
            State::Rented { by, .. } => Some(by),
            State::Available | State::Requested { .. } => None,
        }
    }
}

/// State of a [`Listing`] in the rental lifecycle.
///
/// Linkage to the requesting or renting [`User`] exists only in the states
/// it belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// [`Listing`] may be requested for rent.
    Available,

    /// [`Listing`] has a pending [`RentalRequest`].
    Requested {
        /// ID of the [`User`] who requested the [`Listing`].
        by: user::Id,

        /// [`DateTime`] when the [`Listing`] was requested.
        at: RequestDateTime,
    },

    /// [`Listing`] is rented out.
    Rented {
        /// ID of the [`User`] renting the [`Listing`].
        by: user::Id,

        /// [`DateTime`] when the rent was approved.
        at: RentDateTime,
    },
}

impl State {
    /// Returns [`Status`] of this [`State`].
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Available => Status::Available,
            Self::Requested { .. } => Status::Requested,
            Self::Rented { .. } => Status::Rented,
        }
    }

    /// Restores a [`State`] from its stored parts.
    ///
    /// [`None`] is returned if the parts contradict each other.
    #[must_use]
    pub fn from_parts(
        status: Status,
        requested_by: Option<user::Id>,
        requested_at: Option<RequestDateTime>,
        rented_by: Option<user::Id>,
        rented_at: Option<RentDateTime>,
    ) -> Option<Self> {
        match (status, requested_by, requested_at, rented_by, rented_at) {
            (Status::Available, None, None, None, None) => {
                Some(Self::Available)
            }
            (Status::Requested, Some(by), Some(at), None, None) => {
                Some(Self::Requested { by, at })
            }
            (Status::Rented, None, None, Some(by), Some(at)) => {
                Some(Self::Rented { by, at })
            }
            _ => None,
        }
    }
}

define_kind! {
    #[doc = "Status of a [`Listing`]."]
    enum Status {
        #[doc = "[`State::Available`] [`Listing`]."]
        Available = 1,

        #[doc = "[`State::Requested`] [`Listing`]."]
        Requested = 2,

        #[doc = "[`State::Rented`] [`Listing`]."]
        Rented = 3,
    }
}

/// ID of a [`Listing`].
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

/// Name of a listed dog.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 128
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Description of a listed dog: breed, temper, care instructions.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 4096
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Positive price of renting a dog for a single day.
#[derive(AsRef, Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct DailyPrice(Money);

impl DailyPrice {
    /// Creates a new [`DailyPrice`] if the given `price` is positive.
    #[must_use]
    pub fn new(price: Money) -> Option<Self> {
        price.is_positive().then_some(Self(price))
    }

    /// Calculates the total cost of renting for the provided [`Days`].
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn total_for(self, days: Days) -> Option<Money> {
        self.0.checked_times(days.into())
    }
}

impl TryFrom<Money> for DailyPrice {
    type Error = &'static str;

    fn try_from(price: Money) -> Result<Self, Self::Error> {
        Self::new(price).ok_or("`DailyPrice` must be positive")
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// Marker type indicating a [`Listing`] being requested.
#[derive(Clone, Copy, Debug)]
pub struct Request;

/// [`DateTime`] when a [`Listing`] was requested.
pub type RequestDateTime = DateTimeOf<(Listing, Request)>;

/// Marker type indicating a [`Listing`] being rented out.
#[derive(Clone, Copy, Debug)]
pub struct Rent;

/// [`DateTime`] when a [`Listing`] was rented out.
pub type RentDateTime = DateTimeOf<(Listing, Rent)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, DateTime, Money};

    use crate::domain::{rental_request::Days, user};

    use super::{DailyPrice, State, Status};

    fn usd(amount: u32) -> Money {
        Money {
            amount: amount.into(),
            currency: Currency::Usd,
        }
    }

    #[test]
    fn status_has_textual_and_numeric_forms() {
        for (status, text, code) in [
            (Status::Available, "AVAILABLE", 1),
            (Status::Requested, "REQUESTED", 2),
            (Status::Rented, "RENTED", 3),
        ] {
            assert_eq!(status.to_string(), text);
            assert_eq!(text.parse::<Status>().ok(), Some(status));
            assert_eq!(Status::from_code(code), Some(status));
        }
        assert!("available".parse::<Status>().is_err());
        assert_eq!(Status::from_code(0), None);
    }

    #[test]
    fn availability_agrees_with_status() {
        let by = user::Id::new();
        for (state, available) in [
            (State::Available, true),
            (
                State::Requested {
                    by,
                    at: DateTime::now().coerce(),
                },
                false,
            ),
            (
                State::Rented {
                    by,
                    at: DateTime::now().coerce(),
                },
                false,
            ),
        ] {
            assert_eq!(state.status() == Status::Available, available);
        }
    }

    #[test]
    fn restores_state_from_consistent_parts_only() {
        let by = user::Id::new();
        let requested_at = DateTime::now().coerce();
        let rented_at = DateTime::now().coerce();

        assert_eq!(
            State::from_parts(Status::Available, None, None, None, None),
            Some(State::Available),
        );
        assert_eq!(
            State::from_parts(
                Status::Requested,
                Some(by),
                Some(requested_at),
                None,
                None,
            ),
            Some(State::Requested {
                by,
                at: requested_at,
            }),
        );
        assert_eq!(
            State::from_parts(
                Status::Rented,
                None,
                None,
                Some(by),
                Some(rented_at),
            ),
            Some(State::Rented { by, at: rented_at }),
        );

        assert_eq!(
            State::from_parts(Status::Available, Some(by), None, None, None),
            None,
        );
        assert_eq!(
            State::from_parts(Status::Requested, None, None, None, None),
            None,
        );
        assert_eq!(
            State::from_parts(
                Status::Rented,
                Some(by),
                Some(requested_at),
                Some(by),
                Some(rented_at),
            ),
            None,
        );
    }

    #[test]
    fn daily_price_is_positive() {
        assert!(DailyPrice::new(usd(50)).is_some());
        assert!(DailyPrice::new(usd(0)).is_none());
    }

    #[test]
    fn daily_price_totals_per_day() {
        let price = DailyPrice::new(usd(50)).unwrap();

        assert_eq!(price.total_for(Days::new(3).unwrap()), Some(usd(150)));
        assert_eq!(price.total_for(Days::new(1).unwrap()), Some(usd(50)));
    }
}
