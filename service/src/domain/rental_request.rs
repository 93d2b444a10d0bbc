//! [`RentalRequest`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Listing, Rental, User};
use crate::domain::{listing, user};

/// Proposal of a renter to rent a [`Listing`] for a [`Window`] of days,
/// awaiting a decision of the owner.
#[derive(Clone, Debug)]
pub struct RentalRequest {
    /// ID of this [`RentalRequest`].
    pub id: Id,

    /// ID of the requested [`Listing`].
    pub listing_id: listing::Id,

    /// ID of the [`User`] owning the requested [`Listing`].
    pub owner_id: user::Id,

    /// ID of the [`User`] requesting the [`Listing`].
    pub renter_id: user::Id,

    /// Requested [`Window`] of days.
    pub window: Window,

    /// Number of [`Days`] in the requested [`Window`].
    pub duration: Days,

    /// Total cost frozen at the moment of submission.
    pub total_cost: Money,

    /// [`ContactInfo`] the renter may be reached by.
    pub contact_info: ContactInfo,

    /// [`Notes`] of the renter to the owner, if any.
    pub notes: Option<Notes>,

    /// [`Status`] of this [`RentalRequest`].
    pub status: Status,

    /// [`DateTime`] when this [`RentalRequest`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`RentalRequest`] left [`Status::Pending`].
    pub decided_at: Option<DecisionDateTime>,
}

impl RentalRequest {
    /// Indicates whether this [`RentalRequest`] still awaits a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    /// Moves this [`RentalRequest`] into the provided terminal [`Status`],
    /// recording the decision [`DateTime`].
    ///
    /// # Errors
    ///
    /// With [`TransitionError`] if this [`RentalRequest`] is already decided
    /// or the provided [`Status`] is not terminal.
    pub fn decide(
        &mut self,
        to: Status,
        at: DecisionDateTime,
    ) -> Result<(), TransitionError> {
        self.status = self.status.transition(to)?;
        self.decided_at = Some(at);
        Ok(())
    }
}

define_kind! {
    #[doc = "Status of a [`RentalRequest`]."]
    enum Status {
        #[doc = "[`RentalRequest`] awaits a decision of the owner."]
        Pending = 1,

        #[doc = "[`RentalRequest`] is approved and a [`Rental`] exists."]
        Approved = 2,

        #[doc = "[`RentalRequest`] is rejected by the owner."]
        Rejected = 3,

        #[doc = "[`RentalRequest`] is withdrawn by the renter."]
        Cancelled = 4,
    }
}

impl Status {
    /// Indicates whether this [`Status`] can never be left.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the [`Status`] reached by moving from this one to the
    /// provided one.
    ///
    /// # Errors
    ///
    /// If the transition is not allowed: only [`Status::Pending`] may be
    /// left, and only towards a terminal [`Status`].
    pub const fn transition(self, to: Self) -> Result<Self, TransitionError> {
        match (self, to) {
            (
                Self::Pending,
                Self::Approved | Self::Rejected | Self::Cancelled,
            ) => Ok(to),
            (Self::Pending, Self::Pending) => {
                Err(TransitionError::NotTerminal)
            }
            (Self::Approved | Self::Rejected | Self::Cancelled, _) => {
                Err(TransitionError::AlreadyDecided(self))
            }
        }
    }
}

/// Error of a [`Status::transition()`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum TransitionError {
    /// [`RentalRequest`] has already left [`Status::Pending`].
    #[display("`RentalRequest` is already decided as `{_0}`")]
    AlreadyDecided(#[error(not(source))] Status),

    /// Target [`Status`] is not terminal.
    #[display("`RentalRequest` can only be moved into a terminal status")]
    NotTerminal,
}

/// Window of days a [`Listing`] is requested for.
///
/// The `end` day is exclusive and always comes after the `start` one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    /// First day of the rent.
    start: Date,

    /// Day the dog is returned.
    end: Date,
}

impl Window {
    /// Creates a new [`Window`] checking it doesn't start before `today` and
    /// ends after it starts.
    ///
    /// # Errors
    ///
    /// With [`WindowError`] if the provided days violate the ordering.
    pub fn new(
        start: Date,
        end: Date,
        today: Date,
    ) -> Result<Self, WindowError> {
        if start < today {
            return Err(WindowError::StartsInPast { start, today });
        }
        Self::between(start, end)
            .ok_or(WindowError::NotAfterStart { start, end })
    }

    /// Creates a new [`Window`] without regard to the current day, as needed
    /// for restoring already accepted [`Window`]s.
    ///
    /// [`None`] is returned if `end` doesn't come after `start`.
    #[must_use]
    pub fn between(start: Date, end: Date) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Returns the first day of this [`Window`].
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the (exclusive) last day of this [`Window`].
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Returns the number of [`Days`] covered by this [`Window`].
    ///
    /// [`None`] is returned if the [`Window`] is too long to be counted.
    #[must_use]
    pub fn duration(&self) -> Option<Days> {
        u32::try_from(self.start.days_until(self.end))
            .ok()
            .and_then(Days::new)
    }
}

/// Error of creating a [`Window`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum WindowError {
    /// The [`Window`] starts before today.
    #[display("rent cannot start on {start}, before today ({today})")]
    StartsInPast {
        /// Requested first day.
        start: Date,

        /// Current day.
        today: Date,
    },

    /// The [`Window`] doesn't end after it starts.
    #[display("rent must end after {start}, but ends on {end}")]
    NotAfterStart {
        /// Requested first day.
        start: Date,

        /// Requested return day.
        end: Date,
    },
}

/// Positive number of days.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Days(u32);

impl Days {
    /// Creates new [`Days`] if the provided `count` is positive.
    #[must_use]
    pub const fn new(count: u32) -> Option<Self> {
        if count == 0 {
            None
        } else {
            Some(Self(count))
        }
    }
}

/// ID of a [`RentalRequest`].
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

/// Contact information of a renter (phone number, email, messenger handle).
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ContactInfo(String);

impl ContactInfo {
    /// Creates a new [`ContactInfo`] if the given `info` is valid.
    #[must_use]
    pub fn new(info: impl Into<String>) -> Option<Self> {
        let info = info.into();
        Self::check(&info).then_some(Self(info))
    }

    /// Checks whether the given `info` is a valid [`ContactInfo`].
    fn check(info: impl AsRef<str>) -> bool {
        let info = info.as_ref();
        info.trim() == info && !info.is_empty() && info.len() <= 256
    }
}

impl FromStr for ContactInfo {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ContactInfo`")
    }
}

/// Free-form notes of a renter to an owner.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        !notes.trim().is_empty() && notes.len() <= 2048
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// [`DateTime`] when a [`RentalRequest`] was created.
pub type CreationDateTime = DateTimeOf<(RentalRequest, unit::Creation)>;

/// [`DateTime`] when a [`RentalRequest`] was decided upon.
pub type DecisionDateTime = DateTimeOf<(RentalRequest, unit::Decision)>;

#[cfg(test)]
mod spec {
    use common::Date;

    use super::{Days, Status, TransitionError, Window, WindowError};

    fn date(s: &str) -> Date {
        Date::from_iso(s).unwrap()
    }

    #[test]
    fn window_counts_days() {
        let window = Window::new(
            date("2024-06-01"),
            date("2024-06-04"),
            date("2024-05-20"),
        )
        .unwrap();

        assert_eq!(window.duration(), Days::new(3));
        assert_eq!(window.start(), date("2024-06-01"));
        assert_eq!(window.end(), date("2024-06-04"));
    }

    #[test]
    fn window_may_start_today() {
        let today = date("2024-06-01");

        assert!(Window::new(today, date("2024-06-02"), today).is_ok());
    }

    #[test]
    fn window_rejects_past_start() {
        assert_eq!(
            Window::new(
                date("2024-05-31"),
                date("2024-06-04"),
                date("2024-06-01"),
            ),
            Err(WindowError::StartsInPast {
                start: date("2024-05-31"),
                today: date("2024-06-01"),
            }),
        );
    }

    #[test]
    fn window_rejects_unordered_days() {
        let today = date("2024-06-01");

        assert_eq!(
            Window::new(date("2024-06-04"), date("2024-06-04"), today),
            Err(WindowError::NotAfterStart {
                start: date("2024-06-04"),
                end: date("2024-06-04"),
            }),
        );
        assert!(matches!(
            Window::new(date("2024-06-04"), date("2024-06-02"), today),
            Err(WindowError::NotAfterStart { .. }),
        ));
    }

    #[test]
    fn pending_moves_into_terminal_statuses_only() {
        for to in [Status::Approved, Status::Rejected, Status::Cancelled] {
            assert_eq!(Status::Pending.transition(to), Ok(to));
            assert!(to.is_terminal());
        }
        assert_eq!(
            Status::Pending.transition(Status::Pending),
            Err(TransitionError::NotTerminal),
        );
        assert!(!Status::Pending.is_terminal());
    }

    #[test]
    fn terminal_statuses_are_never_left() {
        for from in [Status::Approved, Status::Rejected, Status::Cancelled] {
            for to in [
                Status::Pending,
                Status::Approved,
                Status::Rejected,
                Status::Cancelled,
            ] {
                assert_eq!(
                    from.transition(to),
                    Err(TransitionError::AlreadyDecided(from)),
                );
            }
        }
    }

    #[test]
    fn days_are_positive() {
        assert!(Days::new(0).is_none());
        assert_eq!(Days::new(2).map(u32::from), Some(2));
    }
}
