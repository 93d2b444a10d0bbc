//! [`Notification`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{RentalRequest, User};
use crate::domain::user;

/// Message informing a [`User`] about a change in the rental lifecycle.
#[derive(Clone, Debug)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// ID of the [`User`] this [`Notification`] is addressed to.
    pub recipient_id: user::Id,

    /// [`Kind`] of this [`Notification`].
    pub kind: Kind,

    /// [`Title`] of this [`Notification`].
    pub title: Title,

    /// [`Message`] of this [`Notification`].
    pub message: Message,

    /// Structured [`Payload`] of this [`Notification`].
    pub payload: Payload,

    /// Indicator whether the recipient has read this [`Notification`].
    pub is_read: bool,

    /// [`DateTime`] when this [`Notification`] was created.
    pub created_at: CreationDateTime,
}

define_kind! {
    #[doc = "Kind of a [`Notification`]."]
    enum Kind {
        #[doc = "New [`RentalRequest`] is submitted to the owner."]
        RentalRequest = 1,

        #[doc = "[`RentalRequest`] is approved by the owner."]
        RentalApproved = 2,

        #[doc = "[`RentalRequest`] is rejected by the owner."]
        RentalRejected = 3,

        #[doc = "[`RentalRequest`] is cancelled by the renter."]
        RentalCancelled = 4,
    }
}

impl Kind {
    /// Returns the external `snake_case` name of this [`Kind`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RentalRequest => "rental_request",
            Self::RentalApproved => "rental_approved",
            Self::RentalRejected => "rental_rejected",
            Self::RentalCancelled => "rental_cancelled",
        }
    }
}

/// ID of a [`Notification`].
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

/// Short title of a [`Notification`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 256
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Human-readable body of a [`Notification`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Message(String);

impl Message {
    /// Creates a new [`Message`] if the given `message` is valid.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        Self::check(&message).then_some(Self(message))
    }

    /// Checks whether the given `message` is a valid [`Message`].
    fn check(message: impl AsRef<str>) -> bool {
        !message.as_ref().trim().is_empty()
    }
}

impl FromStr for Message {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Message`")
    }
}

/// Structured data attached to a [`Notification`], letting the client link it
/// to the [`RentalRequest`] it's about.
#[derive(
    Clone, Debug, Default, Deserialize, Eq, From, Into, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Payload(serde_json::Value);

impl Payload {
    /// Returns the JSON representation of this [`Payload`].
    #[must_use]
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// [`DateTime`] when a [`Notification`] was created.
pub type CreationDateTime = DateTimeOf<(Notification, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Kind, Message, Title};

    #[test]
    fn kind_has_external_names() {
        assert_eq!(Kind::RentalRequest.name(), "rental_request");
        assert_eq!(Kind::RentalApproved.name(), "rental_approved");
        assert_eq!(Kind::RentalRejected.name(), "rental_rejected");
        assert_eq!(Kind::RentalCancelled.name(), "rental_cancelled");
    }

    #[test]
    fn texts_are_not_blank() {
        assert!(Title::new("New rental request").is_some());
        assert!(Title::new(" padded ").is_none());
        assert!(Title::new("").is_none());

        assert!(Message::new("Rex was requested for 3 days").is_some());
        assert!(Message::new("   ").is_none());
    }
}
