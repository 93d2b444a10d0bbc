//! [`Notification`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A message addressed to a `User` about a change in the rental lifecycle.
#[derive(Clone, Debug, From)]
pub struct Notification(domain::Notification);

/// A message addressed to a `User` about a change in the rental lifecycle.
#[graphql_object(context = Context)]
impl Notification {
    /// Unique identifier of this `Notification`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Notification.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Kind of this `Notification`.
    pub fn kind(&self) -> Kind {
        self.0.kind.into()
    }

    /// Title of this `Notification`.
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Human-readable message of this `Notification`.
    pub fn message(&self) -> Message {
        self.0.message.clone().into()
    }

    /// Structured payload of this `Notification`, as a JSON string.
    pub fn payload(&self) -> String {
        self.0.payload.as_json().to_string()
    }

    /// Indicator whether this `Notification` is read by its recipient.
    pub fn is_read(&self) -> bool {
        self.0.is_read
    }

    /// `DateTime` when this `Notification` was sent.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Notification`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::notification::Id)]
#[into(domain::notification::Id)]
#[graphql(name = "NotificationId", transparent)]
pub struct Id(Uuid);

/// Title of a `Notification`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "NotificationTitle",
    with = scalar::Via::<domain::notification::Title>,
)]
pub struct Title(domain::notification::Title);

/// Message of a `Notification`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "NotificationMessage",
    with = scalar::Via::<domain::notification::Message>,
)]
pub struct Message(domain::notification::Message);

/// Kind of a `Notification`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "NotificationKind")]
pub enum Kind {
    /// A new `RentalRequest` awaits a decision of the owner.
    RentalRequest,

    /// A `RentalRequest` of the renter is approved.
    RentalApproved,

    /// A `RentalRequest` of the renter is rejected.
    RentalRejected,

    /// A `RentalRequest` to the owner is withdrawn.
    RentalCancelled,
}

impl From<domain::notification::Kind> for Kind {
    fn from(kind: domain::notification::Kind) -> Self {
        use domain::notification::Kind as K;
        match kind {
            K::RentalRequest => Self::RentalRequest,
            K::RentalApproved => Self::RentalApproved,
            K::RentalRejected => Self::RentalRejected,
            K::RentalCancelled => Self::RentalCancelled,
        }
    }
}
