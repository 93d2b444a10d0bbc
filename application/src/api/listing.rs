//! [`Listing`]-related definitions.

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context, Error,
};

/// A dog offered for rent.
#[derive(Clone, Debug, From)]
pub struct Listing(domain::Listing);

/// A dog offered for rent.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// ID of the `User` owning the listed dog.
    pub fn owner_id(&self) -> api::user::Id {
        self.0.owner_id.into()
    }

    /// Name of the listed dog.
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Description of the listed dog.
    pub fn description(&self) -> Option<Description> {
        self.0.description.clone().map(Into::into)
    }

    /// Price of renting the listed dog for a single day.
    pub fn price_per_day(&self) -> DailyPrice {
        self.0.price_per_day.into()
    }

    /// Current status of this `Listing` in the rental lifecycle.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status().into()
    }

    /// Indicator whether this `Listing` may be requested for rent.
    pub fn available(&self) -> bool {
        self.0.is_available()
    }

    /// ID of the `User` who requested this `Listing`, if it's `REQUESTED`.
    ///
    /// Visible to the owner of this `Listing` only.
    pub async fn requested_by(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::user::Id>, Error> {
        Ok(self
            .is_owned_by_viewer(ctx)
            .await?
            .then(|| self.0.requested_by())
            .flatten()
            .map(Into::into))
    }

    /// ID of the `User` renting this `Listing`, if it's `RENTED`.
    ///
    /// Visible to the owner of this `Listing` only.
    pub async fn rented_by(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::user::Id>, Error> {
        Ok(self
            .is_owned_by_viewer(ctx)
            .await?
            .then(|| self.0.rented_by())
            .flatten()
            .map(Into::into))
    }

    /// `DateTime` when this `Listing` was created.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

impl Listing {
    /// Checks whether the [`Context`] is authenticated as the owner of this
    /// [`Listing`].
    async fn is_owned_by_viewer(&self, ctx: &Context) -> Result<bool, Error> {
        let owner_id = api::user::Id::from(self.0.owner_id);
        Ok(ctx
            .try_current_session()
            .await?
            .is_some_and(|s| s.user_id == owner_id))
    }
}

/// Unique identifier of a `Listing`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Name of a listed dog.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingName",
    with = scalar::Via::<domain::listing::Name>,
)]
pub struct Name(domain::listing::Name);

/// Description of a listed dog.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingDescription",
    with = scalar::Via::<domain::listing::Description>,
)]
pub struct Description(domain::listing::Description);

/// Positive price of renting a dog for a single day.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "DailyPrice", with = scalar::Via::<Money>)]
pub struct DailyPrice(domain::listing::DailyPrice);

impl AsRef<Money> for DailyPrice {
    fn as_ref(&self) -> &Money {
        self.0.as_ref()
    }
}

impl TryFrom<Money> for DailyPrice {
    type Error = &'static str;

    fn try_from(price: Money) -> Result<Self, Self::Error> {
        domain::listing::DailyPrice::try_from(price).map(Self)
    }
}

/// Status of a `Listing` in the rental lifecycle.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingStatus")]
pub enum Status {
    /// `Listing` may be requested for rent.
    Available,

    /// `Listing` has a pending `RentalRequest`.
    Requested,

    /// `Listing` is rented out.
    Rented,
}

impl From<domain::listing::Status> for Status {
    fn from(status: domain::listing::Status) -> Self {
        use domain::listing::Status as S;
        match status {
            S::Available => Self::Available,
            S::Requested => Self::Requested,
            S::Rented => Self::Rented,
        }
    }
}
