//! [`Rental`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// A confirmed rent of a `Listing`.
#[derive(Clone, Debug, From)]
pub struct Rental(domain::Rental);

/// A confirmed rent of a `Listing`.
#[graphql_object(context = Context)]
impl Rental {
    /// Unique identifier of this `Rental`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `RentalRequest` this `Rental` is approved from.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.request",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn request(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::RentalRequest>, Error> {
        ctx.service()
            .execute(query::rental_request::ById::by(self.0.request_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|r| r.map(Into::into))
    }

    /// Rented `Listing`, unless it's removed already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Rental.listing",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Listing>, Error> {
        ctx.service()
            .execute(query::listing::ById::by(self.0.listing_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|l| l.map(Into::into))
    }

    /// ID of the `User` owning the rented `Listing`.
    pub fn owner_id(&self) -> api::user::Id {
        self.0.owner_id.into()
    }

    /// ID of the `User` renting the `Listing`.
    pub fn renter_id(&self) -> api::user::Id {
        self.0.renter_id.into()
    }

    /// First day of the rent.
    pub fn start_date(&self) -> Date {
        self.0.window.start()
    }

    /// Day the dog is returned.
    pub fn end_date(&self) -> Date {
        self.0.window.end()
    }

    /// Total cost of this `Rental`.
    pub fn total_cost(&self) -> Money {
        self.0.total_cost
    }

    /// Status of this `Rental`.
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Rental` was created.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Rental`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::rental::Id)]
#[into(domain::rental::Id)]
#[graphql(name = "RentalId", transparent)]
pub struct Id(Uuid);

/// Status of a `Rental`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "RentalStatus")]
pub enum Status {
    /// `Rental` is in progress.
    Active,

    /// `Rental` is over.
    Completed,
}

impl From<domain::rental::Status> for Status {
    fn from(status: domain::rental::Status) -> Self {
        use domain::rental::Status as S;
        match status {
            S::Active => Self::Active,
            S::Completed => Self::Completed,
        }
    }
}
