//! [`RentalRequest`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A proposal of a renter to rent a `Listing`.
#[derive(Clone, Debug, From)]
pub struct RentalRequest(domain::RentalRequest);

/// A proposal of a renter to rent a `Listing`.
#[graphql_object(context = Context)]
impl RentalRequest {
    /// Unique identifier of this `RentalRequest`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalRequest.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Requested `Listing`, unless it's removed already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalRequest.listing",
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

    /// ID of the requested `Listing`.
    pub fn listing_id(&self) -> api::listing::Id {
        self.0.listing_id.into()
    }

    /// ID of the `User` owning the requested `Listing`.
    pub fn owner_id(&self) -> api::user::Id {
        self.0.owner_id.into()
    }

    /// ID of the `User` requesting the `Listing`.
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

    /// Number of days the `Listing` is requested for.
    pub fn duration_days(&self) -> i32 {
        i32::try_from(u32::from(self.0.duration)).unwrap_or(i32::MAX)
    }

    /// Total cost of the rent, fixed at the moment of submission.
    pub fn total_cost(&self) -> Money {
        self.0.total_cost
    }

    /// Contact information the renter may be reached by.
    pub fn contact_info(&self) -> ContactInfo {
        self.0.contact_info.clone().into()
    }

    /// Notes of the renter to the owner.
    pub fn notes(&self) -> Option<Notes> {
        self.0.notes.clone().map(Into::into)
    }

    /// Status of this `RentalRequest`.
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `Rental` this `RentalRequest` is approved as, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentalRequest.rental",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rental(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Rental>, Error> {
        if self.0.status != domain::rental_request::Status::Approved {
            return Ok(None);
        }
        ctx.service()
            .execute(query::rental::ByRequestId::by(self.0.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|r| r.map(Into::into))
    }

    /// `DateTime` when this `RentalRequest` was submitted.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `RentalRequest` was approved, rejected or
    /// cancelled.
    pub fn decided_at(&self) -> Option<DateTime> {
        self.0.decided_at.map(|at| at.coerce())
    }
}

/// Unique identifier of a `RentalRequest`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::rental_request::Id)]
#[into(domain::rental_request::Id)]
#[graphql(name = "RentalRequestId", transparent)]
pub struct Id(Uuid);

/// Contact information of a renter.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RentalRequestContactInfo",
    with = scalar::Via::<domain::rental_request::ContactInfo>,
)]
pub struct ContactInfo(domain::rental_request::ContactInfo);

/// Notes of a renter to an owner.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RentalRequestNotes",
    with = scalar::Via::<domain::rental_request::Notes>,
)]
pub struct Notes(domain::rental_request::Notes);

/// Status of a `RentalRequest`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "RentalRequestStatus")]
pub enum Status {
    /// `RentalRequest` awaits a decision of the owner.
    Pending,

    /// `RentalRequest` is approved and a `Rental` exists.
    Approved,

    /// `RentalRequest` is rejected by the owner.
    Rejected,

    /// `RentalRequest` is withdrawn by the renter.
    Cancelled,
}

impl From<domain::rental_request::Status> for Status {
    fn from(status: domain::rental_request::Status) -> Self {
        use domain::rental_request::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Approved => Self::Approved,
            S::Rejected => Self::Rejected,
            S::Cancelled => Self::Cancelled,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{Date, DateTime};
    use service::domain::{self, listing, rental_request, user};

    use super::RentalRequest;

    fn request(decided_at: Option<&str>) -> RentalRequest {
        let date = |iso: &str| Date::from_iso(iso).unwrap();
        let window = rental_request::Window::between(
            date("2024-06-01"),
            date("2024-06-04"),
        )
        .unwrap();

        RentalRequest::from(domain::RentalRequest {
            id: rental_request::Id::new(),
            listing_id: listing::Id::new(),
            owner_id: user::Id::new(),
            renter_id: user::Id::new(),
            window,
            duration: window.duration().unwrap(),
            total_cost: "150USD".parse().unwrap(),
            contact_info: rental_request::ContactInfo::new("+1 555 0100")
                .unwrap(),
            notes: None,
            status: rental_request::Status::Approved,
            created_at: "2024-05-20T09:00:00Z".parse().unwrap(),
            decided_at: decided_at.map(|at| at.parse().unwrap()),
        })
    }

    #[test]
    fn exposes_decision_time() {
        assert!(request(None).decided_at().is_none());
        assert_eq!(
            request(Some("2024-05-21T10:00:00Z")).decided_at(),
            Some("2024-05-21T10:00:00Z".parse::<DateTime>().unwrap()),
        );
    }
}
