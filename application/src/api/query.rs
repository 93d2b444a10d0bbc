//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Listing` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        ctx.service()
            .execute(query::listing::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ListingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Listing`s which may be requested for rent, newest
    /// first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "availableListings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn available_listings(
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        ctx.service()
            .execute(query::listings::Available::by(read::listing::Available))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }

    /// Returns the `Listing`s owned by the authenticated `User`, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myListings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_listings(
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::listings::OwnedBy::by(read::listing::OwnedBy(
                my_id.into(),
            )))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }

    /// Returns the `RentalRequest`s awaiting a decision of the authenticated
    /// `User`, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "pendingRentalRequests",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn pending_rental_requests(
        ctx: &Context,
    ) -> Result<Vec<api::RentalRequest>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::rental_requests::PendingForOwner {
                owner_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// Returns the `RentalRequest`s submitted by the authenticated `User`,
    /// newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myRentalRequests",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_rental_requests(
        ctx: &Context,
    ) -> Result<Vec<api::RentalRequest>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::rental_requests::RequestedBy::by(
                read::rental_request::RequestedBy(my_id.into()),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// Returns the `Rental`s of the authenticated `User` as a renter, newest
    /// first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myRentals",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_rentals(ctx: &Context) -> Result<Vec<api::Rental>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::rentals::RentedBy::by(read::rental::RentedBy(
                my_id.into(),
            )))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// Returns the `Rental`s of the `Listing`s owned by the authenticated
    /// `User`, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myOwnedRentals",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_owned_rentals(
        ctx: &Context,
    ) -> Result<Vec<api::Rental>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::rentals::OwnedBy::by(read::rental::OwnedBy(
                my_id.into(),
            )))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// Returns the `Notification`s addressed to the authenticated `User`,
    /// newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myNotifications",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_notifications(
        ctx: &Context,
    ) -> Result<Vec<api::Notification>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::notifications::AddressedTo::by(
                read::notification::AddressedTo(my_id.into()),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ns| ns.into_iter().map(Into::into).collect())
    }
}
