//! GraphQL [`Mutation`]s definitions.

use common::Date;
use juniper::{graphql_object, Nullable};
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Lists a new dog for rent, owned by the authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            description = ?description.as_ref().map(ToString::to_string),
            gql.name = "createListing",
            name = %name,
            otel.name = Self::SPAN_NAME,
            price_per_day = %price_per_day,
        ),
    )]
    pub async fn create_listing(
        name: api::listing::Name,
        description: Option<api::listing::Description>,
        price_per_day: api::listing::DailyPrice,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateListing {
                owner_id: my_id.into(),
                name: name.into(),
                description: description.map(Into::into),
                price_per_day: price_per_day.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `Listing` owned by the authenticated `User`.
    ///
    /// Omitted arguments are left unchanged, while an explicit `null`
    /// `description` removes it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `NOT_LISTING_OWNER` - the authenticated `User` doesn't own the
    ///                         `Listing`;
    /// - `LISTING_NOT_AVAILABLE` - the `Listing` is requested or rented at
    ///                             the moment.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_listing(
        id: api::listing::Id,
        name: Option<api::listing::Name>,
        description: Nullable<api::listing::Description>,
        price_per_day: Option<api::listing::DailyPrice>,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateListing {
                listing_id: id.into(),
                initiator_id: my_id.into(),
                name: name.map(Into::into),
                description: description
                    .explicit()
                    .map(|d| d.map(Into::into)),
                price_per_day: price_per_day.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Listing` owned by the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `NOT_LISTING_OWNER` - the authenticated `User` doesn't own the
    ///                         `Listing`;
    /// - `LISTING_NOT_AVAILABLE` - the `Listing` is requested or rented at
    ///                             the moment.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteListing {
                listing_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Requests the `Listing` for rent on behalf of the authenticated `User`.
    ///
    /// The `endDate` is the day the dog is returned, so the rent lasts the
    /// days between `startDate` and `endDate`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `LISTING_NOT_AVAILABLE` - the `Listing` is requested or rented by
    ///                             someone already;
    /// - `OWN_LISTING` - the authenticated `User` owns the `Listing`;
    /// - `INVALID_RENTAL_WINDOW` - the rent starts in the past, doesn't end
    ///                             after it starts or lasts too long.
    #[tracing::instrument(
        skip_all,
        fields(
            end_date = %end_date,
            gql.name = "submitRentalRequest",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
            start_date = %start_date,
        ),
    )]
    pub async fn submit_rental_request(
        listing_id: api::listing::Id,
        start_date: Date,
        end_date: Date,
        contact_info: api::rental_request::ContactInfo,
        notes: Option<api::rental_request::Notes>,
        ctx: &Context,
    ) -> Result<api::RentalRequest, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::SubmitRentalRequest {
                listing_id: listing_id.into(),
                renter_id: my_id.into(),
                start: start_date,
                end: end_date,
                contact_info: contact_info.into(),
                notes: notes.map(Into::into),
                today: Date::today(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Approves the `RentalRequest` to a `Listing` of the authenticated
    /// `User`, renting the dog out.
    ///
    /// Approving an already approved `RentalRequest` returns its `Rental`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RENTAL_REQUEST_NOT_EXISTS` - the `RentalRequest` with the specified
    ///                                 ID does not exist;
    /// - `NOT_LISTING_OWNER` - the authenticated `User` doesn't own the
    ///                         requested `Listing`;
    /// - `RENTAL_REQUEST_ALREADY_DECIDED` - the `RentalRequest` is rejected
    ///                                      or cancelled;
    /// - `LISTING_NOT_EXISTS` - the requested `Listing` is removed;
    /// - `LISTING_NOT_AVAILABLE` - the `Listing` is held by another
    ///                             `RentalRequest`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "approveRentalRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn approve_rental_request(
        id: api::rental_request::Id,
        ctx: &Context,
    ) -> Result<api::Rental, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::ApproveRentalRequest {
                request_id: id.into(),
                owner_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Rejects the `RentalRequest` to a `Listing` of the authenticated
    /// `User`, releasing the dog.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RENTAL_REQUEST_NOT_EXISTS` - the `RentalRequest` with the specified
    ///                                 ID does not exist;
    /// - `NOT_LISTING_OWNER` - the authenticated `User` doesn't own the
    ///                         requested `Listing`;
    /// - `RENTAL_REQUEST_ALREADY_DECIDED` - the `RentalRequest` is not
    ///                                      pending anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "rejectRentalRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reject_rental_request(
        id: api::rental_request::Id,
        ctx: &Context,
    ) -> Result<api::RentalRequest, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::RejectRentalRequest {
                request_id: id.into(),
                owner_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Withdraws the `RentalRequest` submitted by the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RENTAL_REQUEST_NOT_EXISTS` - the `RentalRequest` with the specified
    ///                                 ID does not exist;
    /// - `NOT_RENTER` - the `RentalRequest` is submitted by another `User`;
    /// - `RENTAL_REQUEST_ALREADY_DECIDED` - the `RentalRequest` is not
    ///                                      pending anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelRentalRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_rental_request(
        id: api::rental_request::Id,
        ctx: &Context,
    ) -> Result<api::RentalRequest, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CancelRentalRequest {
                request_id: id.into(),
                renter_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Notification` of the authenticated `User` as read.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOTIFICATION_NOT_EXISTS` - the `Notification` with the specified ID
    ///                               does not exist;
    /// - `NOT_RECIPIENT` - the `Notification` is addressed to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markNotificationRead",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_notification_read(
        id: api::notification::Id,
        ctx: &Context,
    ) -> Result<api::Notification, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::MarkNotificationRead {
                notification_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Notification` of the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOTIFICATION_NOT_EXISTS` - the `Notification` with the specified ID
    ///                               does not exist;
    /// - `NOT_RECIPIENT` - the `Notification` is addressed to another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteNotification",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_notification(
        id: api::notification::Id,
        ctx: &Context,
    ) -> Result<api::Notification, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteNotification {
                notification_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum RentalRequestError {
        #[code = "RENTAL_REQUEST_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`RentalRequest` with the specified ID does not exist"]
        NotExists,

        #[code = "RENTAL_REQUEST_ALREADY_DECIDED"]
        #[status = CONFLICT]
        #[message = "`RentalRequest` is not pending anymore"]
        AlreadyDecided,
    }
}

define_error! {
    enum NotificationError {
        #[code = "NOTIFICATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Notification` with the specified ID does not exist"]
        NotExists,

        #[code = "NOT_RECIPIENT"]
        #[status = FORBIDDEN]
        #[message = "`Notification` is addressed to another `User`"]
        NotRecipient,
    }
}

impl AsError for command::update_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotAvailable(_) => {
                Some(api::ListingError::NotAvailable.into())
            }
            Self::ListingNotExists(_) => {
                Some(api::ListingError::NotExists.into())
            }
            Self::NotOwner(_) => Some(api::ListingError::NotOwner.into()),
        }
    }
}

impl AsError for command::delete_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotAvailable(_) => {
                Some(api::ListingError::NotAvailable.into())
            }
            Self::ListingNotExists(_) => {
                Some(api::ListingError::NotExists.into())
            }
            Self::NotOwner(_) => Some(api::ListingError::NotOwner.into()),
        }
    }
}

impl AsError for command::submit_rental_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "OWN_LISTING"]
                #[status = FORBIDDEN]
                #[message = "`User` cannot rent their own `Listing`"]
                OwnListing,

                #[code = "INVALID_RENTAL_WINDOW"]
                #[status = BAD_REQUEST]
                #[message = "Rent must not start in the past and must end \
                             after it starts"]
                InvalidWindow,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidWindow(_) | Self::WindowTooLong(_) => {
                Some(Error::InvalidWindow.into())
            }
            Self::ListingNotAvailable(_) => {
                Some(api::ListingError::NotAvailable.into())
            }
            Self::ListingNotExists(_) => {
                Some(api::ListingError::NotExists.into())
            }
            Self::OwnListing(_) => Some(Error::OwnListing.into()),
        }
    }
}

impl AsError for command::approve_rental_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotAvailable(_) => {
                Some(api::ListingError::NotAvailable.into())
            }
            Self::ListingNotExists(_) => {
                Some(api::ListingError::NotExists.into())
            }
            Self::NotOwner(_) => Some(api::ListingError::NotOwner.into()),
            Self::RequestAlreadyDecided(_) => {
                Some(RentalRequestError::AlreadyDecided.into())
            }
            Self::RequestNotExists(_) => {
                Some(RentalRequestError::NotExists.into())
            }
        }
    }
}

impl AsError for command::reject_rental_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotAvailable(_) => {
                Some(api::ListingError::NotAvailable.into())
            }
            Self::NotOwner(_) => Some(api::ListingError::NotOwner.into()),
            Self::RequestAlreadyDecided(_) => {
                Some(RentalRequestError::AlreadyDecided.into())
            }
            Self::RequestNotExists(_) => {
                Some(RentalRequestError::NotExists.into())
            }
        }
    }
}

impl AsError for command::cancel_rental_request::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOT_RENTER"]
                #[status = FORBIDDEN]
                #[message = "`RentalRequest` is submitted by another `User`"]
                NotRenter,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotAvailable(_) => {
                Some(api::ListingError::NotAvailable.into())
            }
            Self::NotRenter(_) => Some(Error::NotRenter.into()),
            Self::RequestAlreadyDecided(_) => {
                Some(RentalRequestError::AlreadyDecided.into())
            }
            Self::RequestNotExists(_) => {
                Some(RentalRequestError::NotExists.into())
            }
        }
    }
}

impl AsError for command::mark_notification_read::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotificationNotExists(_) => {
                Some(NotificationError::NotExists.into())
            }
            Self::NotRecipient(_) => {
                Some(NotificationError::NotRecipient.into())
            }
        }
    }
}

impl AsError for command::delete_notification::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotificationNotExists(_) => {
                Some(NotificationError::NotExists.into())
            }
            Self::NotRecipient(_) => {
                Some(NotificationError::NotRecipient.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{command, domain::listing};

    use crate::AsError as _;

    #[test]
    fn reports_unavailable_listing_on_every_decision() {
        let id = listing::Id::new();

        for err in [
            command::submit_rental_request::ExecutionError::ListingNotAvailable(
                id,
            )
            .try_as_error(),
            command::approve_rental_request::ExecutionError::ListingNotAvailable(
                id,
            )
            .try_as_error(),
            command::reject_rental_request::ExecutionError::ListingNotAvailable(
                id,
            )
            .try_as_error(),
            command::cancel_rental_request::ExecutionError::ListingNotAvailable(
                id,
            )
            .try_as_error(),
        ] {
            let err = err.unwrap();
            assert_eq!(err.code, "LISTING_NOT_AVAILABLE");
            assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        }
    }
}
