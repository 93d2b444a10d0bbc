//! GraphQL API definitions.

pub mod listing;
mod mutation;
pub mod notification;
mod query;
pub mod rental;
pub mod rental_request;
pub mod scalar;
pub mod user;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    listing::Listing, mutation::Mutation, notification::Notification,
    query::Query, rental::Rental, rental_request::RentalRequest,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,

        #[code = "LISTING_NOT_AVAILABLE"]
        #[status = CONFLICT]
        #[message = "This dog is no longer available"]
        NotAvailable,

        #[code = "NOT_LISTING_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` doesn't own the `Listing`"]
        NotOwner,
    }
}
