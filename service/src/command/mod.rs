//! [`Command`] definition.

pub mod approve_rental_request;
pub mod authorize_user_session;
pub mod cancel_rental_request;
pub mod create_listing;
pub mod delete_listing;
pub mod delete_notification;
pub mod dispatch_notification;
pub mod mark_notification_read;
pub mod reject_rental_request;
pub mod submit_rental_request;
pub mod update_listing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    approve_rental_request::ApproveRentalRequest,
    authorize_user_session::AuthorizeUserSession,
    cancel_rental_request::CancelRentalRequest, create_listing::CreateListing,
    delete_listing::DeleteListing, delete_notification::DeleteNotification,
    dispatch_notification::DispatchNotification,
    mark_notification_read::MarkNotificationRead,
    reject_rental_request::RejectRentalRequest,
    submit_rental_request::SubmitRentalRequest, update_listing::UpdateListing,
};
