//! Domain definitions.

pub mod listing;
pub mod notification;
pub mod rental;
pub mod rental_request;
pub mod user;

pub use self::{
    listing::Listing, notification::Notification, rental::Rental,
    rental_request::RentalRequest, user::User,
};
