//! Read entities definitions.

pub mod listing;
pub mod notification;
pub mod rental;
pub mod rental_request;
