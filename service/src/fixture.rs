//! Shared helpers of the [`Service`] tests.

use std::str::FromStr as _;

use common::{Date, Money};

use crate::{
    command::{CreateListing, SubmitRentalRequest},
    domain::{listing, rental_request, user, Listing},
    infra::Memory,
    Command as _, Config, Service,
};

/// Creates a new [`Service`] over an empty [`Memory`] database, returning
/// the database alongside for direct inspection.
pub(crate) fn service() -> (Service<Memory>, Memory) {
    let db = Memory::new();
    let config = Config {
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"secret"),
    };
    (Service::new(config, db.clone()), db)
}

/// Parses the provided `YYYY-MM-DD` date.
pub(crate) fn date(iso: &str) -> Date {
    Date::from_iso(iso).unwrap()
}

/// Returns the provided whole amount of US dollars.
pub(crate) fn usd(amount: u32) -> Money {
    Money::from_str(&format!("{amount}USD")).unwrap()
}

/// Returns the provided whole amount of US dollars as a
/// [`listing::DailyPrice`].
pub(crate) fn daily(amount: u32) -> listing::DailyPrice {
    listing::DailyPrice::new(usd(amount)).unwrap()
}

/// Creates a new [`Listing`] of the provided owner with the provided daily
/// price in US dollars.
pub(crate) async fn listing(
    svc: &Service<Memory>,
    owner_id: user::Id,
    price: u32,
) -> Listing {
    svc.execute(CreateListing {
        owner_id,
        name: listing::Name::new("Rex").unwrap(),
        description: listing::Description::new("Good boy"),
        price_per_day: daily(price),
    })
    .await
    .unwrap()
}

/// Returns a [`SubmitRentalRequest`] for 3 days starting on 2024-06-01, as
/// submitted on 2024-05-20.
pub(crate) fn submission(
    listing_id: listing::Id,
    renter_id: user::Id,
) -> SubmitRentalRequest {
    SubmitRentalRequest {
        listing_id,
        renter_id,
        start: date("2024-06-01"),
        end: date("2024-06-04"),
        contact_info: rental_request::ContactInfo::new("+1 555 0100")
            .unwrap(),
        notes: None,
        today: date("2024-05-20"),
    }
}
