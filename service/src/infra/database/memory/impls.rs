//! [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{
    By, Commit, CompareAndSwap, Delete, Insert, Lock, Select, Transact,
};
use tracerr::Traced;

use crate::{
    domain::{
        listing, notification, rental_request, Listing, Notification, Rental,
        RentalRequest,
    },
    infra::{database, Database},
    read,
};

use super::{Access, Error, Memory, NonTx, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::begin(&self.0).await))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await;
        Ok(())
    }
}

/// Sorts the provided `items` by their creation time, newest first.
fn newest_first<T, K: Ord>(
    mut items: Vec<T>,
    created_at: impl Fn(&T) -> K,
) -> Vec<T> {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

impl<C: Access> Database<Lock<By<Listing, listing::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // `Tx`s are exclusive already.
        Ok(())
    }
}

impl<C, IDs> Database<Select<By<HashMap<listing::Id, Listing>, IDs>>>
    for Memory<C>
where
    C: Access,
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        self.read(|s| {
            ids.as_ref()
                .iter()
                .filter_map(|id| s.listings.get(id))
                .map(|l| (l.id, l.clone()))
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Listing>, listing::Id>>>
    for Memory<C>
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.listings.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Listing>, read::listing::OwnedBy>>>
    for Memory<C>
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, read::listing::OwnedBy>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::listing::OwnedBy(owner_id) = by.into_inner();
        self.read(|s| {
            s.listings
                .values()
                .filter(|l| l.owner_id == owner_id)
                .cloned()
                .collect()
        })
        .await
        .map(|ls| newest_first(ls, |l: &Listing| l.created_at))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Listing>, read::listing::Available>>>
    for Memory<C>
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Listing>, read::listing::Available>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| {
            s.listings
                .values()
                .filter(|l| l.is_available())
                .cloned()
                .collect()
        })
        .await
        .map(|ls| newest_first(ls, |l: &Listing| l.created_at))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Listing>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| drop(s.listings.insert(listing.id, listing)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<CompareAndSwap<Listing, listing::Status>>
    for Memory<C>
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        CompareAndSwap { expected, new }: CompareAndSwap<
            Listing,
            listing::Status,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| match s.listings.get_mut(&new.id) {
            Some(current) if current.status() == expected => {
                *current = new;
                true
            }
            Some(_) | None => false,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Delete<By<Listing, listing::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|s| drop(s.listings.remove(&id)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Option<RentalRequest>, rental_request::Id>>>
    for Memory<C>
{
    type Ok = Option<RentalRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentalRequest>, rental_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.rental_requests.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<RentalRequest>, read::rental_request::PendingFor>>>
    for Memory<C>
{
    type Ok = Vec<RentalRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<RentalRequest>, read::rental_request::PendingFor>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_request::PendingFor(owner_id) = by.into_inner();
        self.read(|s| {
            s.rental_requests
                .values()
                .filter(|r| r.owner_id == owner_id && r.is_pending())
                .cloned()
                .collect()
        })
        .await
        .map(|rs| newest_first(rs, |r: &RentalRequest| r.created_at))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<RentalRequest>, read::rental_request::RequestedBy>>>
    for Memory<C>
{
    type Ok = Vec<RentalRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<RentalRequest>, read::rental_request::RequestedBy>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_request::RequestedBy(renter_id) = by.into_inner();
        self.read(|s| {
            s.rental_requests
                .values()
                .filter(|r| r.renter_id == renter_id)
                .cloned()
                .collect()
        })
        .await
        .map(|rs| newest_first(rs, |r: &RentalRequest| r.created_at))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<RentalRequest>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(request): Insert<RentalRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            let conflicts = request.is_pending()
                && s.rental_requests.values().any(|r| {
                    r.id != request.id
                        && r.listing_id == request.listing_id
                        && r.is_pending()
                });
            if conflicts {
                return Err(Error::UniqueViolation(
                    "rental_requests_pending_listing_id_key",
                ));
            }
            drop(s.rental_requests.insert(request.id, request));
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())?
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C: Access> Database<Delete<By<RentalRequest, rental_request::Id>>>
    for Memory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<RentalRequest, rental_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|s| drop(s.rental_requests.remove(&id)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Rental>, rental_request::Id>>>
    for Memory<C>
{
    type Ok = Option<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rental>, rental_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let request_id = by.into_inner();
        self.read(|s| {
            s.rentals
                .values()
                .find(|r| r.request_id == request_id)
                .cloned()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Rental>, read::rental::RentedBy>>>
    for Memory<C>
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::RentedBy>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental::RentedBy(renter_id) = by.into_inner();
        self.read(|s| {
            s.rentals
                .values()
                .filter(|r| r.renter_id == renter_id)
                .cloned()
                .collect()
        })
        .await
        .map(|rs| newest_first(rs, |r: &Rental| r.created_at))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Rental>, read::rental::OwnedBy>>>
    for Memory<C>
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::OwnedBy>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental::OwnedBy(owner_id) = by.into_inner();
        self.read(|s| {
            s.rentals
                .values()
                .filter(|r| r.owner_id == owner_id)
                .cloned()
                .collect()
        })
        .await
        .map(|rs| newest_first(rs, |r: &Rental| r.created_at))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Rental>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(rental): Insert<Rental>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            if s.rentals.values().any(|r| {
                r.id != rental.id && r.request_id == rental.request_id
            }) {
                return Err(Error::UniqueViolation("rentals_request_id_key"));
            }
            drop(s.rentals.insert(rental.id, rental));
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())?
        .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl<C: Access>
    Database<Select<By<Option<Notification>, notification::Id>>>
    for Memory<C>
{
    type Ok = Option<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Notification>, notification::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.notifications.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<Notification>, read::notification::AddressedTo>>>
    for Memory<C>
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Notification>, read::notification::AddressedTo>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::notification::AddressedTo(recipient_id) = by.into_inner();
        self.read(|s| {
            s.notifications
                .values()
                .filter(|n| n.recipient_id == recipient_id)
                .cloned()
                .collect()
        })
        .await
        .map(|ns| newest_first(ns, |n: &Notification| n.created_at))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Notification>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.fails_notifications() {
            return Err(tracerr::new!(database::Error::from(
                Error::Unavailable
            )));
        }
        self.write(|s| {
            drop(s.notifications.insert(notification.id, notification));
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Delete<By<Notification, notification::Id>>>
    for Memory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Notification, notification::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|s| drop(s.notifications.remove(&id)))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, CompareAndSwap, Select},
        DateTime,
    };

    use crate::{
        domain::{
            listing::{self, State},
            user, Listing,
        },
        fixture,
        infra::{Database as _, Memory},
    };

    async fn select(db: &Memory, id: listing::Id) -> Listing {
        db.execute(Select(By::<Option<Listing>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn swaps_listing_in_expected_status() {
        let (svc, db) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        let renter_id = user::Id::new();

        let swapped = db
            .execute(CompareAndSwap {
                expected: listing::Status::Available,
                new: Listing {
                    state: State::Requested {
                        by: renter_id,
                        at: DateTime::now().coerce(),
                    },
                    ..listing.clone()
                },
            })
            .await
            .unwrap();

        assert!(swapped);
        let stored = select(&db, listing.id).await;
        assert_eq!(stored.status(), listing::Status::Requested);
        assert_eq!(stored.requested_by(), Some(renter_id));
    }

    #[tokio::test]
    async fn keeps_listing_in_unexpected_status() {
        let (svc, db) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        let first = user::Id::new();
        let second = user::Id::new();
        let request_by = |by| Listing {
            state: State::Requested {
                by,
                at: DateTime::now().coerce(),
            },
            ..listing.clone()
        };

        assert!(db
            .execute(CompareAndSwap {
                expected: listing::Status::Available,
                new: request_by(first),
            })
            .await
            .unwrap());
        let swapped = db
            .execute(CompareAndSwap {
                expected: listing::Status::Available,
                new: request_by(second),
            })
            .await
            .unwrap();

        assert!(!swapped);
        let stored = select(&db, listing.id).await;
        assert_eq!(stored.status(), listing::Status::Requested);
        assert_eq!(stored.requested_by(), Some(first));
    }

    #[tokio::test]
    async fn does_not_swap_missing_listing() {
        let (_, db) = fixture::service();
        let (svc, _) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;

        let swapped = db
            .execute(CompareAndSwap {
                expected: listing::Status::Available,
                new: listing.clone(),
            })
            .await
            .unwrap();

        assert!(!swapped);
        assert!(db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .is_none());
    }
}
