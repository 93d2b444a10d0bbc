//! [`Query`] collection related to the multiple [`RentalRequest`]s.

use std::collections::{HashMap, HashSet};

use common::operations::{By, Delete, Select};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{rental_request::Status, User};
use crate::{
    domain::{listing, rental_request, user, Listing, RentalRequest},
    infra::{database, Database},
    read, Query, Service,
};

use super::DatabaseQuery;

/// Queries all [`RentalRequest`]s of a [`User`] as a renter, newest first.
pub type RequestedBy =
    DatabaseQuery<By<Vec<RentalRequest>, read::rental_request::RequestedBy>>;

/// [`Query`] of [`Status::Pending`] [`RentalRequest`]s awaiting a decision
/// of a [`User`] as an owner, newest first.
///
/// [`RentalRequest`]s whose [`Listing`] doesn't exist anymore are deleted
/// and never returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingForOwner {
    /// ID of the [`User`] owning the requested [`Listing`]s.
    pub owner_id: user::Id,
}

impl<Db> Query<PendingForOwner> for Service<Db>
where
    Db: Database<
            Select<By<Vec<RentalRequest>, read::rental_request::PendingFor>>,
            Ok = Vec<RentalRequest>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<listing::Id, Listing>, Vec<listing::Id>>>,
            Ok = HashMap<listing::Id, Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<RentalRequest, rental_request::Id>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<RentalRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        PendingForOwner { owner_id }: PendingForOwner,
    ) -> Result<Self::Ok, Self::Err> {
        let pending = self
            .database()
            .execute(Select(By::<Vec<RentalRequest>, _>::new(
                read::rental_request::PendingFor(owner_id),
            )))
            .await
            .map_err(tracerr::wrap!())?;
        if pending.is_empty() {
            return Ok(pending);
        }

        let listing_ids = pending
            .iter()
            .map(|r| r.listing_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let listings = self
            .database()
            .execute(Select(By::<HashMap<listing::Id, Listing>, _>::new(
                listing_ids,
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let (alive, orphans): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|r| listings.contains_key(&r.listing_id));
        for orphan in orphans {
            log::warn!(
                "deleting orphaned `RentalRequest(id: {})` of missing \
                 `Listing(id: {})`",
                orphan.id,
                orphan.listing_id,
            );
            self.database()
                .execute(Delete(By::<RentalRequest, _>::new(orphan.id)))
                .await
                .map_err(tracerr::wrap!())?;
        }

        Ok(alive)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Select};

    use crate::{
        domain::{user, Listing, RentalRequest},
        fixture, Command as _,
    };

    use super::PendingForOwner;

    #[tokio::test]
    async fn returns_pending_requests() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let first = fixture::listing(&svc, owner_id, 50).await;
        let second = fixture::listing(&svc, owner_id, 30).await;
        let a = svc
            .execute(fixture::submission(first.id, user::Id::new()))
            .await
            .unwrap();
        let b = svc
            .execute(fixture::submission(second.id, user::Id::new()))
            .await
            .unwrap();

        let pending = svc.execute(PendingForOwner { owner_id }).await.unwrap();

        assert_eq!(pending.len(), 2);
        assert!(pending.iter().any(|r| r.id == a.id));
        assert!(pending.iter().any(|r| r.id == b.id));
    }

    #[tokio::test]
    async fn deletes_orphans() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let kept = fixture::listing(&svc, owner_id, 50).await;
        let gone = fixture::listing(&svc, owner_id, 30).await;
        let alive = svc
            .execute(fixture::submission(kept.id, user::Id::new()))
            .await
            .unwrap();
        let orphan = svc
            .execute(fixture::submission(gone.id, user::Id::new()))
            .await
            .unwrap();
        db.execute(Delete(By::<Listing, _>::new(gone.id)))
            .await
            .unwrap();

        let pending = svc.execute(PendingForOwner { owner_id }).await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, alive.id);
        let stored = db
            .execute(Select(By::<Option<RentalRequest>, _>::new(orphan.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn ignores_decided_requests() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        _ = svc
            .execute(crate::command::RejectRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        let pending = svc.execute(PendingForOwner { owner_id }).await.unwrap();

        assert!(pending.is_empty());
    }
}
