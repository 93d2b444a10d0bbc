//! [`Command`] for deleting a [`Listing`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{listing::Status, RentalRequest, User};
use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Status::Available`] [`Listing`].
///
/// Requested or rented [`Listing`]s cannot be deleted, so no
/// [`RentalRequest`] is left orphaned by this [`Command`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteListing {
    /// ID of the [`Listing`] to delete.
    pub listing_id: listing::Id,

    /// ID of the [`User`] performing the deletion.
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteListing {
            listing_id,
            initiator_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        if listing.owner_id != initiator_id {
            return Err(tracerr::new!(E::NotOwner(initiator_id)));
        }
        if !listing.is_available() {
            return Err(tracerr::new!(E::ListingNotAvailable(listing_id)));
        }

        tx.execute(Delete(By::<Listing, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Listing(id: {listing_id})` is deleted by \
             `User(id: {initiator_id})`",
        );

        Ok(listing)
    }
}

/// Error of [`DeleteListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] is requested or rented, so cannot be deleted.
    #[display("`Listing(id: {_0})` is not available")]
    #[from(ignore)]
    ListingNotAvailable(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] is not the owner of the [`Listing`].
    #[display("`User(id: {_0})` is not the owner of the `Listing`")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{user, Listing},
        fixture, Command as _,
    };

    use super::{DeleteListing, ExecutionError};

    #[tokio::test]
    async fn deletes_available_listing() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;

        let deleted = svc
            .execute(DeleteListing {
                listing_id: listing.id,
                initiator_id: owner_id,
            })
            .await
            .unwrap();

        assert_eq!(deleted.id, listing.id);
        let stored = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn keeps_requested_listing() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        _ = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();

        let err = svc
            .execute(DeleteListing {
                listing_id: listing.id,
                initiator_id: owner_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotAvailable(id) if *id == listing.id,
        ));
        let stored = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn allows_owner_only() {
        let (svc, _) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        let stranger = user::Id::new();

        let err = svc
            .execute(DeleteListing {
                listing_id: listing.id,
                initiator_id: stranger,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotOwner(id) if *id == stranger,
        ));
    }
}
