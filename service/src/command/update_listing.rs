//! [`Command`] for updating a [`Listing`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{
    listing::{DailyPrice, Description, Name, Status},
    User,
};
use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the details of a [`Status::Available`]
/// [`Listing`].
///
/// Details of a requested or rented [`Listing`] are frozen, so renters always
/// get what they've asked for.
#[derive(Clone, Debug)]
pub struct UpdateListing {
    /// ID of the [`Listing`] to update.
    pub listing_id: listing::Id,

    /// ID of the [`User`] performing the update.
    pub initiator_id: user::Id,

    /// New [`Name`] of the listed dog, if it should be changed.
    pub name: Option<listing::Name>,

    /// New [`Description`] of the listed dog, if it should be changed.
    ///
    /// `Some(None)` removes the [`Description`].
    pub description: Option<Option<listing::Description>>,

    /// New [`DailyPrice`], if it should be changed.
    pub price_per_day: Option<listing::DailyPrice>,
}

impl<Db> Command<UpdateListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Insert<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListing {
            listing_id,
            initiator_id,
            name,
            description,
            price_per_day,
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

        let mut listing = tx
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

        if let Some(name) = name {
            listing.name = name;
        }
        if let Some(description) = description {
            listing.description = description;
        }
        if let Some(price) = price_per_day {
            listing.price_per_day = price;
        }

        tx.execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("`Listing(id: {listing_id})` is updated");

        Ok(listing)
    }
}

/// Error of [`UpdateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] is requested or rented, so cannot be changed.
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
    use crate::{
        domain::{listing, user},
        fixture, Command as _,
    };

    use super::{ExecutionError, UpdateListing};

    fn rename(
        listing_id: listing::Id,
        initiator_id: user::Id,
    ) -> UpdateListing {
        UpdateListing {
            listing_id,
            initiator_id,
            name: listing::Name::new("Buddy"),
            description: Some(None),
            price_per_day: Some(fixture::daily(70)),
        }
    }

    #[tokio::test]
    async fn updates_available_listing() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;

        let updated = svc.execute(rename(listing.id, owner_id)).await.unwrap();

        assert_eq!(AsRef::<str>::as_ref(&updated.name), "Buddy");
        assert!(updated.description.is_none());
        assert_eq!(updated.price_per_day, fixture::daily(70));
        assert!(updated.is_available());
    }

    #[tokio::test]
    async fn allows_owner_only() {
        let (svc, _) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        let stranger = user::Id::new();

        let err = svc.execute(rename(listing.id, stranger)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotOwner(id) if *id == stranger,
        ));
    }

    #[tokio::test]
    async fn freezes_requested_listing() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        _ = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();

        let err = svc.execute(rename(listing.id, owner_id)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotAvailable(id) if *id == listing.id,
        ));
    }

    #[tokio::test]
    async fn fails_on_missing_listing() {
        let (svc, _) = fixture::service();
        let missing = listing::Id::new();

        let err = svc
            .execute(rename(missing, user::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(id) if *id == missing,
        ));
    }
}
