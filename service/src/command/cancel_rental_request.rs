//! [`Command`] for cancelling a [`RentalRequest`].

use common::{
    operations::{
        By, Commit, CompareAndSwap, Insert, Lock, Select, Transact, Transacted,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{
        listing, notification, rental_request, user, Listing, Notification,
        RentalRequest,
    },
    infra::{database, Database},
    Service,
};

use super::{Command, DispatchNotification};

/// [`Command`] for withdrawing a [`rental_request::Status::Pending`]
/// [`RentalRequest`] by its renter.
#[derive(Clone, Copy, Debug)]
pub struct CancelRentalRequest {
    /// ID of the [`RentalRequest`] to cancel.
    pub request_id: rental_request::Id,

    /// ID of the [`User`] who submitted the [`RentalRequest`].
    pub renter_id: user::Id,
}

impl<Db> Command<CancelRentalRequest> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Notification>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<RentalRequest>, rental_request::Id>>,
            Ok = Option<RentalRequest>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Insert<RentalRequest>, Err = Traced<database::Error>>
        + Database<
            CompareAndSwap<Listing, listing::Status>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RentalRequest;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelRentalRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelRentalRequest {
            request_id,
            renter_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let listing_id = tx
            .execute(Select(By::<Option<RentalRequest>, _>::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RequestNotExists(request_id))
            .map_err(tracerr::wrap!())?
            .listing_id;
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut request = tx
            .execute(Select(By::<Option<RentalRequest>, _>::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RequestNotExists(request_id))
            .map_err(tracerr::wrap!())?;

        if request.renter_id != renter_id {
            return Err(tracerr::new!(E::NotRenter(renter_id)));
        }
        request
            .decide(rental_request::Status::Cancelled, DateTime::now().coerce())
            .map_err(|_| E::RequestAlreadyDecided(request.status))
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(request.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        match listing {
            Some(mut listing) if listing.requested_by() == Some(renter_id) => {
                listing.state = listing::State::Available;
                let released = tx
                    .execute(CompareAndSwap {
                        expected: listing::Status::Requested,
                        new: listing,
                    })
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if !released {
                    return Err(tracerr::new!(E::ListingNotAvailable(
                        listing_id
                    )));
                }
            }
            Some(listing) => {
                log::warn!(
                    "`Listing(id: {listing_id})` is not requested by \
                     `User(id: {renter_id})`, leaving it `{}`",
                    listing.status(),
                );
            }
            None => {
                log::warn!(
                    "`Listing(id: {listing_id})` of cancelled \
                     `RentalRequest(id: {request_id})` does not exist",
                );
            }
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::info!("`RentalRequest(id: {request_id})` is cancelled");

        _ = self
            .execute(DispatchNotification {
                recipient_id: request.owner_id,
                kind: notification::Kind::RentalCancelled,
                title: "Rental request cancelled".to_owned(),
                message: format!(
                    "Request for {} to {} is withdrawn by the renter",
                    request.window.start(),
                    request.window.end(),
                ),
                payload: json!({
                    "request_id": request_id,
                    "listing_id": listing_id,
                    "renter_id": renter_id,
                }),
            })
            .await;

        Ok(request)
    }
}

/// Error of [`CancelRentalRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] changed its [`listing::Status`] concurrently.
    #[display("`Listing(id: {_0})` is not available")]
    #[from(ignore)]
    ListingNotAvailable(#[error(not(source))] listing::Id),

    /// [`User`] is not the one who submitted the [`RentalRequest`].
    #[display("`User(id: {_0})` is not the renter of the `RentalRequest`")]
    #[from(ignore)]
    NotRenter(#[error(not(source))] user::Id),

    /// [`RentalRequest`] is not [`rental_request::Status::Pending`] anymore.
    #[display("`RentalRequest` is already decided as `{_0}`")]
    #[from(ignore)]
    RequestAlreadyDecided(#[error(not(source))] rental_request::Status),

    /// [`RentalRequest`] with the provided ID does not exist.
    #[display("`RentalRequest(id: {_0})` does not exist")]
    #[from(ignore)]
    RequestNotExists(#[error(not(source))] rental_request::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{
            listing, notification, rental_request, user, Listing,
            Notification,
        },
        fixture, read, Command as _,
    };

    use super::{CancelRentalRequest, ExecutionError};

    #[tokio::test]
    async fn releases_listing_and_notifies_owner() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();

        let cancelled = svc
            .execute(CancelRentalRequest {
                request_id: request.id,
                renter_id,
            })
            .await
            .unwrap();

        assert_eq!(cancelled.status, rental_request::Status::Cancelled);
        let listing = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.state, listing::State::Available);

        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(owner_id),
            )))
            .await
            .unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent
            .iter()
            .any(|n| n.kind == notification::Kind::RentalCancelled));
    }

    #[tokio::test]
    async fn allows_renter_only() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();

        let err = svc
            .execute(CancelRentalRequest {
                request_id: request.id,
                renter_id: owner_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotRenter(id) if *id == owner_id,
        ));
    }

    #[tokio::test]
    async fn refuses_cancelled_request() {
        let (svc, _) = fixture::service();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();
        let cancel = CancelRentalRequest {
            request_id: request.id,
            renter_id,
        };
        _ = svc.execute(cancel).await.unwrap();

        let err = svc.execute(cancel).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RequestAlreadyDecided(
                rental_request::Status::Cancelled,
            ),
        ));
    }

    #[tokio::test]
    async fn survives_notification_failure() {
        let (svc, db) = fixture::service();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();
        db.fail_notifications(true);

        let cancelled = svc
            .execute(CancelRentalRequest {
                request_id: request.id,
                renter_id,
            })
            .await;

        assert!(cancelled.is_ok());
    }
}
