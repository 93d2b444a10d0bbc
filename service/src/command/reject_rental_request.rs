//! [`Command`] for rejecting a [`RentalRequest`].

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
use crate::domain::{Rental, User};
use crate::{
    domain::{
        listing, notification, rental_request, user, Listing, Notification,
        RentalRequest,
    },
    infra::{database, Database},
    Service,
};

use super::{Command, DispatchNotification};

/// [`Command`] for rejecting a [`rental_request::Status::Pending`]
/// [`RentalRequest`], making the requested [`Listing`] available again.
///
/// No [`Rental`] is created.
#[derive(Clone, Copy, Debug)]
pub struct RejectRentalRequest {
    /// ID of the [`RentalRequest`] to reject.
    pub request_id: rental_request::Id,

    /// ID of the [`User`] owning the requested [`Listing`].
    pub owner_id: user::Id,
}

impl<Db> Command<RejectRentalRequest> for Service<Db>
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
        cmd: RejectRentalRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectRentalRequest {
            request_id,
            owner_id,
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

        if request.owner_id != owner_id {
            return Err(tracerr::new!(E::NotOwner(owner_id)));
        }
        let now = DateTime::now();
        request
            .decide(rental_request::Status::Rejected, now.coerce())
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
        let name = match listing {
            Some(mut listing)
                if listing.requested_by() == Some(request.renter_id) =>
            {
                listing.state = listing::State::Available;
                let released = tx
                    .execute(CompareAndSwap {
                        expected: listing::Status::Requested,
                        new: listing.clone(),
                    })
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if !released {
                    return Err(tracerr::new!(E::ListingNotAvailable(
                        listing_id
                    )));
                }
                Some(listing.name)
            }
            Some(listing) => {
                log::warn!(
                    "`Listing(id: {listing_id})` is not requested by \
                     `User(id: {})`, leaving it `{}`",
                    request.renter_id,
                    listing.status(),
                );
                Some(listing.name)
            }
            None => {
                log::warn!(
                    "`Listing(id: {listing_id})` of rejected \
                     `RentalRequest(id: {request_id})` does not exist",
                );
                None
            }
        };

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::info!("`RentalRequest(id: {request_id})` is rejected");

        _ = self
            .execute(DispatchNotification {
                recipient_id: request.renter_id,
                kind: notification::Kind::RentalRejected,
                title: "Rental request rejected".to_owned(),
                message: match name {
                    Some(name) => {
                        format!("Your request for {name} is rejected")
                    }
                    None => "Your rental request is rejected".to_owned(),
                },
                payload: json!({
                    "request_id": request_id,
                    "listing_id": listing_id,
                }),
            })
            .await;

        Ok(request)
    }
}

/// Error of [`RejectRentalRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] changed its [`listing::Status`] concurrently.
    #[display("`Listing(id: {_0})` is not available")]
    #[from(ignore)]
    ListingNotAvailable(#[error(not(source))] listing::Id),

    /// [`User`] is not the owner of the requested [`Listing`].
    #[display("`User(id: {_0})` is not the owner of the `Listing`")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),

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
        command::ApproveRentalRequest,
        domain::{
            listing, notification, rental_request, user, Listing,
            Notification, Rental,
        },
        fixture, read, Command as _,
    };

    use super::{ExecutionError, RejectRentalRequest};

    #[tokio::test]
    async fn releases_listing() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();

        let rejected = svc
            .execute(RejectRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        assert_eq!(rejected.status, rental_request::Status::Rejected);
        assert!(rejected.decided_at.is_some());

        let listing = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(listing.is_available());
        assert_eq!(listing.state, listing::State::Available);

        let rentals = db
            .execute(Select(By::<Vec<Rental>, _>::new(
                read::rental::RentedBy(renter_id),
            )))
            .await
            .unwrap();
        assert!(rentals.is_empty());

        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(renter_id),
            )))
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, notification::Kind::RentalRejected);
    }

    #[tokio::test]
    async fn lets_listing_be_requested_again() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        _ = svc
            .execute(RejectRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        let next = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await;

        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn refuses_approved_request() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        _ = svc
            .execute(ApproveRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        let err = svc
            .execute(RejectRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RequestAlreadyDecided(
                rental_request::Status::Approved,
            ),
        ));
    }

    #[tokio::test]
    async fn allows_owner_only() {
        let (svc, _) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        let renter_id = user::Id::new();
        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();

        let err = svc
            .execute(RejectRentalRequest {
                request_id: request.id,
                owner_id: renter_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotOwner(id) if *id == renter_id,
        ));
    }
}
