//! [`Command`] for approving a [`RentalRequest`].

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
        Rental, RentalRequest,
    },
    infra::{database, Database},
    Service,
};

use super::{Command, DispatchNotification};

/// [`Command`] for approving a [`rental_request::Status::Pending`]
/// [`RentalRequest`], turning it into an active [`Rental`].
///
/// Approving an already approved [`RentalRequest`] again returns its
/// [`Rental`] without creating another one.
#[derive(Clone, Copy, Debug)]
pub struct ApproveRentalRequest {
    /// ID of the [`RentalRequest`] to approve.
    pub request_id: rental_request::Id,

    /// ID of the [`User`] owning the requested [`Listing`].
    pub owner_id: user::Id,
}

impl<Db> Command<ApproveRentalRequest> for Service<Db>
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
        > + Database<
            Select<By<Option<Rental>, rental_request::Id>>,
            Ok = Option<Rental>,
            Err = Traced<database::Error>,
        > + Database<Insert<RentalRequest>, Err = Traced<database::Error>>
        + Database<
            CompareAndSwap<Listing, listing::Status>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Rental>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Rental;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ApproveRentalRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use rental_request::Status as S;
        use ExecutionError as E;

        let ApproveRentalRequest {
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

        // Re-read under the lock, as a concurrent decision may have happened.
        let mut request = tx
            .execute(Select(By::<Option<RentalRequest>, _>::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RequestNotExists(request_id))
            .map_err(tracerr::wrap!())?;

        if request.owner_id != owner_id {
            return Err(tracerr::new!(E::NotOwner(owner_id)));
        }
        match request.status {
            S::Pending => {}
            S::Approved => {
                let existing = tx
                    .execute(Select(By::<Option<Rental>, _>::new(request_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if let Some(rental) = existing {
                    log::debug!(
                        "`RentalRequest(id: {request_id})` is already \
                         approved as `Rental(id: {})`",
                        rental.id,
                    );
                    return Ok(rental);
                }
                log::warn!(
                    "`RentalRequest(id: {request_id})` is approved, but has \
                     no `Rental`, completing the approval",
                );
            }
            S::Rejected | S::Cancelled => {
                return Err(tracerr::new!(E::RequestAlreadyDecided(
                    request.status
                )));
            }
        }

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let is_updated = if request.is_pending() {
            request
                .decide(S::Approved, now.coerce())
                .map_err(|_| E::RequestAlreadyDecided(request.status))
                .map_err(tracerr::wrap!())?;
            true
        } else if request.decided_at.is_none() {
            request.decided_at = Some(now.coerce());
            true
        } else {
            false
        };
        if is_updated {
            tx.execute(Insert(request.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        if listing.rented_by() != Some(request.renter_id) {
            if listing.requested_by() != Some(request.renter_id) {
                return Err(tracerr::new!(E::ListingNotAvailable(listing_id)));
            }
            listing.state = listing::State::Rented {
                by: request.renter_id,
                at: now.coerce(),
            };
            let rented = tx
                .execute(CompareAndSwap {
                    expected: listing::Status::Requested,
                    new: listing.clone(),
                })
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !rented {
                return Err(tracerr::new!(E::ListingNotAvailable(listing_id)));
            }
        }

        let rental = Rental::approved(&request);
        tx.execute(Insert(rental.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::info!(
            "`RentalRequest(id: {request_id})` is approved as \
             `Rental(id: {})`",
            rental.id,
        );

        _ = self
            .execute(DispatchNotification {
                recipient_id: request.renter_id,
                kind: notification::Kind::RentalApproved,
                title: "Rental request approved".to_owned(),
                message: format!(
                    "Your request for {} from {} to {} is approved",
                    listing.name,
                    rental.window.start(),
                    rental.window.end(),
                ),
                payload: json!({
                    "request_id": request_id,
                    "rental_id": rental.id,
                    "listing_id": listing_id,
                    "start_date": rental.window.start().to_iso(),
                    "end_date": rental.window.end().to_iso(),
                    "total_cost": rental.total_cost.to_string(),
                }),
            })
            .await;

        Ok(rental)
    }
}

/// Error of [`ApproveRentalRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] is not requested by the renter anymore.
    #[display("`Listing(id: {_0})` is not available")]
    #[from(ignore)]
    ListingNotAvailable(#[error(not(source))] listing::Id),

    /// Requested [`Listing`] does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] is not the owner of the requested [`Listing`].
    #[display("`User(id: {_0})` is not the owner of the `Listing`")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),

    /// [`RentalRequest`] is already rejected or cancelled.
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
    use common::operations::{By, Insert, Select};

    use crate::{
        command::RejectRentalRequest,
        domain::{
            listing, notification, rental, rental_request, user, Listing,
            Notification, Rental, RentalRequest,
        },
        fixture, read, Command as _,
    };

    use super::{ApproveRentalRequest, ExecutionError};

    #[tokio::test]
    async fn rents_out_listing() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();

        let rental = svc
            .execute(ApproveRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        assert_eq!(rental.request_id, request.id);
        assert_eq!(rental.renter_id, renter_id);
        assert_eq!(rental.window, request.window);
        assert_eq!(rental.total_cost, fixture::usd(150));
        assert_eq!(rental.status, rental::Status::Active);

        let listing = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.status(), listing::Status::Rented);
        assert_eq!(listing.rented_by(), Some(renter_id));
        assert!(listing.requested_by().is_none());

        let request = db
            .execute(Select(By::<Option<RentalRequest>, _>::new(request.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, rental_request::Status::Approved);
        assert!(request.decided_at.is_some());

        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(renter_id),
            )))
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, notification::Kind::RentalApproved);
    }

    #[tokio::test]
    async fn is_idempotent() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();
        let approve = ApproveRentalRequest {
            request_id: request.id,
            owner_id,
        };

        let first = svc.execute(approve).await.unwrap();
        let second = svc.execute(approve).await.unwrap();

        assert_eq!(first.id, second.id);
        let rentals = db
            .execute(Select(By::<Vec<Rental>, _>::new(
                read::rental::RentedBy(renter_id),
            )))
            .await
            .unwrap();
        assert_eq!(rentals.len(), 1);
        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(renter_id),
            )))
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn completes_half_done_approval() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let mut request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();
        request.status = rental_request::Status::Approved;
        db.execute(Insert(request.clone())).await.unwrap();

        let rental = svc
            .execute(ApproveRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        assert_eq!(rental.request_id, request.id);
        let listing = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.rented_by(), Some(renter_id));
    }

    #[tokio::test]
    async fn records_decision_time_when_completing_approval() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let mut request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        request.status = rental_request::Status::Approved;
        request.decided_at = None;
        db.execute(Insert(request.clone())).await.unwrap();

        _ = svc
            .execute(ApproveRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        let stored = db
            .execute(Select(By::<Option<RentalRequest>, _>::new(request.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, rental_request::Status::Approved);
        assert!(stored.decided_at.is_some());
    }

    #[tokio::test]
    async fn keeps_decision_time_when_completing_approval() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let mut request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        let decided_at = "2024-05-21T10:00:00Z".parse().unwrap();
        request.status = rental_request::Status::Approved;
        request.decided_at = Some(decided_at);
        db.execute(Insert(request.clone())).await.unwrap();

        _ = svc
            .execute(ApproveRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        let stored = db
            .execute(Select(By::<Option<RentalRequest>, _>::new(request.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.decided_at, Some(decided_at));
    }

    #[tokio::test]
    async fn keeps_rental_cost_frozen() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        let mut repriced = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        repriced.price_per_day = fixture::daily(80);
        db.execute(Insert(repriced)).await.unwrap();

        let rental = svc
            .execute(ApproveRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap();

        assert_eq!(rental.total_cost, fixture::usd(150));
        assert_eq!(rental.total_cost, request.total_cost);
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
            .execute(ApproveRentalRequest {
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

    #[tokio::test]
    async fn refuses_rejected_request() {
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

        let err = svc
            .execute(ApproveRentalRequest {
                request_id: request.id,
                owner_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RequestAlreadyDecided(
                rental_request::Status::Rejected,
            ),
        ));
    }

    #[tokio::test]
    async fn fails_on_missing_request() {
        let (svc, _) = fixture::service();
        let missing = rental_request::Id::new();

        let err = svc
            .execute(ApproveRentalRequest {
                request_id: missing,
                owner_id: user::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RequestNotExists(id) if *id == missing,
        ));
    }
}
