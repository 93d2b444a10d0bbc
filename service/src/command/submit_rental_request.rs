//! [`Command`] for submitting a new [`RentalRequest`].

use common::{
    operations::{
        By, Commit, CompareAndSwap, Insert, Lock, Select, Transact, Transacted,
    },
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{listing::Status, User};
use crate::{
    domain::{
        listing, notification,
        rental_request::{self, ContactInfo, Notes, Window, WindowError},
        user, Listing, Notification, RentalRequest,
    },
    infra::{database, Database},
    Service,
};

use super::{Command, DispatchNotification};

/// [`Command`] for requesting a [`Status::Available`] [`Listing`] for rent.
///
/// Claims the [`Listing`] for the renter, so of several racing renters only
/// one succeeds.
#[derive(Clone, Debug)]
pub struct SubmitRentalRequest {
    /// ID of the [`Listing`] to request.
    pub listing_id: listing::Id,

    /// ID of the [`User`] requesting the [`Listing`].
    pub renter_id: user::Id,

    /// First day of the rent.
    pub start: Date,

    /// Day the dog is returned.
    pub end: Date,

    /// [`ContactInfo`] the renter may be reached by.
    pub contact_info: ContactInfo,

    /// [`Notes`] of the renter to the owner, if any.
    pub notes: Option<Notes>,

    /// Current day, the rent cannot start before.
    pub today: Date,
}

impl<Db> Command<SubmitRentalRequest> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<Insert<Notification>, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
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
        cmd: SubmitRentalRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitRentalRequest {
            listing_id,
            renter_id,
            start,
            end,
            contact_info,
            notes,
            today,
        } = cmd;

        let window = Window::new(start, end, today)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let duration = window
            .duration()
            .ok_or(E::WindowTooLong(window))
            .map_err(tracerr::wrap!())?;

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

        if listing.owner_id == renter_id {
            return Err(tracerr::new!(E::OwnListing(listing_id)));
        }
        if !listing.is_available() {
            return Err(tracerr::new!(E::ListingNotAvailable(listing_id)));
        }

        let total_cost = listing
            .price_per_day
            .total_for(duration)
            .ok_or(E::WindowTooLong(window))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let request = RentalRequest {
            id: rental_request::Id::new(),
            listing_id,
            owner_id: listing.owner_id,
            renter_id,
            window,
            duration,
            total_cost,
            contact_info,
            notes,
            status: rental_request::Status::Pending,
            created_at: now.coerce(),
            decided_at: None,
        };
        tx.execute(Insert(request.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        listing.state = listing::State::Requested {
            by: renter_id,
            at: now.coerce(),
        };
        let claimed = tx
            .execute(CompareAndSwap {
                expected: listing::Status::Available,
                new: listing.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !claimed {
            return Err(tracerr::new!(E::ListingNotAvailable(listing_id)));
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::info!(
            "`Listing(id: {listing_id})` is requested by \
             `User(id: {renter_id})` with `RentalRequest(id: {})`",
            request.id,
        );

        _ = self
            .execute(DispatchNotification {
                recipient_id: listing.owner_id,
                kind: notification::Kind::RentalRequest,
                title: "New rental request".to_owned(),
                message: format!(
                    "{} is requested for {duration} day(s) from {} to {} \
                     for {total_cost}",
                    listing.name,
                    window.start(),
                    window.end(),
                ),
                payload: json!({
                    "request_id": request.id,
                    "listing_id": listing_id,
                    "renter_id": renter_id,
                    "start_date": window.start().to_iso(),
                    "end_date": window.end().to_iso(),
                    "duration_days": u32::from(duration),
                    "total_cost": total_cost.to_string(),
                }),
            })
            .await;

        Ok(request)
    }
}

/// Error of [`SubmitRentalRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requested days are invalid.
    #[display("Invalid rent window: {_0}")]
    InvalidWindow(WindowError),

    /// [`Listing`] is already requested or rented.
    #[display("`Listing(id: {_0})` is not available")]
    #[from(ignore)]
    ListingNotAvailable(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] requests their own [`Listing`].
    #[display("`Listing(id: {_0})` cannot be rented by its owner")]
    #[from(ignore)]
    OwnListing(#[error(not(source))] listing::Id),

    /// Requested [`Window`] is too long to be priced.
    #[display("Rent window from {} to {} is too long", _0.start(), _0.end())]
    #[from(ignore)]
    WindowTooLong(#[error(not(source))] Window),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{
            listing, notification, rental_request, user, Listing,
            Notification, RentalRequest,
        },
        fixture, read, Command as _,
    };

    use super::{ExecutionError, SubmitRentalRequest};

    #[tokio::test]
    async fn freezes_duration_and_cost() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;

        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();

        assert_eq!(u32::from(request.duration), 3);
        assert_eq!(request.total_cost, fixture::usd(150));
        assert_eq!(request.status, rental_request::Status::Pending);
        assert_eq!(request.owner_id, owner_id);
        assert!(request.decided_at.is_none());

        let listing = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(!listing.is_available());
        assert_eq!(listing.status(), listing::Status::Requested);
        assert_eq!(listing.requested_by(), Some(renter_id));
    }

    #[tokio::test]
    async fn notifies_owner() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;

        let request = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();

        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(owner_id),
            )))
            .await
            .unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, notification::Kind::RentalRequest);
        let payload = sent[0].payload.as_json();
        assert_eq!(payload["request_id"], request.id.to_string());
        assert_eq!(payload["renter_id"], renter_id.to_string());
        assert_eq!(payload["start_date"], "2024-06-01");
        assert_eq!(payload["duration_days"], 3);
        assert_eq!(payload["total_cost"], "150USD");
    }

    #[tokio::test]
    async fn rejects_unavailable_listing_without_storing() {
        let (svc, db) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;
        _ = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        let late = user::Id::new();

        let err = svc
            .execute(fixture::submission(listing.id, late))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotAvailable(id) if *id == listing.id,
        ));
        let stored = db
            .execute(Select(By::<Vec<RentalRequest>, _>::new(
                read::rental_request::RequestedBy(late),
            )))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn lets_exactly_one_racer_win() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        let (first, second) = (user::Id::new(), user::Id::new());

        let (a, b) = tokio::join!(
            svc.execute(fixture::submission(listing.id, first)),
            svc.execute(fixture::submission(listing.id, second)),
        );

        assert!(a.is_ok() != b.is_ok(), "exactly one must win");
        let (winner, loser) = if a.is_ok() {
            (first, b.unwrap_err())
        } else {
            (second, a.unwrap_err())
        };
        assert!(matches!(
            loser.as_ref(),
            ExecutionError::ListingNotAvailable(_),
        ));

        let listing = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.requested_by(), Some(winner));
        let pending = db
            .execute(Select(By::<Vec<RentalRequest>, _>::new(
                read::rental_request::PendingFor(owner_id),
            )))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].renter_id, winner);
    }

    #[tokio::test]
    async fn forbids_renting_own_listing() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;

        let err = svc
            .execute(fixture::submission(listing.id, owner_id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::OwnListing(id) if *id == listing.id,
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_window() {
        let (svc, _) = fixture::service();
        let listing = fixture::listing(&svc, user::Id::new(), 50).await;

        let err = svc
            .execute(SubmitRentalRequest {
                end: fixture::date("2024-06-01"),
                ..fixture::submission(listing.id, user::Id::new())
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidWindow(_)));
    }

    #[tokio::test]
    async fn fails_on_missing_listing() {
        let (svc, _) = fixture::service();
        let missing = listing::Id::new();

        let err = svc
            .execute(fixture::submission(missing, user::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(id) if *id == missing,
        ));
    }

    #[tokio::test]
    async fn survives_notification_failure() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        db.fail_notifications(true);

        let request = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();

        db.fail_notifications(false);
        let pending = db
            .execute(Select(By::<Vec<RentalRequest>, _>::new(
                read::rental_request::PendingFor(owner_id),
            )))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, request.id);
        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(owner_id),
            )))
            .await
            .unwrap();
        assert!(sent.is_empty());
    }
}
