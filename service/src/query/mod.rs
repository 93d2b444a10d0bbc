//! [`Query`] definition.

pub mod listing;
pub mod listings;
pub mod notifications;
pub mod rental;
pub mod rental_request;
pub mod rental_requests;
pub mod rentals;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::user,
        fixture,
        query::{listings, notifications, rentals},
        read, Command as _,
    };

    #[tokio::test]
    async fn serves_dashboards() {
        let (svc, _) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let requested = fixture::listing(&svc, owner_id, 50).await;
        let free = fixture::listing(&svc, owner_id, 40).await;
        _ = svc
            .execute(fixture::submission(requested.id, renter_id))
            .await
            .unwrap();

        let owned = svc
            .execute(listings::OwnedBy::by(read::listing::OwnedBy(owner_id)))
            .await
            .unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|l| l.owner_id == owner_id));

        let available = svc
            .execute(listings::Available::by(read::listing::Available))
            .await
            .unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, free.id);

        let inbox = svc
            .execute(notifications::AddressedTo::by(
                read::notification::AddressedTo(owner_id),
            ))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);

        let rented = svc
            .execute(rentals::RentedBy::by(read::rental::RentedBy(renter_id)))
            .await
            .unwrap();
        assert!(rented.is_empty());
    }
}
