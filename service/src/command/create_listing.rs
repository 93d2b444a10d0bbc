//! [`Command`] for creating a new [`Listing`].

use common::{operations::Insert, DateTime};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{
    listing::{DailyPrice, Description, Name},
    User,
};
use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Listing`].
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// ID of the [`User`] owning the listed dog.
    pub owner_id: user::Id,

    /// [`Name`] of the listed dog.
    pub name: listing::Name,

    /// [`Description`] of the listed dog.
    pub description: Option<listing::Description>,

    /// [`DailyPrice`] of renting the listed dog.
    pub price_per_day: listing::DailyPrice,
}

impl<Db> Command<CreateListing> for Service<Db>
where
    Db: Database<Insert<Listing>, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing,
    ) -> Result<Self::Ok, Self::Err> {
        let CreateListing {
            owner_id,
            name,
            description,
            price_per_day,
        } = cmd;

        let listing = Listing {
            id: listing::Id::new(),
            owner_id,
            name,
            description,
            price_per_day,
            state: listing::State::Available,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::info!(
            "`Listing(id: {})` is created by `User(id: {owner_id})`",
            listing.id,
        );

        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{listing, user, Listing},
        fixture, read, Command as _,
    };

    #[tokio::test]
    async fn creates_available_listing() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();

        let created = fixture::listing(&svc, owner_id, 50).await;

        assert_eq!(created.owner_id, owner_id);
        assert!(created.is_available());
        assert_eq!(created.state, listing::State::Available);

        let owned = db
            .execute(Select(By::<Vec<Listing>, _>::new(
                read::listing::OwnedBy(owner_id),
            )))
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, created.id);
        assert_eq!(owned[0].price_per_day, created.price_per_day);
    }
}
