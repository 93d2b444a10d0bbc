//! [`Listing`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, CompareAndSwap, Delete, Insert, Lock, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, DailyPrice, RentDateTime, RequestDateTime, State},
        user, Listing,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Restores a [`Listing`] from the provided `listings` table [`Row`].
fn from_row(row: &Row) -> Listing {
    Listing {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        price_per_day: DailyPrice::new(Money {
            amount: row.get("price_per_day"),
            currency: row.get("price_currency"),
        })
        .expect("`price_per_day` is always positive"),
        state: State::from_parts(
            row.get("status"),
            row.get("requested_by"),
            row.get("requested_at"),
            row.get("rented_by"),
            row.get("rented_at"),
        )
        .expect("`listings_state_check` is never violated"),
        created_at: row.get("created_at"),
    }
}

/// [`State`] of a [`Listing`] split into its `listings` table columns.
struct StateColumns {
    /// `status` column.
    status: listing::Status,

    /// `requested_by` column.
    requested_by: Option<user::Id>,

    /// `requested_at` column.
    requested_at: Option<RequestDateTime>,

    /// `rented_by` column.
    rented_by: Option<user::Id>,

    /// `rented_at` column.
    rented_at: Option<RentDateTime>,
}

impl From<State> for StateColumns {
    fn from(state: State) -> Self {
        let mut columns = Self {
            status: state.status(),
            requested_by: None,
            requested_at: None,
            rented_by: None,
            rented_at: None,
        };
        match state {
            State::Available => {}
            State::Requested { by, at } => {
                columns.requested_by = Some(by);
                columns.requested_at = Some(at);
            }
            State::Rented { by, at } => {
                columns.rented_by = Some(by);
                columns.rented_at = Some(at);
            }
        }
        columns
    }
}

impl<C, IDs> Database<Select<By<HashMap<listing::Id, Listing>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[listing::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, owner_id, name, description, \
                   price_per_day, price_currency, \
                   status, requested_by, requested_at, rented_by, rented_at, \
                   created_at \
            FROM listings \
            WHERE id = ANY($1::UUID[])";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let listing = from_row(row);
                (listing.id, listing)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, owner_id, name, description, \
                   price_per_day, price_currency, \
                   status, requested_by, requested_at, rented_by, rented_at, \
                   created_at \
            FROM listings \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Listing>, read::listing::OwnedBy>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, read::listing::OwnedBy>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::listing::OwnedBy(owner_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, owner_id, name, description, \
                   price_per_day, price_currency, \
                   status, requested_by, requested_at, rented_by, rented_at, \
                   created_at \
            FROM listings \
            WHERE owner_id = $1::UUID \
            ORDER BY created_at DESC";
        self.query(SQL, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Select<By<Vec<Listing>, read::listing::Available>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Listing>, read::listing::Available>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, owner_id, name, description, \
                   price_per_day, price_currency, \
                   status, requested_by, requested_at, rented_by, rented_at, \
                   created_at \
            FROM listings \
            WHERE available \
            ORDER BY created_at DESC";
        self.query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Insert<Listing>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let Listing {
            id,
            owner_id,
            name,
            description,
            price_per_day,
            state,
            created_at,
        } = listing;
        let Money {
            amount: price,
            currency,
        } = price_per_day.into();
        let StateColumns {
            status,
            requested_by,
            requested_at,
            rented_by,
            rented_at,
        } = state.into();

        const SQL: &str = "\
            INSERT INTO listings (\
                id, owner_id, name, description, \
                price_per_day, price_currency, \
                status, requested_by, requested_at, rented_by, rented_at, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, \
                $5::NUMERIC, $6::INT2, \
                $7::INT2, $8::UUID, $9::TIMESTAMPTZ, $10::UUID, \
                $11::TIMESTAMPTZ, \
                $12::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET owner_id = EXCLUDED.owner_id, \
                name = EXCLUDED.name, \
                description = EXCLUDED.description, \
                price_per_day = EXCLUDED.price_per_day, \
                price_currency = EXCLUDED.price_currency, \
                status = EXCLUDED.status, \
                requested_by = EXCLUDED.requested_by, \
                requested_at = EXCLUDED.requested_at, \
                rented_by = EXCLUDED.rented_by, \
                rented_at = EXCLUDED.rented_at, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &name,
                &description,
                &price,
                &currency,
                &status,
                &requested_by,
                &requested_at,
                &rented_by,
                &rented_at,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<CompareAndSwap<Listing, listing::Status>> for Postgres<C>
where
    C: Connection,
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
        let Listing {
            id,
            name,
            description,
            price_per_day,
            state,
            ..
        } = new;
        let Money {
            amount: price,
            currency,
        } = price_per_day.into();
        let StateColumns {
            status,
            requested_by,
            requested_at,
            rented_by,
            rented_at,
        } = state.into();

        const SQL: &str = "\
            UPDATE listings \
            SET name = $3::VARCHAR, \
                description = $4::VARCHAR, \
                price_per_day = $5::NUMERIC, \
                price_currency = $6::INT2, \
                status = $7::INT2, \
                requested_by = $8::UUID, \
                requested_at = $9::TIMESTAMPTZ, \
                rented_by = $10::UUID, \
                rented_at = $11::TIMESTAMPTZ \
            WHERE id = $1::UUID \
              AND status = $2::INT2";
        self.exec(
            SQL,
            &[
                &id,
                &expected,
                &name,
                &description,
                &price,
                &currency,
                &status,
                &requested_by,
                &requested_at,
                &rented_by,
                &rented_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(|updated| updated == 1)
    }
}

impl<C> Database<Delete<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM listings \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        // Touching the row on conflict keeps it locked until the end of the
        // transaction.
        const SQL: &str = "\
            INSERT INTO listings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
