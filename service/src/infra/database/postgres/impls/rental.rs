//! [`Rental`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{rental_request, rental_request::Window, Rental},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Restores a [`Rental`] from the provided `rentals` table [`Row`].
fn from_row(row: &Row) -> Rental {
    Rental {
        id: row.get("id"),
        request_id: row.get("request_id"),
        listing_id: row.get("listing_id"),
        owner_id: row.get("owner_id"),
        renter_id: row.get("renter_id"),
        window: Window::between(row.get("start_date"), row.get("end_date"))
            .expect("`rentals_window_check` is never violated"),
        total_cost: Money {
            amount: row.get("total_cost"),
            currency: row.get("total_cost_currency"),
        },
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Rental>, rental_request::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rental>, rental_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let request_id: rental_request::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, request_id, listing_id, owner_id, renter_id, \
                   start_date, end_date, \
                   total_cost, total_cost_currency, \
                   status, created_at \
            FROM rentals \
            WHERE request_id = $1::UUID";
        self.query_opt(SQL, &[&request_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Rental>, read::rental::RentedBy>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::RentedBy>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental::RentedBy(renter_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, request_id, listing_id, owner_id, renter_id, \
                   start_date, end_date, \
                   total_cost, total_cost_currency, \
                   status, created_at \
            FROM rentals \
            WHERE renter_id = $1::UUID \
            ORDER BY created_at DESC";
        self.query(SQL, &[&renter_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Select<By<Vec<Rental>, read::rental::OwnedBy>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Rental>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rental>, read::rental::OwnedBy>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental::OwnedBy(owner_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, request_id, listing_id, owner_id, renter_id, \
                   start_date, end_date, \
                   total_cost, total_cost_currency, \
                   status, created_at \
            FROM rentals \
            WHERE owner_id = $1::UUID \
            ORDER BY created_at DESC";
        self.query(SQL, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Insert<Rental>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(rental): Insert<Rental>,
    ) -> Result<Self::Ok, Self::Err> {
        let Rental {
            id,
            request_id,
            listing_id,
            owner_id,
            renter_id,
            window,
            total_cost,
            status,
            created_at,
        } = rental;

        const SQL: &str = "\
            INSERT INTO rentals (\
                id, request_id, listing_id, owner_id, renter_id, \
                start_date, end_date, \
                total_cost, total_cost_currency, \
                status, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, $5::UUID, \
                $6::DATE, $7::DATE, \
                $8::NUMERIC, $9::INT2, \
                $10::INT2, $11::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET start_date = EXCLUDED.start_date, \
                end_date = EXCLUDED.end_date, \
                total_cost = EXCLUDED.total_cost, \
                total_cost_currency = EXCLUDED.total_cost_currency, \
                status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &request_id,
                &listing_id,
                &owner_id,
                &renter_id,
                &window.start(),
                &window.end(),
                &total_cost.amount,
                &total_cost.currency,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
