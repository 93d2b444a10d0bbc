//! [`RentalRequest`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        rental_request::{self, Days, Window},
        RentalRequest,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Restores a [`RentalRequest`] from the provided `rental_requests` table
/// [`Row`].
fn from_row(row: &Row) -> RentalRequest {
    RentalRequest {
        id: row.get("id"),
        listing_id: row.get("listing_id"),
        owner_id: row.get("owner_id"),
        renter_id: row.get("renter_id"),
        window: Window::between(row.get("start_date"), row.get("end_date"))
            .expect("`rental_requests_window_check` is never violated"),
        duration: u32::try_from(row.get::<_, i64>("duration_days"))
            .ok()
            .and_then(Days::new)
            .expect("`duration_days` overflow"),
        total_cost: Money {
            amount: row.get("total_cost"),
            currency: row.get("total_cost_currency"),
        },
        contact_info: row.get("contact_info"),
        notes: row.get("notes"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        decided_at: row.get("decided_at"),
    }
}

impl<C> Database<Select<By<Option<RentalRequest>, rental_request::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<RentalRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentalRequest>, rental_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: rental_request::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, listing_id, owner_id, renter_id, \
                   start_date, end_date, duration_days, \
                   total_cost, total_cost_currency, \
                   contact_info, notes, \
                   status, created_at, decided_at \
            FROM rental_requests \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C>
    Database<Select<By<Vec<RentalRequest>, read::rental_request::PendingFor>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RentalRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<RentalRequest>, read::rental_request::PendingFor>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_request::PendingFor(owner_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, listing_id, owner_id, renter_id, \
                   start_date, end_date, duration_days, \
                   total_cost, total_cost_currency, \
                   contact_info, notes, \
                   status, created_at, decided_at \
            FROM rental_requests \
            WHERE owner_id = $1::UUID \
              AND status = $2::INT2 \
            ORDER BY created_at DESC";
        self.query(SQL, &[&owner_id, &rental_request::Status::Pending])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C>
    Database<Select<By<Vec<RentalRequest>, read::rental_request::RequestedBy>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RentalRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<RentalRequest>, read::rental_request::RequestedBy>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::rental_request::RequestedBy(renter_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, listing_id, owner_id, renter_id, \
                   start_date, end_date, duration_days, \
                   total_cost, total_cost_currency, \
                   contact_info, notes, \
                   status, created_at, decided_at \
            FROM rental_requests \
            WHERE renter_id = $1::UUID \
            ORDER BY created_at DESC";
        self.query(SQL, &[&renter_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Insert<RentalRequest>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(request): Insert<RentalRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        let RentalRequest {
            id,
            listing_id,
            owner_id,
            renter_id,
            window,
            duration,
            total_cost,
            contact_info,
            notes,
            status,
            created_at,
            decided_at,
        } = request;

        let duration = i64::from(u32::from(duration));

        const SQL: &str = "\
            INSERT INTO rental_requests (\
                id, listing_id, owner_id, renter_id, \
                start_date, end_date, duration_days, \
                total_cost, total_cost_currency, \
                contact_info, notes, \
                status, created_at, decided_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::DATE, $6::DATE, $7::INT8, \
                $8::NUMERIC, $9::INT2, \
                $10::VARCHAR, $11::VARCHAR, \
                $12::INT2, $13::TIMESTAMPTZ, $14::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET listing_id = EXCLUDED.listing_id, \
                owner_id = EXCLUDED.owner_id, \
                renter_id = EXCLUDED.renter_id, \
                start_date = EXCLUDED.start_date, \
                end_date = EXCLUDED.end_date, \
                duration_days = EXCLUDED.duration_days, \
                total_cost = EXCLUDED.total_cost, \
                total_cost_currency = EXCLUDED.total_cost_currency, \
                contact_info = EXCLUDED.contact_info, \
                notes = EXCLUDED.notes, \
                status = EXCLUDED.status, \
                created_at = EXCLUDED.created_at, \
                decided_at = EXCLUDED.decided_at";
        self.exec(
            SQL,
            &[
                &id,
                &listing_id,
                &owner_id,
                &renter_id,
                &window.start(),
                &window.end(),
                &duration,
                &total_cost.amount,
                &total_cost.currency,
                &contact_info,
                &notes,
                &status,
                &created_at,
                &decided_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<RentalRequest, rental_request::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<RentalRequest, rental_request::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: rental_request::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM rental_requests \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
