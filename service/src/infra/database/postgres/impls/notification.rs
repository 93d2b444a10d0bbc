//! [`Notification`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{notification, Notification},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Restores a [`Notification`] from the provided `notifications` table
/// [`Row`].
fn from_row(row: &Row) -> Notification {
    Notification {
        id: row.get("id"),
        recipient_id: row.get("recipient_id"),
        kind: row.get("kind"),
        title: row.get("title"),
        message: row.get("message"),
        payload: row.get("payload"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Notification>, notification::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Notification>, notification::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: notification::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, recipient_id, kind, title, message, payload, \
                   is_read, created_at \
            FROM notifications \
            WHERE id = $1::UUID";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C>
    Database<Select<By<Vec<Notification>, read::notification::AddressedTo>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Notification>, read::notification::AddressedTo>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::notification::AddressedTo(recipient_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, recipient_id, kind, title, message, payload, \
                   is_read, created_at \
            FROM notifications \
            WHERE recipient_id = $1::UUID \
            ORDER BY created_at DESC";
        self.query(SQL, &[&recipient_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows.iter().map(from_row).collect())
    }
}

impl<C> Database<Insert<Notification>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        let Notification {
            id,
            recipient_id,
            kind,
            title,
            message,
            payload,
            is_read,
            created_at,
        } = notification;

        const SQL: &str = "\
            INSERT INTO notifications (\
                id, recipient_id, kind, title, message, payload, \
                is_read, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::INT2, $4::VARCHAR, $5::TEXT, \
                $6::JSONB, \
                $7::BOOLEAN, $8::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET is_read = EXCLUDED.is_read";
        self.exec(
            SQL,
            &[
                &id,
                &recipient_id,
                &kind,
                &title,
                &message,
                &payload,
                &is_read,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Notification, notification::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Notification, notification::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: notification::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM notifications \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
