//! [`Command`] for marking a [`Notification`] as read.

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{notification, user, Notification},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Notification`] as read by its recipient.
#[derive(Clone, Copy, Debug)]
pub struct MarkNotificationRead {
    /// ID of the [`Notification`] to mark.
    pub notification_id: notification::Id,

    /// ID of the [`User`] performing the operation.
    pub initiator_id: user::Id,
}

impl<Db> Command<MarkNotificationRead> for Service<Db>
where
    Db: Database<
            Select<By<Option<Notification>, notification::Id>>,
            Ok = Option<Notification>,
            Err = Traced<database::Error>,
        > + Database<Insert<Notification>, Err = Traced<database::Error>>,
{
    type Ok = Notification;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkNotificationRead,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkNotificationRead {
            notification_id,
            initiator_id,
        } = cmd;

        let mut notification = self
            .database()
            .execute(Select(By::<Option<Notification>, _>::new(
                notification_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotificationNotExists(notification_id))
            .map_err(tracerr::wrap!())?;

        if notification.recipient_id != initiator_id {
            return Err(tracerr::new!(E::NotRecipient(initiator_id)));
        }
        if notification.is_read {
            return Ok(notification);
        }

        notification.is_read = true;
        self.database()
            .execute(Insert(notification.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(notification)
    }
}

/// Error of [`MarkNotificationRead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Notification`] with the provided ID does not exist.
    #[display("`Notification(id: {_0})` does not exist")]
    #[from(ignore)]
    NotificationNotExists(#[error(not(source))] notification::Id),

    /// [`User`] is not the recipient of the [`Notification`].
    #[display("`User(id: {_0})` is not the recipient of the `Notification`")]
    #[from(ignore)]
    NotRecipient(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{user, Notification},
        fixture, read, Command as _,
    };

    use super::{ExecutionError, MarkNotificationRead};

    #[tokio::test]
    async fn marks_read() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        _ = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(owner_id),
            )))
            .await
            .unwrap();

        let marked = svc
            .execute(MarkNotificationRead {
                notification_id: sent[0].id,
                initiator_id: owner_id,
            })
            .await
            .unwrap();

        assert!(marked.is_read);
        let stored = db
            .execute(Select(By::<Option<Notification>, _>::new(sent[0].id)))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_read);
    }

    #[tokio::test]
    async fn allows_recipient_only() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let renter_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        _ = svc
            .execute(fixture::submission(listing.id, renter_id))
            .await
            .unwrap();
        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(owner_id),
            )))
            .await
            .unwrap();

        let err = svc
            .execute(MarkNotificationRead {
                notification_id: sent[0].id,
                initiator_id: renter_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotRecipient(id) if *id == renter_id,
        ));
    }
}
