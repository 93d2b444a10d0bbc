//! [`Command`] for deleting a [`Notification`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{notification, user, Notification},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Notification`] by its recipient.
#[derive(Clone, Copy, Debug)]
pub struct DeleteNotification {
    /// ID of the [`Notification`] to delete.
    pub notification_id: notification::Id,

    /// ID of the [`User`] performing the deletion.
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteNotification> for Service<Db>
where
    Db: Database<
            Select<By<Option<Notification>, notification::Id>>,
            Ok = Option<Notification>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Notification, notification::Id>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Notification;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteNotification,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteNotification {
            notification_id,
            initiator_id,
        } = cmd;

        let notification = self
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

        self.database()
            .execute(Delete(By::<Notification, _>::new(notification_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("`Notification(id: {notification_id})` is deleted");

        Ok(notification)
    }
}

/// Error of [`DeleteNotification`] [`Command`] execution.
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
        domain::{notification, user, Notification},
        fixture, read, Command as _,
    };

    use super::{DeleteNotification, ExecutionError};

    #[tokio::test]
    async fn deletes_own_notification() {
        let (svc, db) = fixture::service();
        let owner_id = user::Id::new();
        let listing = fixture::listing(&svc, owner_id, 50).await;
        _ = svc
            .execute(fixture::submission(listing.id, user::Id::new()))
            .await
            .unwrap();
        let inbox = read::notification::AddressedTo(owner_id);
        let sent = db
            .execute(Select(By::<Vec<Notification>, _>::new(inbox)))
            .await
            .unwrap();

        let deleted = svc
            .execute(DeleteNotification {
                notification_id: sent[0].id,
                initiator_id: owner_id,
            })
            .await
            .unwrap();

        assert_eq!(deleted.id, sent[0].id);
        let left = db
            .execute(Select(By::<Vec<Notification>, _>::new(inbox)))
            .await
            .unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn fails_on_missing_notification() {
        let (svc, _) = fixture::service();
        let missing = notification::Id::new();

        let err = svc
            .execute(DeleteNotification {
                notification_id: missing,
                initiator_id: user::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotificationNotExists(id) if *id == missing,
        ));
    }
}
