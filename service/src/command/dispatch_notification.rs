//! [`Command`] for dispatching a [`Notification`].

use std::convert::Infallible;

use common::{operations::Insert, DateTime};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{
        notification::{self, Message, Payload, Title},
        user, Notification,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for dispatching a [`Notification`] to a [`User`].
///
/// Never fails: a [`Notification`] that cannot be stored is logged and
/// dropped, so the workflow dispatching it is never interrupted.
#[derive(Clone, Debug)]
pub struct DispatchNotification {
    /// ID of the [`User`] to notify.
    pub recipient_id: user::Id,

    /// [`notification::Kind`] of the [`Notification`].
    pub kind: notification::Kind,

    /// Title of the [`Notification`].
    pub title: String,

    /// Human-readable message of the [`Notification`].
    pub message: String,

    /// Structured payload of the [`Notification`].
    pub payload: serde_json::Value,
}

impl<Db> Command<DispatchNotification> for Service<Db>
where
    Db: Database<Insert<Notification>, Err = Traced<database::Error>>,
{
    type Ok = Option<Notification>;
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: DispatchNotification,
    ) -> Result<Self::Ok, Self::Err> {
        let DispatchNotification {
            recipient_id,
            kind,
            title,
            message,
            payload,
        } = cmd;

        let Some(title) = Title::new(title) else {
            log::error!(
                "`{kind}` notification for `User(id: {recipient_id})` is \
                 dropped: invalid title",
            );
            return Ok(None);
        };
        let Some(message) = Message::new(message) else {
            log::error!(
                "`{kind}` notification for `User(id: {recipient_id})` is \
                 dropped: invalid message",
            );
            return Ok(None);
        };

        let notification = Notification {
            id: notification::Id::new(),
            recipient_id,
            kind,
            title,
            message,
            payload: Payload::from(payload),
            is_read: false,
            created_at: DateTime::now().coerce(),
        };

        match self.database().execute(Insert(notification.clone())).await {
            Ok(_) => {
                log::debug!(
                    "`{kind}` notification sent to `User(id: {recipient_id})`",
                );
                Ok(Some(notification))
            }
            Err(e) => {
                log::error!(
                    "failed to send `{kind}` notification to \
                     `User(id: {recipient_id})`: {e}",
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};
    use serde_json::json;

    use crate::{
        domain::{notification, user, Notification},
        fixture, read, Command as _,
    };

    use super::DispatchNotification;

    fn dispatch(recipient_id: user::Id) -> DispatchNotification {
        DispatchNotification {
            recipient_id,
            kind: notification::Kind::RentalApproved,
            title: "Rental request approved".to_owned(),
            message: "Your request for Rex is approved".to_owned(),
            payload: json!({ "listing_id": "rex" }),
        }
    }

    #[tokio::test]
    async fn stores_unread_notification() {
        let (svc, db) = fixture::service();
        let recipient_id = user::Id::new();

        let sent = svc.execute(dispatch(recipient_id)).await.unwrap().unwrap();

        assert!(!sent.is_read);
        assert_eq!(sent.recipient_id, recipient_id);
        assert_eq!(sent.kind, notification::Kind::RentalApproved);
        assert_eq!(sent.payload.as_json(), &json!({ "listing_id": "rex" }));

        let stored = db
            .execute(Select(By::<Vec<Notification>, _>::new(
                read::notification::AddressedTo(recipient_id),
            )))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, sent.id);
    }

    #[tokio::test]
    async fn swallows_storage_failures() {
        let (svc, db) = fixture::service();
        db.fail_notifications(true);

        let sent = svc.execute(dispatch(user::Id::new())).await.unwrap();

        assert!(sent.is_none());
    }

    #[tokio::test]
    async fn drops_invalid_texts() {
        let (svc, _) = fixture::service();

        let sent = svc
            .execute(DispatchNotification {
                title: "  ".to_owned(),
                ..dispatch(user::Id::new())
            })
            .await
            .unwrap();

        assert!(sent.is_none());
    }
}
