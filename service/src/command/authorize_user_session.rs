//! [`Command`] for authorizing a [`User`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`session::Token`] issued by
/// the identity provider.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(tracerr::from_and_wrap!(=> E))
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, session, Session},
        fixture, Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn token(session: &Session, secret: &[u8]) -> session::Token {
        let encoded = jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        encoded.parse().unwrap()
    }

    fn session(expires_in_secs: i64) -> Session {
        Session {
            user_id: user::Id::new(),
            expires_at: DateTime::from_unix_timestamp(
                DateTime::now().unix_timestamp() + expires_in_secs,
            )
            .unwrap()
            .coerce(),
        }
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let (svc, _) = fixture::service();
        let issued = session(3600);

        let authorized = svc
            .execute(AuthorizeUserSession {
                token: token(&issued, b"secret"),
            })
            .await
            .unwrap();

        assert_eq!(authorized.user_id, issued.user_id);
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let (svc, _) = fixture::service();

        let err = svc
            .execute(AuthorizeUserSession {
                token: token(&session(3600), b"another"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let (svc, _) = fixture::service();

        let err = svc
            .execute(AuthorizeUserSession {
                token: token(&session(-3600), b"secret"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }
}
