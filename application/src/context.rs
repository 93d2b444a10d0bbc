//! Per-request [`Context`] of the GraphQL API.

use std::sync::atomic::{AtomicU16, Ordering};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user::session,
};
use tokio::sync::OnceCell;

use crate::{api, define_error, AsError, Error, JuniperResponse, Service};

/// Context of a single GraphQL request.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] resolving the request.
    service: Service,

    /// HTTP status to respond with if the request fails.
    status: AtomicU16,

    /// HTTP request parts, holding the credentials.
    parts: http::request::Parts,

    /// Outcome of authenticating the request, [`None`] if it carries no
    /// credentials.
    session: OnceCell<Result<Option<Session>, Error>>,
}

impl Context {
    /// Returns the [`Service`] resolving the request.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the HTTP status to respond with if the request fails.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.status.load(Ordering::Relaxed))
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns a [`Result::map_err()`] closure remembering the HTTP status of
    /// the passed [`Error`] for the response.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.status
                .store(err.status_code.as_u16(), Ordering::Relaxed);
            err
        }
    }

    /// Returns the [`Session`] of the viewer, if the request carries any
    /// credentials.
    ///
    /// # Errors
    ///
    /// If the provided credentials are rejected.
    pub async fn try_current_session(&self) -> Result<Option<Session>, Error> {
        self.session
            .get_or_init(|| self.authenticate())
            .await
            .clone()
            .map_err(self.error())
    }

    /// Returns the [`Session`] of the viewer.
    ///
    /// # Errors
    ///
    /// If the request carries no credentials, or they are rejected.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.try_current_session()
            .await?
            .ok_or_else(|| Error::from(AuthError::AuthorizationRequired))
            .map_err(self.error())
    }

    /// Authenticates the request by its `Authorization: Bearer` header.
    async fn authenticate(&self) -> Result<Option<Session>, Error> {
        let header = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        let bearer = match header {
            Ok(TypedHeader(Authorization(bearer))) => bearer,
            Err(e) if e.is_missing() => return Ok(None),
            Err(e) => return Err(e.into_error()),
        };

        let token = session::Token::from(bearer.token().to_owned());
        let session = self
            .service
            .execute(command::AuthorizeUserSession {
                token: token.clone(),
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Some(Session {
            user_id: session.user_id.into(),
            token,
            expires_at: session.expires_at.coerce(),
        }))
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(service) = parts.extensions.get::<Service>().cloned() else {
            let err = Error::internal(&"`Service` is not attached to request");
            return Err(JuniperResponse {
                status_code: err.status_code,
                response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                    err.into_field_error(),
                )),
            });
        };

        Ok(Self {
            service,
            status: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            session: OnceCell::new(),
        })
    }
}

/// Authenticated session of the viewer.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the authenticated user.
    pub user_id: api::user::Id,

    /// Token the [`Session`] was authenticated with.
    pub token: session::Token,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::JsonWebTokenDecodeError(_) => {
                Some(AuthError::InvalidToken.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Provided access token is invalid or expired"]
        InvalidToken,
    }
}
