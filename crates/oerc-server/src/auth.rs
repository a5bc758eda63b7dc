//! Request credentials and the sign-in endpoints.

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use oerc_auth::{authorize, AuthError, Capability, Credentials, Identity, Session};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Credentials from the `Authorization` header. Absent header is anonymous.
#[derive(Clone, Debug)]
pub struct Caller(pub Credentials);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str())
            .transpose()
            .map_err(|_| AuthError::MalformedCredentials)?;
        Ok(Self(Credentials::from_authorization(header)?))
    }
}

impl Caller {
    /// The signed-in identity, or `None` for anonymous callers. A bad token
    /// is an error, not anonymous.
    pub async fn identity(&self, state: &AppState) -> Result<Option<Identity>, ApiError> {
        match &self.0 {
            Credentials::Anonymous => Ok(None),
            Credentials::Bearer(token) => Ok(Some(state.site.identity.current_user(token).await?)),
        }
    }

    pub async fn require(&self, state: &AppState, capability: Capability) -> Result<Identity, ApiError> {
        Ok(authorize(state.site.identity.as_ref(), &self.0, capability).await?)
    }

    fn token(&self) -> Result<&str, ApiError> {
        match &self.0 {
            Credentials::Bearer(token) => Ok(token),
            Credentials::Anonymous => Err(AuthError::MissingCredentials.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignIn>,
) -> Result<Json<Session>, ApiError> {
    let session = state.site.identity.sign_in(&body.email, &body.password).await?;
    Ok(Json(session))
}

pub async fn sign_out(State(state): State<AppState>, caller: Caller) -> Result<StatusCode, ApiError> {
    state.site.identity.sign_out(caller.token()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_user(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Identity>, ApiError> {
    let identity = state.site.identity.current_user(caller.token()?).await?;
    Ok(Json(identity))
}
