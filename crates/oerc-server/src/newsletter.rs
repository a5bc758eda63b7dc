//! Subscribe, subscriber administration, bulk send, and the new-subscriber
//! webhook.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use oerc_site::{BulkEmail, SendOutcome, WelcomeOutcome};
use oerc_types::{NewsletterSubscriber, RecordId};
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared webhook secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscribeRequest {
    pub email: String,
}

pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<NewsletterSubscriber>), ApiError> {
    let subscriber = state.site.newsletter.subscribe(&body.email).await?;
    Ok((StatusCode::CREATED, Json(subscriber)))
}

pub async fn list_subscribers(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<NewsletterSubscriber>>, ApiError> {
    let identity = caller.identity(&state).await?;
    Ok(Json(state.site.newsletter.list(identity.as_ref()).await?))
}

pub async fn remove_subscriber(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let identity = caller.identity(&state).await?;
    let id: RecordId = id.parse()?;
    if state.site.newsletter.remove(identity.as_ref(), &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("subscriber not found: {id}")))
    }
}

pub async fn send_newsletter(
    State(state): State<AppState>,
    caller: Caller,
    Json(email): Json<BulkEmail>,
) -> Result<Json<SendOutcome>, ApiError> {
    let identity = caller.identity(&state).await?;
    let outcome = state.site.newsletter.send_bulk(identity.as_ref(), &email).await?;
    Ok(Json(outcome))
}

/// Row-insert notification: `{"record": {"email": ...}}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscriberCreated {
    pub record: Option<CreatedRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatedRecord {
    pub email: Option<String>,
}

pub async fn subscriber_created(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubscriberCreated>,
) -> Result<Json<WelcomeOutcome>, ApiError> {
    if let Some(secret) = &state.webhook_secret {
        let given = headers.get(WEBHOOK_SECRET_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(secret.as_str()) {
            tracing::warn!("webhook call with a bad secret");
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, "invalid webhook secret"));
        }
    }
    let email = payload
        .record
        .and_then(|r| r.email)
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;
    Ok(Json(state.site.newsletter.welcome(&email).await?))
}
