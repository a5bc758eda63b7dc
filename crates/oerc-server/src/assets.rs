//! Public object downloads at the URLs the bucket hands out.

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn public_object(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let blobs = state.site.papers.blobs();
    if bucket != blobs.bucket() {
        return Err(ApiError::not_found(format!("no such bucket: {bucket}")));
    }
    let blob = blobs
        .download(&path)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no such object: {path}")))?;
    Ok(([(CONTENT_TYPE, blob.content_type)], blob.bytes).into_response())
}
