//! Routes for the reading submission and poll protocol.

use arcana_reading::request_reading;
use arcana_session::ReadingResult;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /{id}/reading — submit the spread and poll to completion.
///
/// Responds 200 with the assembled result when the interpretation is
/// ready; 202 when the hard poll timeout elapsed (the reading id is kept
/// and a later call resumes polling); error statuses per the failure
/// taxonomy otherwise.
#[instrument(skip(state))]
async fn request_session_reading(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReadingResult>, ApiError> {
    let entry = state.session(id)?;
    let result = request_reading(
        &entry.session,
        state.reading_service.as_ref(),
        &state.ads,
        &state.poll_policy,
        &state.locale,
    )
    .await?;
    Ok(Json(result))
}

/// Returns the router for the reading protocol, nested alongside the
/// session routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/reading", post(request_session_reading))
}
