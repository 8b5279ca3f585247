//! Routes for the layout registry.

use arcana_layouts::{SpreadSchema, all_schemas, schema_by_id};
use axum::extract::Path;
use axum::{Json, Router, routing::get};

use crate::state::AppState;

/// GET / — every spread schema in the catalog.
async fn list_layouts() -> Json<Vec<&'static SpreadSchema>> {
    Json(all_schemas())
}

/// GET /{id} — one schema; unknown ids fall back to the default
/// single-card schema, matching the registry contract.
async fn get_layout(Path(id): Path<String>) -> Json<&'static SpreadSchema> {
    Json(schema_by_id(&id))
}

/// Returns the router for the layout registry.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_layouts))
        .route("/{id}", get(get_layout))
}
