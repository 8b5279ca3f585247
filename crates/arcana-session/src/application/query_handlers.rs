//! Query handlers for the spread session context.
//!
//! Read-only view DTOs assembled from the aggregate under a short-lived
//! lock, so every observer sees a consistent snapshot.

use arcana_core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::command_handlers::{SharedSession, lock};
use crate::domain::reading::{ReadingResult, ReadingStatus};
use crate::domain::session::Stage;

/// Read-only view of one card in the spread.
#[derive(Debug, Serialize)]
pub struct CardView {
    /// The position the card occupies.
    pub position_id: u8,
    /// Display name of the card.
    pub card_name: String,
    /// Orientation assigned at draw time.
    pub reversed: bool,
    /// Whether the card has been revealed.
    pub is_open: bool,
}

/// Read-only view of a spread session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Id of the layout the session runs on.
    pub schema_id: String,
    /// Display title of the layout.
    pub schema_title: String,
    /// Current presentation stage.
    pub stage: Stage,
    /// The user's question.
    pub question: String,
    /// Drawn cards; empty before start.
    pub cards: Vec<CardView>,
    /// Whether opening-order enforcement has been relaxed.
    pub forced_free_opening: bool,
    /// Reading id, once submitted.
    pub reading_id: Option<String>,
    /// Last observed backend status.
    pub backend_status: Option<ReadingStatus>,
    /// Whether the long-wait escalation has fired.
    pub taking_long: bool,
    /// The assembled interpretation, once ready.
    pub result: Option<ReadingResult>,
    /// When the spread was started.
    pub started_at: Option<DateTime<Utc>>,
}

/// Builds a consistent snapshot of the session.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned.
pub fn session_view(session: &SharedSession) -> Result<SessionView, DomainError> {
    let guard = lock(session)?;
    Ok(SessionView {
        session_id: guard.id(),
        schema_id: guard.schema().id.clone(),
        schema_title: guard.schema().title.clone(),
        stage: guard.stage(),
        question: guard.question().to_owned(),
        cards: guard
            .cards()
            .iter()
            .map(|card| CardView {
                position_id: card.position_id,
                card_name: card.card_name.clone(),
                reversed: card.reversed,
                is_open: card.is_open,
            })
            .collect(),
        forced_free_opening: guard.forced_free_opening(),
        reading_id: guard.reading_id().map(str::to_owned),
        backend_status: guard.backend_status(),
        taking_long: guard.taking_long(),
        result: guard.result().cloned(),
        started_at: guard.started_at(),
    })
}
