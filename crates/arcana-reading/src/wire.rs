//! Wire types for the interpretation service.

use arcana_session::ReadingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The reading type submitted for a card spread.
pub const READING_KIND: &str = "spread";

/// One card entry of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    /// Position the card occupies in the layout.
    pub position_index: u8,
    /// Stable wire code of the card.
    pub card_code: String,
    /// Orientation assigned at draw time.
    pub reversed: bool,
    /// Display label of the position.
    pub position_label: String,
    /// Display name of the card.
    pub card_name: String,
}

/// Request body for creating a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReadingRequest {
    /// Reading type; always [`READING_KIND`] here.
    #[serde(rename = "type")]
    pub kind: String,
    /// Id of the spread layout.
    pub spread_id: String,
    /// Display title of the spread layout.
    pub spread_title: String,
    /// Id of the deck drawn from.
    pub deck_id: String,
    /// Display title of the deck.
    pub deck_title: String,
    /// The user's trimmed question.
    pub question: String,
    /// Normalized locale tag.
    pub locale: String,
    /// One entry per drawn card, in position order.
    pub cards: Vec<CardEntry>,
}

/// Response to a create-reading call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateReadingResponse {
    /// Server-assigned reading id.
    pub id: String,
    /// Initial status.
    pub status: ReadingStatus,
}

/// Status snapshot returned by the get-reading endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadingSnapshot {
    /// The reading id.
    pub id: String,
    /// Current status.
    pub status: ReadingStatus,
    /// Interpretation payload; present and non-null once ready.
    #[serde(default)]
    pub output_payload: Option<serde_json::Value>,
    /// Short summary, when the backend includes one early.
    #[serde(default)]
    pub summary_text: Option<String>,
    /// Energy spent on this reading, if reported.
    #[serde(default)]
    pub energy_spent: Option<i64>,
    /// Server-supplied failure reason when status is `error`.
    #[serde(default)]
    pub error: Option<String>,
}

impl ReadingSnapshot {
    /// Whether this snapshot carries a usable interpretation payload.
    #[must_use]
    pub fn has_output(&self) -> bool {
        self.output_payload.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Interpretation text for one position, as sent on the wire.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PositionPayload {
    /// The position this text belongs to.
    pub position_index: u8,
    /// Heading for the position.
    pub title: String,
    /// One-line interpretation.
    pub short_text: String,
    /// Full interpretation text.
    pub full_text: String,
}

/// Interpretation payload of the full view.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputPayload {
    /// Overall summary of the spread.
    pub summary: String,
    /// When the interpretation was generated.
    pub generated_at: DateTime<Utc>,
    /// Per-position interpretations.
    pub positions: Vec<PositionPayload>,
}

/// Response of the view-reading endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadingView {
    /// The full interpretation payload.
    pub output_payload: OutputPayload,
    /// Account balance after the reading, if reported.
    #[serde(default)]
    pub balance: Option<i64>,
}
