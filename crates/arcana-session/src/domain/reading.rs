//! Reading metadata held by the session.
//!
//! The session stores the backend's view of a submitted reading: its
//! status while the interpretation is being prepared and the assembled
//! result once it is ready. The poll client writes these slots; the
//! session only clears them on reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend status of a submitted reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    /// Accepted, not yet picked up.
    Pending,
    /// Waiting in the interpretation queue.
    Queued,
    /// Interpretation in progress.
    Processing,
    /// Interpretation complete; the full view can be fetched.
    Ready,
    /// The backend failed to produce an interpretation.
    Error,
}

impl ReadingStatus {
    /// Whether this status ends the poll loop.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

/// Interpretation text for one spread position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInterpretation {
    /// The position this text belongs to.
    pub position_index: u8,
    /// Heading for the position.
    pub title: String,
    /// One-line interpretation.
    pub short_text: String,
    /// Full interpretation text.
    pub full_text: String,
}

/// The assembled interpretation of a completed spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingResult {
    /// Overall summary of the spread.
    pub summary: String,
    /// When the backend generated the interpretation.
    pub generated_at: DateTime<Utc>,
    /// Per-position interpretations, in position order.
    pub positions: Vec<PositionInterpretation>,
    /// Account balance reported alongside the full view, if any.
    pub balance: Option<i64>,
    /// Energy spent on this reading, if reported.
    pub energy_spent: Option<i64>,
}
