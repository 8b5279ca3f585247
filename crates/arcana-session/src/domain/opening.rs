//! Opening-order validation.
//!
//! Decides whether a position may be revealed given the schema's policy
//! and the current open state of the card array. Pure; the session owns
//! the warning-episode bookkeeping.

use arcana_layouts::{OpeningRule, SpreadSchema};

use super::session::SpreadCard;

/// Outcome of an opening-order check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenDecision {
    /// Whether the requested position may be opened now.
    pub allowed: bool,
    /// The next position the policy expects, when ordering applies and
    /// closed cards remain.
    pub expected: Option<u8>,
}

/// Checks whether `position_id` may be opened.
///
/// Any-order schemas and sessions with relaxed enforcement always allow.
/// In-order schemas allow exactly the first position in `open_order`
/// whose card is still closed.
#[must_use]
pub fn can_open(
    schema: &SpreadSchema,
    cards: &[SpreadCard],
    forced_free_opening: bool,
    position_id: u8,
) -> OpenDecision {
    if schema.opening_rule == OpeningRule::AnyOrder || forced_free_opening {
        return OpenDecision {
            allowed: true,
            expected: None,
        };
    }

    let expected = schema.open_order.iter().copied().find(|id| {
        cards
            .iter()
            .any(|card| card.position_id == *id && !card.is_open)
    });

    match expected {
        Some(id) => OpenDecision {
            allowed: position_id == id,
            expected: Some(id),
        },
        // Every card is already open; nothing left to order.
        None => OpenDecision {
            allowed: true,
            expected: None,
        },
    }
}
