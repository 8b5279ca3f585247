//! Card draw: assigns one deck card to every schema position.

use arcana_core::error::DomainError;
use arcana_core::rng::DeterministicRng;
use arcana_layouts::{CardDef, SpreadSchema};

use super::session::SpreadCard;

/// Probability that a drawn card lands reversed.
pub const REVERSAL_ODDS: f64 = 0.45;

/// Draws `schema.card_count` cards from the front of an already shuffled
/// deck, one per position, each with an independently rolled reversed
/// flag. Neither the schema nor the deck is mutated.
///
/// # Errors
///
/// Returns `DomainError::Validation` when the deck holds fewer cards than
/// the spread needs. Slicing a short deck would silently duplicate or
/// underflow positions, so the draw refuses instead.
pub fn draw_cards(
    schema: &SpreadSchema,
    deck: &[&'static CardDef],
    rng: &mut dyn DeterministicRng,
) -> Result<Vec<SpreadCard>, DomainError> {
    let needed = usize::from(schema.card_count);
    if deck.len() < needed {
        return Err(DomainError::Validation(format!(
            "deck {} holds {} cards but spread {} needs {}",
            schema.deck_type,
            deck.len(),
            schema.id,
            needed
        )));
    }

    Ok(schema
        .positions
        .iter()
        .zip(deck.iter())
        .map(|(position, def)| SpreadCard {
            position_id: position.position_id,
            card_name: def.name.to_owned(),
            reversed: rng.next_f64() < REVERSAL_ODDS,
            is_open: false,
        })
        .collect())
}
