//! Deck tables and the deck source.
//!
//! Card identity lives here: display names paired with the stable wire
//! codes the interpretation service expects. The tables are the single
//! source of truth for the name-to-code mapping, which must fail closed
//! (return `None`) for names it does not know.

use arcana_core::rng::{DeterministicRng, shuffle_in_place};

/// Deck id for the full 78-card deck.
pub const DECK_RIDER_WAITE: &str = "rider_waite";

/// Deck id for the 22-card major arcana deck.
pub const DECK_MAJOR_ARCANA: &str = "major_arcana";

/// One deck entry: display name plus stable wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDef {
    /// Display name, unique across all decks.
    pub name: &'static str,
    /// Stable code sent to the interpretation service.
    pub code: &'static str,
}

const fn card(name: &'static str, code: &'static str) -> CardDef {
    CardDef { name, code }
}

/// The 22 major arcana.
pub const MAJOR_ARCANA: [CardDef; 22] = [
    card("The Fool", "ar00"),
    card("The Magician", "ar01"),
    card("The High Priestess", "ar02"),
    card("The Empress", "ar03"),
    card("The Emperor", "ar04"),
    card("The Hierophant", "ar05"),
    card("The Lovers", "ar06"),
    card("The Chariot", "ar07"),
    card("Strength", "ar08"),
    card("The Hermit", "ar09"),
    card("Wheel of Fortune", "ar10"),
    card("Justice", "ar11"),
    card("The Hanged Man", "ar12"),
    card("Death", "ar13"),
    card("Temperance", "ar14"),
    card("The Devil", "ar15"),
    card("The Tower", "ar16"),
    card("The Star", "ar17"),
    card("The Moon", "ar18"),
    card("The Sun", "ar19"),
    card("Judgement", "ar20"),
    card("The World", "ar21"),
];

/// The 56 minor arcana, by suit and rank.
pub const MINOR_ARCANA: [CardDef; 56] = [
    card("Ace of Wands", "wa01"),
    card("Two of Wands", "wa02"),
    card("Three of Wands", "wa03"),
    card("Four of Wands", "wa04"),
    card("Five of Wands", "wa05"),
    card("Six of Wands", "wa06"),
    card("Seven of Wands", "wa07"),
    card("Eight of Wands", "wa08"),
    card("Nine of Wands", "wa09"),
    card("Ten of Wands", "wa10"),
    card("Page of Wands", "wa11"),
    card("Knight of Wands", "wa12"),
    card("Queen of Wands", "wa13"),
    card("King of Wands", "wa14"),
    card("Ace of Cups", "cu01"),
    card("Two of Cups", "cu02"),
    card("Three of Cups", "cu03"),
    card("Four of Cups", "cu04"),
    card("Five of Cups", "cu05"),
    card("Six of Cups", "cu06"),
    card("Seven of Cups", "cu07"),
    card("Eight of Cups", "cu08"),
    card("Nine of Cups", "cu09"),
    card("Ten of Cups", "cu10"),
    card("Page of Cups", "cu11"),
    card("Knight of Cups", "cu12"),
    card("Queen of Cups", "cu13"),
    card("King of Cups", "cu14"),
    card("Ace of Swords", "sw01"),
    card("Two of Swords", "sw02"),
    card("Three of Swords", "sw03"),
    card("Four of Swords", "sw04"),
    card("Five of Swords", "sw05"),
    card("Six of Swords", "sw06"),
    card("Seven of Swords", "sw07"),
    card("Eight of Swords", "sw08"),
    card("Nine of Swords", "sw09"),
    card("Ten of Swords", "sw10"),
    card("Page of Swords", "sw11"),
    card("Knight of Swords", "sw12"),
    card("Queen of Swords", "sw13"),
    card("King of Swords", "sw14"),
    card("Ace of Pentacles", "pe01"),
    card("Two of Pentacles", "pe02"),
    card("Three of Pentacles", "pe03"),
    card("Four of Pentacles", "pe04"),
    card("Five of Pentacles", "pe05"),
    card("Six of Pentacles", "pe06"),
    card("Seven of Pentacles", "pe07"),
    card("Eight of Pentacles", "pe08"),
    card("Nine of Pentacles", "pe09"),
    card("Ten of Pentacles", "pe10"),
    card("Page of Pentacles", "pe11"),
    card("Knight of Pentacles", "pe12"),
    card("Queen of Pentacles", "pe13"),
    card("King of Pentacles", "pe14"),
];

/// Returns the cards of the named deck. Unknown deck types fall back to
/// the major arcana deck.
fn deck_cards(deck_type: &str) -> Vec<&'static CardDef> {
    match deck_type {
        DECK_RIDER_WAITE => MAJOR_ARCANA.iter().chain(MINOR_ARCANA.iter()).collect(),
        _ => MAJOR_ARCANA.iter().collect(),
    }
}

/// Returns the display title of the named deck.
#[must_use]
pub fn deck_title(deck_type: &str) -> &'static str {
    match deck_type {
        DECK_RIDER_WAITE => "Rider-Waite Tarot",
        _ => "Major Arcana",
    }
}

/// Returns a full permutation of the named deck, shuffled through the
/// injected RNG.
pub fn shuffled_deck(deck_type: &str, rng: &mut dyn DeterministicRng) -> Vec<&'static CardDef> {
    let mut cards = deck_cards(deck_type);
    shuffle_in_place(&mut cards, rng);
    cards
}

/// Maps a card display name to its wire code. Returns `None` for names
/// outside the tables; callers in the submission path must treat that as
/// a fatal local error.
#[must_use]
pub fn card_code(name: &str) -> Option<&'static str> {
    MAJOR_ARCANA
        .iter()
        .chain(MINOR_ARCANA.iter())
        .find(|def| def.name == name)
        .map(|def| def.code)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct FixedRng(u32);

    impl DeterministicRng for FixedRng {
        fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
            self.0.clamp(min, max)
        }

        fn next_f64(&mut self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_deck_sizes() {
        assert_eq!(deck_cards(DECK_RIDER_WAITE).len(), 78);
        assert_eq!(deck_cards(DECK_MAJOR_ARCANA).len(), 22);
    }

    #[test]
    fn test_unknown_deck_type_falls_back_to_major_arcana() {
        assert_eq!(deck_cards("lenormand").len(), 22);
        assert_eq!(deck_title("lenormand"), "Major Arcana");
    }

    #[test]
    fn test_names_and_codes_are_unique_across_decks() {
        let all: Vec<&CardDef> = MAJOR_ARCANA.iter().chain(MINOR_ARCANA.iter()).collect();
        let names: HashSet<&str> = all.iter().map(|def| def.name).collect();
        let codes: HashSet<&str> = all.iter().map(|def| def.code).collect();
        assert_eq!(names.len(), all.len());
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_card_code_maps_known_names() {
        assert_eq!(card_code("The Fool"), Some("ar00"));
        assert_eq!(card_code("Queen of Swords"), Some("sw13"));
    }

    #[test]
    fn test_card_code_fails_closed_for_unknown_names() {
        assert_eq!(card_code("The Ferryman"), None);
        assert_eq!(card_code(""), None);
    }

    #[test]
    fn test_shuffled_deck_is_a_permutation() {
        let mut rng = FixedRng(0);
        let shuffled = shuffled_deck(DECK_MAJOR_ARCANA, &mut rng);
        assert_eq!(shuffled.len(), 22);
        let names: HashSet<&str> = shuffled.iter().map(|def| def.name).collect();
        assert_eq!(names.len(), 22);
    }
}
