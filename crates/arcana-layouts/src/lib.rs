//! Arcana Layouts — spread layout registry and deck source.
//!
//! Static catalog data: spread schemas (position coordinates, card counts,
//! opening-order policies) and the card decks they draw from. Nothing in
//! this crate is mutated at runtime; the orchestrator receives schemas and
//! shuffled decks by value or by `'static` reference.

pub mod deck;
pub mod schema;

pub use deck::{CardDef, card_code, deck_title, shuffled_deck};
pub use schema::{OpeningRule, Position, SpreadSchema, all_schemas, default_schema, schema_by_id};
