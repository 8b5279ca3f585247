//! Spread schemas and the layout registry.
//!
//! The catalog is authored as YAML, embedded at compile time, and parsed
//! once. Schemas are immutable; the orchestrator never mutates them.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// The schema id used when a lookup misses.
pub const DEFAULT_SCHEMA_ID: &str = "card_of_day";

/// Opening-order policy for a spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningRule {
    /// Positions must be revealed in the schema's `open_order`.
    InOrder,
    /// Positions may be revealed in any order.
    AnyOrder,
}

/// One card position within a spread layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Unique position id, `1..=card_count`.
    pub position_id: u8,
    /// Normalized horizontal coordinate on the layout canvas.
    pub x: f32,
    /// Normalized vertical coordinate on the layout canvas.
    pub y: f32,
    /// Display label for the position.
    pub label: String,
}

/// An immutable spread layout schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadSchema {
    /// Stable schema identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Number of cards to draw.
    pub card_count: u8,
    /// Identifier of the deck to draw from.
    pub deck_type: String,
    /// Opening-order policy.
    pub opening_rule: OpeningRule,
    /// Required reveal order of position ids when `opening_rule` is
    /// `InOrder`.
    pub open_order: Vec<u8>,
    /// Ordered positions, one per card.
    pub positions: Vec<Position>,
}

#[derive(Debug, Deserialize)]
struct Catalog {
    spreads: Vec<SpreadSchema>,
}

static REGISTRY: LazyLock<HashMap<String, SpreadSchema>> = LazyLock::new(|| {
    let catalog: Catalog = serde_yaml::from_str(include_str!("catalog.yaml"))
        .expect("embedded spread catalog must parse");
    for schema in &catalog.spreads {
        assert_schema_well_formed(schema);
    }
    catalog
        .spreads
        .into_iter()
        .map(|schema| (schema.id.clone(), schema))
        .collect()
});

/// Panics at first use if the embedded catalog violates its own shape.
/// A malformed catalog is a packaging defect, not a runtime condition.
fn assert_schema_well_formed(schema: &SpreadSchema) {
    assert!(
        schema.card_count > 0,
        "schema {} must have at least one card",
        schema.id
    );
    assert_eq!(
        usize::from(schema.card_count),
        schema.positions.len(),
        "schema {} position count must match card_count",
        schema.id
    );
    let mut order = schema.open_order.clone();
    order.sort_unstable();
    let expected: Vec<u8> = (1..=schema.card_count).collect();
    assert_eq!(
        order, expected,
        "schema {} open_order must be a permutation of position ids",
        schema.id
    );
    let mut ids: Vec<u8> = schema.positions.iter().map(|p| p.position_id).collect();
    ids.sort_unstable();
    assert_eq!(
        ids, expected,
        "schema {} position ids must cover 1..=card_count",
        schema.id
    );
}

/// Looks up a schema by id, falling back to the default single-card
/// schema when the id is unknown.
#[must_use]
pub fn schema_by_id(id: &str) -> &'static SpreadSchema {
    REGISTRY.get(id).unwrap_or_else(default_schema)
}

/// Returns the default single-card schema.
#[must_use]
pub fn default_schema() -> &'static SpreadSchema {
    REGISTRY
        .get(DEFAULT_SCHEMA_ID)
        .expect("default schema must exist in the embedded catalog")
}

/// Returns every schema in the catalog, ordered by id.
#[must_use]
pub fn all_schemas() -> Vec<&'static SpreadSchema> {
    let mut schemas: Vec<&'static SpreadSchema> = REGISTRY.values().collect();
    schemas.sort_by_key(|schema| schema.id.as_str());
    schemas
}
