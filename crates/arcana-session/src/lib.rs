//! Arcana Session — the spread session state machine.
//!
//! Owns the mutable aggregate at the center of the orchestrator: stage,
//! question, card array, opening-order state and submission metadata. All
//! mutation goes through a small set of operations; operations invoked
//! outside their permitted stage are silent no-ops.

pub mod application;
pub mod domain;

pub use application::command_handlers::{SharedSession, shared};
pub use domain::opening::OpenDecision;
pub use domain::reading::{PositionInterpretation, ReadingResult, ReadingStatus};
pub use domain::session::{OpenOutcome, SpreadCard, SpreadSession, Stage};
