//! Arcana Timeline — the animation timeline coordinator.
//!
//! Sequences the presentation stages `fan -> collecting -> shuffling ->
//! dealing -> await_open` as timed phases, and guarantees that a
//! superseded run never mutates the session again: every run carries an
//! epoch token that is re-checked after each suspension point.

mod pacing;
mod timeline;

pub use pacing::TimelinePacing;
pub use timeline::TimelineCoordinator;
