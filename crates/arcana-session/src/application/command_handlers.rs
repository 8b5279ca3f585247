//! Command handlers for the spread session context.
//!
//! Each handler locks the shared session, runs one synchronous domain
//! operation, and releases the lock before anything can suspend. Guards
//! are never held across await points.

use std::sync::{Arc, Mutex, MutexGuard};

use arcana_core::clock::Clock;
use arcana_core::error::DomainError;
use arcana_core::rng::DeterministicRng;
use arcana_layouts::{schema_by_id, shuffled_deck};
use uuid::Uuid;

use crate::domain::session::{OpenOutcome, SpreadSession};

/// A session handle shared between the API, the timeline coordinator and
/// the poll client.
pub type SharedSession = Arc<Mutex<SpreadSession>>;

/// Wraps a session into a shared handle.
#[must_use]
pub fn shared(session: SpreadSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Locks the session, mapping lock poisoning to an infrastructure error.
pub(crate) fn lock(session: &SharedSession) -> Result<MutexGuard<'_, SpreadSession>, DomainError> {
    session
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("session mutex poisoned: {e}")))
}

/// Handles a question update.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned.
pub fn handle_set_question(session: &SharedSession, question: &str) -> Result<bool, DomainError> {
    Ok(lock(session)?.set_question(question))
}

/// Handles layout selection: replaces the schema and clears the session.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned.
pub fn handle_select_schema(session: &SharedSession, schema_id: &str) -> Result<(), DomainError> {
    let schema = schema_by_id(schema_id).clone();
    lock(session)?.select_schema(schema);
    Ok(())
}

/// Handles `start`: shuffles the schema's deck through the injected RNG
/// and draws the spread. The caller decides whether to reset first (the
/// cancel-then-restart contract lives above this layer).
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty question or a deck
/// smaller than the spread, `DomainError::Infrastructure` on poisoned
/// locks.
pub fn handle_start(
    session: &SharedSession,
    question: &str,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<bool, DomainError> {
    let mut guard = lock(session)?;
    let deck_type = guard.schema().deck_type.clone();

    // Lock the RNG only for the synchronous shuffle and draw.
    let mut rng_guard = rng
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
    let deck = shuffled_deck(&deck_type, &mut *rng_guard);

    let started = guard.start(question, &deck, clock, &mut *rng_guard)?;
    if started {
        tracing::info!(
            session_id = %guard.id(),
            schema = %guard.schema().id,
            cards = guard.cards().len(),
            "spread started"
        );
    }
    Ok(started)
}

/// Handles a card-open request.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned.
pub fn handle_open_card(
    session: &SharedSession,
    position_id: u8,
) -> Result<OpenOutcome, DomainError> {
    let mut guard = lock(session)?;
    let outcome = guard.open_card(position_id);
    if let OpenOutcome::Denied {
        expected,
        first_warning,
    } = outcome
    {
        tracing::debug!(
            session_id = %guard.id(),
            requested = position_id,
            expected,
            first_warning,
            "opening order violation"
        );
    }
    Ok(outcome)
}

/// Handles the opening-order escape hatch.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned.
pub fn handle_force_free_opening(session: &SharedSession) -> Result<bool, DomainError> {
    Ok(lock(session)?.force_free_opening())
}

/// Handles `reset`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session lock is poisoned.
pub fn handle_reset(session: &SharedSession) -> Result<(), DomainError> {
    let mut guard = lock(session)?;
    guard.reset();
    tracing::debug!(session_id = %guard.id(), "session reset");
    Ok(())
}

/// Creates a new shared session on the given layout.
#[must_use]
pub fn create_session(schema_id: &str) -> (Uuid, SharedSession) {
    let id = Uuid::new_v4();
    let session = SpreadSession::new(id, schema_by_id(schema_id).clone());
    (id, shared(session))
}
