//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use arcana_core::clock::Clock;
use arcana_core::error::DomainError;
use arcana_core::rng::DeterministicRng;
use arcana_reading::{AdGateway, PollPolicy, ReadingService};
use arcana_session::SharedSession;
use arcana_session::application::command_handlers;
use arcana_timeline::{TimelineCoordinator, TimelinePacing};
use uuid::Uuid;

/// One live session with its timeline coordinator.
#[derive(Clone)]
pub struct SessionEntry {
    /// The shared session aggregate.
    pub session: SharedSession,
    /// Coordinator for this session's dealing timeline.
    pub timeline: Arc<TimelineCoordinator>,
}

/// Application state shared across all request handlers.
///
/// Sessions are process-local: they are created when a layout is chosen
/// and die on delete or process exit, which is the lifetime the product
/// gives them anyway.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    /// Injected clock.
    pub clock: Arc<dyn Clock>,
    /// Injected RNG behind a mutex; locked only for synchronous draws.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// The interpretation service client.
    pub reading_service: Arc<dyn ReadingService>,
    /// The monetization collaborator.
    pub ads: Arc<dyn AdGateway>,
    /// Pacing of the dealing timeline.
    pub pacing: TimelinePacing,
    /// Poll cadence and escalation thresholds.
    pub poll_policy: PollPolicy,
    /// Locale submitted with readings.
    pub locale: String,
}

impl AppState {
    /// Creates application state with production pacing and polling.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        reading_service: Arc<dyn ReadingService>,
        ads: Arc<dyn AdGateway>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            clock,
            rng,
            reading_service,
            ads,
            pacing: TimelinePacing::production(),
            poll_policy: PollPolicy::production(),
            locale: "en".to_owned(),
        }
    }

    /// Overrides the timeline pacing.
    #[must_use]
    pub fn with_pacing(mut self, pacing: TimelinePacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Overrides the poll policy.
    #[must_use]
    pub fn with_poll_policy(mut self, poll_policy: PollPolicy) -> Self {
        self.poll_policy = poll_policy;
        self
    }

    /// Overrides the submission locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Creates a session on the given layout and registers it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store lock is
    /// poisoned.
    pub fn insert_session(&self, schema_id: &str) -> Result<(Uuid, SessionEntry), DomainError> {
        let (id, session) = command_handlers::create_session(schema_id);
        let entry = SessionEntry {
            session,
            timeline: Arc::new(TimelineCoordinator::new()),
        };
        self.sessions
            .write()
            .map_err(|e| DomainError::Infrastructure(format!("session store poisoned: {e}")))?
            .insert(id, entry.clone());
        Ok((id, entry))
    }

    /// Looks up a live session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` for unknown ids and
    /// `DomainError::Infrastructure` if the store lock is poisoned.
    pub fn session(&self, id: Uuid) -> Result<SessionEntry, DomainError> {
        self.sessions
            .read()
            .map_err(|e| DomainError::Infrastructure(format!("session store poisoned: {e}")))?
            .get(&id)
            .cloned()
            .ok_or(DomainError::SessionNotFound(id))
    }

    /// Removes a session, cancelling its timeline.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` for unknown ids and
    /// `DomainError::Infrastructure` if the store lock is poisoned.
    pub fn remove_session(&self, id: Uuid) -> Result<(), DomainError> {
        let entry = self
            .sessions
            .write()
            .map_err(|e| DomainError::Infrastructure(format!("session store poisoned: {e}")))?
            .remove(&id)
            .ok_or(DomainError::SessionNotFound(id))?;
        entry.timeline.cancel();
        Ok(())
    }
}
