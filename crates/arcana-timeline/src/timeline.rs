//! The timeline coordinator.

use std::sync::atomic::{AtomicU64, Ordering};

use arcana_session::SharedSession;
use tokio::time::sleep;

use crate::pacing::TimelinePacing;

/// Drives the stage checkpoints of one session's dealing animation.
///
/// At most one run is live per coordinator: every `play` claims a fresh
/// epoch token, and a run re-checks its token after every sleep. A stale
/// token means a newer run (or a cancel) superseded this one; the run
/// then returns without touching the session. Cancellation is the normal
/// way runs end early and is never an error.
#[derive(Debug, Default)]
pub struct TimelineCoordinator {
    epoch: AtomicU64,
}

impl TimelineCoordinator {
    /// Creates a coordinator with no live run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes the live run, if any, without starting a new one.
    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Claims a token for a new run, superseding the previous one.
    fn claim(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == token
    }

    /// Plays the dealing timeline over the session, applying each phase's
    /// stage checkpoint as it completes. Returns when the timeline has
    /// finished or been superseded; neither outcome is an error.
    pub async fn play(&self, session: SharedSession, pacing: TimelinePacing) {
        let token = self.claim();
        tracing::debug!(token, "timeline started");

        for (duration, checkpoint) in pacing.phases() {
            sleep(duration).await;
            if !self.is_current(token) {
                tracing::debug!(token, "timeline superseded");
                return;
            }
            if let Some(stage) = checkpoint {
                // A poisoned session lock ends the run; timelines never
                // surface failures.
                let Ok(mut guard) = session.lock() else {
                    return;
                };
                guard.advance_to(stage);
            }
        }
        tracing::debug!(token, "timeline complete");
    }
}
