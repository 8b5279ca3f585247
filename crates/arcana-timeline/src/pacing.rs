//! Phase durations for the dealing timeline.

use std::time::Duration;

use arcana_session::Stage;

/// Durations of the five presentation phases.
#[derive(Debug, Clone, Copy)]
pub struct TimelinePacing {
    /// The question card fading out.
    pub question_dismiss: Duration,
    /// The fan collapsing into a stack.
    pub deck_collapse: Duration,
    /// The shuffle.
    pub shuffle: Duration,
    /// Cards lifting into their positions.
    pub deal: Duration,
    /// The tap-to-reveal hint; plays after the last checkpoint.
    pub reveal_hint: Duration,
}

impl TimelinePacing {
    /// Production pacing, tuned to the presentation.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            question_dismiss: Duration::from_millis(600),
            deck_collapse: Duration::from_millis(450),
            shuffle: Duration::from_millis(1400),
            deal: Duration::from_millis(900),
            reveal_hint: Duration::from_millis(400),
        }
    }

    /// Uniform pacing, mostly useful in tests.
    #[must_use]
    pub const fn uniform(phase: Duration) -> Self {
        Self {
            question_dismiss: phase,
            deck_collapse: phase,
            shuffle: phase,
            deal: phase,
            reveal_hint: phase,
        }
    }

    /// The phases in play order, each with the stage checkpoint applied
    /// when the phase completes. The reveal hint carries no checkpoint.
    #[must_use]
    pub fn phases(&self) -> [(Duration, Option<Stage>); 5] {
        [
            (self.question_dismiss, Some(Stage::Collecting)),
            (self.deck_collapse, Some(Stage::Shuffling)),
            (self.shuffle, Some(Stage::Dealing)),
            (self.deal, Some(Stage::AwaitOpen)),
            (self.reveal_hint, None),
        ]
    }
}

impl Default for TimelinePacing {
    fn default() -> Self {
        Self::production()
    }
}
