//! The spread session aggregate.
//!
//! One `SpreadSession` is one user's interaction with a chosen layout:
//! question, drawn cards, presentation stage and submission metadata. It
//! is mutated only through the operations below. Operations invoked
//! outside their permitted stage return without touching state; they
//! never error for being mis-staged.

use arcana_core::clock::Clock;
use arcana_core::error::DomainError;
use arcana_core::rng::DeterministicRng;
use arcana_layouts::{CardDef, SpreadSchema};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::draw::draw_cards;
use super::opening::{OpenDecision, can_open};
use super::reading::{ReadingResult, ReadingStatus};

/// Presentation stage of a spread session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Cards fanned out, question being composed.
    Fan,
    /// Deck collapsing into a stack.
    Collecting,
    /// Deck shuffling.
    Shuffling,
    /// Cards lifting into their positions.
    Dealing,
    /// Dealt face down, waiting for the user to reveal them.
    AwaitOpen,
    /// Every card revealed.
    Done,
}

impl Stage {
    /// The forward edge a timeline checkpoint may take from this stage,
    /// if any. `AwaitOpen -> Done` is not listed: that edge belongs to
    /// `open_card` alone.
    fn timeline_successor(self) -> Option<Self> {
        match self {
            Self::Fan => Some(Self::Collecting),
            Self::Collecting => Some(Self::Shuffling),
            Self::Shuffling => Some(Self::Dealing),
            Self::Dealing => Some(Self::AwaitOpen),
            Self::AwaitOpen | Self::Done => None,
        }
    }
}

/// One drawn card, bound to a layout position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadCard {
    /// The position this card occupies.
    pub position_id: u8,
    /// Display name of the drawn card.
    pub card_name: String,
    /// Orientation assigned at draw time.
    pub reversed: bool,
    /// Whether the user has revealed this card.
    pub is_open: bool,
}

/// Result of an `open_card` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The card was revealed.
    Opened {
        /// The opened position.
        position_id: u8,
        /// Whether this reveal completed the spread.
        all_open: bool,
    },
    /// The opening-order policy rejected the request.
    Denied {
        /// The position the policy expects next.
        expected: u8,
        /// Whether this is the first denial of the current violation
        /// episode. The caller warns the user only when this is set.
        first_warning: bool,
    },
    /// Wrong stage, unknown position, or the card was already open.
    Ignored,
}

/// The mutable aggregate owned by the orchestrator.
#[derive(Debug)]
pub struct SpreadSession {
    id: Uuid,
    schema: SpreadSchema,
    question: String,
    stage: Stage,
    cards: Vec<SpreadCard>,
    forced_free_opening: bool,
    /// Expected position of the last denial, for warning-once semantics.
    warned_expected: Option<u8>,
    reading_id: Option<String>,
    backend_status: Option<ReadingStatus>,
    result: Option<ReadingResult>,
    taking_long: bool,
    started_at: Option<DateTime<Utc>>,
}

impl SpreadSession {
    /// Creates a fresh session for the given layout.
    #[must_use]
    pub fn new(id: Uuid, schema: SpreadSchema) -> Self {
        Self {
            id,
            schema,
            question: String::new(),
            stage: Stage::Fan,
            cards: Vec::new(),
            forced_free_opening: false,
            warned_expected: None,
            reading_id: None,
            backend_status: None,
            result: None,
            taking_long: false,
            started_at: None,
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The layout schema this session runs on.
    #[must_use]
    pub fn schema(&self) -> &SpreadSchema {
        &self.schema
    }

    /// The user's question, trimmed at start time.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Current presentation stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Drawn cards; empty before `start`.
    #[must_use]
    pub fn cards(&self) -> &[SpreadCard] {
        &self.cards
    }

    /// Whether opening-order enforcement has been relaxed.
    #[must_use]
    pub fn forced_free_opening(&self) -> bool {
        self.forced_free_opening
    }

    /// Reading id assigned by the interpretation service, if submitted.
    #[must_use]
    pub fn reading_id(&self) -> Option<&str> {
        self.reading_id.as_deref()
    }

    /// Last backend status republished by the poll loop.
    #[must_use]
    pub fn backend_status(&self) -> Option<ReadingStatus> {
        self.backend_status
    }

    /// The assembled interpretation, once ready.
    #[must_use]
    pub fn result(&self) -> Option<&ReadingResult> {
        self.result.as_ref()
    }

    /// Whether the poll loop flagged the long-wait escalation.
    #[must_use]
    pub fn taking_long(&self) -> bool {
        self.taking_long
    }

    /// When the spread was started, if it has been.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Records the question while still on the fan. No-op in any other
    /// stage. Returns whether the question was stored.
    pub fn set_question(&mut self, question: &str) -> bool {
        if self.stage != Stage::Fan {
            return false;
        }
        self.question = question.to_owned();
        true
    }

    /// Replaces the layout, clearing all per-spread state.
    pub fn select_schema(&mut self, schema: SpreadSchema) {
        self.reset();
        self.schema = schema;
    }

    /// Starts the spread: stores the trimmed question and draws one card
    /// per position from the front of `deck`. Only permitted on the fan;
    /// elsewhere it is a no-op returning `Ok(false)`. The stage does not
    /// move here; the timeline advances it through its checkpoints.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the trimmed question is
    /// empty or the deck is smaller than the spread. State is untouched
    /// on error.
    pub fn start(
        &mut self,
        question: &str,
        deck: &[&'static CardDef],
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<bool, DomainError> {
        if self.stage != Stage::Fan {
            return Ok(false);
        }

        let trimmed = question.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation(
                "question must not be empty".to_owned(),
            ));
        }

        let cards = draw_cards(&self.schema, deck, rng)?;

        self.question = trimmed.to_owned();
        self.cards = cards;
        self.started_at = Some(clock.now());
        Ok(true)
    }

    /// Applies a timeline checkpoint. Accepts exactly the next forward
    /// edge of the stage machine and only on a drawn session; every other
    /// request is a silent no-op. Returns whether the stage moved.
    pub fn advance_to(&mut self, target: Stage) -> bool {
        if self.cards.is_empty() {
            return false;
        }
        match self.stage.timeline_successor() {
            Some(next) if next == target => {
                self.stage = target;
                true
            }
            _ => false,
        }
    }

    /// Checks the opening-order policy for a position without mutating
    /// anything.
    #[must_use]
    pub fn can_open(&self, position_id: u8) -> OpenDecision {
        can_open(&self.schema, &self.cards, self.forced_free_opening, position_id)
    }

    /// Attempts to reveal a card. Permitted while cards are on the table
    /// (`AwaitOpen` and `Done`); elsewhere, and for unknown or already
    /// open positions, the request is ignored. Revealing the last closed
    /// card moves the session to `Done`.
    pub fn open_card(&mut self, position_id: u8) -> OpenOutcome {
        if !matches!(self.stage, Stage::AwaitOpen | Stage::Done) {
            return OpenOutcome::Ignored;
        }

        let Some(index) = self
            .cards
            .iter()
            .position(|card| card.position_id == position_id)
        else {
            return OpenOutcome::Ignored;
        };
        if self.cards[index].is_open {
            return OpenOutcome::Ignored;
        }

        let decision = self.can_open(position_id);
        if !decision.allowed {
            let expected = decision
                .expected
                .expect("a denied open always names the expected position");
            let first_warning = self.warned_expected != Some(expected);
            self.warned_expected = Some(expected);
            return OpenOutcome::Denied {
                expected,
                first_warning,
            };
        }

        self.cards[index].is_open = true;
        self.warned_expected = None;
        let all_open = self.cards.iter().all(|card| card.is_open);
        if all_open {
            self.stage = Stage::Done;
        }
        OpenOutcome::Opened {
            position_id,
            all_open,
        }
    }

    /// Permanently relaxes opening-order enforcement for this session.
    /// Only meaningful while cards wait to be opened; a no-op elsewhere.
    /// Already opened cards are never re-validated or reshuffled.
    pub fn force_free_opening(&mut self) -> bool {
        if self.stage != Stage::AwaitOpen {
            return false;
        }
        self.forced_free_opening = true;
        self.warned_expected = None;
        true
    }

    /// Records the reading id returned by the interpretation service.
    /// The id is set at most once per session; a second call without an
    /// intervening reset is a no-op returning false.
    pub fn link_reading(&mut self, reading_id: String, status: ReadingStatus) -> bool {
        if self.reading_id.is_some() {
            return false;
        }
        self.reading_id = Some(reading_id);
        self.backend_status = Some(status);
        true
    }

    /// Republishes the backend status for observers.
    pub fn set_backend_status(&mut self, status: ReadingStatus) {
        self.backend_status = Some(status);
    }

    /// Raises or clears the long-wait escalation flag.
    pub fn set_taking_long(&mut self, taking_long: bool) {
        self.taking_long = taking_long;
    }

    /// Stores the assembled interpretation.
    pub fn set_result(&mut self, result: ReadingResult) {
        self.backend_status = Some(ReadingStatus::Ready);
        self.result = Some(result);
    }

    /// Returns the session to the fan, clearing question, cards,
    /// opening-order state and all submission metadata. Permitted from
    /// any stage.
    pub fn reset(&mut self) {
        self.question.clear();
        self.stage = Stage::Fan;
        self.cards.clear();
        self.forced_free_opening = false;
        self.warned_expected = None;
        self.reading_id = None;
        self.backend_status = None;
        self.result = None;
        self.taking_long = false;
        self.started_at = None;
    }
}
