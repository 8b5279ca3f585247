//! Submission and the poll loop.
//!
//! `request_reading` is the whole protocol: validate and map the spread
//! locally, ensure the reading exists remotely (at most one creation per
//! session), fire the monetization side action, then poll to a terminal
//! state under the escalation ladder. Re-invoking after a hard timeout
//! resumes polling against the stored reading id.

use std::sync::{Arc, MutexGuard};
use std::time::Duration;

use arcana_layouts::{SpreadSchema, card_code, deck_title};
use arcana_session::{
    PositionInterpretation, ReadingResult, ReadingStatus, SharedSession, SpreadCard, SpreadSession,
};
use tokio::time::{Instant, sleep};

use crate::ads::{AdGateway, AdOptions};
use crate::error::ReadingError;
use crate::service::ReadingService;
use crate::wire::{CardEntry, CreateReadingRequest, READING_KIND, ReadingView};

/// Poll cadence and escalation thresholds.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Delay between status fetches.
    pub interval: Duration,
    /// Elapsed time after which the long-wait hint is raised. Polling
    /// continues.
    pub long_wait: Duration,
    /// Elapsed time after which the loop gives up with a recoverable
    /// timeout.
    pub hard_timeout: Duration,
}

impl PollPolicy {
    /// Production thresholds.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            interval: Duration::from_secs(2),
            long_wait: Duration::from_secs(15),
            hard_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::production()
    }
}

/// Ad placement reported for the reading-wait side action.
const AD_PLACEMENT: &str = "reading_wait";

fn lock(session: &SharedSession) -> Result<MutexGuard<'_, SpreadSession>, ReadingError> {
    session
        .lock()
        .map_err(|e| ReadingError::Infrastructure(format!("session mutex poisoned: {e}")))
}

/// Normalizes a locale tag: trimmed, lowercased, underscores flattened
/// to hyphens, empty falling back to `en`.
fn normalize_locale(locale: &str) -> String {
    let normalized = locale.trim().to_lowercase().replace('_', "-");
    if normalized.is_empty() {
        "en".to_owned()
    } else {
        normalized
    }
}

/// Builds the create-reading submission from a drawn spread.
///
/// # Errors
///
/// Returns `ReadingError::Validation` when no cards are drawn or the
/// question is blank, and `ReadingError::UnknownCard` when any card name
/// has no code mapping. All of these fire before any network traffic.
pub fn build_request(
    schema: &SpreadSchema,
    question: &str,
    cards: &[SpreadCard],
    locale: &str,
) -> Result<CreateReadingRequest, ReadingError> {
    if cards.is_empty() {
        return Err(ReadingError::Validation(
            "spread has no drawn cards".to_owned(),
        ));
    }
    let question = question.trim();
    if question.is_empty() {
        return Err(ReadingError::Validation(
            "question must not be empty".to_owned(),
        ));
    }

    let entries = cards
        .iter()
        .map(|card| {
            let code = card_code(&card.card_name)
                .ok_or_else(|| ReadingError::UnknownCard(card.card_name.clone()))?;
            let label = schema
                .positions
                .iter()
                .find(|position| position.position_id == card.position_id)
                .map(|position| position.label.clone())
                .unwrap_or_default();
            Ok(CardEntry {
                position_index: card.position_id,
                card_code: code.to_owned(),
                reversed: card.reversed,
                position_label: label,
                card_name: card.card_name.clone(),
            })
        })
        .collect::<Result<Vec<CardEntry>, ReadingError>>()?;

    Ok(CreateReadingRequest {
        kind: READING_KIND.to_owned(),
        spread_id: schema.id.clone(),
        spread_title: schema.title.clone(),
        deck_id: schema.deck_type.clone(),
        deck_title: deck_title(&schema.deck_type).to_owned(),
        question: question.to_owned(),
        locale: normalize_locale(locale),
        cards: entries,
    })
}

fn assemble_result(view: ReadingView, energy_spent: Option<i64>) -> ReadingResult {
    ReadingResult {
        summary: view.output_payload.summary,
        generated_at: view.output_payload.generated_at,
        positions: view
            .output_payload
            .positions
            .into_iter()
            .map(|position| PositionInterpretation {
                position_index: position.position_index,
                title: position.title,
                short_text: position.short_text,
                full_text: position.full_text,
            })
            .collect(),
        balance: view.balance,
        energy_spent,
    }
}

/// Fires the monetization side action for this submission attempt. Best
/// effort by contract: the outcome is logged and dropped.
fn spawn_ad_side_action(ads: &Arc<dyn AdGateway>) {
    let ads = Arc::clone(ads);
    tokio::spawn(async move {
        let options = AdOptions {
            placement: AD_PLACEMENT.to_owned(),
        };
        let outcome = ads.show(&options).await;
        if outcome.ok {
            tracing::debug!("reading-wait ad completed");
        } else {
            tracing::debug!(failure = ?outcome.failure, "reading-wait ad skipped");
        }
    });
}

/// Submits the session's spread and polls the reading to completion.
///
/// Creation is idempotent per session: when a reading id is already
/// linked the creation step is skipped and polling resumes against it.
/// Every poll iteration republishes the backend status into the session.
///
/// # Errors
///
/// Local validation errors (`Validation`, `UnknownCard`) fire before any
/// network call. `Server` carries a backend-reported failure verbatim,
/// `Transport` a connectivity failure, and `StillPreparing` the
/// recoverable hard timeout.
pub async fn request_reading(
    session: &SharedSession,
    service: &dyn ReadingService,
    ads: &Arc<dyn AdGateway>,
    policy: &PollPolicy,
    locale: &str,
) -> Result<ReadingResult, ReadingError> {
    // Step 1: ensure the reading exists, creating it at most once.
    let existing = lock(session)?.reading_id().map(str::to_owned);
    let reading_id = if let Some(id) = existing {
        tracing::debug!(reading_id = %id, "resuming poll for linked reading");
        id
    } else {
        let request = {
            let guard = lock(session)?;
            build_request(guard.schema(), guard.question(), guard.cards(), locale)?
        };
        let response = service.create_reading(&request).await?;
        lock(session)?.link_reading(response.id.clone(), response.status);
        tracing::info!(reading_id = %response.id, spread = %request.spread_id, "reading created");
        response.id
    };

    // Step 2: the best-effort monetization side action, once per attempt.
    spawn_ad_side_action(ads);

    // Step 3: poll under the escalation ladder.
    let started = Instant::now();
    let mut flagged_long_wait = false;
    loop {
        let snapshot = service.get_reading(&reading_id).await?;
        lock(session)?.set_backend_status(snapshot.status);

        match snapshot.status {
            ReadingStatus::Ready if snapshot.has_output() => {
                let view = service.view_reading(&reading_id).await?;
                let result = assemble_result(view, snapshot.energy_spent);
                {
                    let mut guard = lock(session)?;
                    guard.set_taking_long(false);
                    guard.set_result(result.clone());
                }
                tracing::info!(reading_id = %reading_id, "reading ready");
                return Ok(result);
            }
            ReadingStatus::Error => {
                let message = snapshot
                    .error
                    .unwrap_or_else(|| "the reading could not be prepared".to_owned());
                tracing::warn!(reading_id = %reading_id, %message, "reading failed");
                return Err(ReadingError::Server(message));
            }
            // Ready without output is treated as still in flight.
            _ => {}
        }

        if started.elapsed() >= policy.hard_timeout {
            tracing::warn!(reading_id = %reading_id, "poll hard timeout; reading id kept");
            return Err(ReadingError::StillPreparing);
        }
        if !flagged_long_wait && started.elapsed() >= policy.long_wait {
            flagged_long_wait = true;
            lock(session)?.set_taking_long(true);
            tracing::debug!(reading_id = %reading_id, "reading is taking longer than usual");
        }

        sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use arcana_layouts::schema_by_id;
    use arcana_layouts::shuffled_deck;
    use arcana_session::{SpreadSession, shared};
    use arcana_test_support::{FixedClock, MockRng};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::ads::AdOutcome;
    use crate::wire::{CreateReadingResponse, OutputPayload, PositionPayload, ReadingSnapshot};

    fn snapshot(status: ReadingStatus, with_output: bool, error: Option<&str>) -> ReadingSnapshot {
        ReadingSnapshot {
            id: "rd-1".to_owned(),
            status,
            output_payload: with_output.then(|| serde_json::json!({"summary": "calm seas"})),
            summary_text: None,
            energy_spent: with_output.then_some(5),
            error: error.map(str::to_owned),
        }
    }

    fn ready_view() -> ReadingView {
        ReadingView {
            output_payload: OutputPayload {
                summary: "calm seas".to_owned(),
                generated_at: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
                positions: vec![PositionPayload {
                    position_index: 1,
                    title: "Past".to_owned(),
                    short_text: "short".to_owned(),
                    full_text: "full".to_owned(),
                }],
            },
            balance: Some(42),
        }
    }

    struct ScriptedService {
        create_calls: AtomicUsize,
        snapshots: Mutex<VecDeque<ReadingSnapshot>>,
        view: ReadingView,
    }

    impl ScriptedService {
        fn new(snapshots: Vec<ReadingSnapshot>) -> Self {
            Self {
                create_calls: AtomicUsize::new(0),
                snapshots: Mutex::new(snapshots.into()),
                view: ready_view(),
            }
        }

        fn create_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadingService for ScriptedService {
        async fn create_reading(
            &self,
            _request: &CreateReadingRequest,
        ) -> Result<CreateReadingResponse, ReadingError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(CreateReadingResponse {
                id: "rd-1".to_owned(),
                status: ReadingStatus::Pending,
            })
        }

        async fn get_reading(&self, _reading_id: &str) -> Result<ReadingSnapshot, ReadingError> {
            // An exhausted script keeps reporting processing, which is
            // what the timeout tests rely on.
            Ok(self
                .snapshots
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| snapshot(ReadingStatus::Processing, false, None)))
        }

        async fn view_reading(&self, _reading_id: &str) -> Result<ReadingView, ReadingError> {
            Ok(self.view.clone())
        }
    }

    #[derive(Default)]
    struct RecordingAds {
        shows: AtomicUsize,
    }

    #[async_trait]
    impl AdGateway for RecordingAds {
        async fn preload(&self, _options: &AdOptions) {}

        async fn show(&self, _options: &AdOptions) -> AdOutcome {
            self.shows.fetch_add(1, Ordering::SeqCst);
            AdOutcome {
                ok: true,
                payload: None,
                failure: None,
            }
        }
    }

    fn started_session() -> SharedSession {
        let schema = schema_by_id("three_card").clone();
        let mut rng = MockRng;
        let deck = shuffled_deck(&schema.deck_type, &mut rng);
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap());
        let mut session = SpreadSession::new(Uuid::new_v4(), schema);
        session.start("Will it work?", &deck, &clock, &mut rng).unwrap();
        shared(session)
    }

    fn recording_ads() -> (std::sync::Arc<RecordingAds>, Arc<dyn AdGateway>) {
        let concrete = std::sync::Arc::new(RecordingAds::default());
        let gateway: Arc<dyn AdGateway> = concrete.clone();
        (concrete, gateway)
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_is_idempotent_across_invocations() {
        let session = started_session();
        let service = ScriptedService::new(vec![
            snapshot(ReadingStatus::Ready, true, None),
            snapshot(ReadingStatus::Ready, true, None),
        ]);
        let (_, ads) = recording_ads();
        let policy = PollPolicy::production();

        let first = request_reading(&session, &service, &ads, &policy, "en").await;
        assert!(first.is_ok());
        assert_eq!(service.create_calls(), 1);
        assert_eq!(session.lock().unwrap().reading_id(), Some("rd-1"));

        let second = request_reading(&session, &service, &ads, &policy, "en").await;
        assert!(second.is_ok());
        assert_eq!(service.create_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out_recoverably_when_never_ready() {
        let session = started_session();
        let service = ScriptedService::new(vec![]);
        let (_, ads) = recording_ads();
        let policy = PollPolicy::production();

        let result = request_reading(&session, &service, &ads, &policy, "en").await;

        assert_eq!(result.unwrap_err(), ReadingError::StillPreparing);
        let guard = session.lock().unwrap();
        assert_eq!(guard.backend_status(), Some(ReadingStatus::Processing));
        assert!(guard.taking_long());
        assert_eq!(guard.reading_id(), Some("rd-1"));
        assert!(guard.result().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_is_passed_through() {
        let session = started_session();
        let service = ScriptedService::new(vec![
            snapshot(ReadingStatus::Processing, false, None),
            snapshot(ReadingStatus::Error, false, Some("the spirits are silent")),
        ]);
        let (_, ads) = recording_ads();

        let result =
            request_reading(&session, &service, &ads, &PollPolicy::production(), "en").await;

        assert_eq!(
            result.unwrap_err(),
            ReadingError::Server("the spirits are silent".to_owned())
        );
        assert_eq!(
            session.lock().unwrap().backend_status(),
            Some(ReadingStatus::Error)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_without_output_keeps_polling() {
        let session = started_session();
        let service = ScriptedService::new(vec![
            snapshot(ReadingStatus::Ready, false, None),
            snapshot(ReadingStatus::Ready, true, None),
        ]);
        let (_, ads) = recording_ads();

        let result =
            request_reading(&session, &service, &ads, &PollPolicy::production(), "en").await;

        let result = result.unwrap();
        assert_eq!(result.summary, "calm seas");
        assert_eq!(result.balance, Some(42));
        assert_eq!(result.energy_spent, Some(5));
        let guard = session.lock().unwrap();
        assert_eq!(guard.result(), Some(&result));
        assert_eq!(guard.backend_status(), Some(ReadingStatus::Ready));
    }

    #[tokio::test(start_paused = true)]
    async fn test_undrawn_session_fails_before_any_network_call() {
        let schema = schema_by_id("three_card").clone();
        let session = shared(SpreadSession::new(Uuid::new_v4(), schema));
        let service = ScriptedService::new(vec![]);
        let (_, ads) = recording_ads();

        let result =
            request_reading(&session, &service, &ads, &PollPolicy::production(), "en").await;

        assert!(matches!(result.unwrap_err(), ReadingError::Validation(_)));
        assert_eq!(service.create_calls(), 0);
        assert!(session.lock().unwrap().reading_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ad_side_action_fires_once_per_attempt() {
        let session = started_session();
        let service = ScriptedService::new(vec![
            snapshot(ReadingStatus::Ready, true, None),
            snapshot(ReadingStatus::Ready, true, None),
        ]);
        let (ads_counter, ads) = recording_ads();
        let policy = PollPolicy::production();

        request_reading(&session, &service, &ads, &policy, "en")
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert_eq!(ads_counter.shows.load(Ordering::SeqCst), 1);

        request_reading(&session, &service, &ads, &policy, "en")
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert_eq!(ads_counter.shows.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_build_request_maps_cards_labels_and_locale() {
        let schema = schema_by_id("three_card");
        let cards = vec![
            SpreadCard {
                position_id: 1,
                card_name: "The Fool".to_owned(),
                reversed: true,
                is_open: true,
            },
            SpreadCard {
                position_id: 2,
                card_name: "Death".to_owned(),
                reversed: false,
                is_open: true,
            },
            SpreadCard {
                position_id: 3,
                card_name: "The Sun".to_owned(),
                reversed: false,
                is_open: true,
            },
        ];

        let request = build_request(schema, "  What next?  ", &cards, "EN_us").unwrap();

        assert_eq!(request.kind, "spread");
        assert_eq!(request.spread_id, "three_card");
        assert_eq!(request.deck_id, "rider_waite");
        assert_eq!(request.deck_title, "Rider-Waite Tarot");
        assert_eq!(request.question, "What next?");
        assert_eq!(request.locale, "en-us");
        assert_eq!(request.cards.len(), 3);
        assert_eq!(request.cards[0].card_code, "ar00");
        assert!(request.cards[0].reversed);
        assert_eq!(request.cards[0].position_label, "Past");
        assert_eq!(request.cards[1].card_code, "ar13");
        assert_eq!(request.cards[2].position_label, "Future");
    }

    #[test]
    fn test_build_request_fails_closed_on_unknown_card_name() {
        let schema = schema_by_id("card_of_day");
        let cards = vec![SpreadCard {
            position_id: 1,
            card_name: "The Ferryman".to_owned(),
            reversed: false,
            is_open: true,
        }];

        let err = build_request(schema, "Q", &cards, "en").unwrap_err();

        assert_eq!(err, ReadingError::UnknownCard("The Ferryman".to_owned()));
    }

    #[test]
    fn test_blank_question_is_a_local_validation_failure() {
        let schema = schema_by_id("card_of_day");
        let cards = vec![SpreadCard {
            position_id: 1,
            card_name: "The Fool".to_owned(),
            reversed: false,
            is_open: false,
        }];

        let err = build_request(schema, "   ", &cards, "en").unwrap_err();

        assert!(matches!(err, ReadingError::Validation(_)));
    }
}
