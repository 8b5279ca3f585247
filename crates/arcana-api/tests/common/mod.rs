//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arcana_core::clock::Clock;
use arcana_core::rng::DeterministicRng;
use arcana_reading::wire::{
    CreateReadingRequest, CreateReadingResponse, OutputPayload, PositionPayload, ReadingSnapshot,
    ReadingView,
};
use arcana_reading::{AdGateway, AdOptions, AdOutcome, PollPolicy, ReadingError, ReadingService};
use arcana_session::ReadingStatus;
use arcana_test_support::{FixedClock, MockRng};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use arcana_api::routes;
use arcana_api::state::AppState;
use arcana_timeline::TimelinePacing;

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
    ))
}

fn ready_snapshot() -> ReadingSnapshot {
    ReadingSnapshot {
        id: "rd-1".to_owned(),
        status: ReadingStatus::Ready,
        output_payload: Some(serde_json::json!({"summary": "calm seas"})),
        summary_text: None,
        energy_spent: Some(5),
        error: None,
    }
}

fn processing_snapshot() -> ReadingSnapshot {
    ReadingSnapshot {
        id: "rd-1".to_owned(),
        status: ReadingStatus::Processing,
        output_payload: None,
        summary_text: None,
        energy_spent: None,
        error: None,
    }
}

fn error_snapshot(message: &str) -> ReadingSnapshot {
    ReadingSnapshot {
        id: "rd-1".to_owned(),
        status: ReadingStatus::Error,
        output_payload: None,
        summary_text: None,
        energy_spent: None,
        error: Some(message.to_owned()),
    }
}

/// Interpretation service fake driven by a snapshot script. When the
/// script runs dry, the fallback snapshot is repeated forever.
pub struct ScriptedReadingService {
    create_calls: AtomicUsize,
    create_failure: Mutex<Option<ReadingError>>,
    script: Mutex<VecDeque<ReadingSnapshot>>,
    fallback: Mutex<ReadingSnapshot>,
}

impl ScriptedReadingService {
    fn with(
        script: Vec<ReadingSnapshot>,
        fallback: ReadingSnapshot,
        create_failure: Option<ReadingError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            create_calls: AtomicUsize::new(0),
            create_failure: Mutex::new(create_failure),
            script: Mutex::new(script.into()),
            fallback: Mutex::new(fallback),
        })
    }

    /// Immediately ready on the first poll.
    pub fn ready() -> Arc<Self> {
        Self::with(vec![], ready_snapshot(), None)
    }

    /// Processing for `polls` fetches, ready afterwards.
    pub fn ready_after(polls: usize) -> Arc<Self> {
        Self::with(
            (0..polls).map(|_| processing_snapshot()).collect(),
            ready_snapshot(),
            None,
        )
    }

    /// Processing forever; drives the hard-timeout path.
    pub fn never_ready() -> Arc<Self> {
        Self::with(vec![], processing_snapshot(), None)
    }

    /// Reports a server-side reading failure.
    pub fn erroring(message: &str) -> Arc<Self> {
        Self::with(vec![], error_snapshot(message), None)
    }

    /// Fails the create call with the given error.
    pub fn failing_create(err: ReadingError) -> Arc<Self> {
        Self::with(vec![], processing_snapshot(), Some(err))
    }

    /// Flips the fallback to ready; used to resume after a timeout.
    pub fn make_ready(&self) {
        *self.fallback.lock().unwrap() = ready_snapshot();
    }

    /// Number of create-reading calls observed.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadingService for ScriptedReadingService {
    async fn create_reading(
        &self,
        _request: &CreateReadingRequest,
    ) -> Result<CreateReadingResponse, ReadingError> {
        if let Some(err) = self.create_failure.lock().unwrap().clone() {
            return Err(err);
        }
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CreateReadingResponse {
            id: "rd-1".to_owned(),
            status: ReadingStatus::Pending,
        })
    }

    async fn get_reading(&self, _reading_id: &str) -> Result<ReadingSnapshot, ReadingError> {
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone()))
    }

    async fn view_reading(&self, _reading_id: &str) -> Result<ReadingView, ReadingError> {
        Ok(ReadingView {
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
        })
    }
}

/// Ad gateway fake recording every call.
#[derive(Default)]
pub struct RecordingAdGateway {
    pub preloads: AtomicUsize,
    pub shows: AtomicUsize,
}

#[async_trait]
impl AdGateway for RecordingAdGateway {
    async fn preload(&self, _options: &AdOptions) {
        self.preloads.fetch_add(1, Ordering::SeqCst);
    }

    async fn show(&self, _options: &AdOptions) -> AdOutcome {
        self.shows.fetch_add(1, Ordering::SeqCst);
        AdOutcome {
            ok: true,
            payload: None,
            failure: None,
        }
    }
}

/// Build the full app router with deterministic clock/RNG, the scripted
/// reading service and fast test pacing. Uses the same route structure
/// as `main.rs`.
pub fn build_test_app(
    service: Arc<ScriptedReadingService>,
    ads: Arc<RecordingAdGateway>,
) -> Router {
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
    let app_state = AppState::new(fixed_clock(), rng, service, ads)
        .with_pacing(TimelinePacing::uniform(Duration::from_millis(10)))
        .with_poll_policy(PollPolicy::production());

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/layouts", routes::layouts::router())
        .nest(
            "/api/v1/sessions",
            routes::sessions::router().merge(routes::readings::router()),
        )
        .with_state(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a DELETE request and return the status code.
pub async fn delete(app: Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap().status()
}
