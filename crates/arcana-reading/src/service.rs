//! The interpretation service contract and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::ReadingError;
use crate::wire::{CreateReadingRequest, CreateReadingResponse, ReadingSnapshot, ReadingView};

/// Remote interpretation service.
#[async_trait]
pub trait ReadingService: Send + Sync {
    /// Creates a reading from a submitted spread.
    async fn create_reading(
        &self,
        request: &CreateReadingRequest,
    ) -> Result<CreateReadingResponse, ReadingError>;

    /// Fetches the status snapshot of a reading.
    async fn get_reading(&self, reading_id: &str) -> Result<ReadingSnapshot, ReadingError>;

    /// Fetches the full view of a ready reading.
    async fn view_reading(&self, reading_id: &str) -> Result<ReadingView, ReadingError>;
}

/// HTTP client for the interpretation service.
#[derive(Debug, Clone)]
pub struct HttpReadingService {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpReadingService {
    /// Creates a client for the service at `base_url` (no trailing
    /// slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Adds a bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, ReadingError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| ReadingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ReadingError::Server(format!("malformed response body: {e}")))
    }
}

/// Maps a non-success HTTP response onto the reading error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> ReadingError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message"]
                .iter()
                .find_map(|key| value[*key].as_str().map(str::to_owned))
        })
        .unwrap_or_else(|| format!("status {status}"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ReadingError::InvalidSession(message),
        StatusCode::PAYMENT_REQUIRED => ReadingError::InsufficientEnergy(message),
        _ => ReadingError::Server(message),
    }
}

#[async_trait]
impl ReadingService for HttpReadingService {
    async fn create_reading(
        &self,
        request: &CreateReadingRequest,
    ) -> Result<CreateReadingResponse, ReadingError> {
        let url = format!("{}/readings", self.base_url);
        self.execute(self.client.post(url).json(request)).await
    }

    async fn get_reading(&self, reading_id: &str) -> Result<ReadingSnapshot, ReadingError> {
        let url = format!("{}/readings/{reading_id}", self.base_url);
        self.execute(self.client.get(url)).await
    }

    async fn view_reading(&self, reading_id: &str) -> Result<ReadingView, ReadingError> {
        let url = format!("{}/readings/{reading_id}/view", self.base_url);
        self.execute(self.client.get(url)).await
    }
}
