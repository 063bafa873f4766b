use eventhub_models::{EventId, SubmitMode};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::encode::EncodedPayload;
use crate::error::{ClientError, SubmissionResult, SubmitError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Eventhub-Client/0.1";

/// Remote side of the submission workflow: one write per call, no retries.
#[allow(async_fn_in_trait)]
pub trait EventApi {
    async fn submit_event(&self, mode: &SubmitMode, payload: EncodedPayload) -> SubmissionResult;
}

/// HTTP client for the events API.
#[derive(Debug, Clone)]
pub struct EventClient {
    http: Client,
    base_url: Url,
}

impl EventClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_options(base_url, DEFAULT_TIMEOUT, USER_AGENT)
    }

    pub fn with_options(
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(format!(
                "unsupported scheme `{}`",
                parsed.scheme()
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base}/events` or `{base}/events/{id}`, with the id escaped as a
    /// single path segment.
    fn endpoint(&self, mode: &SubmitMode) -> Result<Url, SubmitError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                tracing::warn!(base_url = %self.base_url, "base URL cannot take a path");
                SubmitError::unexpected()
            })?;
            segments.pop_if_empty().push("events");
            if let SubmitMode::Update(id) = mode {
                if !id.is_routable() {
                    tracing::warn!(%id, "refusing to address an event by a non-routable id");
                    return Err(SubmitError::unexpected());
                }
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }
}

impl EventApi for EventClient {
    async fn submit_event(&self, mode: &SubmitMode, payload: EncodedPayload) -> SubmissionResult {
        let url = self.endpoint(mode)?;
        let form = payload.into_form()?;
        let request = match mode {
            SubmitMode::Create => self.http.post(url.clone()),
            SubmitMode::Update(_) => self.http.put(url.clone()),
        };

        tracing::debug!(%url, "sending event submission");
        let resp = request.multipart(form).send().await.map_err(|e| {
            tracing::warn!(%url, timeout = e.is_timeout(), "event submission failed: {e}");
            SubmitError::network()
        })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            tracing::warn!(%url, "failed to read event submission response: {e}");
            SubmitError::network()
        })?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::info!(%url, status = status.as_u16(), ?message, "event submission rejected");
            return Err(SubmitError::server(status.as_u16(), message));
        }

        created_event_id(&body).ok_or_else(|| {
            tracing::warn!(%url, status = status.as_u16(), "response carried no event id");
            SubmitError::invalid_response()
        })
    }
}

/// Pull the identifier out of `{"data": {"event": ...}}`. The event may be
/// the bare id or the full record.
pub fn created_event_id(body: &[u8]) -> Option<EventId> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let event = value.pointer("/data/event")?;
    let raw = match event {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        Value::Object(record) => record
            .get("_id")
            .or_else(|| record.get("id"))
            .and_then(|id| match id {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })?,
        _ => return None,
    };
    let id = EventId::new(raw.trim());
    id.is_routable().then_some(id)
}

/// The server's `message` field, if the body has a non-blank one.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
