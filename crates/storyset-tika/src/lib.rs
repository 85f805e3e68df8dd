//! Apache Tika server backend.
//!
//! Sends each file to a running Tika server (`PUT /rmeta/text`) and reads the
//! extracted text from the `X-TIKA:content` field of the first metadata
//! object. A missing or blank content field is reported as
//! [`BackendError::NoContent`] so the caller can skip the file.
//!
//! Requests are bounded by a per-request timeout; connection failures,
//! timeouts and 5xx responses are retried with a linear backoff.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::{Map, Value};

use storyset_core::{BackendError, TextBackend};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9998";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const CONTENT_KEY: &str = "X-TIKA:content";

/// Parse the JSON array returned by `/rmeta/text` into its text content.
///
/// The first element describes the container document; embedded resources
/// follow it and are ignored. Yields `None` when there is no string content.
pub fn parse_rmeta_response(body: &str) -> Result<Option<String>, BackendError> {
    let objects: Vec<Map<String, Value>> = serde_json::from_str(body)
        .map_err(|e| BackendError::ExtractionError(format!("invalid Tika response: {}", e)))?;

    let content = objects
        .into_iter()
        .next()
        .and_then(|mut first| match first.remove(CONTENT_KEY) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        });
    Ok(content)
}

/// Text backend backed by a remote Tika server.
pub struct TikaBackend {
    /// Base URL of the Tika server (e.g., "http://localhost:9998")
    endpoint: String,
    client: Client,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl TikaBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(500),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), route)
    }

    /// Check if the Tika server is reachable. Returns Ok(()) if reachable, Err with message otherwise.
    pub fn check_connectivity(&self) -> Result<(), String> {
        match self
            .client
            .get(self.url("tika"))
            .timeout(Duration::from_secs(3))
            .send()
        {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(format!("Tika returned HTTP {}", resp.status())),
            Err(e) if e.is_connect() => Err(format!(
                "Cannot connect to Tika at {} - is the server running?",
                self.endpoint
            )),
            Err(e) if e.is_timeout() => Err(format!("Tika at {} timed out", self.endpoint)),
            Err(e) => Err(format!("Tika error: {}", e)),
        }
    }

    /// Send `bytes` to the server once.
    fn request_once(&self, bytes: Vec<u8>) -> Result<Option<String>, Attempt> {
        let resp = self
            .client
            .put(self.url("rmeta/text"))
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .body(bytes)
            .send()
            .map_err(|e| Attempt::Retry(BackendError::Http(e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            let err = BackendError::Remote {
                status: status.as_u16(),
                message: message.trim().chars().take(200).collect(),
            };
            return Err(if status.is_server_error() {
                Attempt::Retry(err)
            } else {
                Attempt::Fatal(err)
            });
        }

        let body = resp
            .text()
            .map_err(|e| Attempt::Retry(BackendError::Http(e.to_string())))?;
        parse_rmeta_response(&body).map_err(Attempt::Fatal)
    }

    /// Send a file to the server and return its text content, retrying
    /// transient failures.
    pub fn parse_file(&self, path: &Path) -> Result<Option<String>, BackendError> {
        let bytes = std::fs::read(path)?;

        let mut attempt = 0;
        loop {
            match self.request_once(bytes.clone()) {
                Ok(content) => return Ok(content),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(e)) if attempt >= self.max_retries => return Err(e),
                Err(Attempt::Retry(e)) => {
                    attempt += 1;
                    tracing::debug!(
                        path = %path.display(),
                        attempt,
                        error = %e,
                        "Tika request failed, retrying"
                    );
                    std::thread::sleep(self.retry_backoff * attempt);
                }
            }
        }
    }
}

enum Attempt {
    Retry(BackendError),
    Fatal(BackendError),
}

impl TextBackend for TikaBackend {
    fn name(&self) -> &str {
        "tika"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        match self.parse_file(path)? {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(BackendError::NoContent),
        }
    }
}
