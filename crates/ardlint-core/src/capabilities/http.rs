//! HTTP capability.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Largest body accepted by [`Http::fetch`].
const MAX_BODY_BYTES: u64 = 128 * 1024 * 1024;

/// HTTP failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The request could not be made.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: HttpStatus,
    },

    /// The response body could not be read.
    #[error("Failed to read response from {url}: {message}")]
    Body {
        /// Requested URL.
        url: String,
        /// Read error message.
        message: String,
    },
}

/// A response status code with its reason phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatus {
    /// Numeric status code.
    pub code: u16,
    /// Canonical reason phrase, possibly empty.
    pub reason: String,
}

impl HttpStatus {
    /// Creates a status with the given code and reason.
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Returns true for `200 OK`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == 200
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.reason)
        }
    }
}

fn canonical_reason(code: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or_default()
}

/// Outbound HTTP, one attempt per call.
pub trait Http: Send + Sync {
    /// Issues a GET and returns the status without reading the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails before a status is received.
    fn get(&self, url: &str) -> Result<HttpStatus, HttpError>;

    /// Issues a GET and returns the body of a `200 OK` response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or unreadable body.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, HttpError>;
}

/// [`Http`] backed by a blocking `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqHttp {
    agent: ureq::Agent,
}

impl UreqHttp {
    /// Creates a client whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Http for UreqHttp {
    fn get(&self, url: &str) -> Result<HttpStatus, HttpError> {
        trace!("GET {}", url);
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        let code = response.status().as_u16();
        Ok(HttpStatus::new(code, canonical_reason(code)))
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        trace!("Fetching {}", url);
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let code = response.status().as_u16();
        if code != 200 {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: HttpStatus::new(code, canonical_reason(code)),
            });
        }

        let mut body = response.into_body();
        body.with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
            .map_err(|e| HttpError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

/// [`Http`] answering from a fixed table; unknown URLs fail with a transport error.
///
/// Records every requested URL.
#[derive(Debug, Default)]
pub struct FakeHttp {
    statuses: HashMap<String, u16>,
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeHttp {
    /// Creates an empty fake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers GETs of `url` with `status`.
    #[must_use]
    pub fn status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(url.into(), status);
        self
    }

    /// Answers fetches of `url` with `body` and status 200.
    #[must_use]
    pub fn body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let url = url.into();
        self.statuses.insert(url.clone(), 200);
        self.bodies.insert(url, body.into());
        self
    }

    /// URLs requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, url: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
    }
}

impl Http for FakeHttp {
    fn get(&self, url: &str) -> Result<HttpStatus, HttpError> {
        self.record(url);
        self.statuses
            .get(url)
            .map(|code| HttpStatus::new(*code, canonical_reason(*code)))
            .ok_or_else(|| HttpError::Transport(format!("no route to {url}")))
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let status = self.get(url)?;
        match self.bodies.get(url) {
            Some(body) if status.is_ok() => Ok(body.clone()),
            _ => Err(HttpError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        assert_eq!(HttpStatus::new(404, "Not Found").to_string(), "404 Not Found");
        assert_eq!(HttpStatus::new(599, "").to_string(), "599");
    }

    #[test]
    fn fake_answers_from_table() {
        let http = FakeHttp::new()
            .status("https://example.com/dead", 404)
            .body("https://example.com/index.json", b"{}".to_vec());

        assert_eq!(
            http.get("https://example.com/dead").unwrap().to_string(),
            "404 Not Found"
        );
        assert_eq!(http.fetch("https://example.com/index.json").unwrap(), b"{}");
        assert!(http.fetch("https://example.com/dead").is_err());
        assert!(matches!(
            http.get("https://unknown.invalid"),
            Err(HttpError::Transport(_))
        ));
        assert_eq!(http.requests().len(), 4);
    }
}
