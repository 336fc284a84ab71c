//! Authenticated session against the vulnerability-management API
//!
//! A [`Session`] only exists after a successful login. Every request it
//! sends carries the configured timeout and `X-Requested-With` header.
//! Logout happens exactly once: through [`Session::close`], or when the
//! session is dropped on an early return, an error, or a panic.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use vmignore_core::{HostSelection, IgnoreRequest, RestoreRequest};

use crate::decode::{DecodeError, EnvelopeKind};
use crate::envelope::{self, IgnoreOutcome, RestoreOutcome};

// ── Endpoints ────────────────────────────────────────────────────────────────

const SESSION_ENDPOINT: &str = "session/";
const HOST_LIST_ENDPOINT: &str = "asset/host/";
const DETECTION_ENDPOINT: &str = "asset/host/vm/detection/";
const IGNORE_VULN_ENDPOINT: &str = "ignore_vuln/index.php";

// ── Configuration ────────────────────────────────────────────────────────────

/// Request defaults applied to every call made through a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API base URL (e.g. "https://qualysapi.qg3.apps.qualys.com/api/2.0/fo")
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Value of the X-Requested-With header
    pub requested_with: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://qualysapi.qg3.apps.qualys.com/api/2.0/fo"),
            timeout: Duration::from_secs(15),
            requested_with: String::from("vmignore"),
        }
    }
}

/// Login name and password
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ── Client Errors ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("login rejected ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ClientError> for vmignore_core::Error {
    fn from(err: ClientError) -> Self {
        use vmignore_core::Error;

        match err {
            ClientError::Http(e) => Error::Transport(e.to_string()),
            ClientError::Authentication { status, message } => {
                Error::AuthenticationFailed(format!("HTTP {}: {}", status, message.trim()))
            }
            ClientError::InvalidHeader(msg) => Error::Configuration(msg),
            ClientError::Decode(DecodeError::Upstream { code, message }) => Error::Operation {
                message: format!("API error {}: {}", code, message),
            },
            ClientError::Decode(e) => Error::Parse(e.to_string()),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

/// One logged-in API session
pub struct Session {
    config: SessionConfig,
    http: Client,
    closed: bool,
}

impl Session {
    /// Log in and return a usable session.
    ///
    /// Any non-success login status is an authentication failure; no session
    /// is created and no logout is sent.
    pub fn open(config: SessionConfig, credentials: &Credentials) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        let requested_with = HeaderValue::from_str(&config.requested_with)
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
        headers.insert("X-Requested-With", requested_with);

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .cookie_store(true)
            .user_agent(format!("vmignore/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!("Logging in to {} as {}", config.base_url, credentials.username);

        let res = http
            .post(endpoint_url(&config.base_url, SESSION_ENDPOINT))
            .form(&[
                ("action", "login"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res.text().unwrap_or_default();
            return Err(ClientError::Authentication { status, message });
        }

        debug!("Login succeeded");
        Ok(Self {
            config,
            http,
            closed: false,
        })
    }

    /// POST form parameters to an endpoint and return the response body.
    ///
    /// Non-success statuses are logged but the body is still returned; the
    /// envelopes carry the error details.
    pub fn post(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, ClientError> {
        let url = endpoint_url(&self.config.base_url, endpoint);
        let action = params
            .iter()
            .find(|(k, _)| *k == "action")
            .map(|(_, v)| *v)
            .unwrap_or_default();
        debug!("POST {} action={}", url, action);

        let res = self.http.post(&url).form(params).send()?;
        let status = res.status();
        let body = res.text()?;

        if !status.is_success() {
            warn!("{} action={} returned {}", endpoint, action, status);
        }
        Ok(body)
    }

    /// Hosts matching an IP expression, without detections
    pub fn list_hosts(&self, ips: &str) -> Result<HostSelection, ClientError> {
        let body = self.post(HOST_LIST_ENDPOINT, &[("action", "list"), ("ips", ips)])?;
        Ok(envelope::host_selection(&body, EnvelopeKind::HostList)?)
    }

    /// Hosts matching an IP expression with their detections, ignored ones included
    pub fn list_detections(&self, ips: &str) -> Result<HostSelection, ClientError> {
        let body = self.post(
            DETECTION_ENDPOINT,
            &[("action", "list"), ("ips", ips), ("include_ignored", "1")],
        )?;
        Ok(envelope::host_selection(&body, EnvelopeKind::HostDetectionList)?)
    }

    /// Send one ignore request
    pub fn ignore(&self, request: &IgnoreRequest) -> Result<IgnoreOutcome, ClientError> {
        let body = self.post(IGNORE_VULN_ENDPOINT, &request.params())?;
        Ok(envelope::ignore_outcome(&body)?)
    }

    /// Send one restore request
    pub fn restore(&self, request: &RestoreRequest) -> Result<RestoreOutcome, ClientError> {
        let body = self.post(IGNORE_VULN_ENDPOINT, &request.params())?;
        Ok(envelope::restore_outcome(body))
    }

    /// Log out and release the connection pool
    pub fn close(mut self) {
        self.logout();
    }

    fn logout(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let url = endpoint_url(&self.config.base_url, SESSION_ENDPOINT);
        match self.http.post(&url).form(&[("action", "logout")]).send() {
            Ok(res) => debug!("Logout returned {}", res.status()),
            Err(e) => debug!("Logout failed: {}", e),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.logout();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url)
            .field("closed", &self.closed)
            .finish()
    }
}

fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint)
}
