//! Process configuration read from the environment
//!
//! Everything here is read at startup. The API key is the exception: only the
//! names of the variables to consult are kept, and the value is looked up on
//! the first chat request.

use crate::llm::{Credential, DEFAULT_MODEL};
use std::path::PathBuf;
use std::time::Duration;

/// Variables consulted for the API key, in order
pub const CREDENTIAL_VARS: [&str; 3] = ["FOLIO_API_KEY", "GEMINI_API_KEY", "API_KEY"];

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Portfolio JSON to serve instead of the bundled one
    pub content_path: Option<PathBuf>,
    pub model: String,
    /// Gateway base URL (e.g., `http://169.254.169.254/gateway/llm`)
    pub gateway: Option<String>,
    /// How long an abandoned session is kept before it is reclaimed
    pub session_idle: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("FOLIO_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid FOLIO_PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let idle_secs = match var("FOLIO_SESSION_IDLE_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value = %raw, "Invalid FOLIO_SESSION_IDLE_SECS, using default");
                    DEFAULT_SESSION_IDLE_SECS
                }
            },
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        Self {
            port,
            content_path: var("FOLIO_CONTENT_PATH").map(PathBuf::from),
            model: var("FOLIO_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gateway: var("LLM_GATEWAY"),
            session_idle: Duration::from_secs(idle_secs),
        }
    }

    /// How the completion service authenticates.
    ///
    /// A gateway injects its own credentials; otherwise the key comes from
    /// the first non-empty variable in `CREDENTIAL_VARS`.
    pub fn credential(&self) -> Credential {
        if self.gateway.is_some() {
            Credential::Implicit
        } else {
            Credential::Env(CREDENTIAL_VARS.iter().map(ToString::to_string).collect())
        }
    }
}
