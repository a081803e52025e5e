//! Engine configuration from environment variables.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use storyteller_domain::common::parse_reference_date;

use crate::infrastructure::nominatim::{
    DEFAULT_GEOCODER_TIMEOUT_SECS, DEFAULT_GEOCODER_URL, DEFAULT_USER_AGENT,
};

pub const DEFAULT_VAULT_PATH: &str = "vault.json";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Snapshot JSON the binary renders
    pub vault_path: PathBuf,
    pub geocoder_url: String,
    pub geocoder_timeout_secs: u64,
    pub user_agent: String,
    /// Anchor for relative dates; `None` means "now"
    pub reference_date: Option<NaiveDateTime>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vault_path: PathBuf::from(DEFAULT_VAULT_PATH),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            reference_date: None,
        }
    }
}

impl EngineConfig {
    /// Reads `STORYTELLER_*` variables. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Malformed values fall back to
    /// their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let geocoder_timeout_secs = match get("STORYTELLER_GEOCODER_TIMEOUT_SECS") {
            None => defaults.geocoder_timeout_secs,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        default = defaults.geocoder_timeout_secs,
                        "Invalid STORYTELLER_GEOCODER_TIMEOUT_SECS, using default"
                    );
                    defaults.geocoder_timeout_secs
                }
            },
        };

        let reference_date = get("STORYTELLER_REFERENCE_DATE").and_then(|raw| {
            let parsed = parse_reference_date(&raw);
            if parsed.is_none() {
                tracing::warn!(
                    value = %raw,
                    "Invalid STORYTELLER_REFERENCE_DATE, using current time"
                );
            }
            parsed
        });

        Self {
            vault_path: get("STORYTELLER_VAULT")
                .map(PathBuf::from)
                .unwrap_or(defaults.vault_path),
            geocoder_url: get("STORYTELLER_GEOCODER_URL").unwrap_or(defaults.geocoder_url),
            geocoder_timeout_secs,
            user_agent: get("STORYTELLER_USER_AGENT").unwrap_or(defaults.user_agent),
            reference_date,
        }
    }
}
