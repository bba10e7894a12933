//! Runtime settings (environment + CLI) and the embedded UI strings.
use std::sync::LazyLock;
use std::time::Duration;

use bf_core::config::parse_yaml;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_OFFLINE_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_HEADER, ENV_API_URL, ENV_OFFLINE,
    ENV_TIMEOUT_SECS, ENV_USER_HEADER,
};

// ============================================================================
// Runtime Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the interaction-node service
    pub api_url: String,
    pub timeout: Duration,
    /// Header carrying the user id
    pub user_header: String,
    /// Use the in-process echo generator instead of HTTP
    pub offline: bool,
    pub offline_delay: Duration,
}

impl Settings {
    /// Load `.env`, then read the environment and CLI flags.
    pub fn load(args: &[String]) -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), args)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, args: &[String]) -> Self {
        let timeout_secs = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(DEFAULT_TIMEOUT_SECS);
        let offline_env = lookup(ENV_OFFLINE).is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"));

        Self {
            api_url: lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            user_header: lookup(ENV_USER_HEADER).unwrap_or_else(|| DEFAULT_USER_HEADER.to_string()),
            offline: offline_env || args.iter().any(|a| a == "--offline"),
            offline_delay: Duration::from_millis(DEFAULT_OFFLINE_DELAY_MS),
        }
    }
}

// ============================================================================
// UI Strings
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UiConfig {
    pub login: LoginStrings,
    pub placeholder: PlaceholderStrings,
    pub exchange: ExchangeStrings,
    pub status: StatusStrings,
    pub hints: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginStrings {
    pub title: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceholderStrings {
    pub title: String,
    pub hint: String,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeStrings {
    pub response_title: String,
    pub loading: String,
    pub branch_hint: String,
    pub branch_count: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusStrings {
    pub ready: String,
    pub generating: String,
    pub offline: String,
}

pub static UI: LazyLock<UiConfig> = LazyLock::new(|| parse_yaml("ui.yaml", include_str!("../yamls/ui.yaml")));
