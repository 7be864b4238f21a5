use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use shared::protocol::DEFAULT_PAGE_SIZE;
use toml::{Table, Value};
use tracing::warn;
use url::Url;

use crate::error::ApiError;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/products".into(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// File values first, then environment overrides. Unparsable numbers are ignored.
///
/// Numbers in the file may be written as TOML integers or quoted strings.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match raw.parse::<Table>() {
            Ok(file_cfg) => {
                if let Some(Value::String(v)) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
                if let Some(v) = file_number(&file_cfg, "page_size") {
                    settings.page_size = v;
                }
                if let Some(v) = file_number(&file_cfg, "request_timeout_secs") {
                    settings.request_timeout_secs = v;
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            }
        }
    }

    if let Some(v) = env("PRICING_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__PAGE_SIZE").and_then(|v| v.parse().ok()) {
        settings.page_size = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = v;
    }

    settings
}

fn file_number<T>(table: &Table, key: &str) -> Option<T>
where
    T: TryFrom<i64> + std::str::FromStr,
{
    match table.get(key)? {
        Value::Integer(n) => T::try_from(*n).ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(Settings::default().api_base_url);
    }

    let parsed = Url::parse(trimmed)
        .with_context(|| format!("failed to parse api base url '{trimmed}'"))
        .map_err(|err| ApiError::InvalidBaseUrl(format!("{err:#}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl(format!(
            "unsupported scheme '{}' in '{trimmed}'",
            parsed.scheme()
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
