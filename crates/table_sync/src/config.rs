use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::{
    domain::UpdateTarget,
    protocol::{
        DEFAULT_CONTROLS_REGION, DEFAULT_PARTIAL_PARAM, DEFAULT_PARTIAL_VALUE,
        DEFAULT_QUERY_PARAM, DEFAULT_RESULTS_REGION,
    },
};

use crate::fetcher::PartialMarker;

pub const SETTINGS_FILE: &str = "tablesync.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub results_region: String,
    pub controls_region: String,
    pub partial_param: String,
    pub partial_value: String,
    pub query_param: String,
    pub search_debounce_ms: u64,
    pub search_min_chars: usize,
    pub fallback_retries: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            results_region: DEFAULT_RESULTS_REGION.into(),
            controls_region: DEFAULT_CONTROLS_REGION.into(),
            partial_param: DEFAULT_PARTIAL_PARAM.into(),
            partial_value: DEFAULT_PARTIAL_VALUE.into(),
            query_param: DEFAULT_QUERY_PARAM.into(),
            search_debounce_ms: 700,
            search_min_chars: 2,
            fallback_retries: 0,
        }
    }
}

impl SyncSettings {
    pub fn update_target(&self) -> UpdateTarget {
        UpdateTarget::new(self.results_region.clone(), self.controls_region.clone())
    }

    pub fn marker(&self) -> PartialMarker {
        PartialMarker {
            param: self.partial_param.clone(),
            value: self.partial_value.clone(),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Defaults, then `tablesync.toml` in the working directory, then the environment.
pub fn load_settings() -> anyhow::Result<SyncSettings> {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<SyncSettings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => SyncSettings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<SyncSettings> {
    Ok(toml::from_str(raw)?)
}

/// Unparseable numeric overrides are ignored.
pub fn apply_env_overrides(settings: &mut SyncSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("TABLESYNC_RESULTS_REGION") {
        settings.results_region = v;
    }
    if let Some(v) = lookup("TABLESYNC_CONTROLS_REGION") {
        settings.controls_region = v;
    }
    if let Some(v) = lookup("TABLESYNC_PARTIAL_PARAM") {
        settings.partial_param = v;
    }
    if let Some(v) = lookup("TABLESYNC_PARTIAL_VALUE") {
        settings.partial_value = v;
    }
    if let Some(v) = lookup("TABLESYNC_QUERY_PARAM") {
        settings.query_param = v;
    }
    if let Some(v) = lookup("TABLESYNC_SEARCH_DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse() {
            settings.search_debounce_ms = parsed;
        }
    }
    if let Some(v) = lookup("TABLESYNC_SEARCH_MIN_CHARS") {
        if let Ok(parsed) = v.parse() {
            settings.search_min_chars = parsed;
        }
    }
    if let Some(v) = lookup("TABLESYNC_FALLBACK_RETRIES") {
        if let Ok(parsed) = v.parse() {
            settings.fallback_retries = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
