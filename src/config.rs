//! Runtime settings from the environment, with an optional `.env` file.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::services::EngineOptions;

pub const OUTPUT_DIR_VAR: &str = "BILLING_OUTPUT_DIR";
pub const LOG_VAR: &str = "BILLING_LOG";
pub const SAMPLE_ROWS_VAR: &str = "BILLING_SAMPLE_ROWS";
pub const HEADER_SCAN_ROWS_VAR: &str = "BILLING_HEADER_SCAN_ROWS";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    /// `EnvFilter` directive string.
    pub log_filter: String,
    pub engine: EngineOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            log_filter: "info".to_string(),
            engine: EngineOptions::default(),
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ProcessingError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProcessingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();
        if let Some(dir) = get(OUTPUT_DIR_VAR) {
            settings.output_dir = PathBuf::from(dir);
        }
        if let Some(filter) = get(LOG_VAR) {
            settings.log_filter = filter;
        }
        if let Some(raw) = get(SAMPLE_ROWS_VAR) {
            settings.engine.sample_rows = parse_positive(SAMPLE_ROWS_VAR, &raw)?;
        }
        if let Some(raw) = get(HEADER_SCAN_ROWS_VAR) {
            settings.engine.header_scan_rows = parse_positive(HEADER_SCAN_ROWS_VAR, &raw)?;
        }
        Ok(settings)
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, ProcessingError>
where
    T: FromStr + PartialOrd + Default,
{
    match raw.parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(ProcessingError::Configuration(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init_tracing(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output_dir, PathBuf::from("outputs"));
        assert_eq!(settings.engine.sample_rows, 5);
        assert_eq!(settings.engine.header_scan_rows, 10);
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_lookup(lookup(&[
            (OUTPUT_DIR_VAR, "/tmp/out"),
            (LOG_VAR, "billing_normalizer=debug"),
            (SAMPLE_ROWS_VAR, "3"),
            (HEADER_SCAN_ROWS_VAR, " 20 "),
        ]))
        .unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.log_filter, "billing_normalizer=debug");
        assert_eq!(settings.engine.sample_rows, 3);
        assert_eq!(settings.engine.header_scan_rows, 20);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Settings::from_lookup(lookup(&[(SAMPLE_ROWS_VAR, "five")])).unwrap_err();
        assert!(matches!(err, ProcessingError::Configuration(_)));
        let err = Settings::from_lookup(lookup(&[(HEADER_SCAN_ROWS_VAR, "0")])).unwrap_err();
        assert!(err.to_string().contains(HEADER_SCAN_ROWS_VAR));
    }
}
