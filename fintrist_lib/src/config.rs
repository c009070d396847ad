//! Runtime settings read from the environment.
//!
//! The CLI loads a `.env` file first, so everything here can also live there.

use std::time::Duration;

use chrono_tz::Tz;

use crate::alphavantage::{AlphaVantageClient, DEFAULT_BASE_URL as ALPHAVANTAGE_BASE_URL};
use crate::error::FintristError;

pub const ENV_TIINGO_KEY: &str = "APIKEY_TIINGO";
pub const ENV_TIINGO_KEY_FALLBACK: &str = "TIINGO_API_KEY";
pub const ENV_ALPHAVANTAGE_KEY: &str = "APIKEY_AV";
pub const ENV_TIMEZONE: &str = "TIMEZONE";
pub const ENV_TIINGO_BASE_URL: &str = "TIINGO_BASE_URL";
pub const ENV_ALPHAVANTAGE_BASE_URL: &str = "ALPHAVANTAGE_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "FINTRIST_TIMEOUT_SECS";

const TIINGO_KEY_VARS: &str = "APIKEY_TIINGO (or TIINGO_API_KEY)";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API keys, endpoints and display timezone.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tiingo_api_key: Option<String>,
    pub alphavantage_api_key: Option<String>,
    /// Zone used when rendering timestamps and market schedules.
    pub timezone: Tz,
    pub tiingo_base_url: String,
    pub alphavantage_base_url: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tiingo_api_key: None,
            alphavantage_api_key: None,
            timezone: Tz::UTC,
            tiingo_base_url: tiingo_api::DEFAULT_BASE_URL.to_string(),
            alphavantage_base_url: ALPHAVANTAGE_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, FintristError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FintristError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timezone = match get(ENV_TIMEZONE) {
            Some(name) => name.trim().parse::<Tz>().map_err(|_| {
                FintristError::InvalidInput(format!("unknown timezone '{}'", name))
            })?,
            None => defaults.timezone,
        };
        let timeout = get(ENV_TIMEOUT_SECS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Ok(Self {
            tiingo_api_key: get(ENV_TIINGO_KEY).or_else(|| get(ENV_TIINGO_KEY_FALLBACK)),
            alphavantage_api_key: get(ENV_ALPHAVANTAGE_KEY),
            timezone,
            tiingo_base_url: get(ENV_TIINGO_BASE_URL).unwrap_or(defaults.tiingo_base_url),
            alphavantage_base_url: get(ENV_ALPHAVANTAGE_BASE_URL)
                .unwrap_or(defaults.alphavantage_base_url),
            timeout,
        })
    }

    /// Explicit key first, then the configured one.
    pub fn resolve_tiingo_key(&self, api_key: Option<&str>) -> Result<String, FintristError> {
        api_key
            .filter(|k| !k.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.tiingo_api_key.clone())
            .ok_or(FintristError::MissingApiKey {
                provider: "Tiingo",
                env: TIINGO_KEY_VARS,
            })
    }

    pub fn resolve_alphavantage_key(
        &self,
        api_key: Option<&str>,
    ) -> Result<String, FintristError> {
        api_key
            .filter(|k| !k.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.alphavantage_api_key.clone())
            .ok_or(FintristError::MissingApiKey {
                provider: "Alpha Vantage",
                env: ENV_ALPHAVANTAGE_KEY,
            })
    }

    /// Builds a Tiingo client against the configured base URL and timeout.
    pub fn tiingo_client(&self, api_key: Option<&str>) -> Result<tiingo_api::Client, FintristError> {
        let key = self.resolve_tiingo_key(api_key)?;
        let client =
            tiingo_api::Client::with_base_url(&self.tiingo_base_url, key)?.with_timeout(self.timeout)?;
        Ok(client)
    }

    pub fn alphavantage_client(
        &self,
        api_key: Option<&str>,
    ) -> Result<AlphaVantageClient, FintristError> {
        let key = self.resolve_alphavantage_key(api_key)?;
        let client = AlphaVantageClient::with_base_url(&self.alphavantage_base_url, key)?
            .with_timeout(self.timeout)?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert!(settings.tiingo_api_key.is_none());
        assert_eq!(settings.timezone, Tz::UTC);
        assert_eq!(settings.tiingo_base_url, "https://api.tiingo.com");
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn primary_key_wins_over_fallback() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("APIKEY_TIINGO", "primary"),
            ("TIINGO_API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(settings.tiingo_api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn fallback_key_used_when_primary_blank() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("APIKEY_TIINGO", "  "),
            ("TIINGO_API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(settings.tiingo_api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn timezone_and_timeout_parsed() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TIMEZONE", "America/New_York"),
            ("FINTRIST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(settings.timezone, chrono_tz::America::New_York);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timezone_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("TIMEZONE", "Mars/Olympus")])).unwrap_err();
        assert!(matches!(err, FintristError::InvalidInput(_)));
    }

    #[test]
    fn bad_timeout_falls_back_to_default() {
        let settings =
            Settings::from_lookup(lookup_from(&[("FINTRIST_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let settings =
            Settings::from_lookup(lookup_from(&[("FINTRIST_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn explicit_key_beats_configured_key() {
        let settings = Settings {
            tiingo_api_key: Some("configured".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.resolve_tiingo_key(Some("explicit")).unwrap(), "explicit");
        assert_eq!(settings.resolve_tiingo_key(None).unwrap(), "configured");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Settings::default().resolve_tiingo_key(None).unwrap_err();
        assert!(matches!(err, FintristError::MissingApiKey { provider: "Tiingo", .. }));
        assert!(Settings::default().tiingo_client(None).is_err());
        assert!(Settings::default().alphavantage_client(None).is_err());
    }
}
