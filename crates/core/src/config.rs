use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Key lookup with an optional profile: tries {PROFILE}_{KEY} first, falls
/// back to {KEY}. Values come from `lookup` (the process env outside tests).
struct Profiled<'a, F> {
    profile: &'a str,
    lookup: F,
}

impl<F> Profiled<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn prefixed(&self, key: &str) -> Option<String> {
        if self.profile.is_empty() {
            None
        } else {
            (self.lookup)(&format!("{}_{}", self.profile, key))
        }
    }

    /// First non-empty value.
    fn opt(&self, key: &str) -> Option<String> {
        non_empty(self.prefixed(key)).or_else(|| non_empty((self.lookup)(key)))
    }

    /// First value that is set at all, empty included.
    fn set(&self, key: &str) -> Option<String> {
        self.prefixed(key).or_else(|| (self.lookup)(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn u64(&self, key: &str, default: u64) -> u64 {
        self.opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.opt(key).ok_or(ConfigError::Missing(key))
    }
}

pub const ENDPOINT_KEY: &str = "WRHS_NEXT_ENDPOINT";
pub const USERNAME_KEY: &str = "WRHS_NEXT_USERNAME";
pub const PASSWORD_KEY: &str = "WRHS_NEXT_PASSWORD";

/// Namespace prefix tried when an unprefixed package name is not found.
pub const DEFAULT_NAME_PREFIX: &str = "@ux/";

/// Message fragments that mark an upstream failure as "not found".
pub const DEFAULT_NOT_FOUND_PATTERNS: &[&str] = &["not found", "404"];

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub retry: RetryConfig,
    pub request_timeout_secs: u64,
}

/// Settings for the alternate-name retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub name_prefix: String,
    pub not_found_patterns: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            not_found_patterns: DEFAULT_NOT_FOUND_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RetryConfig {
    /// An explicitly empty `WRHS_NAME_PREFIX` disables the retry.
    fn from_profiled<F>(vars: &Profiled<'_, F>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let not_found_patterns = match vars.opt("WRHS_NOT_FOUND_PATTERNS") {
            Some(raw) => parse_patterns(&raw),
            None => defaults.not_found_patterns,
        };
        Self {
            name_prefix: vars
                .set("WRHS_NAME_PREFIX")
                .unwrap_or(defaults.name_prefix),
            not_found_patterns,
        }
    }
}

/// Split a comma-separated pattern list, dropping blanks.
fn parse_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl WarehouseConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `WRHS_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = env_or("WRHS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(profile, |key| env::var(key).ok())
    }

    fn from_lookup<F>(profile: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = profile.to_uppercase();
        let vars = Profiled {
            profile: p.as_str(),
            lookup,
        };

        let endpoint = vars.required(ENDPOINT_KEY)?;
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint));
        }

        Ok(Self {
            profile: p.clone(),
            endpoint,
            username: vars.required(USERNAME_KEY)?,
            password: vars.required(PASSWORD_KEY)?,
            retry: RetryConfig::from_profiled(&vars),
            request_timeout_secs: vars.u64("WRHS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  warehouse:   endpoint={}, user={}", self.endpoint, self.username);
        tracing::info!(
            "  retry:       prefix={}, not_found_patterns={:?}",
            self.retry.name_prefix,
            self.retry.not_found_patterns
        );
        tracing::info!("  http:        timeout={}s", self.request_timeout_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base(profile: &str) -> Vec<(String, String)> {
        [
            (ENDPOINT_KEY, "https://wrhs.example.com"),
            (USERNAME_KEY, "svc-user"),
            (PASSWORD_KEY, "hunter2"),
        ]
        .iter()
        .map(|(k, v)| (format!("{profile}{k}"), v.to_string()))
        .collect()
    }

    fn load(profile: &str, pairs: &[(String, String)]) -> Result<WarehouseConfig, ConfigError> {
        let pairs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        WarehouseConfig::from_lookup(profile, lookup(&pairs))
    }

    #[test]
    fn test_parse_patterns() {
        assert_eq!(
            parse_patterns(" Not Found , ,404,missing "),
            vec!["not found", "404", "missing"]
        );
        assert!(parse_patterns(" , ").is_empty());
    }

    #[test]
    fn test_retry_defaults() {
        let retry = RetryConfig::default();
        assert_eq!(retry.name_prefix, "@ux/");
        assert_eq!(retry.not_found_patterns, vec!["not found", "404"]);
    }

    #[test]
    fn test_profiled_config_loads_from_process_env() {
        let p = "CFGTESTLOAD";
        for (key, value) in [
            (ENDPOINT_KEY, "https://wrhs.example.com"),
            (USERNAME_KEY, "svc-user"),
            (PASSWORD_KEY, "hunter2"),
            ("WRHS_NAME_PREFIX", "@acme/"),
            ("WRHS_REQUEST_TIMEOUT_SECS", "5"),
        ] {
            env::set_var(format!("{p}_{key}"), value);
        }

        let config = WarehouseConfig::for_profile(p).unwrap();
        assert_eq!(config.profile_label(), p);
        assert_eq!(config.endpoint, "https://wrhs.example.com");
        assert_eq!(config.username, "svc-user");
        assert_eq!(config.retry.name_prefix, "@acme/");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_without_profile() {
        let config = load("", &base("")).unwrap();
        assert_eq!(config.profile_label(), "default");
        assert_eq!(config.retry.name_prefix, "@ux/");
        assert_eq!(config.retry.not_found_patterns, vec!["not found", "404"]);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_profile_key_wins_over_plain_key() {
        let mut pairs = base("");
        pairs.push(("PROD_WRHS_NEXT_ENDPOINT".into(), "https://prod.example.com".into()));
        pairs.push(("PROD_WRHS_NEXT_USERNAME".into(), "".into()));

        let config = load("prod", &pairs).unwrap();
        assert_eq!(config.profile, "PROD");
        assert_eq!(config.endpoint, "https://prod.example.com");
        // Empty profile value falls back to the plain key.
        assert_eq!(config.username, "svc-user");
    }

    #[test]
    fn test_missing_password_is_error() {
        let pairs: Vec<(String, String)> = base("")
            .into_iter()
            .filter(|(k, _)| k != PASSWORD_KEY)
            .collect();

        let err = load("", &pairs).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(PASSWORD_KEY)));
    }

    #[test]
    fn test_empty_password_is_missing() {
        let mut pairs = base("");
        pairs.retain(|(k, _)| k != PASSWORD_KEY);
        pairs.push((PASSWORD_KEY.into(), "".into()));

        let err = load("", &pairs).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(PASSWORD_KEY)));
    }

    #[test]
    fn test_invalid_endpoint_is_error() {
        let mut pairs = base("");
        pairs.retain(|(k, _)| k != ENDPOINT_KEY);
        pairs.push((ENDPOINT_KEY.into(), "wrhs.example.com".into()));

        let err = load("", &pairs).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_explicit_empty_prefix_is_kept() {
        let mut pairs = base("");
        pairs.push(("WRHS_NAME_PREFIX".into(), "".into()));

        let config = load("", &pairs).unwrap();
        assert_eq!(config.retry.name_prefix, "");
    }

    #[test]
    fn test_not_found_patterns_from_env() {
        let mut pairs = base("");
        pairs.push(("WRHS_NOT_FOUND_PATTERNS".into(), "No Such Package, gone".into()));

        let config = load("", &pairs).unwrap();
        assert_eq!(config.retry.not_found_patterns, vec!["no such package", "gone"]);
    }
}
