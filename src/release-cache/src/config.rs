//! Cache configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_API_URL;
use crate::error::{CacheError, CacheResult};

/// Which releases may become the cached release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Let a newer pre-release replace the latest stable release
    pub include_prerelease: bool,
    /// Only ever cache pre-releases
    pub only_prerelease: bool,
}

/// Configuration for a [`ReleaseCache`](crate::ReleaseCache).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Owner of the repository (user or organisation)
    #[serde(default)]
    pub account: String,

    /// Repository holding the releases
    #[serde(default)]
    pub repository: String,

    /// Consider pre-releases alongside stable releases
    #[serde(default)]
    pub include_prerelease: bool,

    /// Consider pre-releases only
    #[serde(default)]
    pub only_prerelease: bool,

    /// Alternate API base URL (GitHub Enterprise, proxies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Access token for private repositories. Requires `url`.
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Minutes after which the cached release is considered outdated (default: 15)
    #[serde(default = "default_interval")]
    pub interval_minutes: u32,
}

fn default_interval() -> u32 {
    15
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            repository: String::new(),
            include_prerelease: false,
            only_prerelease: false,
            url: None,
            token: None,
            interval_minutes: default_interval(),
        }
    }
}

impl CacheConfig {
    /// Create a config for `account/repository` with default settings.
    pub fn new(account: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            repository: repository.into(),
            ..Self::default()
        }
    }

    /// Load from environment variables.
    ///
    /// Reads `ACCOUNT`, `REPOSITORY`, `PRE`, `ONLY_PRE`, `URL`, `TOKEN` and `INTERVAL`.
    /// The result is validated.
    pub fn from_env() -> CacheResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> CacheResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::new(
            non_empty("ACCOUNT").unwrap_or_default(),
            non_empty("REPOSITORY").unwrap_or_default(),
        );

        config.include_prerelease = non_empty("PRE").is_some_and(|v| parse_flag(&v));
        config.only_prerelease = non_empty("ONLY_PRE").is_some_and(|v| parse_flag(&v));
        config.url = non_empty("URL");
        config.token = non_empty("TOKEN");

        if let Some(interval) = non_empty("INTERVAL") {
            match interval.trim().parse() {
                Ok(minutes) => config.interval_minutes = minutes,
                Err(_) => tracing::warn!(%interval, "Ignoring invalid INTERVAL"),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the fatal configuration rules.
    pub fn validate(&self) -> CacheResult<()> {
        if self.account.trim().is_empty() {
            return Err(CacheError::MissingAccount);
        }

        if self.repository.trim().is_empty() {
            return Err(CacheError::MissingRepository);
        }

        if self.token.is_some() && self.url.is_none() {
            return Err(CacheError::TokenWithoutUrl);
        }

        if let Some(url) = &self.url {
            url::Url::parse(url).map_err(|e| CacheError::InvalidUrl {
                url: url.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// Selection policy derived from the pre-release flags.
    pub fn policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            include_prerelease: self.include_prerelease,
            only_prerelease: self.only_prerelease,
        }
    }

    /// API base URL without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    /// Age after which the cache should be refreshed.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_minutes) * 60)
    }
}

/// Parse an environment flag: set and not an explicit "off" value.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_account_is_fatal() {
        let err = CacheConfig::from_lookup(lookup(&[("REPOSITORY", "hyper")])).unwrap_err();
        assert!(matches!(err, CacheError::MissingAccount));
        assert!(err.to_string().contains("ACCOUNT"));
    }

    #[test]
    fn test_missing_repository_is_fatal() {
        let err = CacheConfig::from_lookup(lookup(&[("ACCOUNT", "zeit")])).unwrap_err();
        assert!(matches!(err, CacheError::MissingRepository));
        assert!(err.to_string().contains("REPOSITORY"));
    }

    #[test]
    fn test_token_without_url_is_fatal() {
        let err = CacheConfig::from_lookup(lookup(&[
            ("ACCOUNT", "zeit"),
            ("REPOSITORY", "hyper"),
            ("TOKEN", "abc"),
        ]))
        .unwrap_err();
        assert!(matches!(err, CacheError::TokenWithoutUrl));
        assert!(err.to_string().contains("URL"));
    }

    #[test]
    fn test_token_with_url_is_accepted() {
        let config = CacheConfig::from_lookup(lookup(&[
            ("ACCOUNT", "zeit"),
            ("REPOSITORY", "hyper"),
            ("TOKEN", "abc"),
            ("URL", "https://github.example.com/api/v3/"),
        ]))
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.api_base_url(), "https://github.example.com/api/v3");
    }

    #[test]
    fn test_invalid_url_is_fatal() {
        let mut config = CacheConfig::new("zeit", "hyper");
        config.url = Some("not a url".to_string());
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_defaults() {
        let config =
            CacheConfig::from_lookup(lookup(&[("ACCOUNT", "zeit"), ("REPOSITORY", "hyper")]))
                .unwrap();
        assert_eq!(config.policy(), SelectionPolicy::default());
        assert_eq!(config.api_base_url(), DEFAULT_API_URL);
        assert_eq!(config.interval(), Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_flags_and_interval() {
        let config = CacheConfig::from_lookup(lookup(&[
            ("ACCOUNT", "zeit"),
            ("REPOSITORY", "hyper"),
            ("PRE", "1"),
            ("ONLY_PRE", "false"),
            ("INTERVAL", "5"),
        ]))
        .unwrap();
        assert!(config.include_prerelease);
        assert!(!config.only_prerelease);
        assert_eq!(config.interval_minutes, 5);
    }

    #[test]
    fn test_invalid_interval_keeps_default() {
        let config = CacheConfig::from_lookup(lookup(&[
            ("ACCOUNT", "zeit"),
            ("REPOSITORY", "hyper"),
            ("INTERVAL", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.interval_minutes, 15);
    }

    #[test]
    fn test_default_interval() {
        let config = CacheConfig::default();
        assert_eq!(config.interval_minutes, 15);
        assert_eq!(config.interval(), Duration::from_secs(15 * 60));
        assert_eq!(CacheConfig::new("zeit", "hyper").interval_minutes, 15);
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"account": "zeit", "repository": "hyper"}"#).unwrap();
        assert_eq!(config.interval_minutes, 15);
        assert!(config.validate().is_ok());
    }
}
