//! Endpoint and transport configuration.
//!
//! A [`Config`] is an immutable value handed to the resolver and the
//! download pipeline. It is assembled from built-in defaults, an optional
//! TOML file, `GETGO_*` environment variables, and finally CLI flags, with
//! later sources winning.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default release index endpoint.
pub const DEFAULT_INDEX_URL: &str = "https://go.dev/dl/?mode=json";

/// Default base URL that release filenames are appended to.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://go.dev/dl";

/// Default global HTTP timeout. Release archives run to ~70 MB.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable overriding [`Config::index_url`].
pub const INDEX_URL_ENV: &str = "GETGO_INDEX_URL";

/// Environment variable overriding [`Config::download_base_url`].
pub const DOWNLOAD_URL_ENV: &str = "GETGO_DOWNLOAD_URL";

/// Environment variable overriding [`Config::timeout`], in seconds.
pub const TIMEOUT_ENV: &str = "GETGO_TIMEOUT_SECS";

/// Errors arising while assembling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: String,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A setting has an unusable value.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The setting name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    index_url: String,
    download_base_url: String,
    timeout: Duration,
}

/// Optional settings as they appear in a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    index_url: Option<String>,
    download_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_owned(),
            download_base_url: DEFAULT_DOWNLOAD_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Load defaults, then `file` if given, then the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if a
    /// setting from any source is invalid.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = file {
            config = config.merge_file(path)?;
        }
        config.merge_env()
    }

    /// Overlay settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] for unreadable
    /// or malformed files, and [`ConfigError::InvalidValue`] for bad values.
    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings: FileSettings =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        log::debug!("loaded configuration from {}", path.display());
        self.with_overrides(
            settings.index_url,
            settings.download_base_url,
            settings.timeout_secs.map(Duration::from_secs),
        )
    }

    /// Overlay `GETGO_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable holds an unusable
    /// value.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        let timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .map(|raw| parse_timeout_secs(&raw))
            .transpose()?;
        self.with_overrides(
            std::env::var(INDEX_URL_ENV).ok(),
            std::env::var(DOWNLOAD_URL_ENV).ok(),
            timeout,
        )
    }

    /// Overlay explicit values, typically from CLI flags. `None` keeps the
    /// current setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for empty URLs or a zero
    /// timeout.
    pub fn with_overrides(
        mut self,
        index_url: Option<String>,
        download_base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = index_url {
            self.index_url = validate_url("index_url", &url)?.to_owned();
        }
        if let Some(url) = download_base_url {
            self.download_base_url = validate_url("download_base_url", &url)?
                .trim_end_matches('/')
                .to_owned();
        }
        if let Some(value) = timeout {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    key: "timeout",
                    reason: "must be greater than zero".to_owned(),
                });
            }
            self.timeout = value;
        }
        Ok(self)
    }

    /// The release index endpoint.
    #[must_use]
    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// The base URL release filenames are appended to.
    #[must_use]
    pub fn download_base_url(&self) -> &str {
        &self.download_base_url
    }

    /// The global HTTP timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The URL of a release file.
    ///
    /// # Examples
    ///
    /// ```
    /// use getgo::config::Config;
    ///
    /// let url = Config::default().artefact_url("go1.22.3.linux-amd64.tar.gz");
    /// assert_eq!(url, "https://go.dev/dl/go1.22.3.linux-amd64.tar.gz");
    /// ```
    #[must_use]
    pub fn artefact_url(&self, filename: &str) -> String {
        format!("{}/{filename}", self.download_base_url)
    }

    /// The index URL, asking for every release when `include_all` is set.
    ///
    /// The default endpoint lists only the two most recent release lines;
    /// pinned versions need the full list.
    #[must_use]
    pub fn index_url_for(&self, include_all: bool) -> String {
        if !include_all {
            return self.index_url.clone();
        }
        let separator = if self.index_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}include=all", self.index_url)
    }
}

fn validate_url<'a>(key: &'static str, url: &'a str) -> Result<&'a str, ConfigError> {
    let trimmed = url.trim();
    if trimmed.trim_end_matches('/').is_empty() {
        return Err(ConfigError::InvalidValue {
            key,
            reason: "URL must not be empty".to_owned(),
        });
    }
    Ok(trimmed)
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidValue {
            key: "timeout",
            reason: format!("{TIMEOUT_ENV}={raw:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL_ENV: [&str; 3] = [INDEX_URL_ENV, DOWNLOAD_URL_ENV, TIMEOUT_ENV];

    fn clean_env<R>(f: impl FnOnce() -> R) -> R {
        temp_env::with_vars_unset(ALL_ENV, f)
    }

    #[test]
    fn defaults_point_at_go_dev() {
        let config = Config::default();
        assert_eq!(config.index_url(), DEFAULT_INDEX_URL);
        assert_eq!(config.download_base_url(), DEFAULT_DOWNLOAD_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn load_without_file_or_env_returns_defaults() {
        let config = clean_env(|| Config::load(None)).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = temp_env::with_vars(
            [
                (INDEX_URL_ENV, Some("http://mirror.test/index.json")),
                (DOWNLOAD_URL_ENV, Some("http://mirror.test/dl/")),
                (TIMEOUT_ENV, Some("12")),
            ],
            || Config::load(None),
        )
        .expect("load");
        assert_eq!(config.index_url(), "http://mirror.test/index.json");
        assert_eq!(config.download_base_url(), "http://mirror.test/dl");
        assert_eq!(config.timeout(), Duration::from_secs(12));
    }

    #[test]
    fn env_rejects_non_numeric_timeout() {
        let result = temp_env::with_vars(
            [
                (INDEX_URL_ENV, None),
                (DOWNLOAD_URL_ENV, None),
                (TIMEOUT_ENV, Some("soon")),
            ],
            || Config::load(None),
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "timeout", .. })
        ));
    }

    #[test]
    fn file_settings_apply_and_env_wins() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("getgo.toml");
        std::fs::write(
            &path,
            "index_url = \"http://file.test/index\"\ntimeout_secs = 5\n",
        )
        .expect("write config");

        let config = temp_env::with_vars(
            [
                (INDEX_URL_ENV, None),
                (DOWNLOAD_URL_ENV, Some("http://env.test/dl")),
                (TIMEOUT_ENV, None),
            ],
            || Config::load(Some(&path)),
        )
        .expect("load");
        assert_eq!(config.index_url(), "http://file.test/index");
        assert_eq!(config.download_base_url(), "http://env.test/dl");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn file_with_unknown_key_is_rejected() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("getgo.toml");
        std::fs::write(&path, "mirror = \"x\"\n").expect("write config");

        let result = clean_env(|| Config::load(Some(&path)));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let result = clean_env(|| Config::load(Some(&temp_dir.path().join("absent.toml"))));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::slash_only("/")]
    fn overrides_reject_empty_urls(#[case] url: &str) {
        let result = Config::default().with_overrides(Some(url.to_owned()), None, None);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn overrides_reject_zero_timeout() {
        let result = Config::default().with_overrides(None, None, Some(Duration::ZERO));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[rstest]
    #[case::default_endpoint(DEFAULT_INDEX_URL, "https://go.dev/dl/?mode=json&include=all")]
    #[case::plain_endpoint("http://mirror.test/index.json", "http://mirror.test/index.json?include=all")]
    fn index_url_for_appends_include_all(#[case] base: &str, #[case] expected: &str) {
        let config = Config::default()
            .with_overrides(Some(base.to_owned()), None, None)
            .expect("valid override");
        assert_eq!(config.index_url_for(true), expected);
        assert_eq!(config.index_url_for(false), base);
    }

    #[test]
    fn index_url_keeps_its_trailing_slash() {
        let config = Config::default()
            .with_overrides(Some("https://host/dl/".to_owned()), None, None)
            .expect("valid override");
        assert_eq!(config.index_url(), "https://host/dl/");
        assert_eq!(config.index_url_for(true), "https://host/dl/?include=all");
    }

    #[test]
    fn artefact_url_joins_base_and_filename() {
        let config = Config::default()
            .with_overrides(None, Some("http://mirror.test/dl/".to_owned()), None)
            .expect("valid override");
        assert_eq!(
            config.artefact_url("go1.22.3.src.tar.gz"),
            "http://mirror.test/dl/go1.22.3.src.tar.gz"
        );
    }
}
