//! Run configuration for the default host.
//!
//! Read from the environment by [`RunConfig::from_env`], so `cargo test` runs can be narrowed and re-formatted
//! without recompiling:
//! - `CHECKERS_RUN`: regex over slash-joined subtest names (`Suite/name`)
//! - `CHECKERS_VERBOSE`: `1`/`true` for one line per test
//! - `CHECKERS_FORMAT`: `console` or `json`

use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

pub const FILTER_VAR: &str = "CHECKERS_RUN";
pub const VERBOSE_VAR: &str = "CHECKERS_VERBOSE";
pub const FORMAT_VAR: &str = "CHECKERS_FORMAT";

/// Run configuration
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Only subtests whose full name matches run; the rest are reported skipped
    pub filter: Option<Regex>,
    /// One line per test instead of progress dots
    pub verbose: bool,
    /// Output format of the reporter picked by `Runner::from_config`
    pub format: ReportFormat,
}

/// Reporter output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("{var} is not a valid regular expression: {source}")]
    #[diagnostic(code(checkers::config::filter))]
    InvalidFilter {
        var: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("{var} has unsupported value {value:?}")]
    #[diagnostic(code(checkers::config::value), help("expected one of: {expected}"))]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl RunConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the run to subtests whose full name matches `filter`
    pub fn with_filter(mut self, filter: Regex) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from any variable source. Unset and empty variables keep their defaults.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use checkers::config::{ReportFormat, RunConfig};
    ///
    /// let config = RunConfig::from_lookup(|var| match var {
    ///     "CHECKERS_FORMAT" => Some("json".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.format, ReportFormat::Json);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(pattern) = get(FILTER_VAR) {
            let filter = Regex::new(&pattern).map_err(|source| ConfigError::InvalidFilter {
                var: FILTER_VAR,
                source,
            })?;
            config.filter = Some(filter);
        }

        if let Some(value) = get(VERBOSE_VAR) {
            config.verbose = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: VERBOSE_VAR,
                        value,
                        expected: "1, true, yes, 0, false, no",
                    });
                }
            };
        }

        if let Some(value) = get(FORMAT_VAR) {
            config.format = match value.trim().to_ascii_lowercase().as_str() {
                "console" => ReportFormat::Console,
                "json" => ReportFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: FORMAT_VAR,
                        value,
                        expected: "console, json",
                    });
                }
            };
        }

        tracing::debug!(?config, "loaded run configuration");
        Ok(config)
    }

    /// Whether the subtest with this full name should run.
    pub fn selects(&self, full_name: &str) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter.is_match(full_name))
    }
}
