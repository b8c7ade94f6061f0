//! Configuration for series normalization
//!
//! A widget describes how its series are normalized with a small TOML table.
//! Names are kept as strings here and resolved eagerly by
//! [`SeriesConfig::resolve`], so an unknown name is reported when the widget
//! is configured rather than when data arrives.
//!
//! ```toml
//! null_filter = "zeroize"
//! alignment = "floor"
//! bucket_size = 300
//! relative = true
//! method = "max"        # omit to guess from the target expression
//! default_method = "avg"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::{Alignment, BucketSize};
use crate::error::{Error, Result};
use crate::null_filter::NullFilter;
use crate::summarize::{Bucketing, SummaryMethod};

/// Normalization settings for one series
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeriesConfig {
    /// Null filter policy (`skip` or `zeroize`)
    #[serde(default = "default_null_filter")]
    pub null_filter: String,

    /// Alignment mode (`round` or `floor`)
    #[serde(default = "default_alignment")]
    pub alignment: String,

    /// Bucket width in seconds
    #[serde(default = "default_bucket_size")]
    pub bucket_size: i64,

    /// Align buckets relative to the query's `from_time`
    #[serde(default)]
    pub relative: bool,

    /// Explicit summary method; `None` means guess from the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Method used when nothing can be guessed from the target
    #[serde(default = "default_method")]
    pub default_method: String,
}

/// A validated configuration with every name resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Null filter policy
    pub null_filter: NullFilter,

    /// Bucket geometry
    pub bucketing: Bucketing,

    /// Explicit summary method
    pub method: Option<SummaryMethod>,

    /// Fallback summary method
    pub default_method: SummaryMethod,
}

fn default_null_filter() -> String {
    NullFilter::Skip.name().to_string()
}

fn default_alignment() -> String {
    Alignment::Round.name().to_string()
}

fn default_bucket_size() -> i64 {
    60
}

fn default_method() -> String {
    "avg".to_string()
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            null_filter: default_null_filter(),
            alignment: default_alignment(),
            bucket_size: default_bucket_size(),
            relative: false,
            method: None,
            default_method: default_method(),
        }
    }
}

impl SeriesConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Unparseable numeric and boolean overrides are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(policy) = std::env::var("KUBA_DASH_NULL_FILTER") {
            self.null_filter = policy;
        }
        if let Ok(alignment) = std::env::var("KUBA_DASH_ALIGNMENT") {
            self.alignment = alignment;
        }
        if let Ok(size) = std::env::var("KUBA_DASH_BUCKET_SIZE") {
            if let Ok(s) = size.parse() {
                self.bucket_size = s;
            }
        }
        if let Ok(relative) = std::env::var("KUBA_DASH_RELATIVE") {
            if let Ok(r) = relative.parse() {
                self.relative = r;
            }
        }
        if let Ok(method) = std::env::var("KUBA_DASH_METHOD") {
            self.method = Some(method);
        }
        if let Ok(method) = std::env::var("KUBA_DASH_DEFAULT_METHOD") {
            self.default_method = method;
        }
    }

    /// Resolve every name, failing on the first invalid one
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let null_filter: NullFilter = self.null_filter.parse()?;
        let alignment: Alignment = self.alignment.parse()?;
        let bucket_size = BucketSize::new(self.bucket_size)?;
        let method = self
            .method
            .as_deref()
            .map(str::parse::<SummaryMethod>)
            .transpose()?;
        let default_method: SummaryMethod = self.default_method.parse()?;

        Ok(ResolvedConfig {
            null_filter,
            bucketing: Bucketing::new(alignment, bucket_size, self.relative),
            method,
            default_method,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;

    #[test]
    fn test_default_config() {
        let config = SeriesConfig::default();
        assert_eq!(config.bucket_size, 60);
        assert!(config.validate().is_ok());

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.null_filter, NullFilter::Skip);
        assert_eq!(resolved.bucketing.alignment, Alignment::Round);
        assert_eq!(resolved.method, None);
        assert_eq!(
            resolved.default_method,
            SummaryMethod::Aggregate(Aggregator::Avg)
        );
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SeriesConfig::from_toml_str("").unwrap();
        assert_eq!(config, SeriesConfig::default());
    }

    #[test]
    fn test_full_toml() {
        let config = SeriesConfig::from_toml_str(
            r#"
            null_filter = "zeroize"
            alignment = "floor"
            bucket_size = 300
            relative = true
            method = "last"
            "#,
        )
        .unwrap();

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.null_filter, NullFilter::Zeroize);
        assert_eq!(resolved.bucketing.alignment, Alignment::Floor);
        assert_eq!(resolved.bucketing.bucket_size.get(), 300);
        assert!(resolved.bucketing.relative);
        assert_eq!(resolved.method, Some(SummaryMethod::Last));
    }

    #[test]
    fn test_invalid_names_are_reported() {
        let mut config = SeriesConfig {
            null_filter: "drop".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(Error::UnknownNullFilter(_))));

        config.null_filter = "skip".to_string();
        config.alignment = "ceil".to_string();
        assert!(matches!(config.resolve(), Err(Error::UnknownAlignment(_))));

        config.alignment = "round".to_string();
        config.bucket_size = 0;
        assert!(matches!(config.resolve(), Err(Error::InvalidBucketSize(0))));

        config.bucket_size = 10;
        config.method = Some("p95".to_string());
        assert!(matches!(config.resolve(), Err(Error::UnknownMethod(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let err = SeriesConfig::from_toml_str("bucket_size = \"ten\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.toml");

        let config = SeriesConfig {
            bucket_size: 900,
            method: Some("sum".to_string()),
            ..Default::default()
        };
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(SeriesConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = SeriesConfig::from_file("/nonexistent/kuba-dash/series.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("KUBA_DASH_BUCKET_SIZE", "120");
        let mut config = SeriesConfig::default();
        config.apply_env_overrides();
        std::env::remove_var("KUBA_DASH_BUCKET_SIZE");
        assert_eq!(config.bucket_size, 120);
    }

    #[test]
    fn test_file_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.toml");
        std::fs::write(&path, "alignment = \"floor\"\nmethod = \"avg\"\n").unwrap();

        std::env::set_var("KUBA_DASH_METHOD", "last");
        let config = SeriesConfig::from_file_with_env(&path);
        std::env::remove_var("KUBA_DASH_METHOD");

        let config = config.unwrap();
        assert_eq!(config.alignment, "floor");
        assert_eq!(config.method.as_deref(), Some("last"));
        assert_eq!(config.resolve().unwrap().method, Some(SummaryMethod::Last));
    }
}
