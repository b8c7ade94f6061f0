//! End-to-end series normalization
//!
//! ```text
//! raw samples ──► NullFilter ──► Summarizer ──► normalized points
//!                                    ▲
//!          explicit method ──────────┤
//!          guess_method(target) ─────┤  (first one available)
//!          default method ───────────┘
//! ```
//!
//! A [`SeriesNormalizer`] is built once per widget series. All configuration
//! errors surface from [`SeriesNormalizer::new`]; [`SeriesNormalizer::normalize`]
//! itself cannot fail.

use std::fmt;

use tracing::debug;

use crate::backend::BackendSeries;
use crate::config::{ResolvedConfig, SeriesConfig};
use crate::error::Result;
use crate::expression::guess_method;
use crate::null_filter::NullFilter;
use crate::summarize::{Summarizer, SummaryMethod};
use crate::types::{DataPoint, Sample};

/// Where the summary method of a normalizer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSource {
    /// Named in the configuration
    Explicit,

    /// Inferred from the target expression
    Guessed,

    /// Configured fallback
    Default,
}

impl fmt::Display for MethodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSource::Explicit => write!(f, "explicit"),
            MethodSource::Guessed => write!(f, "guessed"),
            MethodSource::Default => write!(f, "default"),
        }
    }
}

/// Pick the summary method for a target
pub fn resolve_method(
    explicit: Option<SummaryMethod>,
    target: &str,
    default: SummaryMethod,
) -> (SummaryMethod, MethodSource) {
    if let Some(method) = explicit {
        return (method, MethodSource::Explicit);
    }
    match guess_method(target) {
        Some(method) => (method, MethodSource::Guessed),
        None => (default, MethodSource::Default),
    }
}

/// Normalizes the raw samples of one target
pub struct SeriesNormalizer {
    null_filter: NullFilter,
    method: SummaryMethod,
    source: MethodSource,
    summarizer: Box<dyn Summarizer>,
}

impl SeriesNormalizer {
    /// Build a normalizer for `target` from an unresolved configuration
    pub fn new(config: &SeriesConfig, target: &str) -> Result<Self> {
        Ok(Self::from_resolved(config.resolve()?, target))
    }

    /// Build a normalizer from an already resolved configuration
    pub fn from_resolved(config: ResolvedConfig, target: &str) -> Self {
        let (method, source) = resolve_method(config.method, target, config.default_method);
        debug!(
            target_expr = target,
            method = %method,
            source = %source,
            bucket_size = %config.bucketing.bucket_size,
            "Resolved summary method"
        );

        Self {
            null_filter: config.null_filter,
            method,
            source,
            summarizer: method.summarizer(config.bucketing),
        }
    }

    /// Summary method in use
    pub fn method(&self) -> SummaryMethod {
        self.method
    }

    /// Where the summary method came from
    pub fn source(&self) -> MethodSource {
        self.source
    }

    /// Filter and summarize raw samples
    pub fn normalize(&self, samples: &[Sample], from_time: i64) -> Vec<DataPoint> {
        let points = self.null_filter.filter(samples);
        self.summarizer.summarize(&points, from_time)
    }
}

impl fmt::Debug for SeriesNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesNormalizer")
            .field("null_filter", &self.null_filter)
            .field("method", &self.method)
            .field("source", &self.source)
            .finish()
    }
}

/// Normalize a decoded backend series, guessing from its own target
pub fn normalize_series(
    config: &SeriesConfig,
    series: &BackendSeries,
    from_time: i64,
) -> Result<Vec<DataPoint>> {
    let normalizer = SeriesNormalizer::new(config, &series.target)?;
    Ok(normalizer.normalize(&series.datapoints, from_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::error::Error;

    fn config(bucket_size: i64) -> SeriesConfig {
        SeriesConfig {
            bucket_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_method_resolution_order() {
        let default = SummaryMethod::Aggregate(Aggregator::Avg);

        let (method, source) = resolve_method(Some(SummaryMethod::Last), "foo.max", default);
        assert_eq!((method, source), (SummaryMethod::Last, MethodSource::Explicit));

        let (method, source) = resolve_method(None, "foo.max", default);
        assert_eq!(
            (method, source),
            (SummaryMethod::Aggregate(Aggregator::Max), MethodSource::Guessed)
        );

        let (method, source) = resolve_method(None, "foo.bar", default);
        assert_eq!((method, source), (default, MethodSource::Default));
    }

    #[test]
    fn test_normalize_guessed_sum() {
        let normalizer = SeriesNormalizer::new(&config(5), "servers.requests.sum").unwrap();
        assert_eq!(normalizer.source(), MethodSource::Guessed);

        let samples = vec![
            Sample::new(Some(11), Some(1.0)),
            Sample::new(Some(12), None),
            Sample::new(Some(12), Some(2.0)),
            Sample::new(None, Some(100.0)),
            Sample::new(Some(21), Some(4.0)),
        ];
        assert_eq!(
            normalizer.normalize(&samples, 11),
            vec![DataPoint::new(10, 3.0), DataPoint::new(20, 4.0)]
        );
    }

    #[test]
    fn test_normalize_last_value_with_zeroize() {
        let config = SeriesConfig {
            null_filter: "zeroize".to_string(),
            method: Some("last".to_string()),
            ..config(5)
        };
        let normalizer = SeriesNormalizer::new(&config, "anything").unwrap();

        let samples = vec![
            Sample::new(Some(3), Some(1.0)),
            Sample::new(Some(8), None),
            Sample::new(Some(12), Some(4.0)),
        ];
        assert_eq!(
            normalizer.normalize(&samples, 3),
            vec![DataPoint::new(5, 1.0), DataPoint::new(10, 4.0)]
        );
    }

    #[test]
    fn test_normalize_all_null_is_empty() {
        let normalizer = SeriesNormalizer::new(&config(5), "foo").unwrap();
        let samples = vec![Sample::new(Some(1), None), Sample::new(None, None)];
        assert!(normalizer.normalize(&samples, 0).is_empty());
    }

    #[test]
    fn test_config_errors_surface_at_construction() {
        let err = SeriesNormalizer::new(&config(-1), "foo.max").unwrap_err();
        assert!(matches!(err, Error::InvalidBucketSize(-1)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_normalize_backend_series() {
        let series = BackendSeries::new(
            "integral(hits.min)",
            vec![
                Sample::new(Some(10), Some(1.0)),
                Sample::new(Some(12), Some(5.0)),
            ],
        );
        let points = normalize_series(&config(10), &series, 10).unwrap();
        assert_eq!(points, vec![DataPoint::new(10, 5.0)]);
    }
}
