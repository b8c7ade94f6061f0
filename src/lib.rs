//! Kuba Dash - time-series normalization core for metrics dashboards
//!
//! This library turns the irregular, gappy samples returned by a metrics
//! backend into evenly spaced series ready for display:
//! - Null filtering (skip or zero-fill missing values)
//! - Bucket alignment (round or floor, absolute or relative to an anchor)
//! - Summarization (last value carried forward, or sum/min/max/avg per bucket)
//! - Best-effort aggregation guessing from backend target expressions
//!
//! Everything here is synchronous and side-effect free; HTTP, rendering and
//! fetching from the backend live elsewhere.
//!
//! # Example
//!
//! ```rust
//! use kuba_dash::{SeriesConfig, SeriesNormalizer, Sample, DataPoint};
//!
//! let config = SeriesConfig { bucket_size: 5, ..Default::default() };
//! let normalizer = SeriesNormalizer::new(&config, "servers.web1.requests.max").unwrap();
//!
//! let samples = vec![
//!     Sample::new(Some(11), Some(3.0)),
//!     Sample::new(Some(12), Some(7.0)),
//!     Sample::new(Some(13), None),
//! ];
//! assert_eq!(normalizer.normalize(&samples, 11), vec![DataPoint::new(10, 7.0)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod alignment;
pub mod error;
pub mod null_filter;
pub mod summarize;
pub mod types;

/// Query target analysis for picking a default aggregation
pub mod expression;

/// Configuration with TOML support
pub mod config;

/// Decoding of backend render responses
pub mod backend;

/// Null filter → summarizer pipeline
pub mod pipeline;

// Re-export main types
pub use aggregator::Aggregator;
pub use alignment::{Alignment, BucketSize};
pub use backend::{decode_render_response, BackendSeries};
pub use config::{ResolvedConfig, SeriesConfig};
pub use error::{Error, Result};
pub use expression::guess_method;
pub use null_filter::NullFilter;
pub use pipeline::{normalize_series, MethodSource, SeriesNormalizer};
pub use summarize::{
    AggregatingSummarizer, Bucketing, LastValueSummarizer, Summarizer, SummaryMethod,
};
pub use types::{DataPoint, Sample};
