//! Summarizers - one output point per populated bucket
//!
//! A summarizer walks a sorted sequence of complete data points and folds it
//! onto an evenly spaced timeline of buckets. Output points carry the bucket's
//! left edge as `x`.
//!
//! - **LastValueSummarizer**: step-function semantics, each bucket reports the
//!   value that was current when the timeline moved past it
//! - **AggregatingSummarizer**: every value aligned into a bucket is reduced
//!   with an [`Aggregator`]
//!
//! Both start the timeline at the bucket of `from_time` and always close with
//! one final point for the last bucket seen.
//!
//! # Example
//!
//! ```rust
//! use kuba_dash::aggregator::Aggregator;
//! use kuba_dash::alignment::{Alignment, BucketSize};
//! use kuba_dash::summarize::{AggregatingSummarizer, Bucketing, Summarizer};
//! use kuba_dash::types::DataPoint;
//!
//! let bucketing = Bucketing::new(Alignment::Round, BucketSize::new(5).unwrap(), false);
//! let summarizer = AggregatingSummarizer::new(bucketing, Aggregator::Sum);
//!
//! let points = vec![DataPoint::new(11, 1.0), DataPoint::new(12, 2.0)];
//! assert_eq!(summarizer.summarize(&points, 11), vec![DataPoint::new(10, 3.0)]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::aggregator::Aggregator;
use crate::alignment::{Alignment, BucketSize};
use crate::error::{Error, Result};
use crate::types::DataPoint;

/// Converts irregular points into one point per bucket
pub trait Summarizer: Send + Sync {
    /// Summarize `points` onto the bucket timeline anchored at `from_time`
    ///
    /// Points must be sorted by `x`. Empty input yields empty output.
    fn summarize(&self, points: &[DataPoint], from_time: i64) -> Vec<DataPoint>;

    /// Summarizer name for logging
    fn name(&self) -> &'static str;
}

/// Bucket geometry shared by both summarizers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucketing {
    /// Edge snapping mode
    pub alignment: Alignment,

    /// Bucket width
    pub bucket_size: BucketSize,

    /// Align relative to `from_time` instead of the epoch
    pub relative: bool,
}

impl Bucketing {
    /// Create a new bucketing
    pub fn new(alignment: Alignment, bucket_size: BucketSize, relative: bool) -> Self {
        Self {
            alignment,
            bucket_size,
            relative,
        }
    }

    /// Create a bucketing from an unvalidated bucket size
    pub fn try_new(alignment: Alignment, bucket_size: i64, relative: bool) -> Result<Self> {
        Ok(Self::new(alignment, BucketSize::new(bucket_size)?, relative))
    }

    /// Align `t` for a summarization anchored at `from_time`
    pub fn align(&self, t: i64, from_time: i64) -> i64 {
        let relative_to = self.relative.then_some(from_time);
        self.alignment.align(t, self.bucket_size, relative_to)
    }
}

/// Carries the most recent value forward across bucket boundaries
#[derive(Debug, Clone, Copy)]
pub struct LastValueSummarizer {
    bucketing: Bucketing,
}

impl LastValueSummarizer {
    /// Create a new last-value summarizer
    pub fn new(bucketing: Bucketing) -> Self {
        Self { bucketing }
    }
}

impl Summarizer for LastValueSummarizer {
    fn summarize(&self, points: &[DataPoint], from_time: i64) -> Vec<DataPoint> {
        let (first, rest) = match points.split_first() {
            Some(split) => split,
            None => return Vec::new(),
        };

        let mut result = Vec::new();
        let mut step = self.bucketing.align(from_time, from_time);
        let mut prev = first;

        for point in rest {
            let aligned = self.bucketing.align(point.x, from_time);
            if aligned > step {
                trace!(bucket = step, value = prev.y, "Closing bucket");
                result.push(DataPoint::new(step, prev.y));
                step = aligned;
            }
            prev = point;
        }

        // Closing point for whatever value was current at the end
        result.push(DataPoint::new(
            self.bucketing.align(prev.x, from_time),
            prev.y,
        ));
        result
    }

    fn name(&self) -> &'static str {
        "last"
    }
}

/// Reduces all values aligned into the same bucket
#[derive(Debug, Clone, Copy)]
pub struct AggregatingSummarizer {
    bucketing: Bucketing,
    aggregator: Aggregator,
}

impl AggregatingSummarizer {
    /// Create a new aggregating summarizer
    pub fn new(bucketing: Bucketing, aggregator: Aggregator) -> Self {
        Self {
            bucketing,
            aggregator,
        }
    }

    /// Reducer used for each bucket
    pub fn aggregator(&self) -> Aggregator {
        self.aggregator
    }
}

impl Summarizer for AggregatingSummarizer {
    fn summarize(&self, points: &[DataPoint], from_time: i64) -> Vec<DataPoint> {
        if points.is_empty() {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut step = self.bucketing.align(from_time, from_time);
        let mut bucket: Vec<f64> = Vec::new();

        for point in points {
            let aligned = self.bucketing.align(point.x, from_time);
            if aligned > step {
                if !bucket.is_empty() {
                    let value = self.aggregator.apply(&bucket);
                    trace!(bucket = step, value, count = bucket.len(), "Closing bucket");
                    result.push(DataPoint::new(step, value));
                }
                bucket.clear();
                step = aligned;
            }
            bucket.push(point.y);
        }

        // The last bucket is always closed
        result.push(DataPoint::new(step, self.aggregator.apply(&bucket)));
        result
    }

    fn name(&self) -> &'static str {
        self.aggregator.name()
    }
}

/// How a series is summarized: last value, or one of the aggregators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SummaryMethod {
    /// Last value carried forward
    Last,

    /// Algebraic aggregation of each bucket
    Aggregate(Aggregator),
}

impl SummaryMethod {
    /// Registered name of this method
    pub fn name(&self) -> &'static str {
        match self {
            SummaryMethod::Last => "last",
            SummaryMethod::Aggregate(agg) => agg.name(),
        }
    }

    /// Look up a method by name
    pub fn lookup(name: &str) -> Option<Self> {
        if name == "last" {
            return Some(SummaryMethod::Last);
        }
        Aggregator::lookup(name).map(SummaryMethod::Aggregate)
    }

    /// Build the summarizer implementing this method
    pub fn summarizer(&self, bucketing: Bucketing) -> Box<dyn Summarizer> {
        match *self {
            SummaryMethod::Last => Box::new(LastValueSummarizer::new(bucketing)),
            SummaryMethod::Aggregate(agg) => Box::new(AggregatingSummarizer::new(bucketing, agg)),
        }
    }
}

impl From<Aggregator> for SummaryMethod {
    fn from(agg: Aggregator) -> Self {
        SummaryMethod::Aggregate(agg)
    }
}

impl FromStr for SummaryMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s).ok_or_else(|| Error::UnknownMethod(s.to_string()))
    }
}

impl TryFrom<String> for SummaryMethod {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SummaryMethod> for String {
    fn from(method: SummaryMethod) -> Self {
        method.name().to_string()
    }
}

impl fmt::Display for SummaryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
