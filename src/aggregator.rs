//! Aggregator registry
//!
//! Named reducers applied to the values that fall into one bucket. The set is
//! closed: `sum`, `min`, `max` and `avg`. Every reducer is total; an empty
//! input yields `0.0` rather than an error or a sentinel like infinity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Reducer applied to the values of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    /// Sum of all values
    Sum,

    /// Minimum value
    Min,

    /// Maximum value
    Max,

    /// Arithmetic mean
    Avg,
}

impl Aggregator {
    /// All registered aggregators
    pub const ALL: [Aggregator; 4] = [
        Aggregator::Sum,
        Aggregator::Min,
        Aggregator::Max,
        Aggregator::Avg,
    ];

    /// Registered name of this aggregator
    pub fn name(&self) -> &'static str {
        match self {
            Aggregator::Sum => "sum",
            Aggregator::Min => "min",
            Aggregator::Max => "max",
            Aggregator::Avg => "avg",
        }
    }

    /// Look up an aggregator by name
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|agg| agg.name() == name)
    }

    /// Reduce a sequence of values
    ///
    /// # Example
    ///
    /// ```rust
    /// use kuba_dash::aggregator::Aggregator;
    ///
    /// assert_eq!(Aggregator::Avg.apply(&[2.0, 3.0, 4.0]), 3.0);
    /// assert_eq!(Aggregator::Max.apply(&[]), 0.0);
    /// ```
    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        match self {
            Aggregator::Sum => values.iter().sum(),
            Aggregator::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregator::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregator::Avg => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

impl FromStr for Aggregator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| Error::UnknownAggregator(s.to_string()))
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
