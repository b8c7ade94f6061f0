//! Null Filter - repairs or drops incomplete backend samples
//!
//! Backends report missing measurements as `null`. Before samples can be
//! bucketed they must be turned into complete [`DataPoint`]s:
//!
//! - **skip**: drop every sample missing either coordinate
//! - **zeroize**: drop samples without a timestamp, substitute `0` for a
//!   missing value
//!
//! The relative order of the surviving samples is preserved.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::types::{DataPoint, Sample};

/// Policy for samples with missing coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullFilter {
    /// Drop samples missing either coordinate
    #[default]
    Skip,

    /// Drop samples missing a timestamp, zero-fill missing values
    Zeroize,
}

impl NullFilter {
    /// All registered policies
    pub const ALL: [NullFilter; 2] = [NullFilter::Skip, NullFilter::Zeroize];

    /// Registered name of this policy
    pub fn name(&self) -> &'static str {
        match self {
            NullFilter::Skip => "skip",
            NullFilter::Zeroize => "zeroize",
        }
    }

    /// Convert a single sample, or `None` if the policy drops it
    pub fn apply(&self, sample: &Sample) -> Option<DataPoint> {
        let x = sample.x?;
        match (self, sample.y) {
            (_, Some(y)) => Some(DataPoint::new(x, y)),
            (NullFilter::Zeroize, None) => Some(DataPoint::new(x, 0.0)),
            (NullFilter::Skip, None) => None,
        }
    }

    /// Filter a sequence of samples into complete data points
    pub fn filter(&self, samples: &[Sample]) -> Vec<DataPoint> {
        let points: Vec<DataPoint> = samples.iter().filter_map(|s| self.apply(s)).collect();

        let dropped = samples.len() - points.len();
        if dropped > 0 {
            debug!(
                policy = self.name(),
                dropped,
                kept = points.len(),
                "Null filter dropped incomplete samples"
            );
        }

        points
    }
}

impl FromStr for NullFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NullFilter::ALL
            .into_iter()
            .find(|policy| policy.name() == s)
            .ok_or_else(|| Error::UnknownNullFilter(s.to_string()))
    }
}

impl fmt::Display for NullFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
