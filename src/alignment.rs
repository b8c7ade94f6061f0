//! Time bucket alignment
//!
//! Maps an arbitrary timestamp onto the left edge of the bucket that contains
//! it. Buckets are the half-open intervals `[offset + k*size, offset + (k+1)*size)`
//! where `offset` is `relative_to mod size` (or `0` for absolute alignment).
//!
//! Two modes are supported:
//!
//! - **floor**: the bucket whose interval actually contains `t`
//! - **round**: the nearest bucket edge, ties rounding up
//!
//! Results are clamped to `0`; nothing before the epoch is ever produced.
//!
//! # Example
//!
//! ```rust
//! use kuba_dash::alignment::{Alignment, BucketSize};
//!
//! let five = BucketSize::new(5).unwrap();
//! assert_eq!(Alignment::Round.align(8, five, None), 10);
//! assert_eq!(Alignment::Floor.align(8, five, None), 5);
//!
//! // Relative to an anchor at t=3, bucket edges sit at 3, 8, 13, ...
//! assert_eq!(Alignment::Floor.align(9, five, Some(3)), 8);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of a bucket in seconds, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BucketSize(i64);

impl BucketSize {
    /// Validate a bucket size
    ///
    /// Returns `Error::InvalidBucketSize` for zero or negative sizes.
    pub fn new(seconds: i64) -> Result<Self> {
        if seconds <= 0 {
            return Err(Error::InvalidBucketSize(seconds));
        }
        Ok(Self(seconds))
    }

    /// Size in seconds
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for BucketSize {
    type Error = Error;

    fn try_from(seconds: i64) -> Result<Self> {
        Self::new(seconds)
    }
}

impl From<BucketSize> for i64 {
    fn from(size: BucketSize) -> Self {
        size.0
    }
}

impl fmt::Display for BucketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// How a timestamp is snapped to a bucket edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Nearest edge, ties round up
    #[default]
    Round,

    /// Edge at or below the timestamp
    Floor,
}

impl Alignment {
    /// All registered alignment modes
    pub const ALL: [Alignment; 2] = [Alignment::Round, Alignment::Floor];

    /// Registered name of this mode
    pub fn name(&self) -> &'static str {
        match self {
            Alignment::Round => "round",
            Alignment::Floor => "floor",
        }
    }

    /// Align `t` to a bucket edge
    ///
    /// When `relative_to` is given, bucket edges are shifted so that the
    /// anchor itself falls on an edge.
    pub fn align(&self, t: i64, bucket_size: BucketSize, relative_to: Option<i64>) -> i64 {
        // i128 keeps 2*delta from overflowing near the ends of the i64 range
        let size = bucket_size.get() as i128;
        let offset = relative_to.map_or(0, |anchor| (anchor as i128).rem_euclid(size));
        let delta = t as i128 - offset;

        let quotient = match self {
            Alignment::Floor => delta.div_euclid(size),
            Alignment::Round => (2 * delta + size).div_euclid(2 * size),
        };

        (offset + quotient * size).clamp(0, i64::MAX as i128) as i64
    }
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Alignment::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| Error::UnknownAlignment(s.to_string()))
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
