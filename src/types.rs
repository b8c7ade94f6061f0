//! Core data types used throughout the normalization pipeline
//!
//! # Key Types
//!
//! - **`Sample`**: A raw measurement as returned by the metrics backend. Either
//!   coordinate may be missing.
//! - **`DataPoint`**: A complete `(x, y)` pair. This is what the null filter
//!   produces and what the summarizers consume and emit.
//!
//! Timestamps are integer seconds since the Unix epoch throughout.
//!
//! # Example
//!
//! ```rust
//! use kuba_dash::types::{DataPoint, Sample};
//!
//! let raw = Sample::new(Some(1_700_000_000), None);
//! assert!(!raw.is_complete());
//!
//! let point = DataPoint::new(1_700_000_000, 42.5);
//! assert_eq!(Sample::from(point), Sample::new(Some(1_700_000_000), Some(42.5)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw sample from the metrics backend
///
/// Backends report gaps as `null` in either position, so both coordinates are
/// optional. Non-null entries are expected in ascending `x` order; nothing in
/// this crate sorts them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Unix timestamp in seconds
    pub x: Option<i64>,

    /// Measured value
    pub y: Option<f64>,
}

impl Sample {
    /// Create a new sample
    pub fn new(x: Option<i64>, y: Option<f64>) -> Self {
        Self { x, y }
    }

    /// Build a sample from the backend's native `[value, timestamp]` order
    pub fn from_backend_pair(value: Option<f64>, timestamp: Option<i64>) -> Self {
        Self {
            x: timestamp,
            y: value,
        }
    }

    /// Whether both coordinates are present
    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

impl From<DataPoint> for Sample {
    fn from(point: DataPoint) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
        }
    }
}

/// A complete time-series point
///
/// After summarization `x` holds the left edge of the bucket the value
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Unix timestamp in seconds
    pub x: i64,

    /// Measured or summarized value
    pub y: f64,
}

impl DataPoint {
    /// Create a new data point
    pub fn new(x: i64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, f64)> for DataPoint {
    fn from((x, y): (i64, f64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
