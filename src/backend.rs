//! Backend render response decoding
//!
//! The metrics backend answers a render request with one entry per target:
//!
//! ```json
//! [
//!   {"target": "servers.web1.load.avg", "datapoints": [[0.5, 1700000000], [null, 1700000060]]}
//! ]
//! ```
//!
//! Each datapoint is a `[value, timestamp]` pair in the backend's native
//! order. Decoding transposes the pair into a [`Sample`] so the rest of the
//! pipeline sees `x = timestamp`, `y = value`. Fetching the body is the
//! caller's job.

use serde::Deserialize;

use crate::error::Result;
use crate::types::Sample;

/// One target's raw series as returned by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSeries")]
pub struct BackendSeries {
    /// Target expression the series was rendered from
    pub target: String,

    /// Raw samples in backend order
    pub datapoints: Vec<Sample>,
}

impl BackendSeries {
    /// Create a series from already decoded samples
    pub fn new(target: impl Into<String>, datapoints: Vec<Sample>) -> Self {
        Self {
            target: target.into(),
            datapoints,
        }
    }
}

/// Wire shape; pairs are validated for arity by the tuple deserializer
#[derive(Deserialize)]
struct RawSeries {
    target: String,
    #[serde(default)]
    datapoints: Vec<(Option<f64>, Option<f64>)>,
}

impl From<RawSeries> for BackendSeries {
    fn from(raw: RawSeries) -> Self {
        let datapoints = raw
            .datapoints
            .into_iter()
            .map(|(value, timestamp)| {
                Sample::from_backend_pair(
                    value.filter(|v| v.is_finite()),
                    timestamp.filter(|t| t.is_finite()).map(|t| t.trunc() as i64),
                )
            })
            .collect();

        Self {
            target: raw.target,
            datapoints,
        }
    }
}

/// Decode a full render response body
pub fn decode_render_response(body: &str) -> Result<Vec<BackendSeries>> {
    Ok(serde_json::from_str(body)?)
}
