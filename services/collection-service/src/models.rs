use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One telemetry segment as accepted on `/transfer`.
///
/// Every field is required; serde rejects missing keys and mismatched types, so a
/// `Segment` that exists has been fully validated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Segment {
    pub data: String,
    pub time: SegmentTime,
    pub number: i64,
    pub count: i64,
}

/// Segment timestamp: epoch seconds or an RFC 3339 string, kept in the form it arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SegmentTime {
    Epoch(i64),
    Timestamp(DateTime<FixedOffset>),
}

impl SegmentTime {
    pub fn unix_seconds(&self) -> i64 {
        match self {
            SegmentTime::Epoch(seconds) => *seconds,
            SegmentTime::Timestamp(timestamp) => timestamp.timestamp(),
        }
    }
}

/// Strict-mode request body.
#[derive(Debug, Deserialize)]
pub struct SegmentEnvelope {
    pub segment: Segment,
    // Required and non-null, but it never changes what gets published.
    pub error: bool,
}
