use std::sync::Arc;

use crate::config::Placement;
use crate::decode::Payload;
use crate::error::GatewayError;
use crate::models::SegmentTime;

/// A single record bound for the collection topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: Arc<str>,
    pub partition: Option<i32>,
    pub key: Option<String>,
    pub value: Vec<u8>,
}

impl OutboundMessage {
    pub fn build(
        topic: Arc<str>,
        placement: Placement,
        payload: Payload,
    ) -> Result<Self, GatewayError> {
        let (time, value) = match payload {
            Payload::Segment(envelope) => {
                let value =
                    serde_json::to_vec(&envelope.segment).map_err(GatewayError::Serialization)?;
                (Some(envelope.segment.time), value)
            }
            Payload::Raw(bytes) => (None, bytes.to_vec()),
        };

        let (partition, key) = match placement {
            Placement::Fixed(partition) => (Some(partition), None),
            Placement::TimeKey => (None, time.as_ref().map(time_key)),
            Placement::Default => (None, None),
        };

        Ok(Self {
            topic,
            partition,
            key,
            value,
        })
    }
}

/// Record key for time-keyed placement: whole Unix seconds as decimal text.
pub fn time_key(time: &SegmentTime) -> String {
    time.unix_seconds().to_string()
}
