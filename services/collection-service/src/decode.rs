use axum::body::{Body, Bytes};

use crate::config::DecodeMode;
use crate::error::DecodeError;
use crate::models::SegmentEnvelope;

/// A request body that passed decoding for the configured mode.
#[derive(Debug)]
pub enum Payload {
    Segment(SegmentEnvelope),
    Raw(Bytes),
}

pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, DecodeError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(DecodeError::Body)
}

pub fn decode(mode: DecodeMode, bytes: Bytes) -> Result<Payload, DecodeError> {
    match mode {
        DecodeMode::Strict => Ok(Payload::Segment(serde_json::from_slice(&bytes)?)),
        DecodeMode::Permissive => Ok(Payload::Raw(bytes)),
    }
}
