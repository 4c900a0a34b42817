use axum::{body::Body, extract::State, http::StatusCode};
use std::time::Instant;

use crate::decode::{self, Payload};
use crate::error::GatewayError;
use crate::message::OutboundMessage;
use crate::state::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

/// `POST /transfer`: decode, publish, and answer with a bare status.
pub async fn transfer(
    State(state): State<AppState>,
    body: Body,
) -> Result<StatusCode, GatewayError> {
    let start = Instant::now();
    let result = forward(&state, body).await;
    // Each failed request produces exactly one event here.
    match &result {
        Ok(_) => {}
        Err(err @ GatewayError::MalformedPayload(_)) => {
            tracing::warn!(error = %err, "rejected segment");
        }
        Err(err @ GatewayError::Serialization(_)) => {
            tracing::error!(error = %err, "failed to serialize segment");
        }
        Err(err @ GatewayError::Publish(_)) => {
            tracing::error!(
                error = %err,
                topic = %state.topic,
                latency_ms = start.elapsed().as_millis(),
                "failed to send segment to kafka"
            );
        }
    }
    result
}

async fn forward(state: &AppState, body: Body) -> Result<StatusCode, GatewayError> {
    let bytes = decode::read_body(body, state.max_body_bytes).await?;
    let payload = decode::decode(state.mode, bytes)?;
    if let Payload::Segment(envelope) = &payload {
        tracing::debug!(
            error_flag = envelope.error,
            data = %envelope.segment.data,
            "segment decoded"
        );
    }

    let message = OutboundMessage::build(state.topic.clone(), state.placement, payload)?;
    let delivery = state.publisher.publish(&message).await?;
    tracing::debug!(
        partition = delivery.partition,
        offset = delivery.offset,
        "transfer acknowledged"
    );
    Ok(StatusCode::OK)
}
