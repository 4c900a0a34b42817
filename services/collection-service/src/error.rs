use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),
    #[error("invalid segment payload: {0}")]
    Shape(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("kafka producer setup failed: {0}")]
    Setup(#[source] rdkafka::error::KafkaError),
    #[error("kafka metadata probe for topic '{topic}' failed: {source}")]
    Unreachable {
        topic: String,
        #[source]
        source: rdkafka::error::KafkaError,
    },
    #[error("kafka delivery failed: {0}")]
    Delivery(#[source] rdkafka::error::KafkaError),
}

/// Failure of a single `/transfer` request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] DecodeError),
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            GatewayError::Serialization(_) | GatewayError::Publish(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Callers only ever see the status; details stay in the logs.
        self.status().into_response()
    }
}
