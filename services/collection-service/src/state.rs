use std::sync::Arc;

use crate::config::{DecodeMode, GatewayConfig, Placement};
use crate::publisher::Publisher;

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<dyn Publisher>,
    pub topic: Arc<str>,
    pub mode: DecodeMode,
    pub placement: Placement,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &GatewayConfig, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher,
            topic: Arc::from(config.kafka.topic.as_str()),
            mode: config.mode,
            placement: config.placement,
            max_body_bytes: config.max_body_bytes,
        }
    }
}
