mod app;
mod config;
mod decode;
mod error;
mod handlers;
mod message;
mod models;
mod publisher;
mod state;

use std::{process, sync::Arc, time::Duration};

use collection_common::{bind_listener, init_tracing, shutdown_signal};

use crate::config::GatewayConfig;
use crate::publisher::KafkaPublisher;
use crate::state::AppState;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let _guards = init_tracing("collection-service");

    let config =
        GatewayConfig::from_env().unwrap_or_else(|err| fatal("invalid configuration", err));

    // The serving path needs a working broker; refuse to start without one.
    let kafka = config.kafka.clone();
    let connect = tokio::task::spawn_blocking(move || KafkaPublisher::connect(&kafka));
    let publisher = match connect.await {
        Ok(Ok(publisher)) => publisher,
        Ok(Err(err)) => fatal("kafka producer unavailable", err),
        Err(err) => fatal("kafka producer setup aborted", err),
    };
    tracing::info!(
        topic = publisher.topic(),
        mode = ?config.mode,
        placement = ?config.placement,
        "collection service starting"
    );

    let state = AppState::new(&config, Arc::new(publisher.clone()));
    let app = app::build_router(state);
    let listener = bind_listener(config.ip, config.port)
        .await
        .unwrap_or_else(|err| fatal("bind listener", err));

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
    }

    let flushed = tokio::task::spawn_blocking(move || publisher.flush(FLUSH_TIMEOUT)).await;
    match flushed {
        Ok(Ok(())) => tracing::info!("collection service stopped"),
        Ok(Err(err)) => tracing::warn!(error = %err, "kafka flush incomplete"),
        Err(err) => tracing::warn!(error = %err, "kafka flush aborted"),
    }
}

fn fatal(context: &str, err: impl std::fmt::Display) -> ! {
    tracing::error!(error = %err, "{context}");
    process::exit(1);
}
