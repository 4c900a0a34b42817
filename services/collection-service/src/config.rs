use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("KAFKA_ACKS=0 never confirms delivery; use 1 or all")]
    UnconfirmedAcks,
    #[error("time-key placement needs strict decoding to read segment times")]
    KeyWithoutSegments,
}

/// How request bodies are turned into message values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Strict,
    Permissive,
}

impl FromStr for DecodeMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Ok(DecodeMode::Strict),
            "permissive" => Ok(DecodeMode::Permissive),
            _ => Err(()),
        }
    }
}

/// Where published messages land inside the topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Every message goes to one partition.
    Fixed(i32),
    /// Keyed by segment time in Unix seconds; the producer hashes the key.
    TimeKey,
    /// No key and no partition; the producer's partitioner decides.
    Default,
}

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub acks: String,
    pub message_timeout: Duration,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub ip: IpAddr,
    pub port: u16,
    pub mode: DecodeMode,
    pub placement: Placement,
    pub max_body_bytes: usize,
    pub kafka: KafkaConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside local development.
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env file loaded");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let brokers = required(&lookup, "KAFKA_ADDR")?;
        let topic = required(&lookup, "TOPIC")?;
        let ip = parsed(&lookup, "IP", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = parsed(&lookup, "COLLECTION_SERVER_PORT", 8080u16)?;
        let mode = parsed(&lookup, "DECODE_MODE", DecodeMode::Strict)?;
        let max_body_bytes = parsed(&lookup, "MAX_BODY_BYTES", 2 * 1024 * 1024usize)?;

        let placement = placement(&lookup)?;
        if placement == Placement::TimeKey && mode == DecodeMode::Permissive {
            return Err(ConfigError::KeyWithoutSegments);
        }
        let acks = acks(&lookup)?;

        let message_timeout_ms = parsed(&lookup, "KAFKA_MESSAGE_TIMEOUT_MS", 30_000u64)?;
        let connect_timeout_ms = parsed(&lookup, "KAFKA_CONNECT_TIMEOUT_MS", 5_000u64)?;

        Ok(Self {
            ip,
            port,
            mode,
            placement,
            max_body_bytes,
            kafka: KafkaConfig {
                brokers,
                topic,
                acks,
                message_timeout: Duration::from_millis(message_timeout_ms),
                connect_timeout: Duration::from_millis(connect_timeout_ms),
            },
        })
    }
}

fn placement<F>(lookup: &F) -> Result<Placement, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let placement = lookup("PUBLISH_PLACEMENT").unwrap_or_default();
    match placement.trim() {
        "" | "fixed" => match parsed(lookup, "PUBLISH_PARTITION", 0i32)? {
            partition if partition >= 0 => Ok(Placement::Fixed(partition)),
            partition => Err(ConfigError::Invalid {
                key: "PUBLISH_PARTITION",
                value: partition.to_string(),
            }),
        },
        "time-key" => Ok(Placement::TimeKey),
        "default" => Ok(Placement::Default),
        other => Err(ConfigError::Invalid {
            key: "PUBLISH_PLACEMENT",
            value: other.to_string(),
        }),
    }
}

fn acks<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let acks = parsed(lookup, "KAFKA_ACKS", "all".to_string())?;
    if acks == "0" {
        return Err(ConfigError::UnconfirmedAcks);
    }
    if !matches!(acks.as_str(), "all" | "-1" | "1") {
        return Err(ConfigError::Invalid {
            key: "KAFKA_ACKS",
            value: acks,
        });
    }
    Ok(acks)
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_collection_server() {
        let config = load(&[("KAFKA_ADDR", "kafka:9092"), ("TOPIC", "segments")]).unwrap();
        assert_eq!(config.ip, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8080);
        assert_eq!(config.mode, DecodeMode::Strict);
        assert_eq!(config.placement, Placement::Fixed(0));
        assert_eq!(config.kafka.acks, "all");
        assert_eq!(config.kafka.message_timeout, Duration::from_secs(30));
    }

    #[test]
    fn broker_and_topic_are_required() {
        assert_eq!(
            load(&[("TOPIC", "segments")]).unwrap_err(),
            ConfigError::Missing("KAFKA_ADDR")
        );
        assert_eq!(
            load(&[("KAFKA_ADDR", "kafka:9092"), ("TOPIC", "  ")]).unwrap_err(),
            ConfigError::Missing("TOPIC")
        );
    }

    #[test]
    fn reads_listen_address_and_placement() {
        let config = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("IP", "127.0.0.1"),
            ("COLLECTION_SERVER_PORT", "8091"),
            ("PUBLISH_PLACEMENT", "fixed"),
            ("PUBLISH_PARTITION", "3"),
        ])
        .unwrap();
        assert_eq!(config.ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 8091);
        assert_eq!(config.placement, Placement::Fixed(3));

        let config = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("PUBLISH_PLACEMENT", "time-key"),
        ])
        .unwrap();
        assert_eq!(config.placement, Placement::TimeKey);
    }

    #[test]
    fn rejects_fire_and_forget_acks() {
        let err = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("KAFKA_ACKS", "0"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::UnconfirmedAcks);
    }

    #[test]
    fn trims_acks_like_other_values() {
        let config = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("KAFKA_ACKS", " 1 "),
        ])
        .unwrap();
        assert_eq!(config.kafka.acks, "1");

        let config = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("KAFKA_ACKS", " all"),
        ])
        .unwrap();
        assert_eq!(config.kafka.acks, "all");
    }

    #[test]
    fn decode_mode_accepts_only_strict_or_permissive() {
        assert_eq!("Strict".parse::<DecodeMode>(), Ok(DecodeMode::Strict));
        assert_eq!(
            "permissive".parse::<DecodeMode>(),
            Ok(DecodeMode::Permissive)
        );
        assert_eq!("raw".parse::<DecodeMode>(), Err(()));
        let err = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("DECODE_MODE", "raw"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "DECODE_MODE",
                value: "raw".to_string()
            }
        );
    }

    #[test]
    fn rejects_time_key_without_strict_decoding() {
        let err = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("DECODE_MODE", "permissive"),
            ("PUBLISH_PLACEMENT", "time-key"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::KeyWithoutSegments);
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("COLLECTION_SERVER_PORT", "eighty"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "COLLECTION_SERVER_PORT",
                value: "eighty".to_string()
            }
        );
        assert!(load(&[
            ("KAFKA_ADDR", "kafka:9092"),
            ("TOPIC", "segments"),
            ("PUBLISH_PARTITION", "-1"),
        ])
        .is_err());
    }
}
