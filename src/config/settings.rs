use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration for the message queue client.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

/// Where the broker lives.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
}

/// How this client identifies itself and paces its background flows.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientSettings {
    /// Name of this client's delivery queue on the broker.
    pub name: String,
    /// Pause after a failed connect before trying again.
    pub retry_interval_ms: u64,
    /// Pause after a poll that delivered nothing.
    pub poll_interval_ms: u64,
    /// Read/write timeout on broker connections; `0` disables it.
    pub io_timeout_ms: u64,
}

impl ClientSettings {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        (self.io_timeout_ms > 0).then(|| Duration::from_millis(self.io_timeout_ms))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Settings as found in files or the environment, every field optional.
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub client: Option<PartialClientSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub name: Option<String>,
    pub retry_interval_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub io_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// The login name when `USER` is set, otherwise a fresh `client-<uuid>`.
pub fn default_name() -> String {
    std::env::var("USER")
        .ok()
        .filter(|user| !user.is_empty())
        .unwrap_or_else(|| format!("client-{}", uuid::Uuid::new_v4()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                host: "127.0.0.1".to_string(),
                port: 9000,
            },
            client: ClientSettings {
                name: default_name(),
                retry_interval_ms: 250,
                poll_interval_ms: 100,
                io_timeout_ms: 0,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Fill every missing field from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let broker = self.broker;
        let client = self.client;
        let logging = self.logging;

        Settings {
            broker: BrokerSettings {
                host: broker
                    .as_ref()
                    .and_then(|b| b.host.clone())
                    .unwrap_or(default.broker.host),
                port: broker
                    .as_ref()
                    .and_then(|b| b.port)
                    .unwrap_or(default.broker.port),
            },
            client: ClientSettings {
                name: client
                    .as_ref()
                    .and_then(|c| c.name.clone())
                    .unwrap_or(default.client.name),
                retry_interval_ms: client
                    .as_ref()
                    .and_then(|c| c.retry_interval_ms)
                    .unwrap_or(default.client.retry_interval_ms),
                poll_interval_ms: client
                    .as_ref()
                    .and_then(|c| c.poll_interval_ms)
                    .unwrap_or(default.client.poll_interval_ms),
                io_timeout_ms: client
                    .as_ref()
                    .and_then(|c| c.io_timeout_ms)
                    .unwrap_or(default.client.io_timeout_ms),
            },
            logging: LoggingSettings {
                level: logging
                    .and_then(|l| l.level)
                    .unwrap_or(default.logging.level),
            },
        }
    }
}
