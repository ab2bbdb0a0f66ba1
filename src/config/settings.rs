use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub hub: HubSettings,
    pub logging: LoggingSettings,
}

/// Address the WebSocket endpoint binds to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fan-out tuning for the broadcast hub.
///
/// `send_timeout_ms` bounds how long a single subscriber may hold up a publish;
/// `channel_capacity` is the number of frames buffered per connection before
/// sends start waiting on that bound.
#[derive(Debug, Deserialize, Clone)]
pub struct HubSettings {
    pub send_timeout_ms: u64,
    pub channel_capacity: usize,
}

impl HubSettings {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Tokio channels panic on a zero capacity.
    pub fn capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub hub: Option<PartialHubSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialHubSettings {
    pub send_timeout_ms: Option<u64>,
    pub channel_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Overlay whatever was provided onto `base`.
    pub fn merge_onto(self, base: Settings) -> Settings {
        let server = self.server;
        let hub = self.hub;
        let logging = self.logging;

        Settings {
            server: ServerSettings {
                host: server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(base.server.host),
                port: server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(base.server.port),
            },
            hub: HubSettings {
                send_timeout_ms: hub
                    .as_ref()
                    .and_then(|h| h.send_timeout_ms)
                    .unwrap_or(base.hub.send_timeout_ms),
                channel_capacity: hub
                    .as_ref()
                    .and_then(|h| h.channel_capacity)
                    .unwrap_or(base.hub.channel_capacity),
            },
            logging: LoggingSettings {
                level: logging
                    .and_then(|l| l.level)
                    .unwrap_or(base.logging.level),
            },
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            hub: HubSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            send_timeout_ms: 2000,
            channel_capacity: 32,
        }
    }
}
