use std::env;
use std::time::Duration;

use crate::name::Name;

/// Prefix under which requests are accepted.
pub const ROOT_PREFIX: &str = "/thisRoom/pi";
/// How long an access code stays valid.
pub const ROTATION_INTERVAL: Duration = Duration::from_secs(30);
/// Delay between iterations of the main loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// BCM line numbers of outputs 1, 2 and 3.
pub const OUTPUT_PINS: [u8; 3] = [2, 3, 4];

#[derive(Debug, Clone)]
pub struct Config {
    pub broker: BrokerConfig,
    /// Identity used to sign responses.
    pub identity: Name,
}

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub topic_prefix: String,
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            broker: BrokerConfig {
                host: env_or_default("NDN_BROKER_HOST", "localhost".to_string()),
                port: env_or_default("NDN_BROKER_PORT", 1883),
                username: env_optional("NDN_USERNAME"),
                password: env_optional("NDN_PASSWORD"),
                client_id: env_or_default("NDN_CLIENT_ID", "led-responder".to_string()),
                topic_prefix: env_or_default("NDN_TOPIC_PREFIX", "ndn".to_string()),
            },
            identity: Name::from_uri(&env_or_default(
                "NDN_IDENTITY",
                "/thisRoom/identity".to_string(),
            )),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.broker.host.is_empty() {
            return Err("NDN_BROKER_HOST must not be empty".into());
        }
        if self.broker.port == 0 {
            return Err("NDN_BROKER_PORT must be > 0".into());
        }
        if self.broker.topic_prefix.is_empty()
            || self.broker.topic_prefix.contains(['+', '#'])
        {
            return Err("NDN_TOPIC_PREFIX must be a non-empty topic without wildcards".into());
        }
        if self.broker.username.is_some() != self.broker.password.is_some() {
            return Err("NDN_USERNAME and NDN_PASSWORD must be set together".into());
        }
        if self.identity.is_empty() {
            return Err("NDN_IDENTITY must not be empty".into());
        }
        Ok(())
    }

    pub fn root_prefix(&self) -> Name {
        Name::from_uri(ROOT_PREFIX)
    }
}
