//! # Configuration Management
//!
//! Structured configuration for listeners and channels: addresses,
//! timeouts, receive mode, wire format, frame-size bound, and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Environment-variable overrides via `from_env()`
//! - Direct instantiation with defaults
//!
//! The pre-shared key is deliberately not part of this structure; it is
//! provisioned separately (see [`crate::utils::crypto::SymmetricKey`]) so
//! key material never lands in config files or serialized output.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::core::frame::DEFAULT_MAX_CIPHERTEXT_LEN;
use crate::core::serialization::WireFormat;
use crate::core::source::ReceiveMode;
use crate::error::{ChannelError, Result};

/// Main configuration structure for one server or client process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Listener-side configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-channel configuration
    #[serde(default)]
    pub channel: ChannelOptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NetworkConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ChannelError::Config(format!("failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ChannelError::Config(format!("failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ChannelError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Load defaults, then apply environment-variable overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("SECURE_TRANSPORT_ADDRESS") {
            config.server.address = addr;
        }
        if let Ok(timeout) = std::env::var("SECURE_TRANSPORT_ACCEPT_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.server.accept_timeout = Duration::from_millis(val);
            }
        }
        if let Ok(timeout) = std::env::var("SECURE_TRANSPORT_RECV_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.channel.recv_timeout = Duration::from_millis(val);
            }
        }
        if let Ok(max) = std::env::var("SECURE_TRANSPORT_MAX_FRAME_BYTES") {
            if let Ok(val) = max.parse::<usize>() {
                config.channel.max_ciphertext_len = val;
            }
        }

        Ok(config)
    }

    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of problems; an empty list means the configuration is
    /// usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.channel.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ChannelError::Config(format!(
                "configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Listener-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:9000")
    pub address: String,

    /// How long one accept wait blocks before reporting an idle period
    #[serde(with = "duration_serde")]
    pub accept_timeout: Duration,

    /// Treat an idle accept period as fatal instead of looping
    pub crash_on_timeout: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::from("127.0.0.1:9000"),
            accept_timeout: Duration::from_secs(10),
            crash_on_timeout: false,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("server address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "invalid server address format: '{}' (expected format: '127.0.0.1:9000')",
                self.address
            ));
        }

        if self.accept_timeout.as_millis() < 10 {
            errors.push("accept timeout too short (minimum: 10ms)".to_string());
        } else if self.accept_timeout.as_secs() > 300 {
            errors.push("accept timeout too long (maximum: 300s)".to_string());
        }

        errors
    }
}

/// Per-channel configuration, fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOptions {
    /// Frame parsing strategy (must match the peer's expectations)
    pub mode: ReceiveMode,

    /// Payload encoding (must match the peer's)
    pub format: WireFormat,

    /// Receive-side wait bound for one message
    #[serde(with = "duration_serde")]
    pub recv_timeout: Duration,

    /// Client-side connection attempt bound
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Upper bound on a declared ciphertext length
    pub max_ciphertext_len: usize,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            mode: ReceiveMode::default(),
            format: WireFormat::default(),
            recv_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_ciphertext_len: DEFAULT_MAX_CIPHERTEXT_LEN,
        }
    }
}

impl ChannelOptions {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.recv_timeout.as_millis() < 10 {
            errors.push("receive timeout too short (minimum: 10ms)".to_string());
        }
        if self.connect_timeout.as_millis() < 10 {
            errors.push("connect timeout too short (minimum: 10ms)".to_string());
        }

        if self.max_ciphertext_len == 0 {
            errors.push("max ciphertext length cannot be 0".to_string());
        } else if self.max_ciphertext_len > u32::MAX as usize {
            errors.push(format!(
                "max ciphertext length {} does not fit the 32-bit length field",
                self.max_ciphertext_len
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("secure-transport"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("invalid log level: {level_str}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = NetworkConfig::default();
        assert!(config.validate().is_empty());
        config.validate_strict().unwrap();
    }

    #[test]
    fn bad_address_is_reported() {
        let mut config = NetworkConfig::default();
        config.server.address = "nowhere".to_string();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("invalid server address"));
        assert!(config.validate_strict().is_err());
    }

    #[test]
    fn oversized_length_bound_is_reported() {
        let mut config = NetworkConfig::default();
        config.channel.max_ciphertext_len = u32::MAX as usize + 1;
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn toml_roundtrip() {
        let config = NetworkConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = NetworkConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.server.address, config.server.address);
        assert_eq!(parsed.channel.mode, config.channel.mode);
        assert_eq!(parsed.channel.format, config.channel.format);
        assert_eq!(parsed.channel.recv_timeout, config.channel.recv_timeout);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = NetworkConfig::from_toml(
            "[server]\naddress = \"0.0.0.0:4433\"\ncrash_on_timeout = true\n",
        )
        .unwrap();
        assert_eq!(config.server.address, "0.0.0.0:4433");
        assert!(config.server.crash_on_timeout);
        assert_eq!(config.server.accept_timeout, Duration::from_secs(10));
        assert_eq!(config.channel.max_ciphertext_len, DEFAULT_MAX_CIPHERTEXT_LEN);
    }

    #[test]
    fn mode_and_format_parse_from_toml() {
        let config = NetworkConfig::from_toml(
            "[channel]\nmode = \"buffered\"\nformat = \"messagepack\"\n",
        )
        .unwrap();
        assert_eq!(config.channel.mode, ReceiveMode::Buffered);
        assert_eq!(config.channel.format, WireFormat::MessagePack);
    }
}
