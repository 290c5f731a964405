//! Configuration loading for Gobang.
//!
//! Configuration is loaded from a TOML file (default: `gobang.toml`). Every
//! field has a default, so a partial file or no file at all is fine.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::MAX_NAME_CHARS;

/// Smallest frame limit accepted by [`Config::validate`]. A full-board
/// snapshot with both names at [`MAX_NAME_CHARS`] stays under it.
pub const MIN_FRAME_BYTES: usize = 4096;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// LAN play: discovery and transport.
    #[serde(default)]
    pub network: NetConfig,
    /// Player name tables.
    #[serde(default)]
    pub players: PlayersConfig,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetConfig {
    /// TCP port the host listens on (default: 5005).
    #[serde(default = "default_tcp_port")]
    pub tcp_port: u16,
    /// UDP port for discovery beacons (default: 5006).
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,
    /// Milliseconds between beacons (default: 1000).
    #[serde(default = "default_discovery_interval_ms")]
    pub discovery_interval_ms: u64,
    /// How long a scan may find nothing before hosting is offered (default: 7000).
    #[serde(default = "default_scan_timeout_ms")]
    pub scan_timeout_ms: u64,
    /// Beacon payload (default: `GOBANG_HOST`).
    #[serde(default = "default_discovery_tag")]
    pub discovery_tag: String,
    /// Beacon destination (default: 255.255.255.255).
    #[serde(default = "default_broadcast_addr")]
    pub broadcast_addr: IpAddr,
    /// Largest accepted message frame in bytes (default: 64 KiB).
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Client connect timeout (default: 3000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Host accept loop poll interval (default: 50).
    #[serde(default = "default_accept_poll_ms")]
    pub accept_poll_ms: u64,
}

/// Player name configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersConfig {
    /// Names shown before anyone picks one, Black first.
    #[serde(default = "default_names")]
    pub default_names: [String; 2],
    /// Choices cycled on the name input screen.
    #[serde(default = "default_prefilled_names")]
    pub prefilled_names: Vec<String>,
}

// Default value functions
fn default_tcp_port() -> u16 {
    5005
}

fn default_discovery_port() -> u16 {
    5006
}

fn default_discovery_interval_ms() -> u64 {
    1000
}

fn default_scan_timeout_ms() -> u64 {
    7000
}

fn default_discovery_tag() -> String {
    "GOBANG_HOST".to_string()
}

fn default_broadcast_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::BROADCAST)
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}

fn default_connect_timeout_ms() -> u64 {
    3000
}

fn default_accept_poll_ms() -> u64 {
    50
}

fn default_names() -> [String; 2] {
    crate::game::DEFAULT_NAMES.map(String::from)
}

fn default_prefilled_names() -> Vec<String> {
    ["Stella", "Sheryl", "Aaron", "Jessie"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            tcp_port: default_tcp_port(),
            discovery_port: default_discovery_port(),
            discovery_interval_ms: default_discovery_interval_ms(),
            scan_timeout_ms: default_scan_timeout_ms(),
            discovery_tag: default_discovery_tag(),
            broadcast_addr: default_broadcast_addr(),
            max_frame_bytes: default_max_frame_bytes(),
            connect_timeout_ms: default_connect_timeout_ms(),
            accept_poll_ms: default_accept_poll_ms(),
        }
    }
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            default_names: default_names(),
            prefilled_names: default_prefilled_names(),
        }
    }
}

impl NetConfig {
    pub fn discovery_interval(&self) -> Duration {
        Duration::from_millis(self.discovery_interval_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read, parsed, or validated.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Check value ranges the rest of the program relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let net = &self.network;
        if net.tcp_port == 0 {
            return Err(ConfigError::Validation("network.tcp_port must not be 0".into()));
        }
        if net.discovery_port == 0 {
            return Err(ConfigError::Validation(
                "network.discovery_port must not be 0".into(),
            ));
        }
        for (name, value) in [
            ("discovery_interval_ms", net.discovery_interval_ms),
            ("scan_timeout_ms", net.scan_timeout_ms),
            ("connect_timeout_ms", net.connect_timeout_ms),
            ("accept_poll_ms", net.accept_poll_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "network.{name} must be greater than 0"
                )));
            }
        }
        if net.discovery_tag.is_empty() {
            return Err(ConfigError::Validation(
                "network.discovery_tag must not be empty".into(),
            ));
        }
        if net.max_frame_bytes < MIN_FRAME_BYTES {
            return Err(ConfigError::Validation(format!(
                "network.max_frame_bytes must be at least {MIN_FRAME_BYTES}"
            )));
        }
        if self.players.prefilled_names.is_empty() {
            return Err(ConfigError::Validation(
                "players.prefilled_names must not be empty".into(),
            ));
        }
        let mut names = self.players.default_names.iter().chain(&self.players.prefilled_names);
        if let Some(name) = names.find(|n| n.chars().count() > MAX_NAME_CHARS) {
            return Err(ConfigError::Validation(format!(
                "player name {name:?} is longer than {MAX_NAME_CHARS} characters"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network.tcp_port, 5005);
        assert_eq!(config.network.discovery_port, 5006);
        assert_eq!(config.network.discovery_interval(), Duration::from_secs(1));
        assert_eq!(config.network.scan_timeout(), Duration::from_secs(7));
        assert_eq!(config.network.discovery_tag, "GOBANG_HOST");
        assert_eq!(config.network.max_frame_bytes, 65536);
        assert_eq!(config.players.default_names, ["Player 1", "Player 2"]);
        assert_eq!(config.players.prefilled_names.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = write_config("");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let file = write_config(
            r#"
[network]
tcp_port = 6000
broadcast_addr = "192.168.1.255"

[players]
prefilled_names = ["Ann"]
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.network.tcp_port, 6000);
        assert_eq!(config.network.discovery_port, 5006);
        assert_eq!(
            config.network.broadcast_addr,
            "192.168.1.255".parse::<IpAddr>().unwrap()
        );
        assert_eq!(config.players.prefilled_names, vec!["Ann".to_string()]);
        assert_eq!(config.players.default_names, ["Player 1", "Player 2"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Config::load(&path), Err(ConfigError::FileRead { .. })));
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[network\ntcp_port = ");
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let cases: Vec<fn(&mut Config)> = vec![
            |c| c.network.tcp_port = 0,
            |c| c.network.discovery_port = 0,
            |c| c.network.discovery_interval_ms = 0,
            |c| c.network.scan_timeout_ms = 0,
            |c| c.network.connect_timeout_ms = 0,
            |c| c.network.discovery_tag.clear(),
            |c| c.network.max_frame_bytes = 1024,
            |c| c.players.prefilled_names.push("n".repeat(MAX_NAME_CHARS + 1)),
            |c| c.players.default_names[1] = "n".repeat(MAX_NAME_CHARS + 1),
            |c| c.players.prefilled_names.clear(),
        ];
        for mutate in cases {
            let mut config = Config::default();
            mutate(&mut config);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_load_runs_validation() {
        let file = write_config("[network]\nmax_frame_bytes = 10\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_frame_bytes"));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
