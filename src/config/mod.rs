//! Configuration management

use crate::measurement::{ServiceCategory, ServiceTarget};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_catalogue")]
    pub categories: Vec<ServiceCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
    /// Minutes between periodic measurement runs.
    #[serde(default = "default_test_interval_min")]
    pub test_interval_min: u64,
    /// Maximum number of retained measurement records.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_probe")]
    pub probe: ProbeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Simulated,
    Icmp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    8080
}

fn default_test_interval_min() -> u64 {
    15
}

fn default_max_history() -> usize {
    crate::history::MAX_HISTORY
}

fn default_probe() -> ProbeKind {
    ProbeKind::Simulated
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            test_interval_min: default_test_interval_min(),
            max_history: default_max_history(),
            probe: default_probe(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            logging: LoggingConfig::default(),
            categories: default_catalogue(),
        }
    }
}

fn target(name: &str, host: &str) -> ServiceTarget {
    ServiceTarget {
        name: name.to_string(),
        host: host.to_string(),
    }
}

/// The catalogue used when no config file provides one.
fn default_catalogue() -> Vec<ServiceCategory> {
    vec![
        ServiceCategory {
            name: "social".to_string(),
            services: vec![
                target("Facebook", "facebook.com"),
                target("Instagram", "instagram.com"),
                target("Twitter/X", "twitter.com"),
                target("TikTok", "tiktok.com"),
            ],
        },
        ServiceCategory {
            name: "games".to_string(),
            services: vec![
                target("Steam", "steamcommunity.com"),
                target("Epic Games", "epicgames.com"),
                target("Xbox Live", "xbox.com"),
                target("PlayStation", "playstation.com"),
            ],
        },
    ]
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config file")?;

        if config.general.test_interval_min == 0 {
            anyhow::bail!("test_interval_min must be at least 1");
        }

        if config.general.max_history == 0 {
            anyhow::bail!("max_history must be at least 1");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.general.bind_port, 8080);
        assert_eq!(config.general.test_interval_min, 15);
        assert_eq!(config.general.max_history, 1000);
        assert_eq!(config.general.probe, ProbeKind::Simulated);
        assert_eq!(config.logging.level, "info");

        // Built-in catalogue: two categories of four targets each
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].name, "social");
        assert_eq!(config.categories[0].services.len(), 4);
        assert_eq!(config.categories[1].name, "games");
        assert_eq!(config.categories[1].services.len(), 4);
    }

    #[test]
    fn full_config_parses() {
        let config = Config::parse(
            r#"
            [general]
            bind_address = "127.0.0.1"
            bind_port = 9000
            test_interval_min = 5
            max_history = 50
            probe = "icmp"

            [logging]
            level = "debug"

            [[categories]]
            name = "dns"
            services = [
                { name = "Cloudflare", host = "1.1.1.1" },
                { name = "Google", host = "8.8.8.8" },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(config.general.bind_address, "127.0.0.1");
        assert_eq!(config.general.bind_port, 9000);
        assert_eq!(config.general.test_interval_min, 5);
        assert_eq!(config.general.max_history, 50);
        assert_eq!(config.general.probe, ProbeKind::Icmp);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].services[1].host, "8.8.8.8");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = Config::parse("[general]\ntest_interval_min = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn zero_history_capacity_is_rejected() {
        let result = Config::parse("[general]\nmax_history = 0\n");
        assert!(result.is_err());
    }
}
