use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::auth::{AdminAllowlist, AdminAuth};

/// Configuration for the registry service and CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding the sled database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Interface the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Addresses allowed in `x-admin-address`, matched case-insensitively.
    /// Empty means any attribution is accepted with a valid token.
    #[serde(default)]
    pub admin_addresses: Vec<String>,

    /// Shared admin token; admin routes are closed when unset
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Maximum accepted request body (bytes); eligibility lists can be large
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("airdrop-data")
}
fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7080
}
fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind: default_bind(),
            port: default_port(),
            admin_addresses: Vec::new(),
            admin_token: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: RegistryConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config {}", path.display()))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        // AIRDROP_DATA_DIR
        if let Ok(val) = env::var("AIRDROP_DATA_DIR") {
            if !val.trim().is_empty() {
                self.data_dir = PathBuf::from(val.trim());
            }
        }

        // AIRDROP_BIND
        if let Ok(val) = env::var("AIRDROP_BIND") {
            if !val.trim().is_empty() {
                self.bind = val.trim().to_string();
            }
        }

        // AIRDROP_PORT
        if let Ok(val) = env::var("AIRDROP_PORT") {
            if let Ok(port) = val.trim().parse::<u16>() {
                self.port = port;
            }
        }

        // AIRDROP_ADMINS: comma-separated addresses
        if let Ok(val) = env::var("AIRDROP_ADMINS") {
            self.admin_addresses = parse_address_list(&val);
        }

        // AIRDROP_ADMIN_TOKEN
        if let Ok(val) = env::var("AIRDROP_ADMIN_TOKEN") {
            if !val.is_empty() {
                self.admin_token = Some(val);
            }
        }

        // AIRDROP_MAX_BODY_BYTES
        if let Ok(val) = env::var("AIRDROP_MAX_BODY_BYTES") {
            if let Ok(num) = val.trim().parse::<usize>() {
                self.max_body_bytes = num;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("data_dir must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be at least 1"));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.bind, self.port))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("registry.db")
    }

    /// Admin authorization built from the configured allowlist and token
    pub fn admin_auth(&self) -> AdminAuth {
        AdminAuth::allowlist(
            AdminAllowlist::new(&self.admin_addresses),
            self.admin_token.clone(),
        )
    }
}

pub fn parse_address_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = RegistryConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.socket_addr().unwrap().port(), 7080);
        assert!(cfg.db_path().ends_with("registry.db"));
    }

    #[test]
    fn test_parse_toml() {
        let cfg: RegistryConfig = toml::from_str(
            r#"
            data_dir = "/tmp/airdrops"
            port = 9000
            admin_addresses = ["0xAdmin"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bind, "127.0.0.1");
        assert_eq!(cfg.admin_addresses, vec!["0xAdmin".to_string()]);
        assert!(cfg.admin_token.is_none());
    }

    #[test]
    fn test_parse_address_list() {
        assert_eq!(
            parse_address_list(" 0xa, ,0xB,"),
            vec!["0xa".to_string(), "0xB".to_string()]
        );
    }

    #[test]
    fn test_bad_bind_rejected() {
        let cfg = RegistryConfig {
            bind: "not an ip".into(),
            ..RegistryConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
