use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ConfigError, ConfigLoader};

fn default_confirmation_timeout_ms() -> u64 {
    120_000
}

fn default_backfill_page_size() -> u64 {
    50
}

fn default_max_reconnect_backoff_ms() -> u64 {
    60_000
}

fn default_server_port() -> u16 {
    10_000
}

fn default_storage_path() -> String {
    "data".to_string()
}

/// Agent configuration, loaded from a JSON file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// HTTP JSON-RPC endpoint of the network node
    pub rpc_url: String,
    /// WebSocket endpoint used for live log subscriptions
    pub ws_url: String,
    /// Address of the exchange contract
    pub contract_address: String,
    pub chain_id: u64,
    /// Whether the daily midnight-UTC trigger is armed at startup
    pub daily_trigger_enabled: bool,
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,
    #[serde(default = "default_backfill_page_size")]
    pub backfill_page_size: u64,
    #[serde(default = "default_max_reconnect_backoff_ms")]
    pub max_reconnect_backoff_ms: u64,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    /// Directory for persisted cursors and the last-fired date
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
}

impl AgentConfig {
    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        Address::from_str(&self.contract_address).map_err(|e| {
            ConfigError::validation_error(format!(
                "Invalid contract address {}: {}",
                self.contract_address, e
            ))
        })
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn max_reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_backoff_ms)
    }
}

impl ConfigLoader for AgentConfig {
    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !Self::is_json_file(path) {
            return Err(ConfigError::file_error(path, "config file must be JSON"));
        }

        let file = std::fs::File::open(path)
            .map_err(|e| ConfigError::file_error(path, e.to_string()))?;
        let config: AgentConfig = serde_json::from_reader(file)
            .map_err(|e| ConfigError::parse_error(path, e.to_string()))?;

        // Validate the config after loading
        if let Err(validation_error) = config.validate() {
            return Err(ConfigError::validation_error(validation_error));
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let rpc = Url::parse(&self.rpc_url).map_err(|e| format!("Invalid rpc_url: {}", e))?;
        if rpc.scheme() != "http" && rpc.scheme() != "https" {
            return Err("rpc_url must be an http(s) URL".to_string());
        }

        let ws = Url::parse(&self.ws_url).map_err(|e| format!("Invalid ws_url: {}", e))?;
        if ws.scheme() != "ws" && ws.scheme() != "wss" {
            return Err("ws_url must be a ws(s) URL".to_string());
        }

        Address::from_str(&self.contract_address)
            .map_err(|e| format!("Invalid contract_address: {}", e))?;

        if self.backfill_page_size == 0 {
            return Err("backfill_page_size must be greater than zero".to_string());
        }

        if self.confirmation_timeout_ms == 0 {
            return Err("confirmation_timeout_ms must be greater than zero".to_string());
        }

        if self.max_reconnect_backoff_ms == 0 {
            return Err("max_reconnect_backoff_ms must be greater than zero".to_string());
        }

        Ok(())
    }
}
