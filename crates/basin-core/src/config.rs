//! Exchange configuration loaded from TOML or environment variables.
//!
//! The registry snapshots `label` as its identity domain (derived pool ids
//! depend on it) and `fee_bps` at pool creation, so edits to a config file
//! never retroactively change live pools.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default swap fee: 30 basis points (0.3%).
pub const DEFAULT_FEE_BPS: u64 = 30;

/// Highest permitted swap fee: 100 basis points (1%).
pub const MAX_FEE_BPS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Identity domain for derived pool ids. Two registries with different
    /// labels derive disjoint pool id spaces.
    pub label: String,
    /// Swap fee in basis points, applied to the input of every swap.
    pub fee_bps: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            label: "basin-v1".to_string(),
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: ExchangeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to
    /// defaults. Useful for containerized deployments.
    pub fn load_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let label = std::env::var("BASIN_LABEL").unwrap_or_else(|_| "basin-v1".to_string());
        let fee_bps: u64 = std::env::var("BASIN_FEE_BPS")
            .unwrap_or_else(|_| DEFAULT_FEE_BPS.to_string())
            .parse()?;
        Ok(Self { label, fee_bps })
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.label.is_empty() {
            return Err("label cannot be empty".to_string());
        }
        if self.fee_bps == 0 || self.fee_bps > MAX_FEE_BPS {
            return Err(format!(
                "fee_bps must be in 1..={} (got {})",
                MAX_FEE_BPS, self.fee_bps
            ));
        }
        Ok(())
    }
}
