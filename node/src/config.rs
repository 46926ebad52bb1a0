//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use rebase_pool::{ChainUpdate, RateLimiterConfig};
use rebase_types::{Address, ChainSelector, InterestRate, LedgerParams};

use crate::logging::{self, LogFormat};
use crate::NodeError;

/// Configuration for one network's node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Selector of the network this node serves.
    #[serde(default = "default_chain_selector")]
    pub chain_selector: ChainSelector,

    /// Ledger administrator and pool owner.
    #[serde(default = "default_admin")]
    pub admin: Address,

    #[serde(default = "default_vault_address")]
    pub vault_address: Address,

    #[serde(default = "default_pool_address")]
    pub pool_address: Address,

    /// Global interest rate at genesis, per second, scaled by 10^18.
    #[serde(default = "default_interest_rate")]
    pub initial_interest_rate: u64,

    #[serde(default = "default_token_name")]
    pub token_name: String,

    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Remote networks this node's pool talks to.
    #[serde(default)]
    pub lanes: Vec<LaneConfig>,
}

/// One `[[lanes]]` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConfig {
    pub remote_chain: ChainSelector,

    #[serde(default = "default_true")]
    pub allowed: bool,

    pub remote_pool: Address,

    pub remote_token: Address,

    #[serde(default)]
    pub outbound: LimiterConfig,

    #[serde(default)]
    pub inbound: LimiterConfig,
}

/// Rate-limiter settings as written in TOML. Omitted means disabled.
///
/// `capacity` and `rate` are raw token units and are written as decimal
/// strings, since TOML integers stop at `i64::MAX`. Plain integers are
/// accepted on input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, with = "raw_amount")]
    pub capacity: u128,
    /// Tokens refilled per second.
    #[serde(default, with = "raw_amount")]
    pub rate: u128,
}

/// `u128` token amounts as decimal strings.
mod raw_amount {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Integer(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Integer(value) => Ok(u128::from(value)),
            Repr::Text(text) => text
                .trim()
                .replace('_', "")
                .parse::<u128>()
                .map_err(|e| de::Error::custom(format!("invalid amount {text:?}: {e}"))),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_chain_selector() -> ChainSelector {
    ChainSelector::new(1)
}

fn default_admin() -> Address {
    Address::new("rb_admin")
}

fn default_vault_address() -> Address {
    Address::new("rb_vault")
}

fn default_pool_address() -> Address {
    Address::new("rb_pool")
}

fn default_interest_rate() -> u64 {
    // 5e10 fits comfortably in a TOML integer.
    rebase_types::DEFAULT_INTEREST_RATE.raw() as u64
}

fn default_token_name() -> String {
    LedgerParams::default().name
}

fn default_token_symbol() -> String {
    LedgerParams::default().symbol
}

fn default_token_decimals() -> u8 {
    LedgerParams::default().decimals
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams {
            initial_interest_rate: InterestRate::new(u128::from(self.initial_interest_rate)),
            name: self.token_name.clone(),
            symbol: self.token_symbol.clone(),
            decimals: self.token_decimals,
        }
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// Install the global subscriber with this configuration's format and
    /// level.
    pub fn init_logging(&self) -> Result<(), NodeError> {
        logging::init_logging(self.log_format()?, &self.log_level)
    }

    /// The configured lanes as pool chain updates.
    pub fn chain_updates(&self) -> Vec<ChainUpdate> {
        self.lanes
            .iter()
            .map(|lane| ChainUpdate {
                remote_chain: lane.remote_chain,
                allowed: lane.allowed,
                remote_pool: lane.remote_pool.clone(),
                remote_token: lane.remote_token.clone(),
                outbound: lane.outbound.into(),
                inbound: lane.inbound.into(),
            })
            .collect()
    }
}

impl From<LimiterConfig> for RateLimiterConfig {
    fn from(config: LimiterConfig) -> Self {
        RateLimiterConfig {
            is_enabled: config.enabled,
            capacity: config.capacity,
            rate: config.rate,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            chain_selector: default_chain_selector(),
            admin: default_admin(),
            vault_address: default_vault_address(),
            pool_address: default_pool_address(),
            initial_interest_rate: default_interest_rate(),
            token_name: default_token_name(),
            token_symbol: default_token_symbol(),
            token_decimals: default_token_decimals(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            lanes: Vec::new(),
        }
    }
}
