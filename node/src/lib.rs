//! A single network's node.
//!
//! The node owns one ledger and the two components allowed to mint and burn
//! on it:
//! - the collateral vault (native deposits in, native redemptions out)
//! - the cross-network pool (burn-and-send, receive-and-mint)
//!
//! It is built from a [`NodeConfig`] and exposes a facade over the three.

pub mod config;
pub mod error;
pub mod logging;
pub mod node;

pub use config::{LaneConfig, LimiterConfig, NodeConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::NetworkNode;
