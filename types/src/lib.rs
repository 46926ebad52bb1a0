//! Fundamental types for the rebasing ledger.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: holder addresses, chain selectors, timestamps, message ids,
//! amount and rate constants, and ledger genesis parameters.

pub mod address;
pub mod amount;
pub mod hash;
pub mod network;
pub mod params;
pub mod time;

pub use address::{Address, AddressError};
pub use amount::{InterestRate, FULL_BALANCE, PRECISION};
pub use hash::MessageId;
pub use network::ChainSelector;
pub use params::{LedgerParams, DEFAULT_INTEREST_RATE};
pub use time::Timestamp;
