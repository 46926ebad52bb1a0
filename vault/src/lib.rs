//! Collateral vault.
//!
//! Deposits of the network's native asset mint ledger balance 1:1.
//! Redemptions burn ledger balance (interest included) and pay the same
//! amount of native asset back out of the vault's reserve. Interest is
//! funded by topping the reserve up with unsolicited credit; keeping the
//! reserve solvent is the job of whoever funds it.

pub mod error;
pub mod vault;

pub use error::VaultError;
pub use vault::{CollateralVault, NativeTransfer};
