//! Vault-specific errors.

use rebase_ledger::LedgerError;
use rebase_types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("native transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: Address,
        amount: u128,
        reason: String,
    },

    #[error("native reserve overflow")]
    ReserveOverflow,
}
