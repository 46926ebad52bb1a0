//! Pool-specific errors.

use rebase_ledger::LedgerError;
use rebase_types::{Address, ChainSelector};
use std::fmt;
use thiserror::Error;

/// Which half of a lane a limit applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outbound => f.write_str("outbound"),
            Self::Inbound => f.write_str("inbound"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("{direction} rate limit exceeded on {remote}: requested {requested}, available {available}")]
    RateLimitExceeded {
        remote: ChainSelector,
        direction: Direction,
        requested: u128,
        available: u128,
    },

    #[error("no enabled lane for {0}")]
    UnknownRemote(ChainSelector),

    #[error("message from {remote} sent by unregistered pool {pool}")]
    UnknownRemotePool {
        remote: ChainSelector,
        pool: Address,
    },

    #[error("message addressed to {actual}, this pool serves {expected}")]
    WrongDestination {
        expected: ChainSelector,
        actual: ChainSelector,
    },

    #[error("unauthorized: {0} is not the pool owner")]
    Unauthorized(Address),

    #[error("invalid rate limit config: {0}")]
    InvalidRateLimit(String),

    #[error("invalid chain update: {0}")]
    InvalidChainUpdate(String),

    #[error("insufficient fee: required {required}, paid {paid}")]
    InsufficientFee { required: u128, paid: u128 },

    #[error("message codec error: {0}")]
    Codec(String),

    #[error("transport error: {0}")]
    Transport(String),
}
