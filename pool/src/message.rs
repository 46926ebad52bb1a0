//! The payload carried between pools.

use crate::error::PoolError;
use rebase_types::{Address, ChainSelector, InterestRate};
use serde::{Deserialize, Serialize};

/// What the source pool tells the destination pool about a bridged amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub destination: ChainSelector,
    pub sender: Address,
    pub recipient: Address,
    /// Amount burned on the source network.
    pub amount: u128,
    /// The sender's locked rate at the moment of the burn.
    pub sender_locked_rate: InterestRate,
}

impl OutboundMessage {
    pub fn encode(&self) -> Result<Vec<u8>, PoolError> {
        bincode::serialize(self).map_err(|e| PoolError::Codec(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PoolError> {
        bincode::deserialize(bytes).map_err(|e| PoolError::Codec(e.to_string()))
    }
}
