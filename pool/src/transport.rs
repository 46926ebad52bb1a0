//! The seam to whatever carries messages between networks.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use rebase_types::{Address, ChainSelector, MessageId};
use serde::{Deserialize, Serialize};

type Blake2b256 = Blake2b<U32>;

/// A message on its way out, as handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub source_chain: ChainSelector,
    pub source_pool: Address,
    pub destination: ChainSelector,
    /// Encoded [`crate::OutboundMessage`].
    pub payload: Vec<u8>,
}

/// A message as it arrives at the destination pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub message_id: MessageId,
    pub envelope: Envelope,
}

/// Cross-network message passing.
///
/// The transport is expected to deliver each accepted envelope to the
/// destination pool exactly once. Replay protection is its concern.
pub trait MessageTransport {
    /// Fee the transport charges for carrying `envelope`.
    fn estimate_fee(&self, envelope: &Envelope) -> u128;

    /// Accept `envelope` for delivery. An `Err` carries the transport's
    /// rejection reason.
    fn send(&mut self, envelope: Envelope) -> Result<MessageId, String>;
}

/// Blake2b-256 of the source chain, the transport's per-source nonce and the
/// payload.
pub fn derive_message_id(source_chain: ChainSelector, nonce: u64, payload: &[u8]) -> MessageId {
    let mut hasher = Blake2b256::new();
    hasher.update(source_chain.to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    hasher.update(payload);
    MessageId::from(<[u8; 32]>::from(hasher.finalize()))
}
