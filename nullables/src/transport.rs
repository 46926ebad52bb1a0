//! Nullable message transport: queue envelopes instead of relaying them.

use rebase_pool::{derive_message_id, Delivery, Envelope, MessageTransport};
use rebase_types::ChainSelector;
use std::collections::{BTreeMap, VecDeque};

/// A transport that records every accepted envelope and hands them back
/// as deliveries when the test asks for them.
pub struct NullTransport {
    fee: u128,
    /// Per-source-chain nonce feeding the message id.
    nonces: BTreeMap<ChainSelector, u64>,
    in_flight: VecDeque<Delivery>,
    sent: Vec<Delivery>,
    failure: Option<String>,
}

impl NullTransport {
    /// A transport charging a flat `fee` per message.
    pub fn new(fee: u128) -> Self {
        Self {
            fee,
            nonces: BTreeMap::new(),
            in_flight: VecDeque::new(),
            sent: Vec::new(),
            failure: None,
        }
    }

    pub fn set_fee(&mut self, fee: u128) {
        self.fee = fee;
    }

    /// Reject every subsequent send with `reason`.
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub fn recover(&mut self) {
        self.failure = None;
    }

    /// Every delivery ever accepted (for assertions).
    pub fn sent(&self) -> &[Delivery] {
        &self.sent
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Take the oldest undelivered message.
    pub fn next_delivery(&mut self) -> Option<Delivery> {
        self.in_flight.pop_front()
    }

    /// Take every undelivered message addressed to `destination`, oldest
    /// first.
    pub fn drain_for(&mut self, destination: ChainSelector) -> Vec<Delivery> {
        let (matching, rest): (VecDeque<_>, VecDeque<_>) = self
            .in_flight
            .drain(..)
            .partition(|d| d.envelope.destination == destination);
        self.in_flight = rest;
        matching.into()
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        self.nonces.clear();
        self.in_flight.clear();
        self.sent.clear();
        self.failure = None;
    }
}

impl Default for NullTransport {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MessageTransport for NullTransport {
    fn estimate_fee(&self, _envelope: &Envelope) -> u128 {
        self.fee
    }

    fn send(&mut self, envelope: Envelope) -> Result<rebase_types::MessageId, String> {
        if let Some(reason) = &self.failure {
            return Err(reason.clone());
        }
        let nonce = self.nonces.entry(envelope.source_chain).or_insert(0);
        let message_id = derive_message_id(envelope.source_chain, *nonce, &envelope.payload);
        *nonce += 1;

        let delivery = Delivery {
            message_id,
            envelope,
        };
        self.sent.push(delivery.clone());
        self.in_flight.push_back(delivery);
        Ok(message_id)
    }
}
