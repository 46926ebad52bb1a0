//! Per-remote-network lane configuration.

use crate::error::Direction;
use crate::rate_limiter::{RateLimiterConfig, TokenBucket};
use rebase_types::{Address, ChainSelector, Timestamp};
use serde::{Deserialize, Serialize};

/// Upsert record for one remote network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainUpdate {
    pub remote_chain: ChainSelector,
    pub allowed: bool,
    pub remote_pool: Address,
    pub remote_token: Address,
    pub outbound: RateLimiterConfig,
    pub inbound: RateLimiterConfig,
}

/// A configured path to one remote network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lane {
    pub allowed: bool,
    pub remote_pool: Address,
    pub remote_token: Address,
    outbound: TokenBucket,
    inbound: TokenBucket,
}

impl Lane {
    pub fn new(update: &ChainUpdate, now: Timestamp) -> Self {
        Self {
            allowed: update.allowed,
            remote_pool: update.remote_pool.clone(),
            remote_token: update.remote_token.clone(),
            outbound: TokenBucket::new(update.outbound, now),
            inbound: TokenBucket::new(update.inbound, now),
        }
    }

    /// Apply an update to an existing lane. Buckets keep their tokens,
    /// capped at the new capacities.
    pub fn update(&mut self, update: &ChainUpdate, now: Timestamp) {
        self.allowed = update.allowed;
        self.remote_pool = update.remote_pool.clone();
        self.remote_token = update.remote_token.clone();
        self.outbound.set_config(update.outbound, now);
        self.inbound.set_config(update.inbound, now);
    }

    pub fn bucket(&self, direction: Direction) -> &TokenBucket {
        match direction {
            Direction::Outbound => &self.outbound,
            Direction::Inbound => &self.inbound,
        }
    }

    pub fn bucket_mut(&mut self, direction: Direction) -> &mut TokenBucket {
        match direction {
            Direction::Outbound => &mut self.outbound,
            Direction::Inbound => &mut self.inbound,
        }
    }
}
