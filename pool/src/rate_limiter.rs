//! Per-lane throughput limiter using the token bucket algorithm.
//!
//! Each lane carries one bucket per direction. Tokens represent ledger
//! units; they refill at `rate` per second up to `capacity`.

use rebase_types::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limiter parameters for one direction of a lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    pub is_enabled: bool,
    /// Maximum tokens the bucket can hold.
    pub capacity: u128,
    /// Tokens added per second.
    pub rate: u128,
}

impl RateLimiterConfig {
    /// A limiter that lets everything through.
    pub const DISABLED: Self = Self {
        is_enabled: false,
        capacity: 0,
        rate: 0,
    };

    pub const fn enabled(capacity: u128, rate: u128) -> Self {
        Self {
            is_enabled: true,
            capacity,
            rate,
        }
    }

    /// An enabled limiter needs `0 < rate <= capacity`; a disabled one must
    /// have both fields zeroed.
    pub fn validate(&self) -> Result<(), String> {
        if self.is_enabled {
            if self.capacity == 0 || self.rate == 0 {
                return Err(format!(
                    "enabled limiter needs non-zero capacity and rate (capacity {}, rate {})",
                    self.capacity, self.rate
                ));
            }
            if self.rate > self.capacity {
                return Err(format!(
                    "rate {} exceeds capacity {}",
                    self.rate, self.capacity
                ));
            }
        } else if self.capacity != 0 || self.rate != 0 {
            return Err(format!(
                "disabled limiter must have zero capacity and rate (capacity {}, rate {})",
                self.capacity, self.rate
            ));
        }
        Ok(())
    }
}

/// A consume request the bucket could not cover.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("requested {requested}, available {available}")]
pub struct RateLimited {
    pub requested: u128,
    pub available: u128,
}

/// Token bucket refilled lazily from explicit timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBucket {
    config: RateLimiterConfig,
    tokens: u128,
    last_refill: Timestamp,
}

impl TokenBucket {
    /// A new bucket starts full.
    pub fn new(config: RateLimiterConfig, now: Timestamp) -> Self {
        Self {
            config,
            tokens: config.capacity,
            last_refill: now,
        }
    }

    pub fn config(&self) -> RateLimiterConfig {
        self.config
    }

    /// Try to take `amount` tokens.
    ///
    /// A disabled bucket always allows. On rejection nothing is consumed,
    /// but the refill up to `now` is kept.
    pub fn consume(&mut self, amount: u128, now: Timestamp) -> Result<(), RateLimited> {
        if !self.config.is_enabled {
            return Ok(());
        }
        self.refill(now);
        if self.tokens < amount {
            return Err(RateLimited {
                requested: amount,
                available: self.tokens,
            });
        }
        self.tokens -= amount;
        Ok(())
    }

    /// Swap in a new configuration. Tokens refill under the old config up to
    /// `now`, then are capped at the new capacity.
    pub fn set_config(&mut self, config: RateLimiterConfig, now: Timestamp) {
        self.refill(now);
        self.tokens = if self.config.is_enabled {
            self.tokens.min(config.capacity)
        } else {
            config.capacity
        };
        self.config = config;
    }

    /// The bucket as it would look at `now`, without mutating it.
    pub fn current_state(&self, now: Timestamp) -> TokenBucket {
        let mut bucket = self.clone();
        bucket.refill(now);
        bucket
    }

    pub fn tokens(&self) -> u128 {
        self.tokens
    }

    pub fn last_refill(&self) -> Timestamp {
        self.last_refill
    }

    fn refill(&mut self, now: Timestamp) {
        if now <= self.last_refill {
            return;
        }
        if self.config.is_enabled {
            let elapsed = self.last_refill.elapsed_since(now) as u128;
            let added = elapsed.saturating_mul(self.config.rate);
            self.tokens = self.tokens.saturating_add(added).min(self.config.capacity);
        }
        self.last_refill = now;
    }
}
