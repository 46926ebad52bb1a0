//! Nullable infrastructure for deterministic testing.
//!
//! The outside world a network node talks to (wall clock, cross-network
//! message transport, native-asset payouts) sits behind traits or explicit
//! parameters. This crate provides test-friendly stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch a real network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod bank;
pub mod clock;
pub mod transport;

pub use bank::NullNativeBank;
pub use clock::NullClock;
pub use transport::NullTransport;
