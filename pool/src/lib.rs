//! Cross-network pool adapter.
//!
//! One pool per network. Sending burns the holder's balance on the source
//! network and ships the holder's locked interest rate inside the message;
//! receiving mints on the destination network and locks the carried rate
//! for a holder arriving with no balance. The two sides share nothing but
//! the message.
//!
//! Lanes (one per remote network) carry an allow flag, the remote pool and
//! token addresses, and an independent token-bucket limiter per direction.

pub mod error;
pub mod lane;
pub mod message;
pub mod pool;
pub mod rate_limiter;
pub mod transport;

pub use error::{Direction, PoolError};
pub use lane::{ChainUpdate, Lane};
pub use message::OutboundMessage;
pub use pool::{LockOrBurnReceipt, LockOrBurnRequest, ReleaseOrMintOutcome, RebaseTokenPool};
pub use rate_limiter::{RateLimited, RateLimiterConfig, TokenBucket};
pub use transport::{derive_message_id, Delivery, Envelope, MessageTransport};
