//! Rebasing ledger core.
//!
//! Every holder's observable balance grows linearly over time:
//! `balance(h) = principal(h) + principal(h) × rate(h) × (t_now − t_settled(h)) / 10^18`
//!
//! Interest is never written on read. It is realised into principal
//! ("settled") as the first step of every mutating operation touching a
//! holder, which is what keeps mint, burn and transfer free of double
//! accrual.
//!
//! This crate handles:
//! - Lazy balance projection and eager settlement
//! - Per-holder interest-rate locking and the monotonically decreasing global rate
//! - Role-gated mint and burn
//! - ERC-20 style transfers and allowances
//! - Synchronous event fan-out

pub mod access;
pub mod account;
pub mod error;
pub mod event;
pub mod ledger;

pub use access::{AccessControl, Capability};
pub use account::HolderAccount;
pub use error::LedgerError;
pub use event::{EventBus, LedgerEvent};
pub use ledger::{PendingBurn, RebaseLedger};
