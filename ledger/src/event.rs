//! Events emitted by the ledger for subscribers.

use crate::access::Capability;
use rebase_types::{Address, InterestRate};
use std::fmt;

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Principal moved. `from == None` is a mint, `to == None` is a burn.
    Transfer {
        from: Option<Address>,
        to: Option<Address>,
        amount: u128,
    },
    /// Accrued interest was realised into a holder's principal.
    InterestSettled { holder: Address, interest: u128 },
    /// The global interest rate was lowered (or re-set to its current value).
    InterestRateSet { rate: InterestRate },
    /// An allowance was set.
    Approval {
        owner: Address,
        spender: Address,
        amount: u128,
    },
    RoleGranted {
        capability: Capability,
        account: Address,
    },
    RoleRevoked {
        capability: Capability,
        account: Address,
    },
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners run inline on the mutating call, after its state has been
/// committed; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
