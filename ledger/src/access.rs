//! Role table consulted by the ledger's privileged entry points.
//!
//! One administrator owns rate changes and role grants. The mint-and-burn
//! capability is a plain set membership check against the caller passed
//! into each call.

use crate::error::LedgerError;
use rebase_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A capability that can be granted to an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// May call `mint` and `burn` on behalf of any holder.
    MintAndBurn,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MintAndBurn => "mint-and-burn",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrator identity plus the set of mint-and-burn holders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessControl {
    admin: Address,
    mint_and_burn: BTreeSet<Address>,
}

impl AccessControl {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            mint_and_burn: BTreeSet::new(),
        }
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn is_admin(&self, account: &Address) -> bool {
        self.admin == *account
    }

    pub fn has_role(&self, capability: Capability, account: &Address) -> bool {
        match capability {
            Capability::MintAndBurn => self.mint_and_burn.contains(account),
        }
    }

    /// Fail with `Unauthorized` unless `caller` is the administrator.
    pub fn require_admin(&self, caller: &Address) -> Result<(), LedgerError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                required: "administrator",
            })
        }
    }

    /// Fail with `Unauthorized` unless `caller` holds `capability`.
    pub fn require(&self, capability: Capability, caller: &Address) -> Result<(), LedgerError> {
        if self.has_role(capability, caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                required: capability.as_str(),
            })
        }
    }

    /// Returns `true` if the grant changed the table.
    pub fn grant(&mut self, capability: Capability, account: Address) -> bool {
        match capability {
            Capability::MintAndBurn => self.mint_and_burn.insert(account),
        }
    }

    /// Returns `true` if the revoke changed the table.
    pub fn revoke(&mut self, capability: Capability, account: &Address) -> bool {
        match capability {
            Capability::MintAndBurn => self.mint_and_burn.remove(account),
        }
    }
}
