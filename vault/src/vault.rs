//! Deposit and redemption against the ledger.

use crate::error::VaultError;
use rebase_ledger::RebaseLedger;
use rebase_types::{Address, Timestamp};
use tracing::{info, warn};

/// Pays native asset out of the vault.
///
/// Implemented by whatever moves the network's native asset; an `Err`
/// carries the recipient's or runtime's rejection reason.
pub trait NativeTransfer {
    fn transfer(&mut self, to: &Address, amount: u128) -> Result<(), String>;
}

/// Holds native collateral and mints/burns ledger balance against it.
///
/// The vault's `address` must hold the ledger's mint-and-burn role.
#[derive(Clone, Debug)]
pub struct CollateralVault {
    address: Address,
    /// Native asset currently held.
    reserve: u128,
}

impl CollateralVault {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            reserve: 0,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn reserve(&self) -> u128 {
        self.reserve
    }

    /// Accept a native payment of `value` from `caller` and mint the same
    /// amount of ledger balance to them.
    pub fn deposit(
        &mut self,
        ledger: &mut RebaseLedger,
        caller: &Address,
        value: u128,
        now: Timestamp,
    ) -> Result<(), VaultError> {
        let reserve = self
            .reserve
            .checked_add(value)
            .ok_or(VaultError::ReserveOverflow)?;
        ledger.mint(&self.address, caller, value, now)?;
        self.reserve = reserve;
        info!(%caller, value, reserve, "deposited");
        Ok(())
    }

    /// Unsolicited native credit. Grows the reserve without minting.
    pub fn fund_rewards(&mut self, from: &Address, value: u128) -> Result<(), VaultError> {
        self.reserve = self
            .reserve
            .checked_add(value)
            .ok_or(VaultError::ReserveOverflow)?;
        info!(%from, value, reserve = self.reserve, "reserve funded");
        Ok(())
    }

    /// Burn `amount` of the caller's balance and pay it out in native asset.
    /// [`rebase_types::FULL_BALANCE`] redeems everything, interest included.
    ///
    /// The burn is only written once the payout has succeeded, so a failed
    /// payout leaves both the ledger and the reserve untouched. Returns the
    /// amount paid.
    pub fn redeem(
        &mut self,
        ledger: &mut RebaseLedger,
        native: &mut dyn NativeTransfer,
        caller: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        let pending = ledger.prepare_burn(&self.address, caller, amount, now)?;
        let amount = pending.amount();

        if amount > self.reserve {
            warn!(%caller, amount, reserve = self.reserve, "redeem exceeds native reserve");
            return Err(VaultError::TransferFailed {
                to: caller.clone(),
                amount,
                reason: format!("reserve holds only {}", self.reserve),
            });
        }
        native.transfer(caller, amount).map_err(|reason| {
            warn!(%caller, amount, %reason, "native payout rejected");
            VaultError::TransferFailed {
                to: caller.clone(),
                amount,
                reason,
            }
        })?;

        pending.commit();
        self.reserve -= amount;
        info!(%caller, amount, reserve = self.reserve, "redeemed");
        Ok(amount)
    }
}
