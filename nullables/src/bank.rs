//! Nullable native bank: record vault payouts instead of moving funds.

use rebase_types::Address;
use rebase_vault::NativeTransfer;

/// Records every native-asset payout; can be told to reject them.
#[derive(Default)]
pub struct NullNativeBank {
    payouts: Vec<(Address, u128)>,
    rejection: Option<String>,
}

impl NullNativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent payout with `reason`.
    pub fn reject_with(&mut self, reason: impl Into<String>) {
        self.rejection = Some(reason.into());
    }

    pub fn accept(&mut self) {
        self.rejection = None;
    }

    /// All payouts made, in order.
    pub fn payouts(&self) -> &[(Address, u128)] {
        &self.payouts
    }

    /// Sum of everything paid to `to`.
    pub fn paid_to(&self, to: &Address) -> u128 {
        self.payouts
            .iter()
            .filter(|(addr, _)| addr == to)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl NativeTransfer for NullNativeBank {
    fn transfer(&mut self, to: &Address, amount: u128) -> Result<(), String> {
        if let Some(reason) = &self.rejection {
            return Err(reason.clone());
        }
        self.payouts.push((to.clone(), amount));
        Ok(())
    }
}
