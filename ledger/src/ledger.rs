//! The rebasing ledger: one instance per network.

use crate::access::{AccessControl, Capability};
use crate::account::HolderAccount;
use crate::error::LedgerError;
use crate::event::{EventBus, LedgerEvent};
use rebase_types::{Address, InterestRate, LedgerParams, Timestamp, FULL_BALANCE};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// The ledger core: holder accounts, the global rate, roles and allowances.
///
/// Reads project accrued interest without writing. Every mutator first
/// settles each holder it touches, validates the whole operation against
/// the settled state, and only then writes; a failed call leaves nothing
/// behind.
///
/// Time is always supplied by the caller, never read from the system clock.
#[derive(Debug)]
pub struct RebaseLedger {
    params: LedgerParams,
    /// Global rate handed to holders at mint time. Never increases.
    interest_rate: InterestRate,
    accounts: HashMap<Address, HolderAccount>,
    /// `(owner, spender) -> remaining allowance`.
    allowances: HashMap<(Address, Address), u128>,
    /// Sum of realised principal over all holders.
    total_supply: u128,
    access: AccessControl,
    events: EventBus,
}

/// A validated burn that has not been written yet.
///
/// Holds the ledger mutably, so nothing else can change it in between.
/// [`PendingBurn::commit`] writes the burn; dropping the value discards it
/// and leaves the ledger exactly as it was. Used by callers that must
/// perform an external step (a payout, a message send) which may still fail
/// after the burn has been validated.
#[must_use = "a pending burn does nothing unless committed"]
pub struct PendingBurn<'a> {
    ledger: &'a mut RebaseLedger,
    holder: Address,
    amount: u128,
    interest: u128,
    account: HolderAccount,
    total_supply: u128,
}

/// A validated transfer, computed against settled state.
struct TransferPlan {
    from: Address,
    to: Address,
    amount: u128,
    from_account: HolderAccount,
    from_interest: u128,
    /// `None` for a self-transfer, where only settlement happens.
    to_account: Option<(HolderAccount, u128)>,
    total_supply: u128,
}

impl RebaseLedger {
    pub fn new(admin: Address, params: LedgerParams) -> Self {
        Self {
            interest_rate: params.initial_interest_rate,
            params,
            accounts: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            access: AccessControl::new(admin),
            events: EventBus::new(),
        }
    }

    // ── Metadata ───────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn symbol(&self) -> &str {
        &self.params.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.params.decimals
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Principal plus interest accrued up to `now`. Saturates on overflow.
    pub fn balance_of(&self, holder: &Address, now: Timestamp) -> u128 {
        self.accounts
            .get(holder)
            .map(|a| a.projected_balance(now))
            .unwrap_or(0)
    }

    /// Principal plus interest accrued up to `now`, with checked arithmetic.
    pub fn balance_of_checked(
        &self,
        holder: &Address,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        match self.accounts.get(holder) {
            Some(account) => account
                .projected_balance_checked(now)
                .ok_or(LedgerError::Overflow),
            None => Ok(0),
        }
    }

    /// Stored principal, without any accrual since the last settlement.
    pub fn principal_balance_of(&self, holder: &Address) -> u128 {
        self.accounts.get(holder).map(|a| a.principal).unwrap_or(0)
    }

    /// The current global interest rate.
    pub fn get_interest_rate(&self) -> InterestRate {
        self.interest_rate
    }

    /// The holder's locked rate; zero for a holder never written.
    pub fn get_user_interest_rate(&self, holder: &Address) -> InterestRate {
        self.accounts
            .get(holder)
            .map(|a| a.locked_rate)
            .unwrap_or(InterestRate::ZERO)
    }

    pub fn last_settled_at(&self, holder: &Address) -> Option<Timestamp> {
        self.accounts.get(holder).map(|a| a.last_settled_at)
    }

    pub fn account(&self, holder: &Address) -> Option<&HolderAccount> {
        self.accounts.get(holder)
    }

    /// Sum of realised principal. Interest not yet settled is not included.
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn holder_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn admin(&self) -> &Address {
        self.access.admin()
    }

    pub fn has_role(&self, capability: Capability, account: &Address) -> bool {
        self.access.has_role(capability, account)
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Lower (or re-assert) the global interest rate.
    ///
    /// Existing holders keep their locked rates; only future mints pick up
    /// the new value.
    pub fn set_global_interest_rate(
        &mut self,
        caller: &Address,
        new_rate: InterestRate,
    ) -> Result<(), LedgerError> {
        self.authorize_admin(caller)?;
        if new_rate > self.interest_rate {
            warn!(
                current = %self.interest_rate,
                requested = %new_rate,
                "rejected global interest rate increase"
            );
            return Err(LedgerError::RateIncreaseRejected {
                current: self.interest_rate,
                requested: new_rate,
            });
        }
        self.interest_rate = new_rate;
        info!(rate = %new_rate, "global interest rate set");
        self.events
            .emit(&LedgerEvent::InterestRateSet { rate: new_rate });
        Ok(())
    }

    pub fn grant_mint_and_burn_role(
        &mut self,
        caller: &Address,
        account: Address,
    ) -> Result<(), LedgerError> {
        self.authorize_admin(caller)?;
        if self.access.grant(Capability::MintAndBurn, account.clone()) {
            info!(%account, "mint-and-burn role granted");
            self.events.emit(&LedgerEvent::RoleGranted {
                capability: Capability::MintAndBurn,
                account,
            });
        }
        Ok(())
    }

    pub fn revoke_mint_and_burn_role(
        &mut self,
        caller: &Address,
        account: &Address,
    ) -> Result<(), LedgerError> {
        self.authorize_admin(caller)?;
        if self.access.revoke(Capability::MintAndBurn, account) {
            info!(%account, "mint-and-burn role revoked");
            self.events.emit(&LedgerEvent::RoleRevoked {
                capability: Capability::MintAndBurn,
                account: account.clone(),
            });
        }
        Ok(())
    }

    // ── Mint / burn ────────────────────────────────────────────────────

    /// Mint `amount` to `holder`.
    ///
    /// Settles the holder, then re-locks the holder's rate to the current
    /// global rate. This happens on every mint: the latest deposit decides
    /// the rate for the whole balance.
    pub fn mint(
        &mut self,
        caller: &Address,
        holder: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.mint_inner(caller, holder, amount, None, now).map(|_| ())
    }

    /// Mint for a bridged arrival, keeping the rate the holder carried from
    /// the source network.
    ///
    /// If the holder has no balance here, `carried_rate` is locked instead of
    /// the local global rate. A holder that already has a balance is treated
    /// like a plain [`mint`](Self::mint). Returns the rate now locked.
    pub fn mint_with_carried_rate(
        &mut self,
        caller: &Address,
        holder: &Address,
        amount: u128,
        carried_rate: InterestRate,
        now: Timestamp,
    ) -> Result<InterestRate, LedgerError> {
        self.mint_inner(caller, holder, amount, Some(carried_rate), now)
    }

    fn mint_inner(
        &mut self,
        caller: &Address,
        holder: &Address,
        amount: u128,
        carried_rate: Option<InterestRate>,
        now: Timestamp,
    ) -> Result<InterestRate, LedgerError> {
        self.authorize(Capability::MintAndBurn, caller)?;
        let (mut account, interest) = self.settled(holder, now)?;
        account.locked_rate = match carried_rate {
            Some(rate) if account.is_empty() => rate,
            _ => self.interest_rate,
        };
        account.principal = account
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let total_supply = self
            .total_supply
            .checked_add(interest)
            .and_then(|s| s.checked_add(amount))
            .ok_or(LedgerError::Overflow)?;

        let locked_rate = account.locked_rate;
        self.accounts.insert(holder.clone(), account);
        self.total_supply = total_supply;

        info!(%holder, amount, rate = %locked_rate, "minted");
        self.emit_settlement(holder, interest);
        self.events.emit(&LedgerEvent::Transfer {
            from: None,
            to: Some(holder.clone()),
            amount,
        });
        Ok(locked_rate)
    }

    /// Burn `amount` from `holder`; [`FULL_BALANCE`] burns everything
    /// including accrued interest. Returns the amount burned.
    pub fn burn(
        &mut self,
        caller: &Address,
        holder: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        Ok(self.prepare_burn(caller, holder, amount, now)?.commit())
    }

    /// Validate a burn without writing it. See [`PendingBurn`].
    pub fn prepare_burn(
        &mut self,
        caller: &Address,
        holder: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<PendingBurn<'_>, LedgerError> {
        self.authorize(Capability::MintAndBurn, caller)?;
        let amount = self.resolve_amount(holder, amount, now)?;
        let (mut account, interest) = self.settled(holder, now)?;
        if amount > account.principal {
            warn!(%holder, amount, available = account.principal, "burn exceeds balance");
            return Err(LedgerError::InsufficientBalance {
                holder: holder.clone(),
                needed: amount,
                available: account.principal,
            });
        }
        account.principal -= amount;
        // Realised interest is added before the burn is taken out, and the
        // burn never exceeds principal + interest, so this cannot underflow.
        let total_supply = self
            .total_supply
            .checked_add(interest)
            .ok_or(LedgerError::Overflow)?
            - amount;

        Ok(PendingBurn {
            ledger: self,
            holder: holder.clone(),
            amount,
            interest,
            account,
            total_supply,
        })
    }

    // ── Transfers ──────────────────────────────────────────────────────

    /// Move `amount` from `from` to `to`; [`FULL_BALANCE`] moves the
    /// sender's entire balance. Returns the amount moved.
    ///
    /// Both parties are settled first. An empty recipient inherits the
    /// sender's locked rate; a recipient with a balance keeps its own.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        let plan = self.plan_transfer(from, to, amount, now)?;
        Ok(self.apply_transfer(plan))
    }

    /// [`transfer`](Self::transfer) on behalf of `from`, spending the
    /// allowance `from` granted to `spender`.
    ///
    /// An allowance of [`FULL_BALANCE`] is unlimited and never decremented.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        let plan = self.plan_transfer(from, to, amount, now)?;
        let allowed = self.allowance(from, spender);
        if plan.amount > allowed {
            warn!(owner = %from, %spender, allowed, amount = plan.amount, "allowance exceeded");
            return Err(LedgerError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                allowed,
                needed: plan.amount,
            });
        }
        if allowed != FULL_BALANCE {
            self.allowances
                .insert((from.clone(), spender.clone()), allowed - plan.amount);
        }
        Ok(self.apply_transfer(plan))
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
        debug!(%owner, %spender, amount, "allowance set");
        self.events.emit(&LedgerEvent::Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        });
    }

    fn plan_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<TransferPlan, LedgerError> {
        let amount = self.resolve_amount(from, amount, now)?;
        let (mut from_account, from_interest) = self.settled(from, now)?;
        if amount > from_account.principal {
            warn!(
                %from,
                %to,
                amount,
                available = from_account.principal,
                "transfer exceeds balance"
            );
            return Err(LedgerError::InsufficientBalance {
                holder: from.clone(),
                needed: amount,
                available: from_account.principal,
            });
        }

        let mut total_supply = self
            .total_supply
            .checked_add(from_interest)
            .ok_or(LedgerError::Overflow)?;

        let to_account = if from == to {
            None
        } else {
            let (mut to_account, to_interest) = self.settled(to, now)?;
            if to_account.is_empty() {
                to_account.locked_rate = from_account.locked_rate;
            }
            to_account.principal = to_account
                .principal
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
            from_account.principal -= amount;
            total_supply = total_supply
                .checked_add(to_interest)
                .ok_or(LedgerError::Overflow)?;
            Some((to_account, to_interest))
        };

        Ok(TransferPlan {
            from: from.clone(),
            to: to.clone(),
            amount,
            from_account,
            from_interest,
            to_account,
            total_supply,
        })
    }

    fn apply_transfer(&mut self, plan: TransferPlan) -> u128 {
        let TransferPlan {
            from,
            to,
            amount,
            from_account,
            from_interest,
            to_account,
            total_supply,
        } = plan;

        self.accounts.insert(from.clone(), from_account);
        let to_interest = match to_account {
            Some((account, interest)) => {
                self.accounts.insert(to.clone(), account);
                interest
            }
            None => 0,
        };
        self.total_supply = total_supply;

        info!(%from, %to, amount, "transferred");
        self.emit_settlement(&from, from_interest);
        if from != to {
            self.emit_settlement(&to, to_interest);
        }
        self.events.emit(&LedgerEvent::Transfer {
            from: Some(from),
            to: Some(to),
            amount,
        });
        amount
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// The holder's account after realising interest at `now`. Unknown
    /// holders start a fresh account whose accrual clock begins at `now`.
    fn settled(
        &self,
        holder: &Address,
        now: Timestamp,
    ) -> Result<(HolderAccount, u128), LedgerError> {
        let (account, interest) = match self.accounts.get(holder) {
            Some(account) => account.settle(now).ok_or(LedgerError::Overflow)?,
            None => (HolderAccount::new(now), 0),
        };
        debug!(%holder, interest, principal = account.principal, "settled");
        Ok((account, interest))
    }

    /// Substitute the live balance for the [`FULL_BALANCE`] sentinel.
    fn resolve_amount(
        &self,
        holder: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, LedgerError> {
        if amount == FULL_BALANCE {
            self.balance_of_checked(holder, now)
        } else {
            Ok(amount)
        }
    }

    fn authorize(&self, capability: Capability, caller: &Address) -> Result<(), LedgerError> {
        self.access.require(capability, caller).inspect_err(|_| {
            warn!(%caller, %capability, "unauthorized ledger call");
        })
    }

    fn authorize_admin(&self, caller: &Address) -> Result<(), LedgerError> {
        self.access.require_admin(caller).inspect_err(|_| {
            warn!(%caller, "unauthorized administrative call");
        })
    }

    fn emit_settlement(&self, holder: &Address, interest: u128) {
        if interest > 0 {
            self.events.emit(&LedgerEvent::InterestSettled {
                holder: holder.clone(),
                interest,
            });
        }
    }
}

impl PendingBurn<'_> {
    pub fn holder(&self) -> &Address {
        &self.holder
    }

    /// The resolved amount that will be burned.
    pub fn amount(&self) -> u128 {
        self.amount
    }

    /// The holder's locked rate (unchanged by burning).
    pub fn locked_rate(&self) -> InterestRate {
        self.account.locked_rate
    }

    /// Write the burn. Returns the amount burned.
    pub fn commit(self) -> u128 {
        let PendingBurn {
            ledger,
            holder,
            amount,
            interest,
            account,
            total_supply,
        } = self;
        ledger.accounts.insert(holder.clone(), account);
        ledger.total_supply = total_supply;

        info!(%holder, amount, "burned");
        ledger.emit_settlement(&holder, interest);
        ledger.events.emit(&LedgerEvent::Transfer {
            from: Some(holder),
            to: None,
            amount,
        });
        amount
    }
}
