//! One network's assembly: ledger, vault and pool wired together.

use rebase_ledger::{LedgerEvent, RebaseLedger};
use rebase_pool::{
    Delivery, LockOrBurnReceipt, LockOrBurnRequest, MessageTransport, RebaseTokenPool,
    ReleaseOrMintOutcome,
};
use rebase_types::{Address, ChainSelector, InterestRate, Timestamp};
use rebase_vault::{CollateralVault, NativeTransfer};
use tracing::info;

use crate::config::NodeConfig;
use crate::error::NodeError;

/// A running network: its ledger plus the vault and pool that hold the
/// ledger's mint-and-burn role.
pub struct NetworkNode {
    chain: ChainSelector,
    ledger: RebaseLedger,
    vault: CollateralVault,
    pool: RebaseTokenPool,
}

impl NetworkNode {
    /// Build a node from configuration: create the ledger, grant the vault
    /// and the pool the mint-and-burn role, and configure the lanes.
    pub fn from_config(config: &NodeConfig, now: Timestamp) -> Result<Self, NodeError> {
        let admin = &config.admin;
        let mut ledger = RebaseLedger::new(admin.clone(), config.ledger_params());
        let vault = CollateralVault::new(config.vault_address.clone());
        let mut pool = RebaseTokenPool::new(
            config.pool_address.clone(),
            admin.clone(),
            config.chain_selector,
        );

        ledger.grant_mint_and_burn_role(admin, vault.address().clone())?;
        ledger.grant_mint_and_burn_role(admin, pool.address().clone())?;
        pool.apply_chain_updates(admin, &config.chain_updates(), now)?;

        info!(
            chain = %config.chain_selector,
            rate = %ledger.get_interest_rate(),
            lanes = config.lanes.len(),
            "network node ready"
        );
        Ok(Self {
            chain: config.chain_selector,
            ledger,
            vault,
            pool,
        })
    }

    pub fn chain_selector(&self) -> ChainSelector {
        self.chain
    }

    pub fn ledger(&self) -> &RebaseLedger {
        &self.ledger
    }

    /// Direct ledger access for administration (role grants, approvals).
    pub fn ledger_mut(&mut self) -> &mut RebaseLedger {
        &mut self.ledger
    }

    pub fn vault(&self) -> &CollateralVault {
        &self.vault
    }

    pub fn pool(&self) -> &RebaseTokenPool {
        &self.pool
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.ledger.subscribe(listener);
    }

    pub fn balance_of(&self, holder: &Address, now: Timestamp) -> u128 {
        self.ledger.balance_of(holder, now)
    }

    // ── Vault ──────────────────────────────────────────────────────────

    pub fn deposit(
        &mut self,
        caller: &Address,
        value: u128,
        now: Timestamp,
    ) -> Result<(), NodeError> {
        self.vault.deposit(&mut self.ledger, caller, value, now)?;
        Ok(())
    }

    pub fn fund_rewards(&mut self, from: &Address, value: u128) -> Result<(), NodeError> {
        self.vault.fund_rewards(from, value)?;
        Ok(())
    }

    pub fn redeem(
        &mut self,
        native: &mut dyn NativeTransfer,
        caller: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, NodeError> {
        Ok(self
            .vault
            .redeem(&mut self.ledger, native, caller, amount, now)?)
    }

    // ── Ledger ─────────────────────────────────────────────────────────

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<u128, NodeError> {
        Ok(self.ledger.transfer(from, to, amount, now)?)
    }

    pub fn set_global_interest_rate(
        &mut self,
        caller: &Address,
        rate: InterestRate,
    ) -> Result<(), NodeError> {
        self.ledger.set_global_interest_rate(caller, rate)?;
        Ok(())
    }

    // ── Pool ───────────────────────────────────────────────────────────

    /// Send `request.amount` of `sender`'s balance to another network.
    pub fn bridge(
        &mut self,
        transport: &mut dyn MessageTransport,
        sender: &Address,
        request: LockOrBurnRequest,
        now: Timestamp,
    ) -> Result<LockOrBurnReceipt, NodeError> {
        Ok(self
            .pool
            .lock_or_burn(&mut self.ledger, transport, sender, request, now)?)
    }

    /// Accept a message delivered from another network.
    pub fn deliver(
        &mut self,
        delivery: &Delivery,
        now: Timestamp,
    ) -> Result<ReleaseOrMintOutcome, NodeError> {
        Ok(self.pool.release_or_mint(&mut self.ledger, delivery, now)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaneConfig;
    use rebase_ledger::{Capability, LedgerError};
    use rebase_pool::PoolError;

    fn addr(name: &str) -> Address {
        Address::new(format!("rb_{name}"))
    }

    #[test]
    fn from_config_grants_roles_and_lanes() {
        let config = NodeConfig {
            lanes: vec![LaneConfig {
                remote_chain: ChainSelector::new(2),
                allowed: true,
                remote_pool: addr("remote_pool"),
                remote_token: addr("remote_token"),
                outbound: Default::default(),
                inbound: Default::default(),
            }],
            ..NodeConfig::default()
        };
        let node = NetworkNode::from_config(&config, Timestamp::new(0)).unwrap();

        assert!(node.ledger().has_role(Capability::MintAndBurn, &config.vault_address));
        assert!(node.ledger().has_role(Capability::MintAndBurn, &config.pool_address));
        assert!(!node.ledger().has_role(Capability::MintAndBurn, &config.admin));
        assert!(node.pool().is_supported_chain(ChainSelector::new(2)));
        assert_eq!(node.pool().owner(), &config.admin);
        assert_eq!(node.chain_selector(), ChainSelector::new(1));
    }

    #[test]
    fn lane_pointing_at_itself_fails_startup() {
        let config = NodeConfig {
            lanes: vec![LaneConfig {
                remote_chain: ChainSelector::new(1),
                allowed: true,
                remote_pool: addr("remote_pool"),
                remote_token: addr("remote_token"),
                outbound: Default::default(),
                inbound: Default::default(),
            }],
            ..NodeConfig::default()
        };
        assert!(matches!(
            NetworkNode::from_config(&config, Timestamp::new(0)),
            Err(NodeError::Pool(PoolError::InvalidChainUpdate(_)))
        ));
    }

    #[test]
    fn only_admin_lowers_rate() {
        let config = NodeConfig::default();
        let mut node = NetworkNode::from_config(&config, Timestamp::new(0)).unwrap();
        assert!(matches!(
            node.set_global_interest_rate(&addr("mallory"), InterestRate::ZERO),
            Err(NodeError::Ledger(LedgerError::Unauthorized { .. }))
        ));
        node.set_global_interest_rate(&config.admin, InterestRate::ZERO)
            .unwrap();
        assert_eq!(node.ledger().get_interest_rate(), InterestRate::ZERO);
    }
}
