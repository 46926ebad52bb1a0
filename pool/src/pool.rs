//! Burn-and-send / receive-and-mint pool.

use crate::error::{Direction, PoolError};
use crate::lane::{ChainUpdate, Lane};
use crate::message::OutboundMessage;
use crate::rate_limiter::{RateLimited, TokenBucket};
use crate::transport::{Delivery, Envelope, MessageTransport};
use rebase_ledger::RebaseLedger;
use rebase_types::{Address, ChainSelector, InterestRate, MessageId, Timestamp};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// A holder's request to move balance to another network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockOrBurnRequest {
    pub destination: ChainSelector,
    pub receiver: Address,
    /// Amount to bridge, or [`rebase_types::FULL_BALANCE`].
    pub amount: u128,
    /// Fee the sender is paying for transport.
    pub fee_paid: u128,
}

/// Result of a successful send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockOrBurnReceipt {
    pub message_id: MessageId,
    /// Resolved amount burned.
    pub amount: u128,
    pub sender_locked_rate: InterestRate,
    pub fee: u128,
}

/// Result of a successful receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseOrMintOutcome {
    pub message_id: MessageId,
    pub recipient: Address,
    pub amount: u128,
    /// Rate locked for the recipient after the mint.
    pub locked_rate: InterestRate,
}

/// The pool adapter for one network.
///
/// Owns no ledger state. `address` must hold the ledger's mint-and-burn
/// role; `owner` is the only identity allowed to configure lanes.
#[derive(Clone, Debug)]
pub struct RebaseTokenPool {
    address: Address,
    owner: Address,
    local_chain: ChainSelector,
    lanes: BTreeMap<ChainSelector, Lane>,
}

impl RebaseTokenPool {
    pub fn new(address: Address, owner: Address, local_chain: ChainSelector) -> Self {
        Self {
            address,
            owner,
            local_chain,
            lanes: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn local_chain(&self) -> ChainSelector {
        self.local_chain
    }

    // ── Configuration ──────────────────────────────────────────────────

    /// Upsert lanes keyed by remote chain.
    ///
    /// The whole batch is validated before any lane is touched. Existing
    /// lanes keep their bucket levels, capped at any new capacity.
    pub fn apply_chain_updates(
        &mut self,
        caller: &Address,
        updates: &[ChainUpdate],
        now: Timestamp,
    ) -> Result<(), PoolError> {
        if caller != &self.owner {
            warn!(%caller, "chain update rejected: not the pool owner");
            return Err(PoolError::Unauthorized(caller.clone()));
        }
        for update in updates {
            if update.remote_chain == self.local_chain {
                return Err(PoolError::InvalidChainUpdate(format!(
                    "{} is the local chain",
                    update.remote_chain
                )));
            }
            update
                .outbound
                .validate()
                .and_then(|_| update.inbound.validate())
                .map_err(|reason| {
                    PoolError::InvalidRateLimit(format!("{}: {reason}", update.remote_chain))
                })?;
        }

        for update in updates {
            match self.lanes.get_mut(&update.remote_chain) {
                Some(lane) => lane.update(update, now),
                None => {
                    self.lanes
                        .insert(update.remote_chain, Lane::new(update, now));
                }
            }
            info!(
                remote = %update.remote_chain,
                allowed = update.allowed,
                remote_pool = %update.remote_pool,
                "lane configured"
            );
        }
        Ok(())
    }

    /// Whether a lane exists for `chain` and is currently allowed.
    pub fn is_supported_chain(&self, chain: ChainSelector) -> bool {
        self.lanes.get(&chain).is_some_and(|lane| lane.allowed)
    }

    /// Allowed remote chains, in ascending selector order.
    pub fn supported_chains(&self) -> Vec<ChainSelector> {
        self.lanes
            .iter()
            .filter(|(_, lane)| lane.allowed)
            .map(|(chain, _)| *chain)
            .collect()
    }

    pub fn get_remote_pool(&self, chain: ChainSelector) -> Option<&Address> {
        self.lanes.get(&chain).map(|lane| &lane.remote_pool)
    }

    pub fn get_remote_token(&self, chain: ChainSelector) -> Option<&Address> {
        self.lanes.get(&chain).map(|lane| &lane.remote_token)
    }

    pub fn current_outbound_rate_limiter_state(
        &self,
        chain: ChainSelector,
        now: Timestamp,
    ) -> Option<TokenBucket> {
        self.lanes
            .get(&chain)
            .map(|lane| lane.bucket(Direction::Outbound).current_state(now))
    }

    pub fn current_inbound_rate_limiter_state(
        &self,
        chain: ChainSelector,
        now: Timestamp,
    ) -> Option<TokenBucket> {
        self.lanes
            .get(&chain)
            .map(|lane| lane.bucket(Direction::Inbound).current_state(now))
    }

    // ── Send ───────────────────────────────────────────────────────────

    /// Transport fee for bridging `amount` at `rate` to `receiver`.
    pub fn quote_send(
        &self,
        transport: &dyn MessageTransport,
        sender: &Address,
        destination: ChainSelector,
        receiver: &Address,
        amount: u128,
        rate: InterestRate,
    ) -> Result<u128, PoolError> {
        self.allowed_lane(destination)?;
        let envelope = self.envelope(&OutboundMessage {
            destination,
            sender: sender.clone(),
            recipient: receiver.clone(),
            amount,
            sender_locked_rate: rate,
        })?;
        Ok(transport.estimate_fee(&envelope))
    }

    /// Burn the sender's balance here and hand a message carrying the
    /// amount and the sender's locked rate to the transport.
    ///
    /// The burn is written and the outbound bucket debited only after the
    /// transport has accepted the message; any earlier failure leaves the
    /// ledger and the lane untouched.
    pub fn lock_or_burn(
        &mut self,
        ledger: &mut RebaseLedger,
        transport: &mut dyn MessageTransport,
        sender: &Address,
        request: LockOrBurnRequest,
        now: Timestamp,
    ) -> Result<LockOrBurnReceipt, PoolError> {
        let destination = request.destination;
        let mut bucket = self
            .allowed_lane(destination)?
            .bucket(Direction::Outbound)
            .clone();

        let pending = ledger.prepare_burn(&self.address, sender, request.amount, now)?;
        let amount = pending.amount();
        let sender_locked_rate = pending.locked_rate();

        let envelope = self.envelope(&OutboundMessage {
            destination,
            sender: sender.clone(),
            recipient: request.receiver.clone(),
            amount,
            sender_locked_rate,
        })?;

        let fee = transport.estimate_fee(&envelope);
        if request.fee_paid < fee {
            warn!(%sender, required = fee, paid = request.fee_paid, "send rejected: fee too low");
            return Err(PoolError::InsufficientFee {
                required: fee,
                paid: request.fee_paid,
            });
        }

        bucket
            .consume(amount, now)
            .map_err(|limited| rate_limited(destination, Direction::Outbound, limited))?;

        let message_id = transport.send(envelope).map_err(|reason| {
            warn!(%sender, remote = %destination, %reason, "transport rejected message");
            PoolError::Transport(reason)
        })?;

        pending.commit();
        self.store_bucket(destination, Direction::Outbound, bucket);
        info!(
            %sender,
            receiver = %request.receiver,
            remote = %destination,
            amount,
            rate = %sender_locked_rate,
            %message_id,
            "locked and burned"
        );
        Ok(LockOrBurnReceipt {
            message_id,
            amount,
            sender_locked_rate,
            fee,
        })
    }

    // ── Receive ────────────────────────────────────────────────────────

    /// Mint a delivered amount to its recipient.
    ///
    /// A recipient with no balance here gets the sender's carried rate; a
    /// recipient that already holds balance is re-locked to the local global
    /// rate like any other mint. The recipient's accrual clock starts at
    /// `now`.
    pub fn release_or_mint(
        &mut self,
        ledger: &mut RebaseLedger,
        delivery: &Delivery,
        now: Timestamp,
    ) -> Result<ReleaseOrMintOutcome, PoolError> {
        let envelope = &delivery.envelope;
        if envelope.destination != self.local_chain {
            return Err(PoolError::WrongDestination {
                expected: self.local_chain,
                actual: envelope.destination,
            });
        }
        let source = envelope.source_chain;
        let lane = self.allowed_lane(source)?;
        if envelope.source_pool != lane.remote_pool {
            warn!(remote = %source, pool = %envelope.source_pool, "message from unregistered pool");
            return Err(PoolError::UnknownRemotePool {
                remote: source,
                pool: envelope.source_pool.clone(),
            });
        }
        let mut bucket = lane.bucket(Direction::Inbound).clone();

        let message = OutboundMessage::decode(&envelope.payload)?;
        if message.destination != self.local_chain {
            return Err(PoolError::WrongDestination {
                expected: self.local_chain,
                actual: message.destination,
            });
        }
        debug!(
            message_id = %delivery.message_id,
            remote = %source,
            amount = message.amount,
            "decoded inbound message"
        );

        bucket
            .consume(message.amount, now)
            .map_err(|limited| rate_limited(source, Direction::Inbound, limited))?;

        let locked_rate = ledger.mint_with_carried_rate(
            &self.address,
            &message.recipient,
            message.amount,
            message.sender_locked_rate,
            now,
        )?;
        self.store_bucket(source, Direction::Inbound, bucket);

        info!(
            recipient = %message.recipient,
            remote = %source,
            amount = message.amount,
            carried = %message.sender_locked_rate,
            locked = %locked_rate,
            message_id = %delivery.message_id,
            "released and minted"
        );
        Ok(ReleaseOrMintOutcome {
            message_id: delivery.message_id,
            recipient: message.recipient,
            amount: message.amount,
            locked_rate,
        })
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn allowed_lane(&self, chain: ChainSelector) -> Result<&Lane, PoolError> {
        match self.lanes.get(&chain) {
            Some(lane) if lane.allowed => Ok(lane),
            _ => {
                warn!(remote = %chain, "no enabled lane");
                Err(PoolError::UnknownRemote(chain))
            }
        }
    }

    fn envelope(&self, message: &OutboundMessage) -> Result<Envelope, PoolError> {
        Ok(Envelope {
            source_chain: self.local_chain,
            source_pool: self.address.clone(),
            destination: message.destination,
            payload: message.encode()?,
        })
    }

    fn store_bucket(&mut self, chain: ChainSelector, direction: Direction, bucket: TokenBucket) {
        if let Some(lane) = self.lanes.get_mut(&chain) {
            *lane.bucket_mut(direction) = bucket;
        }
    }
}

fn rate_limited(remote: ChainSelector, direction: Direction, limited: RateLimited) -> PoolError {
    warn!(
        %remote,
        %direction,
        requested = limited.requested,
        available = limited.available,
        "rate limit exceeded"
    );
    PoolError::RateLimitExceeded {
        remote,
        direction,
        requested: limited.requested,
        available: limited.available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RateLimiterConfig;
    use rebase_ledger::LedgerError;
    use rebase_types::{LedgerParams, FULL_BALANCE, PRECISION};

    const SOURCE: ChainSelector = ChainSelector::new(1);
    const DEST: ChainSelector = ChainSelector::new(2);
    const RATE: u128 = PRECISION / 1_000_000;
    const FEE: u128 = 7;

    /// Records envelopes and hands out sequential message ids.
    #[derive(Default)]
    struct Loopback {
        sent: Vec<Envelope>,
        fail: bool,
    }

    impl MessageTransport for Loopback {
        fn estimate_fee(&self, _envelope: &Envelope) -> u128 {
            FEE
        }

        fn send(&mut self, envelope: Envelope) -> Result<MessageId, String> {
            if self.fail {
                return Err("router offline".into());
            }
            self.sent.push(envelope);
            let mut id = [0u8; 32];
            id[31] = self.sent.len() as u8;
            Ok(MessageId::new(id))
        }
    }

    impl Loopback {
        fn deliver_last(&self) -> Delivery {
            Delivery {
                message_id: MessageId::new([self.sent.len() as u8; 32]),
                envelope: self.sent.last().cloned().unwrap(),
            }
        }
    }

    fn addr(name: &str) -> Address {
        Address::new(format!("rb_{name}"))
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn lane_to(remote: ChainSelector, remote_pool: &str, limit: RateLimiterConfig) -> ChainUpdate {
        ChainUpdate {
            remote_chain: remote,
            allowed: true,
            remote_pool: addr(remote_pool),
            remote_token: addr("token"),
            outbound: limit,
            inbound: limit,
        }
    }

    struct Network {
        ledger: RebaseLedger,
        pool: RebaseTokenPool,
    }

    fn network(
        local: ChainSelector,
        remote: ChainSelector,
        pool_name: &str,
        remote_pool: &str,
        rate: u128,
    ) -> Network {
        let params = LedgerParams {
            initial_interest_rate: InterestRate::new(rate),
            ..LedgerParams::default()
        };
        let mut ledger = RebaseLedger::new(addr("admin"), params);
        let pool = RebaseTokenPool::new(addr(pool_name), addr("owner"), local);
        ledger
            .grant_mint_and_burn_role(&addr("admin"), pool.address().clone())
            .unwrap();
        ledger
            .grant_mint_and_burn_role(&addr("admin"), addr("minter"))
            .unwrap();
        let mut net = Network { ledger, pool };
        net.pool
            .apply_chain_updates(
                &addr("owner"),
                &[lane_to(remote, remote_pool, RateLimiterConfig::DISABLED)],
                t(0),
            )
            .unwrap();
        net
    }

    fn source() -> Network {
        network(SOURCE, DEST, "pool_a", "pool_b", RATE)
    }

    fn destination() -> Network {
        network(DEST, SOURCE, "pool_b", "pool_a", RATE / 2)
    }

    fn request(amount: u128) -> LockOrBurnRequest {
        LockOrBurnRequest {
            destination: DEST,
            receiver: addr("bob"),
            amount,
            fee_paid: FEE,
        }
    }

    #[test]
    fn only_owner_configures_lanes() {
        let mut pool = RebaseTokenPool::new(addr("pool"), addr("owner"), SOURCE);
        let result = pool.apply_chain_updates(
            &addr("mallory"),
            &[lane_to(DEST, "remote", RateLimiterConfig::DISABLED)],
            t(0),
        );
        assert_eq!(result, Err(PoolError::Unauthorized(addr("mallory"))));
        assert!(!pool.is_supported_chain(DEST));
    }

    #[test]
    fn invalid_batch_applies_nothing() {
        let mut pool = RebaseTokenPool::new(addr("pool"), addr("owner"), SOURCE);
        let good = lane_to(DEST, "remote", RateLimiterConfig::DISABLED);
        let bad = lane_to(ChainSelector::new(3), "other", RateLimiterConfig::enabled(10, 20));
        let result = pool.apply_chain_updates(&addr("owner"), &[good, bad], t(0));
        assert!(matches!(result, Err(PoolError::InvalidRateLimit(_))));
        assert!(pool.supported_chains().is_empty());
    }

    #[test]
    fn lane_to_local_chain_is_rejected() {
        let mut pool = RebaseTokenPool::new(addr("pool"), addr("owner"), SOURCE);
        let result = pool.apply_chain_updates(
            &addr("owner"),
            &[lane_to(SOURCE, "remote", RateLimiterConfig::DISABLED)],
            t(0),
        );
        assert!(matches!(result, Err(PoolError::InvalidChainUpdate(_))));
    }

    #[test]
    fn chain_updates_upsert_and_can_disable() {
        let mut pool = RebaseTokenPool::new(addr("pool"), addr("owner"), SOURCE);
        let mut update = lane_to(DEST, "remote_v1", RateLimiterConfig::enabled(1000, 10));
        pool.apply_chain_updates(&addr("owner"), &[update.clone()], t(0))
            .unwrap();
        assert!(pool.is_supported_chain(DEST));
        assert_eq!(pool.get_remote_pool(DEST), Some(&addr("remote_v1")));
        assert_eq!(pool.get_remote_token(DEST), Some(&addr("token")));

        update.remote_pool = addr("remote_v2");
        update.allowed = false;
        pool.apply_chain_updates(&addr("owner"), &[update], t(1))
            .unwrap();
        assert!(!pool.is_supported_chain(DEST));
        assert!(pool.supported_chains().is_empty());
        // Disabled lanes keep their record.
        assert_eq!(pool.get_remote_pool(DEST), Some(&addr("remote_v2")));
        assert_eq!(pool.get_remote_pool(ChainSelector::new(9)), None);
    }

    #[test]
    fn reconfiguring_keeps_bucket_level() {
        let mut net = source();
        let limit = RateLimiterConfig::enabled(1000, 1);
        net.pool
            .apply_chain_updates(&addr("owner"), &[lane_to(DEST, "pool_b", limit)], t(0))
            .unwrap();
        net.ledger.mint(&addr("minter"), &addr("alice"), 600, t(0)).unwrap();
        let mut transport = Loopback::default();
        net.pool
            .lock_or_burn(&mut net.ledger, &mut transport, &addr("alice"), request(600), t(0))
            .unwrap();
        net.pool
            .apply_chain_updates(&addr("owner"), &[lane_to(DEST, "pool_b", limit)], t(0))
            .unwrap();
        let state = net.pool.current_outbound_rate_limiter_state(DEST, t(0)).unwrap();
        assert_eq!(state.tokens(), 400);
    }

    #[test]
    fn send_burns_and_carries_locked_rate() {
        let mut net = source();
        let mut transport = Loopback::default();
        net.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();

        let receipt = net
            .pool
            .lock_or_burn(&mut net.ledger, &mut transport, &addr("alice"), request(400), t(0))
            .unwrap();

        assert_eq!(receipt.amount, 400);
        assert_eq!(receipt.sender_locked_rate, InterestRate::new(RATE));
        assert_eq!(receipt.fee, FEE);
        assert_eq!(net.ledger.principal_balance_of(&addr("alice")), 600);
        assert_eq!(net.ledger.total_supply(), 600);

        let envelope = &transport.sent[0];
        assert_eq!(envelope.source_chain, SOURCE);
        assert_eq!(envelope.source_pool, addr("pool_a"));
        let message = OutboundMessage::decode(&envelope.payload).unwrap();
        assert_eq!(message.amount, 400);
        assert_eq!(message.recipient, addr("bob"));
        assert_eq!(message.sender_locked_rate, InterestRate::new(RATE));
    }

    #[test]
    fn full_balance_send_includes_accrued_interest() {
        let mut net = source();
        let mut transport = Loopback::default();
        net.ledger.mint(&addr("minter"), &addr("alice"), PRECISION, t(0)).unwrap();
        let expected = net.ledger.balance_of(&addr("alice"), t(100));

        let receipt = net
            .pool
            .lock_or_burn(
                &mut net.ledger,
                &mut transport,
                &addr("alice"),
                request(FULL_BALANCE),
                t(100),
            )
            .unwrap();

        assert_eq!(receipt.amount, expected);
        assert!(expected > PRECISION);
        assert_eq!(net.ledger.balance_of(&addr("alice"), t(100)), 0);
    }

    #[test]
    fn send_to_unknown_chain_leaves_ledger_untouched() {
        let mut net = source();
        net.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        let mut req = request(100);
        req.destination = ChainSelector::new(99);

        let mut transport = Loopback::default();
        let result = net
            .pool
            .lock_or_burn(&mut net.ledger, &mut transport, &addr("alice"), req, t(10));

        assert_eq!(result, Err(PoolError::UnknownRemote(ChainSelector::new(99))));
        assert_eq!(net.ledger.principal_balance_of(&addr("alice")), 1_000);
        assert_eq!(net.ledger.last_settled_at(&addr("alice")), Some(t(0)));
    }

    #[test]
    fn insufficient_fee_leaves_ledger_untouched() {
        let mut net = source();
        let mut transport = Loopback::default();
        net.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        let mut req = request(100);
        req.fee_paid = FEE - 1;

        let result = net
            .pool
            .lock_or_burn(&mut net.ledger, &mut transport, &addr("alice"), req, t(0));

        assert_eq!(
            result,
            Err(PoolError::InsufficientFee {
                required: FEE,
                paid: FEE - 1
            })
        );
        assert_eq!(net.ledger.principal_balance_of(&addr("alice")), 1_000);
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn outbound_rate_limit_rejects_without_burning() {
        let mut net = source();
        net.pool
            .apply_chain_updates(
                &addr("owner"),
                &[lane_to(DEST, "pool_b", RateLimiterConfig::enabled(500, 5))],
                t(0),
            )
            .unwrap();
        net.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        let mut transport = Loopback::default();

        let result = net
            .pool
            .lock_or_burn(&mut net.ledger, &mut transport, &addr("alice"), request(501), t(0));

        assert_eq!(
            result,
            Err(PoolError::RateLimitExceeded {
                remote: DEST,
                direction: Direction::Outbound,
                requested: 501,
                available: 500,
            })
        );
        assert_eq!(net.ledger.principal_balance_of(&addr("alice")), 1_000);
        assert!(transport.sent.is_empty());

        net.pool
            .lock_or_burn(&mut net.ledger, &mut transport, &addr("alice"), request(500), t(0))
            .unwrap();
        let state = net.pool.current_outbound_rate_limiter_state(DEST, t(10)).unwrap();
        assert_eq!(state.tokens(), 50);
    }

    #[test]
    fn transport_failure_leaves_ledger_and_bucket_untouched() {
        let mut net = source();
        net.pool
            .apply_chain_updates(
                &addr("owner"),
                &[lane_to(DEST, "pool_b", RateLimiterConfig::enabled(500, 5))],
                t(0),
            )
            .unwrap();
        net.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        let mut transport = Loopback {
            fail: true,
            ..Loopback::default()
        };

        let result = net
            .pool
            .lock_or_burn(&mut net.ledger, &mut transport, &addr("alice"), request(100), t(0));

        assert_eq!(result, Err(PoolError::Transport("router offline".into())));
        assert_eq!(net.ledger.principal_balance_of(&addr("alice")), 1_000);
        let state = net.pool.current_outbound_rate_limiter_state(DEST, t(0)).unwrap();
        assert_eq!(state.tokens(), 500);
    }

    #[test]
    fn send_more_than_balance_is_rejected() {
        let mut net = source();
        net.ledger.mint(&addr("minter"), &addr("alice"), 10, t(0)).unwrap();
        let result = net.pool.lock_or_burn(
            &mut net.ledger,
            &mut Loopback::default(),
            &addr("alice"),
            request(11),
            t(0),
        );
        assert!(matches!(
            result,
            Err(PoolError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn quote_uses_transport_estimate() {
        let net = source();
        let fee = net
            .pool
            .quote_send(
                &Loopback::default(),
                &addr("alice"),
                DEST,
                &addr("bob"),
                10,
                InterestRate::new(RATE),
            )
            .unwrap();
        assert_eq!(fee, FEE);
        assert_eq!(
            net.pool.quote_send(
                &Loopback::default(),
                &addr("alice"),
                ChainSelector::new(42),
                &addr("bob"),
                10,
                InterestRate::ZERO
            ),
            Err(PoolError::UnknownRemote(ChainSelector::new(42)))
        );
    }

    #[test]
    fn fresh_recipient_keeps_the_carried_rate() {
        let mut src = source();
        let mut dst = destination();
        let mut transport = Loopback::default();
        src.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        src.pool
            .lock_or_burn(&mut src.ledger, &mut transport, &addr("alice"), request(1_000), t(5))
            .unwrap();

        let outcome = dst
            .pool
            .release_or_mint(&mut dst.ledger, &transport.deliver_last(), t(50))
            .unwrap();

        assert_eq!(outcome.recipient, addr("bob"));
        assert_eq!(outcome.amount, 1_000);
        assert_eq!(outcome.locked_rate, InterestRate::new(RATE));
        assert_eq!(dst.ledger.get_user_interest_rate(&addr("bob")), InterestRate::new(RATE));
        assert_ne!(dst.ledger.get_interest_rate(), InterestRate::new(RATE));
        assert_eq!(dst.ledger.last_settled_at(&addr("bob")), Some(t(50)));
        assert_eq!(dst.ledger.principal_balance_of(&addr("bob")), 1_000);
    }

    #[test]
    fn existing_recipient_is_relocked_to_local_rate() {
        let mut src = source();
        let mut dst = destination();
        let mut transport = Loopback::default();
        dst.ledger.mint(&addr("minter"), &addr("bob"), 10, t(0)).unwrap();
        src.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        src.pool
            .lock_or_burn(&mut src.ledger, &mut transport, &addr("alice"), request(1_000), t(0))
            .unwrap();

        let outcome = dst
            .pool
            .release_or_mint(&mut dst.ledger, &transport.deliver_last(), t(0))
            .unwrap();

        assert_eq!(outcome.locked_rate, InterestRate::new(RATE / 2));
        assert_eq!(dst.ledger.principal_balance_of(&addr("bob")), 1_010);
    }

    #[test]
    fn message_from_unregistered_pool_is_rejected() {
        let mut dst = destination();
        let mut delivery = Delivery {
            message_id: MessageId::ZERO,
            envelope: Envelope {
                source_chain: SOURCE,
                source_pool: addr("impostor"),
                destination: DEST,
                payload: OutboundMessage {
                    destination: DEST,
                    sender: addr("alice"),
                    recipient: addr("bob"),
                    amount: 5,
                    sender_locked_rate: InterestRate::new(RATE),
                }
                .encode()
                .unwrap(),
            },
        };

        let result = dst.pool.release_or_mint(&mut dst.ledger, &delivery, t(0));
        assert_eq!(
            result,
            Err(PoolError::UnknownRemotePool {
                remote: SOURCE,
                pool: addr("impostor")
            })
        );

        delivery.envelope.source_chain = ChainSelector::new(77);
        let result = dst.pool.release_or_mint(&mut dst.ledger, &delivery, t(0));
        assert_eq!(result, Err(PoolError::UnknownRemote(ChainSelector::new(77))));

        delivery.envelope.destination = ChainSelector::new(5);
        let result = dst.pool.release_or_mint(&mut dst.ledger, &delivery, t(0));
        assert_eq!(
            result,
            Err(PoolError::WrongDestination {
                expected: DEST,
                actual: ChainSelector::new(5)
            })
        );
        assert_eq!(dst.ledger.total_supply(), 0);
    }

    #[test]
    fn inbound_rate_limit_rejects_without_minting() {
        let mut src = source();
        let mut dst = destination();
        dst.pool
            .apply_chain_updates(
                &addr("owner"),
                &[lane_to(SOURCE, "pool_a", RateLimiterConfig::enabled(200, 2))],
                t(0),
            )
            .unwrap();
        let mut transport = Loopback::default();
        src.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        src.pool
            .lock_or_burn(&mut src.ledger, &mut transport, &addr("alice"), request(150), t(0))
            .unwrap();
        let first = transport.deliver_last();
        src.pool
            .lock_or_burn(&mut src.ledger, &mut transport, &addr("alice"), request(150), t(0))
            .unwrap();
        let second = transport.deliver_last();

        dst.pool.release_or_mint(&mut dst.ledger, &first, t(0)).unwrap();
        let result = dst.pool.release_or_mint(&mut dst.ledger, &second, t(0));
        assert!(matches!(
            result,
            Err(PoolError::RateLimitExceeded {
                direction: Direction::Inbound,
                requested: 150,
                available: 50,
                ..
            })
        ));
        assert_eq!(dst.ledger.total_supply(), 150);

        // Retried once the bucket has refilled.
        dst.pool.release_or_mint(&mut dst.ledger, &second, t(50)).unwrap();
        assert_eq!(dst.ledger.principal_balance_of(&addr("bob")), 300);
        let state = dst.pool.current_inbound_rate_limiter_state(SOURCE, t(50)).unwrap();
        assert_eq!(state.tokens(), 0);
    }

    #[test]
    fn pool_without_role_cannot_mint_and_keeps_bucket() {
        let mut src = source();
        let mut dst = destination();
        dst.pool
            .apply_chain_updates(
                &addr("owner"),
                &[lane_to(SOURCE, "pool_a", RateLimiterConfig::enabled(100, 1))],
                t(0),
            )
            .unwrap();
        dst.ledger
            .revoke_mint_and_burn_role(&addr("admin"), &addr("pool_b"))
            .unwrap();
        let mut transport = Loopback::default();
        src.ledger.mint(&addr("minter"), &addr("alice"), 1_000, t(0)).unwrap();
        src.pool
            .lock_or_burn(&mut src.ledger, &mut transport, &addr("alice"), request(60), t(0))
            .unwrap();

        let result = dst
            .pool
            .release_or_mint(&mut dst.ledger, &transport.deliver_last(), t(0));

        assert!(matches!(
            result,
            Err(PoolError::Ledger(LedgerError::Unauthorized { .. }))
        ));
        let state = dst.pool.current_inbound_rate_limiter_state(SOURCE, t(0)).unwrap();
        assert_eq!(state.tokens(), 100);
    }
}
