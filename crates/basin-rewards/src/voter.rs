// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - EMISSION VOTER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// The voter owns one gauge and one bribe per registered pool and
// splits its reward-token budget across them by vote weight. An
// account's voting power is its ledger balance of the reward token at
// vote time; a vote spreads that power over the named pools in
// proportion to the given weights. Distribution drains the voter's
// own reward-token balance: each pool's share is split between its
// gauge (for stakers) and its bribe (for the voters themselves).
//
// Votes are terminal-error: a vote either replaces the caller's whole
// previous allocation or leaves it untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use basin_amm::Registry;
use basin_core::math::mul_div;
use basin_core::{AmmError, TokenLedger};

use crate::{Bribe, Gauge};

/// Domain tag for gauge id derivation.
const GAUGE_ID_DOMAIN: &[u8] = b"basin:gauge:v1";
/// Domain tag for bribe id derivation.
const BRIBE_ID_DOMAIN: &[u8] = b"basin:bribe:v1";

fn derive_component_id(domain: &[u8], voter_id: &str, pool_id: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(domain);
    hasher.update(voter_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(pool_id.as_bytes());
    hex::encode(hasher.finalize())
}

// ─────────────────────────────────────────────────────────────────────
// Voter
// ─────────────────────────────────────────────────────────────────────

/// Routes reward emissions to pools by vote weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Ledger account holding the undistributed reward budget.
    id: String,
    /// Token distributed to gauges and bribes. An account's balance of
    /// this token is also its voting power.
    reward_token: String,
    /// Sum of all applied vote weight.
    total_weight: u128,
    /// Applied vote weight per pool.
    pool_weights: BTreeMap<String, u128>,
    /// Pools with gauges, in creation order.
    pools: Vec<String>,
    /// pool id -> gauge id.
    gauge_for_pool: BTreeMap<String, String>,
    /// gauge id -> bribe id.
    bribe_for_gauge: BTreeMap<String, String>,
    /// Gauge arena keyed by gauge id.
    gauges: BTreeMap<String, Gauge>,
    /// Bribe arena keyed by bribe id.
    bribes: BTreeMap<String, Bribe>,
    /// account -> pool -> applied weight of the live vote.
    votes: BTreeMap<String, BTreeMap<String, u128>>,
    /// account -> total applied weight of the live vote.
    used_weights: BTreeMap<String, u128>,
    /// Timestamp of the last distribution run.
    distributed_through: u64,
}

impl Voter {
    /// Creates a voter distributing `reward_token`. The `id` is the
    /// ledger account funded ahead of `distribute` calls.
    pub fn new(id: String, reward_token: String) -> Self {
        Voter {
            id,
            reward_token,
            total_weight: 0,
            pool_weights: BTreeMap::new(),
            pools: Vec::new(),
            gauge_for_pool: BTreeMap::new(),
            bribe_for_gauge: BTreeMap::new(),
            gauges: BTreeMap::new(),
            bribes: BTreeMap::new(),
            votes: BTreeMap::new(),
            used_weights: BTreeMap::new(),
            distributed_through: 0,
        }
    }

    /// Gauge id for `pool_id` under the voter `voter_id`.
    pub fn derive_gauge_id(voter_id: &str, pool_id: &str) -> String {
        derive_component_id(GAUGE_ID_DOMAIN, voter_id, pool_id)
    }

    /// Bribe id for `pool_id` under the voter `voter_id`.
    pub fn derive_bribe_id(voter_id: &str, pool_id: &str) -> String {
        derive_component_id(BRIBE_ID_DOMAIN, voter_id, pool_id)
    }

    // ─────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reward_token(&self) -> &str {
        &self.reward_token
    }

    pub fn total_weight(&self) -> u128 {
        self.total_weight
    }

    /// Pools that have gauges, in creation order.
    pub fn pools(&self) -> &[String] {
        &self.pools
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Applied vote weight currently on `pool_id`.
    pub fn pool_weight(&self, pool_id: &str) -> u128 {
        self.pool_weights.get(pool_id).copied().unwrap_or(0)
    }

    pub fn gauge_for_pool(&self, pool_id: &str) -> Option<&str> {
        self.gauge_for_pool.get(pool_id).map(String::as_str)
    }

    pub fn bribe_for_gauge(&self, gauge_id: &str) -> Option<&str> {
        self.bribe_for_gauge.get(gauge_id).map(String::as_str)
    }

    pub fn gauge(&self, gauge_id: &str) -> Option<&Gauge> {
        self.gauges.get(gauge_id)
    }

    pub fn gauge_mut(&mut self, gauge_id: &str) -> Option<&mut Gauge> {
        self.gauges.get_mut(gauge_id)
    }

    pub fn bribe(&self, bribe_id: &str) -> Option<&Bribe> {
        self.bribes.get(bribe_id)
    }

    pub fn bribe_mut(&mut self, bribe_id: &str) -> Option<&mut Bribe> {
        self.bribes.get_mut(bribe_id)
    }

    /// Total weight `account`'s live vote applied.
    pub fn used_weight(&self, account: &str) -> u128 {
        self.used_weights.get(account).copied().unwrap_or(0)
    }

    /// Weight `account`'s live vote applied to `pool_id`.
    pub fn vote_weight(&self, account: &str, pool_id: &str) -> u128 {
        self.votes
            .get(account)
            .and_then(|pools| pools.get(pool_id))
            .copied()
            .unwrap_or(0)
    }

    /// Voting power of `account`: its reward-token balance.
    pub fn voting_power(&self, ledger: &TokenLedger, account: &str) -> u128 {
        ledger.balance_of(&self.reward_token, account)
    }

    /// Timestamp of the last `distribute` run.
    pub fn distributed_through(&self) -> u64 {
        self.distributed_through
    }

    // ─────────────────────────────────────────────────────────────────
    // Gauge lifecycle
    // ─────────────────────────────────────────────────────────────────

    /// Creates the gauge and bribe pair for a registered pool. The
    /// gauge stakes the pool's LP share token. Returns the gauge id.
    pub fn create_gauge(
        &mut self,
        registry: &Registry,
        pool_id: &str,
    ) -> Result<String, AmmError> {
        if !registry.is_pool(pool_id) {
            return Err(AmmError::NotFound(format!("pool {}", pool_id)));
        }
        if self.gauge_for_pool.contains_key(pool_id) {
            return Err(AmmError::DuplicateCreation(format!(
                "gauge for pool {}",
                pool_id
            )));
        }
        let gauge_id = Self::derive_gauge_id(&self.id, pool_id);
        let bribe_id = Self::derive_bribe_id(&self.id, pool_id);
        // LP shares live under the pool's own token id.
        self.gauges
            .insert(gauge_id.clone(), Gauge::new(gauge_id.clone(), pool_id.to_string()));
        self.bribes.insert(bribe_id.clone(), Bribe::new(bribe_id.clone()));
        self.gauge_for_pool
            .insert(pool_id.to_string(), gauge_id.clone());
        self.bribe_for_gauge.insert(gauge_id.clone(), bribe_id);
        self.pools.push(pool_id.to_string());
        Ok(gauge_id)
    }

    // ─────────────────────────────────────────────────────────────────
    // Voting
    // ─────────────────────────────────────────────────────────────────

    /// Replaces `caller`'s vote allocation. The caller's full voting
    /// power is spread over `pools` pro rata to `weights`; weights are
    /// relative, not absolute amounts. Pools whose slice floors to
    /// zero are skipped.
    pub fn vote(
        &mut self,
        ledger: &TokenLedger,
        caller: &str,
        pools: &[String],
        weights: &[u128],
        now: u64,
    ) -> Result<(), AmmError> {
        // 1. Validate the ballot before touching any state.
        if pools.is_empty() || pools.len() != weights.len() {
            return Err(AmmError::InvalidInput(
                "vote needs one weight per pool".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for pool in pools {
            if !seen.insert(pool.as_str()) {
                return Err(AmmError::InvalidInput(format!(
                    "pool {} listed twice in one vote",
                    pool
                )));
            }
            if !self.gauge_for_pool.contains_key(pool.as_str()) {
                return Err(AmmError::NotFound(format!("no gauge for pool {}", pool)));
            }
        }
        let mut total_input: u128 = 0;
        for weight in weights {
            total_input = total_input
                .checked_add(*weight)
                .ok_or_else(|| AmmError::InvalidInput("vote weights overflow".to_string()))?;
        }
        if total_input == 0 {
            return Err(AmmError::InvalidInput(
                "vote weights sum to zero".to_string(),
            ));
        }
        let power = self.voting_power(ledger, caller);
        if power == 0 {
            return Err(AmmError::InvalidInput(format!(
                "account {} has no voting power",
                caller
            )));
        }
        // 2. Normalize each slice to the caller's power.
        let mut applied = Vec::with_capacity(pools.len());
        for weight in weights {
            applied.push(mul_div(*weight, power, total_input)?);
        }
        // 3. Drop the previous allocation, then commit the new one.
        self.reset(caller, now)?;
        let mut used: u128 = 0;
        for (pool, slice) in pools.iter().zip(applied) {
            if slice == 0 {
                continue;
            }
            self.total_weight = self
                .total_weight
                .checked_add(slice)
                .ok_or_else(|| AmmError::InvalidInput("vote weights overflow".to_string()))?;
            *self.pool_weights.entry(pool.clone()).or_insert(0) += slice;
            self.votes
                .entry(caller.to_string())
                .or_default()
                .insert(pool.clone(), slice);
            used += slice;
            self.bribe_for_pool_mut(pool)?.deposit_weight(caller, slice, now)?;
        }
        if used > 0 {
            self.used_weights.insert(caller.to_string(), used);
        }
        Ok(())
    }

    /// Withdraws `caller`'s live vote from every pool it touched. A
    /// reset with no live vote is a no-op.
    pub fn reset(&mut self, caller: &str, now: u64) -> Result<(), AmmError> {
        let allocation = match self.votes.remove(caller) {
            Some(allocation) => allocation,
            None => return Ok(()),
        };
        for (pool, slice) in allocation {
            self.total_weight -= slice;
            if let Some(weight) = self.pool_weights.get_mut(&pool) {
                *weight -= slice;
                if *weight == 0 {
                    self.pool_weights.remove(&pool);
                }
            }
            self.bribe_for_pool_mut(&pool)?.withdraw_weight(caller, slice, now)?;
        }
        self.used_weights.remove(caller);
        Ok(())
    }

    /// Re-applies `caller`'s live vote at their current voting power.
    /// With no live vote this is a no-op; with power gone to zero it
    /// degrades to a reset.
    pub fn poke(
        &mut self,
        ledger: &TokenLedger,
        caller: &str,
        now: u64,
    ) -> Result<(), AmmError> {
        let allocation = match self.votes.get(caller) {
            Some(allocation) => allocation,
            None => return Ok(()),
        };
        let pools: Vec<String> = allocation.keys().cloned().collect();
        let weights: Vec<u128> = allocation.values().copied().collect();
        if self.voting_power(ledger, caller) == 0 {
            return self.reset(caller, now);
        }
        self.vote(ledger, caller, &pools, &weights, now)
    }

    // ─────────────────────────────────────────────────────────────────
    // Distribution
    // ─────────────────────────────────────────────────────────────────

    /// Splits the voter's reward-token balance across pools by vote
    /// weight. Each pool's share goes half to its bribe and the rest
    /// to its gauge, notified as fresh seven-day streams. With no
    /// budget or no votes the call settles as a no-op.
    pub fn distribute(&mut self, ledger: &mut TokenLedger, now: u64) -> Result<(), AmmError> {
        let budget = ledger.balance_of(&self.reward_token, &self.id);
        if budget == 0 || self.total_weight == 0 {
            self.distributed_through = now;
            return Ok(());
        }
        let voter_id = self.id.clone();
        let reward_token = self.reward_token.clone();
        let schedule: Vec<(String, String)> = self
            .pools
            .iter()
            .filter_map(|pool| {
                self.gauge_for_pool
                    .get(pool)
                    .map(|gauge_id| (pool.clone(), gauge_id.clone()))
            })
            .collect();
        for (pool, gauge_id) in schedule {
            let weight = self.pool_weight(&pool);
            if weight == 0 {
                continue;
            }
            let share = mul_div(budget, weight, self.total_weight)?;
            if share == 0 {
                continue;
            }
            let bribe_share = share / 2;
            let gauge_share = share - bribe_share;
            let bribe_id = self
                .bribe_for_gauge
                .get(&gauge_id)
                .cloned()
                .ok_or_else(|| AmmError::NotFound(format!("bribe for gauge {}", gauge_id)))?;
            // Budget moves by allowance so the gauge pulls it the same
            // way any outside funder would.
            ledger.approve(&reward_token, &voter_id, &gauge_id, gauge_share)?;
            let gauge = self
                .gauges
                .get_mut(&gauge_id)
                .ok_or_else(|| AmmError::NotFound(format!("gauge {}", gauge_id)))?;
            gauge.notify_reward_amount(ledger, &voter_id, &reward_token, gauge_share, now)?;
            if bribe_share > 0 {
                ledger.approve(&reward_token, &voter_id, &bribe_id, bribe_share)?;
                let bribe = self
                    .bribes
                    .get_mut(&bribe_id)
                    .ok_or_else(|| AmmError::NotFound(format!("bribe {}", bribe_id)))?;
                bribe.notify_reward_amount(ledger, &voter_id, &reward_token, bribe_share, now)?;
            }
        }
        self.distributed_through = now;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────

    fn bribe_for_pool_mut(&mut self, pool_id: &str) -> Result<&mut Bribe, AmmError> {
        let gauge_id = self
            .gauge_for_pool
            .get(pool_id)
            .ok_or_else(|| AmmError::NotFound(format!("no gauge for pool {}", pool_id)))?;
        let bribe_id = self
            .bribe_for_gauge
            .get(gauge_id)
            .cloned()
            .ok_or_else(|| AmmError::NotFound(format!("bribe for gauge {}", gauge_id)))?;
        self.bribes
            .get_mut(&bribe_id)
            .ok_or_else(|| AmmError::NotFound(format!("bribe {}", bribe_id)))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
