// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - VOTE BRIBE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// A bribe streams reward tokens to the accounts currently voting for
// its pool, using the same reward-per-token accrual as the gauge. The
// difference is what counts as a balance: nothing is staked here, the
// weight is the vote commitment the voter records on the account's
// behalf. Only the voter moves weight; anyone may fund the stream and
// voters claim for themselves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use basin_core::math::mul_div;
use basin_core::{AmmError, TokenLedger};

use crate::gauge::RewardState;
use crate::{PRECISION, REWARD_DURATION_SECS};

/// Streams rewards over the vote weight committed to one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bribe {
    /// Ledger account holding undistributed bribe funds.
    id: String,
    /// Sum of all committed vote weight.
    total_weight: u128,
    /// Committed weight per voting account.
    weights: BTreeMap<String, u128>,
    /// Reward tokens in registration order.
    reward_tokens: Vec<String>,
    /// Streaming state per reward token.
    reward_state: BTreeMap<String, RewardState>,
    /// reward token -> account -> accumulator snapshot at last settle.
    user_paid: BTreeMap<String, BTreeMap<String, u128>>,
    /// reward token -> account -> settled but unclaimed rewards.
    owed: BTreeMap<String, BTreeMap<String, u128>>,
}

impl Bribe {
    pub fn new(id: String) -> Self {
        Bribe {
            id,
            total_weight: 0,
            weights: BTreeMap::new(),
            reward_tokens: Vec::new(),
            reward_state: BTreeMap::new(),
            user_paid: BTreeMap::new(),
            owed: BTreeMap::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sum of all committed vote weight.
    pub fn total_supply(&self) -> u128 {
        self.total_weight
    }

    /// Vote weight currently credited to `account`.
    pub fn balance_of(&self, account: &str) -> u128 {
        self.weights.get(account).copied().unwrap_or(0)
    }

    pub fn reward_tokens(&self) -> &[String] {
        &self.reward_tokens
    }

    pub fn reward_rate(&self, token: &str) -> u128 {
        self.reward_state
            .get(token)
            .map(|state| state.reward_rate)
            .unwrap_or(0)
    }

    pub fn period_finish(&self, token: &str) -> u64 {
        self.reward_state
            .get(token)
            .map(|state| state.period_finish)
            .unwrap_or(0)
    }

    /// Reward accumulated per unit of weight as of `now`, scaled by
    /// `PRECISION`.
    pub fn reward_per_token(&self, token: &str, now: u64) -> Result<u128, AmmError> {
        let state = match self.reward_state.get(token) {
            Some(state) => state,
            None => return Ok(0),
        };
        if self.total_weight == 0 {
            return Ok(state.reward_per_token_stored);
        }
        let applicable = now.min(state.period_finish);
        let elapsed = u128::from(applicable.saturating_sub(state.last_update_time));
        let released = elapsed
            .checked_mul(state.reward_rate)
            .ok_or_else(|| AmmError::InvariantViolation("reward release overflow".to_string()))?;
        let delta = mul_div(released, PRECISION, self.total_weight)?;
        state
            .reward_per_token_stored
            .checked_add(delta)
            .ok_or_else(|| AmmError::InvariantViolation("reward accumulator overflow".to_string()))
    }

    /// Rewards `account` could claim for `token` as of `now`.
    pub fn earned(&self, token: &str, account: &str, now: u64) -> Result<u128, AmmError> {
        let accumulator = self.reward_per_token(token, now)?;
        let paid = self
            .user_paid
            .get(token)
            .and_then(|accounts| accounts.get(account))
            .copied()
            .unwrap_or(0);
        let fresh = mul_div(
            self.balance_of(account),
            accumulator.saturating_sub(paid),
            PRECISION,
        )?;
        let settled = self
            .owed
            .get(token)
            .and_then(|accounts| accounts.get(account))
            .copied()
            .unwrap_or(0);
        fresh
            .checked_add(settled)
            .ok_or_else(|| AmmError::InvariantViolation("reward accumulator overflow".to_string()))
    }

    // ─────────────────────────────────────────────────────────────────
    // Weight accounting, voter only
    // ─────────────────────────────────────────────────────────────────

    /// Credits vote weight to `account`. Called by the voter when a
    /// vote lands on this bribe's pool.
    pub(crate) fn deposit_weight(
        &mut self,
        account: &str,
        amount: u128,
        now: u64,
    ) -> Result<(), AmmError> {
        if amount == 0 {
            return Err(AmmError::InvalidInput(
                "cannot credit zero vote weight".to_string(),
            ));
        }
        self.checkpoint(Some(account), now)?;
        self.total_weight = self
            .total_weight
            .checked_add(amount)
            .ok_or_else(|| AmmError::InvalidInput("vote weight overflow".to_string()))?;
        *self.weights.entry(account.to_string()).or_insert(0) += amount;
        Ok(())
    }

    /// Removes previously credited weight. Called by the voter on
    /// reset or re-vote.
    pub(crate) fn withdraw_weight(
        &mut self,
        account: &str,
        amount: u128,
        now: u64,
    ) -> Result<(), AmmError> {
        let held = self.balance_of(account);
        if amount == 0 || held < amount {
            return Err(AmmError::InvalidInput(format!(
                "cannot remove {} of {} committed vote weight",
                amount, held
            )));
        }
        self.checkpoint(Some(account), now)?;
        self.total_weight -= amount;
        let remaining = held - amount;
        if remaining == 0 {
            self.weights.remove(account);
        } else {
            self.weights.insert(account.to_string(), remaining);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // Rewards
    // ─────────────────────────────────────────────────────────────────

    /// Pays out everything `caller` has earned of `token`.
    pub fn get_reward(
        &mut self,
        ledger: &mut TokenLedger,
        caller: &str,
        token: &str,
        now: u64,
    ) -> Result<u128, AmmError> {
        if !self.reward_state.contains_key(token) {
            return Err(AmmError::NotFound(format!("reward token {}", token)));
        }
        self.checkpoint(Some(caller), now)?;
        let amount = self
            .owed
            .get(token)
            .and_then(|accounts| accounts.get(caller))
            .copied()
            .unwrap_or(0);
        if amount == 0 {
            return Ok(0);
        }
        ledger.transfer(token, &self.id, caller, amount)?;
        if let Some(accounts) = self.owed.get_mut(token) {
            accounts.remove(caller);
        }
        Ok(amount)
    }

    /// Funds the stream with `amount` of `token`, pulled from `from`
    /// (who must have approved the bribe id). Returns the new rate.
    pub fn notify_reward_amount(
        &mut self,
        ledger: &mut TokenLedger,
        from: &str,
        token: &str,
        amount: u128,
        now: u64,
    ) -> Result<u128, AmmError> {
        if amount == 0 {
            return Err(AmmError::InvalidInput("cannot notify zero".to_string()));
        }
        if !self.reward_state.contains_key(token) {
            self.reward_tokens.push(token.to_string());
            self.reward_state
                .insert(token.to_string(), RewardState::default());
        }
        self.checkpoint(None, now)?;
        let state = self
            .reward_state
            .get(token)
            .ok_or_else(|| AmmError::NotFound(format!("reward token {}", token)))?;
        let total = if now >= state.period_finish {
            amount
        } else {
            let remaining = u128::from(state.period_finish - now);
            let leftover = remaining
                .checked_mul(state.reward_rate)
                .ok_or_else(|| {
                    AmmError::InvariantViolation("reward release overflow".to_string())
                })?;
            amount.checked_add(leftover).ok_or_else(|| {
                AmmError::InvalidInput("notified amount overflows the stream".to_string())
            })?
        };
        let rate = total / u128::from(REWARD_DURATION_SECS);
        if rate == 0 {
            return Err(AmmError::InvalidInput(format!(
                "notified amount {} streams to a zero per-second rate",
                amount
            )));
        }
        ledger.transfer_from(token, &self.id, from, &self.id, amount)?;
        if let Some(state) = self.reward_state.get_mut(token) {
            state.reward_rate = rate;
            state.last_update_time = now;
            state.period_finish = now + REWARD_DURATION_SECS;
        }
        Ok(rate)
    }

    // ─────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────

    fn checkpoint(&mut self, account: Option<&str>, now: u64) -> Result<(), AmmError> {
        let tokens = self.reward_tokens.clone();
        for token in tokens {
            let accumulator = self.reward_per_token(&token, now)?;
            if let Some(account) = account {
                let pending = self.earned(&token, account, now)?;
                self.owed
                    .entry(token.clone())
                    .or_default()
                    .insert(account.to_string(), pending);
                self.user_paid
                    .entry(token.clone())
                    .or_default()
                    .insert(account.to_string(), accumulator);
            }
            if let Some(state) = self.reward_state.get_mut(&token) {
                state.reward_per_token_stored = accumulator;
                state.last_update_time = now.min(state.period_finish);
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
