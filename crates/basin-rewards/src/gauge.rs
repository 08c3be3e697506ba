// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - STAKING GAUGE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// A gauge stakes one ledger token (typically an LP share) and streams
// any number of reward tokens to stakers pro rata over fixed seven-day
// periods. Accrual follows the classic reward-per-token scheme: a
// global accumulator advances with time, and each staker settles
// against it whenever their balance changes.
//
// The gauge is itself a ledger account (keyed by its id). Staked tokens
// and undistributed rewards sit in that account, so every claim is an
// ordinary ledger transfer out of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use basin_core::math::mul_div;
use basin_core::{AmmError, TokenLedger};

use crate::{PRECISION, REWARD_DURATION_SECS};

// ─────────────────────────────────────────────────────────────────────
// Reward state
// ─────────────────────────────────────────────────────────────────────

/// Per-reward-token streaming state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardState {
    /// Tokens released per second over the current period.
    pub reward_rate: u128,
    /// Timestamp at which the current period stops accruing.
    pub period_finish: u64,
    /// Last timestamp the accumulator was settled to.
    pub last_update_time: u64,
    /// Accumulated reward per staked unit, scaled by `PRECISION`.
    pub reward_per_token_stored: u128,
}

// ─────────────────────────────────────────────────────────────────────
// Gauge
// ─────────────────────────────────────────────────────────────────────

/// Stakes a single token and streams multiple reward tokens to the
/// stakers in proportion to their share of the staked total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gauge {
    /// Ledger account holding the staked tokens and pending rewards.
    id: String,
    /// Token accepted by `deposit`.
    staking_token: String,
    /// Sum of all staked balances.
    total_staked: u128,
    /// Staked balance per account.
    balances: BTreeMap<String, u128>,
    /// Reward tokens in registration order.
    reward_tokens: Vec<String>,
    /// Streaming state per reward token.
    reward_state: BTreeMap<String, RewardState>,
    /// reward token -> account -> accumulator snapshot at last settle.
    user_paid: BTreeMap<String, BTreeMap<String, u128>>,
    /// reward token -> account -> settled but unclaimed rewards.
    owed: BTreeMap<String, BTreeMap<String, u128>>,
}

impl Gauge {
    /// Creates an empty gauge staking `staking_token`. The `id` doubles
    /// as the gauge's ledger account; callers approve it as spender
    /// before depositing or notifying.
    pub fn new(id: String, staking_token: String) -> Self {
        Gauge {
            id,
            staking_token,
            total_staked: 0,
            balances: BTreeMap::new(),
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

    pub fn staking_token(&self) -> &str {
        &self.staking_token
    }

    /// Sum of all staked balances.
    pub fn total_supply(&self) -> u128 {
        self.total_staked
    }

    /// Staked balance of `account`, zero when it never deposited.
    pub fn balance_of(&self, account: &str) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Reward tokens ever notified, in first-seen order.
    pub fn reward_tokens(&self) -> &[String] {
        &self.reward_tokens
    }

    /// Current release rate for `token`, zero if never notified.
    pub fn reward_rate(&self, token: &str) -> u128 {
        self.reward_state
            .get(token)
            .map(|state| state.reward_rate)
            .unwrap_or(0)
    }

    /// End of the current streaming period for `token`.
    pub fn period_finish(&self, token: &str) -> u64 {
        self.reward_state
            .get(token)
            .map(|state| state.period_finish)
            .unwrap_or(0)
    }

    /// Reward accumulated per staked unit as of `now`, scaled by
    /// `PRECISION`. While nothing is staked the accumulator holds
    /// still and that stretch of emissions is never earned.
    pub fn reward_per_token(&self, token: &str, now: u64) -> Result<u128, AmmError> {
        let state = match self.reward_state.get(token) {
            Some(state) => state,
            None => return Ok(0),
        };
        if self.total_staked == 0 {
            return Ok(state.reward_per_token_stored);
        }
        let applicable = now.min(state.period_finish);
        let elapsed = u128::from(applicable.saturating_sub(state.last_update_time));
        // elapsed * rate never exceeds the tokens actually pulled in,
        // so the only widening needed is for the PRECISION scale.
        let released = elapsed
            .checked_mul(state.reward_rate)
            .ok_or_else(|| AmmError::InvariantViolation("reward release overflow".to_string()))?;
        let delta = mul_div(released, PRECISION, self.total_staked)?;
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
    // Staking
    // ─────────────────────────────────────────────────────────────────

    /// Stakes `amount` of the staking token pulled from `caller`, who
    /// must have approved the gauge id as spender beforehand. The stake
    /// is credited to `on_behalf_of`, which is usually the caller.
    pub fn deposit(
        &mut self,
        ledger: &mut TokenLedger,
        caller: &str,
        amount: u128,
        on_behalf_of: &str,
        now: u64,
    ) -> Result<(), AmmError> {
        if amount == 0 {
            return Err(AmmError::InvalidInput("cannot stake zero".to_string()));
        }
        // 1. Settle the credited account's accrual before its balance
        //    changes.
        self.checkpoint(Some(on_behalf_of), now)?;
        // 2. Validate the new total, then pull the stake.
        let new_total = self
            .total_staked
            .checked_add(amount)
            .ok_or_else(|| AmmError::InvalidInput("staked total overflow".to_string()))?;
        ledger.transfer_from(&self.staking_token, &self.id, caller, &self.id, amount)?;
        // 3. Commit.
        self.total_staked = new_total;
        *self.balances.entry(on_behalf_of.to_string()).or_insert(0) += amount;
        Ok(())
    }

    /// Returns `amount` of staked tokens to `caller`.
    pub fn withdraw(
        &mut self,
        ledger: &mut TokenLedger,
        caller: &str,
        amount: u128,
        now: u64,
    ) -> Result<(), AmmError> {
        if amount == 0 {
            return Err(AmmError::InvalidInput("cannot withdraw zero".to_string()));
        }
        let staked = self.balance_of(caller);
        if staked < amount {
            return Err(AmmError::InvalidInput(format!(
                "withdraw {} exceeds staked balance {}",
                amount, staked
            )));
        }
        self.checkpoint(Some(caller), now)?;
        ledger.transfer(&self.staking_token, &self.id, caller, amount)?;
        self.total_staked -= amount;
        let remaining = staked - amount;
        if remaining == 0 {
            self.balances.remove(caller);
        } else {
            self.balances.insert(caller.to_string(), remaining);
        }
        Ok(())
    }

    /// Withdraws the caller's full stake and claims every reward token.
    /// Returns the unstaked amount and the nonzero claims.
    pub fn exit(
        &mut self,
        ledger: &mut TokenLedger,
        caller: &str,
        now: u64,
    ) -> Result<(u128, Vec<(String, u128)>), AmmError> {
        let staked = self.balance_of(caller);
        if staked == 0 {
            return Err(AmmError::InvalidInput(format!(
                "account {} has no stake to exit",
                caller
            )));
        }
        self.withdraw(ledger, caller, staked, now)?;
        let tokens = self.reward_tokens.clone();
        let mut claims = Vec::new();
        for token in tokens {
            let amount = self.get_reward(ledger, caller, &token, now)?;
            if amount > 0 {
                claims.push((token, amount));
            }
        }
        Ok((staked, claims))
    }

    // ─────────────────────────────────────────────────────────────────
    // Rewards
    // ─────────────────────────────────────────────────────────────────

    /// Pays out everything `caller` has earned of `token`. Returns the
    /// amount transferred, which may be zero.
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
        // Transfer before clearing so a ledger refusal leaves the
        // entitlement intact.
        ledger.transfer(token, &self.id, caller, amount)?;
        if let Some(accounts) = self.owed.get_mut(token) {
            accounts.remove(caller);
        }
        Ok(amount)
    }

    /// Adds `amount` of `token` to the stream, pulled from `from` (who
    /// must have approved the gauge id). Whatever remains of an
    /// unfinished period is folded into the new seven-day period.
    /// Returns the new release rate.
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
        // 1. First sighting of this token registers it with an empty
        //    stream.
        if !self.reward_state.contains_key(token) {
            self.reward_tokens.push(token.to_string());
            self.reward_state
                .insert(token.to_string(), RewardState::default());
        }
        // 2. Settle the old rate up to now.
        self.checkpoint(None, now)?;
        // 3. Work out the new rate before any money moves.
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
        // 4. Pull the funds, then commit the new period.
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

    /// Advances every reward accumulator to `now` and, when an account
    /// is given, settles its earnings against the fresh accumulators.
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

#[cfg(test)]
mod tests {
    use super::*;

    const GAUGE_ID: &str = "gauge-lp";
    const LP: &str = "lp-token";
    const REWARD: &str = "rwd";
    const WEEK: u64 = REWARD_DURATION_SECS;

    fn setup() -> (TokenLedger, Gauge) {
        let mut ledger = TokenLedger::new();
        ledger.register_token(LP, "LP", 18).unwrap();
        ledger.register_token(REWARD, "RWD", 18).unwrap();
        ledger.mint(LP, "alice", 1_000_000_000_000).unwrap();
        ledger.mint(LP, "bob", 1_000_000_000_000).unwrap();
        ledger.mint(REWARD, "funder", 1_000_000_000_000_000).unwrap();
        ledger.approve(LP, "alice", GAUGE_ID, u128::MAX).unwrap();
        ledger.approve(LP, "bob", GAUGE_ID, u128::MAX).unwrap();
        ledger.approve(REWARD, "funder", GAUGE_ID, u128::MAX).unwrap();
        let gauge = Gauge::new(GAUGE_ID.to_string(), LP.to_string());
        (ledger, gauge)
    }

    #[test]
    fn test_deposit_moves_stake_into_gauge_account() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();

        assert_eq!(gauge.total_supply(), 1_000_000_000);
        assert_eq!(gauge.balance_of("alice"), 1_000_000_000);
        assert_eq!(ledger.balance_of(LP, GAUGE_ID), 1_000_000_000);
        assert_eq!(ledger.balance_of(LP, "alice"), 999_000_000_000);
    }

    #[test]
    fn test_deposit_rejects_zero_and_missing_allowance() {
        let (mut ledger, mut gauge) = setup();
        assert_eq!(
            gauge.deposit(&mut ledger, "alice", 0, "alice", 0),
            Err(AmmError::InvalidInput("cannot stake zero".to_string()))
        );
        // mallory never approved the gauge
        ledger.mint(LP, "mallory", 500).unwrap();
        assert!(matches!(
            gauge.deposit(&mut ledger, "mallory", 500, "mallory", 0),
            Err(AmmError::Unauthorized(_))
        ));
        assert_eq!(gauge.total_supply(), 0);
    }

    #[test]
    fn test_deposit_on_behalf_credits_the_named_account() {
        let (mut ledger, mut gauge) = setup();
        // alice funds the stake, bob owns it.
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "bob", 0).unwrap();

        assert_eq!(gauge.balance_of("bob"), 1_000_000_000);
        assert_eq!(gauge.balance_of("alice"), 0);
        assert_eq!(ledger.balance_of(LP, "alice"), 999_000_000_000);
        assert_eq!(ledger.balance_of(LP, "bob"), 1_000_000_000_000);

        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();
        assert_eq!(gauge.earned(REWARD, "bob", 1_000).unwrap(), 1_653_000);
        assert_eq!(gauge.earned(REWARD, "alice", 1_000).unwrap(), 0);

        // The stake leaves through bob, not the funder.
        gauge.withdraw(&mut ledger, "bob", 1_000_000_000, 1_000).unwrap();
        assert_eq!(ledger.balance_of(LP, "bob"), 1_001_000_000_000);
    }

    #[test]
    fn test_withdraw_returns_stake_and_caps_at_balance() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000, "alice", 0).unwrap();
        gauge.withdraw(&mut ledger, "alice", 400, 10).unwrap();

        assert_eq!(gauge.balance_of("alice"), 600);
        assert_eq!(gauge.total_supply(), 600);
        assert!(gauge.withdraw(&mut ledger, "alice", 601, 20).is_err());

        gauge.withdraw(&mut ledger, "alice", 600, 30).unwrap();
        assert_eq!(gauge.balance_of("alice"), 0);
        assert_eq!(ledger.balance_of(LP, "alice"), 1_000_000_000_000);
    }

    #[test]
    fn test_notify_sets_week_long_rate() {
        let (mut ledger, mut gauge) = setup();
        let rate = gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();

        // 1e9 / 604800 floors to 1653.
        assert_eq!(rate, 1_653);
        assert_eq!(gauge.reward_rate(REWARD), 1_653);
        assert_eq!(gauge.period_finish(REWARD), WEEK);
        assert_eq!(ledger.balance_of(REWARD, GAUGE_ID), 1_000_000_000);
        assert_eq!(gauge.reward_tokens(), &[REWARD.to_string()]);
    }

    #[test]
    fn test_notify_folds_unfinished_period_into_new_rate() {
        let (mut ledger, mut gauge) = setup();
        let week = u128::from(WEEK);
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, week * 10, 0)
            .unwrap();
        assert_eq!(gauge.reward_rate(REWARD), 10);

        // Half the period is left, so half the budget folds forward.
        let rate = gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, week * 10, WEEK / 2)
            .unwrap();
        assert_eq!(rate, 15);
        assert_eq!(gauge.period_finish(REWARD), WEEK / 2 + WEEK);
    }

    #[test]
    fn test_notify_rejects_zero_and_dust_amounts() {
        let (mut ledger, mut gauge) = setup();
        assert_eq!(
            gauge.notify_reward_amount(&mut ledger, "funder", REWARD, 0, 0),
            Err(AmmError::InvalidInput("cannot notify zero".to_string()))
        );
        // Less than one token per second streams to nothing.
        let thin = gauge.notify_reward_amount(&mut ledger, "funder", REWARD, 604_799, 0);
        assert!(matches!(thin, Err(AmmError::InvalidInput(_))));
        // The rejected notify moved no funds.
        assert_eq!(ledger.balance_of(REWARD, GAUGE_ID), 0);
    }

    #[test]
    fn test_earned_zero_before_any_notify() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();
        assert_eq!(gauge.earned(REWARD, "alice", 1_000).unwrap(), 0);
        assert_eq!(gauge.reward_rate(REWARD), 0);
    }

    #[test]
    fn test_single_staker_earns_full_rate() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();

        // Sole staker collects rate * elapsed exactly.
        assert_eq!(gauge.earned(REWARD, "alice", 1_000).unwrap(), 1_653_000);

        let paid = gauge.get_reward(&mut ledger, "alice", REWARD, 1_000).unwrap();
        assert_eq!(paid, 1_653_000);
        assert_eq!(ledger.balance_of(REWARD, "alice"), 1_653_000);
        // Nothing left to claim until more time passes.
        assert_eq!(gauge.get_reward(&mut ledger, "alice", REWARD, 1_000).unwrap(), 0);
        assert_eq!(gauge.earned(REWARD, "alice", 2_000).unwrap(), 1_653_000);
    }

    #[test]
    fn test_accrual_stops_at_period_finish() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();

        let at_finish = gauge.earned(REWARD, "alice", WEEK).unwrap();
        let long_after = gauge.earned(REWARD, "alice", WEEK * 10).unwrap();
        assert_eq!(at_finish, 1_653 * u128::from(WEEK));
        assert_eq!(long_after, at_finish);
    }

    #[test]
    fn test_two_stakers_split_pro_rata() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 2_000_000_000, "alice", 0).unwrap();
        gauge.deposit(&mut ledger, "bob", 1_000_000_000, "bob", 0).unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();

        // 1000s at rate 1653 over a 2:1 stake split.
        assert_eq!(gauge.earned(REWARD, "alice", 1_000).unwrap(), 1_102_000);
        assert_eq!(gauge.earned(REWARD, "bob", 1_000).unwrap(), 551_000);
    }

    #[test]
    fn test_late_staker_only_earns_from_entry() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();
        // bob joins halfway through the first 1000 seconds.
        gauge.deposit(&mut ledger, "bob", 1_000_000_000, "bob", 500).unwrap();

        // alice: 500s alone + 500s at half share.
        assert_eq!(gauge.earned(REWARD, "alice", 1_000).unwrap(), 1_239_750);
        // bob: 500s at half share.
        assert_eq!(gauge.earned(REWARD, "bob", 1_000).unwrap(), 413_250);
    }

    #[test]
    fn test_exit_unstakes_and_claims_everything() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();

        let (unstaked, claims) = gauge.exit(&mut ledger, "alice", 1_000).unwrap();
        assert_eq!(unstaked, 1_000_000_000);
        assert_eq!(claims, vec![(REWARD.to_string(), 1_653_000)]);
        assert_eq!(gauge.total_supply(), 0);
        assert_eq!(gauge.balance_of("alice"), 0);
        assert_eq!(ledger.balance_of(LP, "alice"), 1_000_000_000_000);

        // A second exit has nothing to undo.
        assert!(gauge.exit(&mut ledger, "alice", 1_001).is_err());
    }

    #[test]
    fn test_multiple_reward_tokens_stream_independently() {
        let (mut ledger, mut gauge) = setup();
        ledger.register_token("extra", "EXT", 6).unwrap();
        ledger.mint("extra", "funder", 10_000_000_000).unwrap();
        ledger.approve("extra", "funder", GAUGE_ID, u128::MAX).unwrap();

        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", "extra", 6_048_000_000, 0)
            .unwrap();

        assert_eq!(gauge.reward_rate(REWARD), 1_653);
        assert_eq!(gauge.reward_rate("extra"), 10_000);
        assert_eq!(gauge.earned(REWARD, "alice", 100).unwrap(), 165_300);
        assert_eq!(gauge.earned("extra", "alice", 100).unwrap(), 1_000_000);

        let claims = gauge.exit(&mut ledger, "alice", 100).unwrap().1;
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn test_get_reward_unknown_token_is_not_found() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000, "alice", 0).unwrap();
        assert!(matches!(
            gauge.get_reward(&mut ledger, "alice", "ghost", 0),
            Err(AmmError::NotFound(_))
        ));
    }

    #[test]
    fn test_emissions_while_empty_are_never_earned() {
        let (mut ledger, mut gauge) = setup();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();
        // Nobody staked for the first 1000 seconds.
        gauge
            .deposit(&mut ledger, "alice", 1_000_000_000, "alice", 1_000)
            .unwrap();

        assert_eq!(gauge.earned(REWARD, "alice", 1_000).unwrap(), 0);
        assert_eq!(gauge.earned(REWARD, "alice", 2_000).unwrap(), 1_653_000);
    }

    #[test]
    fn test_serde_round_trip() {
        let (mut ledger, mut gauge) = setup();
        gauge.deposit(&mut ledger, "alice", 1_000_000_000, "alice", 0).unwrap();
        gauge
            .notify_reward_amount(&mut ledger, "funder", REWARD, 1_000_000_000, 0)
            .unwrap();

        let json = serde_json::to_string(&gauge).unwrap();
        let restored: Gauge = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, gauge);
    }
}
