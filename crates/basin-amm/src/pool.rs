// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - LIQUIDITY POOL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// A two-token pool holding reserves in a shared token ledger. The pool
// itself is a ledger account (keyed by its own id) and its LP share is
// a ledger token under the same id, so share balances and transfers go
// through the ordinary token machinery.
//
// Deposits follow a transfer-first discipline: callers move tokens into
// the pool's account, then call mint/swap, and the pool measures the
// contribution as balance minus tracked reserve. Every state-changing
// entry point takes an explicit `now` timestamp and runs under the
// pool's mutual-exclusion lock.

use serde::{Deserialize, Serialize};

use basin_core::math::{isqrt_wide, mul_div, narrow, pow10, U256};
use basin_core::{AmmError, TokenLedger};

use crate::curve;
use crate::{BPS_DENOMINATOR, MINIMUM_LIQUIDITY, NORMALIZED_ONE, ZERO_ACCOUNT};

// ─────────────────────────────────────────────────────────────────────
// Pool kind
// ─────────────────────────────────────────────────────────────────────

/// Which swap curve a pool prices on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoolKind {
    /// Constant product k = x * y.
    Volatile,
    /// Correlated-asset curve k = x * y * (x^2 + y^2).
    Stable,
}

impl PoolKind {
    /// Stable byte tag used in pool-id derivation. Never reorder.
    pub fn discriminant(self) -> u8 {
        match self {
            PoolKind::Volatile => 0,
            PoolKind::Stable => 1,
        }
    }

    /// Share-symbol prefix, `vAMM` or `sAMM`.
    pub fn prefix(self) -> &'static str {
        match self {
            PoolKind::Volatile => "vAMM",
            PoolKind::Stable => "sAMM",
        }
    }

    /// Human-readable kind name used in LP share names.
    pub fn describe(self) -> &'static str {
        match self {
            PoolKind::Volatile => "Volatile AMM",
            PoolKind::Stable => "Stable AMM",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Pool state
// ─────────────────────────────────────────────────────────────────────

/// Static pool facts plus live reserves, the shape quoting code needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMetadata {
    pub id: String,
    pub kind: PoolKind,
    pub token0: String,
    pub token1: String,
    /// Base unit of token0, `10^decimals0`.
    pub unit0: u128,
    /// Base unit of token1, `10^decimals1`.
    pub unit1: u128,
    pub reserve0: u128,
    pub reserve1: u128,
}

/// A single two-token liquidity pool.
///
/// All mutation goes through methods; reserves, the price accumulators
/// and the lock are never written directly. Total issued shares are
/// read from the ledger (`total_supply` of the pool id), never cached
/// here, so the two can not drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    id: String,
    name: String,
    symbol: String,
    kind: PoolKind,
    token0: String,
    token1: String,
    decimals0: u8,
    decimals1: u8,
    fee_bps: u64,
    reserve0: u128,
    reserve1: u128,
    /// Time-weighted accumulator of token0's spot price, 1e18-scaled
    /// per second. Wraps on overflow; consumers difference two reads.
    cumulative_price0: u128,
    cumulative_price1: u128,
    last_update: u64,
    /// Hex snapshot of the invariant at the last reserve write.
    last_k: String,
    locked: bool,
}

impl Pool {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        name: String,
        symbol: String,
        kind: PoolKind,
        token0: String,
        token1: String,
        decimals0: u8,
        decimals1: u8,
        fee_bps: u64,
        now: u64,
    ) -> Self {
        Pool {
            id,
            name,
            symbol,
            kind,
            token0,
            token1,
            decimals0,
            decimals1,
            fee_bps,
            reserve0: 0,
            reserve1: 0,
            cumulative_price0: 0,
            cumulative_price1: 0,
            last_update: now,
            last_k: hex::encode([0u8; 32]),
            locked: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // Read access
    // ─────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn token0(&self) -> &str {
        &self.token0
    }

    pub fn token1(&self) -> &str {
        &self.token1
    }

    pub fn fee_bps(&self) -> u64 {
        self.fee_bps
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Tracked reserves and the timestamp of the last reserve write.
    pub fn get_reserves(&self) -> (u128, u128, u64) {
        (self.reserve0, self.reserve1, self.last_update)
    }

    /// Total LP shares in circulation, including the locked minimum.
    pub fn total_shares(&self, ledger: &TokenLedger) -> u128 {
        ledger.total_supply(&self.id)
    }

    /// Invariant snapshot taken at the last reserve write, hex-encoded
    /// big-endian. Stable-pool values exceed u128, hence the string.
    pub fn last_k(&self) -> &str {
        &self.last_k
    }

    pub fn metadata(&self) -> PoolMetadata {
        PoolMetadata {
            id: self.id.clone(),
            kind: self.kind,
            token0: self.token0.clone(),
            token1: self.token1.clone(),
            unit0: pow10(self.decimals0),
            unit1: pow10(self.decimals1),
            reserve0: self.reserve0,
            reserve1: self.reserve1,
        }
    }

    /// Cumulative prices projected to `now`, extending the stored
    /// accumulators by the elapsed time at the current spot price.
    pub fn current_cumulative_prices(&self, now: u64) -> (u128, u128) {
        let mut cum0 = self.cumulative_price0;
        let mut cum1 = self.cumulative_price1;
        let elapsed = now.saturating_sub(self.last_update) as u128;
        if elapsed > 0 && self.reserve0 > 0 && self.reserve1 > 0 {
            cum0 = cum0.wrapping_add(spot_price(self.reserve1, self.reserve0).wrapping_mul(elapsed));
            cum1 = cum1.wrapping_add(spot_price(self.reserve0, self.reserve1).wrapping_mul(elapsed));
        }
        (cum0, cum1)
    }

    // ─────────────────────────────────────────────────────────────────
    // Quoting
    // ─────────────────────────────────────────────────────────────────

    /// Output amount for swapping `amount_in` of `token_in`, after the
    /// pool fee, against current reserves. Read-only.
    pub fn get_amount_out(&self, amount_in: u128, token_in: &str) -> Result<u128, AmmError> {
        if amount_in == 0 {
            return Err(AmmError::InvalidInput("zero input amount".to_string()));
        }
        let in_is_token0 = if token_in == self.token0 {
            true
        } else if token_in == self.token1 {
            false
        } else {
            return Err(AmmError::InvalidInput(format!(
                "token {} is not in pool {}",
                token_in, self.symbol
            )));
        };
        if self.reserve0 == 0 || self.reserve1 == 0 {
            return Err(AmmError::InvalidInput("pool has no liquidity".to_string()));
        }
        let fee = mul_div(amount_in, self.fee_bps as u128, BPS_DENOMINATOR)?;
        let amount_in = amount_in - fee;
        match self.kind {
            PoolKind::Volatile => {
                let (reserve_in, reserve_out) = if in_is_token0 {
                    (self.reserve0, self.reserve1)
                } else {
                    (self.reserve1, self.reserve0)
                };
                curve::volatile_amount_out(amount_in, reserve_in, reserve_out)
            }
            PoolKind::Stable => curve::stable_amount_out(
                amount_in,
                in_is_token0,
                self.reserve0,
                self.reserve1,
                pow10(self.decimals0),
                pow10(self.decimals1),
            ),
        }
    }

    /// Shares a deposit of `(amount0, amount1)` would mint right now.
    ///
    /// First deposit: volatile pools issue sqrt(amount0 * amount1)
    /// total, stable pools the sum of both amounts rescaled to the
    /// smaller decimal basis; the locked minimum is excluded from the
    /// return. Later deposits mint the minimum of the two proportional
    /// entitlements.
    pub fn quote_shares(
        &self,
        ledger: &TokenLedger,
        amount0: u128,
        amount1: u128,
    ) -> Result<u128, AmmError> {
        let total = self.total_shares(ledger);
        if total == 0 {
            let supply = self.initial_shares(amount0, amount1)?;
            if supply <= MINIMUM_LIQUIDITY {
                return Err(AmmError::InvalidInput(
                    "initial deposit below minimum liquidity".to_string(),
                ));
            }
            Ok(supply - MINIMUM_LIQUIDITY)
        } else {
            let by0 = mul_div(amount0, total, self.reserve0)?;
            let by1 = mul_div(amount1, total, self.reserve1)?;
            let minted = by0.min(by1);
            if minted == 0 {
                return Err(AmmError::InvalidInput(
                    "insufficient liquidity minted".to_string(),
                ));
            }
            Ok(minted)
        }
    }

    fn initial_shares(&self, amount0: u128, amount1: u128) -> Result<u128, AmmError> {
        match self.kind {
            PoolKind::Volatile => {
                let product = U256::from(amount0) * U256::from(amount1);
                narrow(isqrt_wide(product))
            }
            PoolKind::Stable => {
                // both sides rescaled to the smaller decimal basis so a
                // 6-decimal and an 18-decimal leg weigh equally
                let base = pow10(self.decimals0.min(self.decimals1));
                let a = mul_div(amount0, base, pow10(self.decimals0))?;
                let b = mul_div(amount1, base, pow10(self.decimals1))?;
                a.checked_add(b)
                    .ok_or_else(|| AmmError::InvalidInput("initial deposit overflow".to_string()))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────
    // State transitions
    // ─────────────────────────────────────────────────────────────────

    /// Mints LP shares to `to` for tokens already transferred into the
    /// pool's account. Returns the shares minted to `to`; the very
    /// first mint additionally locks [`MINIMUM_LIQUIDITY`] shares in
    /// the zero account forever.
    pub fn mint(
        &mut self,
        ledger: &mut TokenLedger,
        to: &str,
        now: u64,
    ) -> Result<u128, AmmError> {
        self.acquire_lock()?;
        let result = self.mint_locked(ledger, to, now);
        self.release_lock();
        result
    }

    fn mint_locked(
        &mut self,
        ledger: &mut TokenLedger,
        to: &str,
        now: u64,
    ) -> Result<u128, AmmError> {
        let balance0 = ledger.balance_of(&self.token0, &self.id);
        let balance1 = ledger.balance_of(&self.token1, &self.id);
        let amount0 = balance0.saturating_sub(self.reserve0);
        let amount1 = balance1.saturating_sub(self.reserve1);
        let first = self.total_shares(ledger) == 0;
        let minted = self.quote_shares(ledger, amount0, amount1)?;
        // pre-check the supply sum so the two ledger mints cannot fail
        // halfway through
        let locked = if first { MINIMUM_LIQUIDITY } else { 0 };
        self.total_shares(ledger)
            .checked_add(locked)
            .and_then(|t| t.checked_add(minted))
            .ok_or_else(|| AmmError::InvalidInput("share supply overflow".to_string()))?;
        if first {
            ledger.mint(&self.id, ZERO_ACCOUNT, MINIMUM_LIQUIDITY)?;
        }
        ledger.mint(&self.id, to, minted)?;
        self.update(balance0, balance1, now)?;
        Ok(minted)
    }

    /// Burns the LP shares sitting in the pool's own account and pays
    /// out the pro-rata slice of both balances to `to`. Callers
    /// transfer shares in first, mirroring the deposit discipline.
    pub fn burn(
        &mut self,
        ledger: &mut TokenLedger,
        to: &str,
        now: u64,
    ) -> Result<(u128, u128), AmmError> {
        self.acquire_lock()?;
        let result = self.burn_locked(ledger, to, now);
        self.release_lock();
        result
    }

    fn burn_locked(
        &mut self,
        ledger: &mut TokenLedger,
        to: &str,
        now: u64,
    ) -> Result<(u128, u128), AmmError> {
        let shares = ledger.balance_of(&self.id, &self.id);
        if shares == 0 {
            return Err(AmmError::InvalidInput(
                "no shares transferred to burn".to_string(),
            ));
        }
        let total = self.total_shares(ledger);
        let balance0 = ledger.balance_of(&self.token0, &self.id);
        let balance1 = ledger.balance_of(&self.token1, &self.id);
        let amount0 = mul_div(shares, balance0, total)?;
        let amount1 = mul_div(shares, balance1, total)?;
        if amount0 == 0 || amount1 == 0 {
            return Err(AmmError::InvalidInput(
                "insufficient liquidity burned".to_string(),
            ));
        }
        ledger.burn(&self.id, &self.id, shares)?;
        ledger.transfer(&self.token0, &self.id, to, amount0)?;
        ledger.transfer(&self.token1, &self.id, to, amount1)?;
        let balance0 = ledger.balance_of(&self.token0, &self.id);
        let balance1 = ledger.balance_of(&self.token1, &self.id);
        self.update(balance0, balance1, now)?;
        Ok((amount0, amount1))
    }

    /// Sends `amount0_out` and/or `amount1_out` to `to`, requiring that
    /// enough input was transferred in beforehand for the fee-adjusted
    /// invariant to hold. All checks run before any funds move, so a
    /// failed swap leaves both ledger and pool untouched.
    pub fn swap(
        &mut self,
        ledger: &mut TokenLedger,
        amount0_out: u128,
        amount1_out: u128,
        to: &str,
        now: u64,
    ) -> Result<(), AmmError> {
        self.acquire_lock()?;
        let result = self.swap_locked(ledger, amount0_out, amount1_out, to, now);
        self.release_lock();
        result
    }

    fn swap_locked(
        &mut self,
        ledger: &mut TokenLedger,
        amount0_out: u128,
        amount1_out: u128,
        to: &str,
        now: u64,
    ) -> Result<(), AmmError> {
        if amount0_out == 0 && amount1_out == 0 {
            return Err(AmmError::InvalidInput("zero output amount".to_string()));
        }
        if amount0_out >= self.reserve0 || amount1_out >= self.reserve1 {
            return Err(AmmError::InvalidInput(
                "output exceeds reserves".to_string(),
            ));
        }
        if to == self.token0 || to == self.token1 {
            return Err(AmmError::InvalidInput(
                "swap recipient is a pool token".to_string(),
            ));
        }
        let balance0 = ledger.balance_of(&self.token0, &self.id);
        let balance1 = ledger.balance_of(&self.token1, &self.id);
        let amount0_in = balance0.saturating_sub(self.reserve0);
        let amount1_in = balance1.saturating_sub(self.reserve1);
        if amount0_in == 0 && amount1_in == 0 {
            return Err(AmmError::InvalidInput("zero input amount".to_string()));
        }
        let new_balance0 = balance0.checked_sub(amount0_out).ok_or_else(|| {
            AmmError::InvalidInput("output exceeds pool balance".to_string())
        })?;
        let new_balance1 = balance1.checked_sub(amount1_out).ok_or_else(|| {
            AmmError::InvalidInput("output exceeds pool balance".to_string())
        })?;
        // the invariant check sees balances net of the input fee, which
        // is how the fee accrues to liquidity providers
        let fee0 = mul_div(amount0_in, self.fee_bps as u128, BPS_DENOMINATOR)?;
        let fee1 = mul_div(amount1_in, self.fee_bps as u128, BPS_DENOMINATOR)?;
        let adjusted0 = new_balance0.saturating_sub(fee0);
        let adjusted1 = new_balance1.saturating_sub(fee1);
        let k_before = self.invariant(self.reserve0, self.reserve1)?;
        let k_after = self.invariant(adjusted0, adjusted1)?;
        if k_after < k_before {
            return Err(AmmError::InvariantViolation(
                "swap violates the curve invariant".to_string(),
            ));
        }
        if amount0_out > 0 {
            ledger.transfer(&self.token0, &self.id, to, amount0_out)?;
        }
        if amount1_out > 0 {
            ledger.transfer(&self.token1, &self.id, to, amount1_out)?;
        }
        self.update(new_balance0, new_balance1, now)
    }

    /// Reconciles tracked reserves with actual ledger balances and
    /// advances the price accumulators.
    pub fn sync(&mut self, ledger: &TokenLedger, now: u64) -> Result<(), AmmError> {
        self.acquire_lock()?;
        let balance0 = ledger.balance_of(&self.token0, &self.id);
        let balance1 = ledger.balance_of(&self.token1, &self.id);
        let result = self.update(balance0, balance1, now);
        self.release_lock();
        result
    }

    /// Pays out any balance in excess of tracked reserves to `to`.
    /// The inverse of [`Pool::sync`]: reserves stay, the surplus moves.
    pub fn skim(
        &mut self,
        ledger: &mut TokenLedger,
        to: &str,
    ) -> Result<(u128, u128), AmmError> {
        self.acquire_lock()?;
        let result = self.skim_locked(ledger, to);
        self.release_lock();
        result
    }

    fn skim_locked(
        &mut self,
        ledger: &mut TokenLedger,
        to: &str,
    ) -> Result<(u128, u128), AmmError> {
        let balance0 = ledger.balance_of(&self.token0, &self.id);
        let balance1 = ledger.balance_of(&self.token1, &self.id);
        let excess0 = balance0.saturating_sub(self.reserve0);
        let excess1 = balance1.saturating_sub(self.reserve1);
        if excess0 > 0 {
            ledger.transfer(&self.token0, &self.id, to, excess0)?;
        }
        if excess1 > 0 {
            ledger.transfer(&self.token1, &self.id, to, excess1)?;
        }
        Ok((excess0, excess1))
    }

    // ─────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────

    fn acquire_lock(&mut self) -> Result<(), AmmError> {
        if self.locked {
            return Err(AmmError::InvariantViolation(format!(
                "pool {} is locked",
                self.symbol
            )));
        }
        self.locked = true;
        Ok(())
    }

    fn release_lock(&mut self) {
        self.locked = false;
    }

    /// Writes new reserves, folding the time elapsed at the old spot
    /// price into the cumulative-price accumulators first.
    fn update(&mut self, balance0: u128, balance1: u128, now: u64) -> Result<(), AmmError> {
        let elapsed = now.saturating_sub(self.last_update) as u128;
        if elapsed > 0 && self.reserve0 > 0 && self.reserve1 > 0 {
            let spot0 = spot_price(self.reserve1, self.reserve0);
            let spot1 = spot_price(self.reserve0, self.reserve1);
            self.cumulative_price0 = self.cumulative_price0.wrapping_add(spot0.wrapping_mul(elapsed));
            self.cumulative_price1 = self.cumulative_price1.wrapping_add(spot1.wrapping_mul(elapsed));
        }
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.last_update = now;
        self.last_k = encode_k(self.invariant(balance0, balance1)?);
        Ok(())
    }

    /// Curve invariant over the given balances, kind-dispatched.
    pub(crate) fn invariant(&self, balance0: u128, balance1: u128) -> Result<U256, AmmError> {
        match self.kind {
            PoolKind::Volatile => Ok(curve::k_volatile(balance0, balance1)),
            PoolKind::Stable => {
                let x = curve::normalize(balance0, pow10(self.decimals0))?;
                let y = curve::normalize(balance1, pow10(self.decimals1))?;
                curve::k_stable(x, y)
            }
        }
    }
}

/// Raw-reserve spot price scaled by 1e18, saturating at u128::MAX.
/// The accumulators wrap anyway, so saturation only caps the rate for
/// pathological reserve ratios.
fn spot_price(numerator: u128, denominator: u128) -> u128 {
    let wide = U256::from(numerator) * U256::from(NORMALIZED_ONE) / U256::from(denominator);
    u128::try_from(wide).unwrap_or(u128::MAX)
}

fn encode_k(k: U256) -> String {
    hex::encode(k.to_be_bytes::<32>())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TESTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    const POOL_ID: &str = "pool-mim-ust";
    const MIM: u128 = 1_000_000_000_000_000_000; // 18 decimals
    const UST: u128 = 1_000_000; // 6 decimals

    fn setup(kind: PoolKind) -> (TokenLedger, Pool) {
        let mut ledger = TokenLedger::new();
        ledger.register_token("mim", "MIM", 18).unwrap();
        ledger.register_token("ust", "ust", 6).unwrap();
        ledger
            .register_token(POOL_ID, &format!("{}-MIM/ust", kind.prefix()), 18)
            .unwrap();
        ledger.mint("mim", "alice", 1_000_000 * MIM).unwrap();
        ledger.mint("ust", "alice", 1_000_000 * UST).unwrap();
        let pool = Pool::new(
            POOL_ID.to_string(),
            format!("{} - MIM/ust", kind.describe()),
            format!("{}-MIM/ust", kind.prefix()),
            kind,
            "mim".to_string(),
            "ust".to_string(),
            18,
            6,
            30,
            0,
        );
        (ledger, pool)
    }

    fn deposit(ledger: &mut TokenLedger, amount_mim: u128, amount_ust: u128) {
        ledger.transfer("mim", "alice", POOL_ID, amount_mim).unwrap();
        ledger.transfer("ust", "alice", POOL_ID, amount_ust).unwrap();
    }

    #[test]
    fn test_volatile_first_mint_locks_minimum_liquidity() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        let minted = pool.mint(&mut ledger, "alice", 0).unwrap();
        // sqrt(1e21 * 1e9) = 1e15 total, minus the locked 1000
        assert_eq!(minted, 1_000_000_000_000_000 - 1_000);
        assert_eq!(pool.total_shares(&ledger), 1_000_000_000_000_000);
        assert_eq!(ledger.balance_of(POOL_ID, ZERO_ACCOUNT), 1_000);
        assert_eq!(ledger.balance_of(POOL_ID, "alice"), minted);
        let (r0, r1, _) = pool.get_reserves();
        assert_eq!((r0, r1), (1_000 * MIM, 1_000 * UST));
    }

    #[test]
    fn test_stable_first_mint_scales_to_common_decimals() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        let minted = pool.mint(&mut ledger, "alice", 0).unwrap();
        // both legs rescale to the 6-decimal basis: 1e9 + 1e9 = 2e9
        assert_eq!(pool.total_shares(&ledger), 2_000_000_000);
        assert_eq!(minted, 2_000_000_000 - 1_000);
    }

    #[test]
    fn test_first_mint_rejects_dust_deposit() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 10, 10);
        let err = pool.mint(&mut ledger, "alice", 0).unwrap_err();
        assert!(matches!(err, AmmError::InvalidInput(_)));
    }

    #[test]
    fn test_mint_without_deposit_fails_and_releases_lock() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        assert!(pool.mint(&mut ledger, "alice", 0).is_err());
        assert!(!pool.is_locked());
        // pool still usable afterwards
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        assert!(pool.mint(&mut ledger, "alice", 0).is_ok());
    }

    #[test]
    fn test_subsequent_mint_is_proportional() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        deposit(&mut ledger, 500 * MIM, 500 * UST);
        let minted = pool.mint(&mut ledger, "alice", 10).unwrap();
        assert_eq!(minted, 1_000_000_000);
    }

    #[test]
    fn test_unbalanced_mint_takes_smaller_entitlement() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        // surplus on the ust side earns nothing extra
        deposit(&mut ledger, 500 * MIM, 1_000 * UST);
        let minted = pool.mint(&mut ledger, "alice", 10).unwrap();
        assert_eq!(minted, 1_000_000_000);
    }

    #[test]
    fn test_burn_returns_pro_rata_slice() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        let mim_before = ledger.balance_of("mim", "alice");
        let ust_before = ledger.balance_of("ust", "alice");
        deposit(&mut ledger, MIM, UST);
        let minted = pool.mint(&mut ledger, "alice", 0).unwrap();
        assert_eq!(minted, 1_999_000);
        ledger.transfer(POOL_ID, "alice", POOL_ID, minted).unwrap();
        let (amount0, amount1) = pool.burn(&mut ledger, "alice", 5).unwrap();
        // 1_999_000 of 2_000_000 shares
        assert_eq!(amount0, 999_500_000_000_000_000);
        assert_eq!(amount1, 999_500);
        assert_eq!(ledger.balance_of("mim", "alice"), mim_before - 500_000_000_000_000);
        assert_eq!(ledger.balance_of("ust", "alice"), ust_before - 500);
        assert_eq!(pool.total_shares(&ledger), 1_000);
    }

    #[test]
    fn test_burn_without_shares_fails() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let err = pool.burn(&mut ledger, "alice", 1).unwrap_err();
        assert!(matches!(err, AmmError::InvalidInput(_)));
    }

    #[test]
    fn test_burn_rejects_zero_sided_payout() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, MIM, UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        // one share of two million rounds the 6-decimal leg to zero
        ledger.transfer(POOL_ID, "alice", POOL_ID, 1).unwrap();
        let err = pool.burn(&mut ledger, "alice", 1).unwrap_err();
        assert!(matches!(err, AmmError::InvalidInput(_)));
    }

    #[test]
    fn test_swap_pays_the_quote_and_grows_k() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let quote = pool.get_amount_out(MIM, "mim").unwrap();
        assert_eq!(quote, 996_006);
        let k_before = pool.invariant(1_000 * MIM, 1_000 * UST).unwrap();
        ledger.transfer("mim", "alice", POOL_ID, MIM).unwrap();
        pool.swap(&mut ledger, 0, quote, "bob", 10).unwrap();
        assert_eq!(ledger.balance_of("ust", "bob"), quote);
        let (r0, r1, _) = pool.get_reserves();
        assert_eq!(r0, 1_001 * MIM);
        assert_eq!(r1, 1_000 * UST - quote);
        assert!(pool.invariant(r0, r1).unwrap() >= k_before);
    }

    #[test]
    fn test_stable_swap_outprices_volatile() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let stable_quote = pool.get_amount_out(MIM, "mim").unwrap();
        ledger.transfer("mim", "alice", POOL_ID, MIM).unwrap();
        pool.swap(&mut ledger, 0, stable_quote, "bob", 10).unwrap();
        assert_eq!(ledger.balance_of("ust", "bob"), stable_quote);
        // flatter curve beats constant product near parity
        assert!(stable_quote > 996_006);
        assert!(stable_quote < UST);
    }

    #[test]
    fn test_swap_without_input_moves_nothing() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let err = pool.swap(&mut ledger, 0, 1_000, "bob", 10).unwrap_err();
        assert!(matches!(err, AmmError::InvalidInput(_)));
        assert_eq!(ledger.balance_of("ust", "bob"), 0);
        let (r0, r1, _) = pool.get_reserves();
        assert_eq!((r0, r1), (1_000 * MIM, 1_000 * UST));
    }

    #[test]
    fn test_swap_rejects_draining_a_reserve() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        ledger.transfer("mim", "alice", POOL_ID, MIM).unwrap();
        let err = pool
            .swap(&mut ledger, 0, 1_000 * UST, "bob", 10)
            .unwrap_err();
        assert!(matches!(err, AmmError::InvalidInput(_)));
    }

    #[test]
    fn test_swap_underpaying_the_curve_fails() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let quote = pool.get_amount_out(MIM, "mim").unwrap();
        ledger.transfer("mim", "alice", POOL_ID, MIM).unwrap();
        // asking for one unit above the quote breaks the invariant
        let err = pool.swap(&mut ledger, 0, quote + 1, "bob", 10).unwrap_err();
        assert!(matches!(err, AmmError::InvariantViolation(_)));
    }

    #[test]
    fn test_operations_fail_while_locked() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        pool.locked = true;
        let err = pool.sync(&ledger, 10).unwrap_err();
        assert!(matches!(err, AmmError::InvariantViolation(_)));
        let err = pool.swap(&mut ledger, 0, 1, "bob", 10).unwrap_err();
        assert!(matches!(err, AmmError::InvariantViolation(_)));
    }

    #[test]
    fn test_sync_absorbs_donations_and_advances_twap() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        ledger.transfer("mim", "alice", POOL_ID, MIM).unwrap();
        pool.sync(&ledger, 100).unwrap();
        let (r0, _, last) = pool.get_reserves();
        assert_eq!(r0, 1_001 * MIM);
        assert_eq!(last, 100);
        // spot0 = r1 * 1e18 / r0 = 1e6; spot1 = 1e30; each times 100s
        let (cum0, cum1) = pool.current_cumulative_prices(100);
        assert_eq!(cum0, 100_000_000);
        assert_eq!(cum1, 100_000_000_000_000_000_000_000_000_000_000);
    }

    #[test]
    fn test_current_cumulative_prices_projects_forward() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let (cum0_at_50, _) = pool.current_cumulative_prices(50);
        assert_eq!(cum0_at_50, 50_000_000);
        // stored accumulators are untouched by projection
        let (cum0_at_0, _) = pool.current_cumulative_prices(0);
        assert_eq!(cum0_at_0, 0);
    }

    #[test]
    fn test_skim_removes_only_the_excess() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        ledger.transfer("mim", "alice", POOL_ID, 5 * MIM).unwrap();
        let (excess0, excess1) = pool.skim(&mut ledger, "carol").unwrap();
        assert_eq!(excess0, 5 * MIM);
        assert_eq!(excess1, 0);
        assert_eq!(ledger.balance_of("mim", "carol"), 5 * MIM);
        let (r0, _, _) = pool.get_reserves();
        assert_eq!(r0, 1_000 * MIM);
        assert_eq!(ledger.balance_of("mim", POOL_ID), 1_000 * MIM);
    }

    #[test]
    fn test_get_amount_out_input_validation() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        assert!(matches!(
            pool.get_amount_out(0, "mim"),
            Err(AmmError::InvalidInput(_))
        ));
        assert!(matches!(
            pool.get_amount_out(1, "doge"),
            Err(AmmError::InvalidInput(_))
        ));
        // empty pool quotes nothing
        assert!(pool.get_amount_out(1, "mim").is_err());
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        assert!(pool.get_amount_out(1_000, "mim").is_ok());
    }

    #[test]
    fn test_metadata_reports_units_and_reserves() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let meta = pool.metadata();
        assert_eq!(meta.kind, PoolKind::Stable);
        assert_eq!(meta.unit0, MIM);
        assert_eq!(meta.unit1, UST);
        assert_eq!(meta.reserve0, 1_000 * MIM);
        assert_eq!(meta.reserve1, 1_000 * UST);
        assert_eq!(meta.token0, "mim");
        assert_eq!(meta.token1, "ust");
    }

    #[test]
    fn test_last_k_snapshot_tracks_updates() {
        let (mut ledger, mut pool) = setup(PoolKind::Volatile);
        assert_eq!(pool.last_k(), &"0".repeat(64));
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let k = pool.invariant(1_000 * MIM, 1_000 * UST).unwrap();
        assert_eq!(pool.last_k(), hex::encode(k.to_be_bytes::<32>()));
    }

    #[test]
    fn test_pool_snapshot_round_trip() {
        let (mut ledger, mut pool) = setup(PoolKind::Stable);
        deposit(&mut ledger, 1_000 * MIM, 1_000 * UST);
        pool.mint(&mut ledger, "alice", 0).unwrap();
        let encoded = serde_json::to_string(&pool).unwrap();
        let decoded: Pool = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, pool);
    }
}
