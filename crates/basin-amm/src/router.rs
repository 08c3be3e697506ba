// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - ROUTER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Stateless convenience layer over the registry and pools: canonical
// token ordering, pure pool-id resolution, multi-hop quoting, and the
// user-facing liquidity and swap operations with slippage and deadline
// protection.
//
// Executing operations pull caller funds through ledger allowances
// granted to [`ROUTER_ACCOUNT`] and run every check before any funds
// move. A failed call leaves ledger, registry, and pools exactly as
// they were.

use serde::{Deserialize, Serialize};

use basin_core::math::mul_div;
use basin_core::{AmmError, TokenLedger};

use crate::pool::{Pool, PoolKind};
use crate::registry::{self, Registry};

/// Ledger identity the router spends caller allowances as.
pub const ROUTER_ACCOUNT: &str = "router";

/// One hop of a swap path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub from: String,
    pub to: String,
    pub kind: PoolKind,
}

/// Namespace for the stateless router operations.
pub struct Router;

impl Router {
    /// Canonical (token0, token1) ordering for a pair.
    pub fn sort_tokens<'a>(
        token_a: &'a str,
        token_b: &'a str,
    ) -> Result<(&'a str, &'a str), AmmError> {
        registry::sort_tokens(token_a, token_b)
    }

    /// Pool id for a pair and kind under the registry's label, derived
    /// without reading the pool table.
    pub fn pool_for(
        registry: &Registry,
        token_a: &str,
        token_b: &str,
        kind: PoolKind,
    ) -> Result<String, AmmError> {
        registry.pool_for(token_a, token_b, kind)
    }

    /// Best single-hop quote across the pair's stable and volatile
    /// pools, with the kind that produced it.
    pub fn get_amount_out(
        registry: &Registry,
        amount_in: u128,
        token_in: &str,
        token_out: &str,
    ) -> Result<(u128, PoolKind), AmmError> {
        if amount_in == 0 {
            return Err(AmmError::InvalidInput("zero input amount".to_string()));
        }
        let mut exists = false;
        let mut best: Option<(u128, PoolKind)> = None;
        for kind in [PoolKind::Volatile, PoolKind::Stable] {
            if let Some(pool) = registry.lookup(token_in, token_out, kind) {
                exists = true;
                if let Ok(out) = pool.get_amount_out(amount_in, token_in) {
                    if best.map_or(true, |(b, _)| out > b) {
                        best = Some((out, kind));
                    }
                }
            }
        }
        match best {
            Some(quote) => Ok(quote),
            None if exists => Err(AmmError::InvalidInput(
                "pool has no liquidity".to_string(),
            )),
            None => Err(AmmError::NotFound(format!(
                "pool {}/{}",
                token_in, token_out
            ))),
        }
    }

    /// Amounts along a multi-hop path: index 0 is `amount_in`, index i
    /// the output of hop i. Quotes are static, each against current
    /// reserves.
    pub fn get_amounts_out(
        registry: &Registry,
        amount_in: u128,
        routes: &[Route],
    ) -> Result<Vec<u128>, AmmError> {
        if routes.is_empty() {
            return Err(AmmError::InvalidInput("empty route".to_string()));
        }
        if amount_in == 0 {
            return Err(AmmError::InvalidInput("zero input amount".to_string()));
        }
        for pair in routes.windows(2) {
            if pair[0].to != pair[1].from {
                return Err(AmmError::InvalidInput(format!(
                    "disconnected route at {} -> {}",
                    pair[0].to, pair[1].from
                )));
            }
        }
        let mut amounts = Vec::with_capacity(routes.len() + 1);
        amounts.push(amount_in);
        let mut current = amount_in;
        for route in routes {
            let pool = registry
                .lookup(&route.from, &route.to, route.kind)
                .ok_or_else(|| {
                    AmmError::NotFound(format!(
                        "pool {}-{}/{}",
                        route.kind.prefix(),
                        route.from,
                        route.to
                    ))
                })?;
            current = pool.get_amount_out(current, &route.from)?;
            amounts.push(current);
        }
        Ok(amounts)
    }

    /// Deposit amounts that match the pool's current reserve ratio,
    /// capped by the desired amounts. An absent or empty pool imposes
    /// no ratio, so the desired amounts come back unchanged.
    pub fn quote_add_liquidity(
        registry: &Registry,
        token_a: &str,
        token_b: &str,
        kind: PoolKind,
        amount_a_desired: u128,
        amount_b_desired: u128,
    ) -> Result<(u128, u128), AmmError> {
        registry::sort_tokens(token_a, token_b)?;
        let pool = match registry.lookup(token_a, token_b, kind) {
            Some(pool) => pool,
            None => return Ok((amount_a_desired, amount_b_desired)),
        };
        let (reserve0, reserve1, _) = pool.get_reserves();
        if reserve0 == 0 && reserve1 == 0 {
            return Ok((amount_a_desired, amount_b_desired));
        }
        let (reserve_a, reserve_b) = if token_a == pool.token0() {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };
        let amount_b_optimal = mul_div(amount_a_desired, reserve_b, reserve_a)?;
        if amount_b_optimal <= amount_b_desired {
            Ok((amount_a_desired, amount_b_optimal))
        } else {
            let amount_a_optimal = mul_div(amount_b_desired, reserve_a, reserve_b)?;
            Ok((amount_a_optimal, amount_b_desired))
        }
    }

    /// Adds liquidity for a pair, creating the pool on first use.
    ///
    /// Quotes ratio-matched amounts, verifies the resulting shares
    /// against `min_shares` and the caller's funds and allowance, and
    /// only then pulls tokens and mints. Returns the deposited amounts
    /// in caller order and the shares minted to `to`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        registry: &mut Registry,
        ledger: &mut TokenLedger,
        caller: &str,
        token_a: &str,
        token_b: &str,
        kind: PoolKind,
        amount_a_desired: u128,
        amount_b_desired: u128,
        min_shares: u128,
        to: &str,
        deadline: u64,
        now: u64,
    ) -> Result<(u128, u128, u128), AmmError> {
        check_deadline(deadline, now)?;
        if amount_a_desired == 0 || amount_b_desired == 0 {
            return Err(AmmError::InvalidInput("zero desired amount".to_string()));
        }
        let (amount_a, amount_b) = Self::quote_add_liquidity(
            registry,
            token_a,
            token_b,
            kind,
            amount_a_desired,
            amount_b_desired,
        )?;
        if amount_a == 0 || amount_b == 0 {
            return Err(AmmError::InvalidInput(
                "quoted liquidity amount is zero".to_string(),
            ));
        }
        let id = registry.pool_for(token_a, token_b, kind)?;
        let (token0, token1) = registry::sort_tokens(token_a, token_b)?;
        let (amount0, amount1) = if token_a == token0 {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        let pool_exists = registry.is_pool(&id);
        let expected = match registry.get_pool(&id) {
            Some(pool) => {
                if pool.is_locked() {
                    return Err(AmmError::InvariantViolation(format!(
                        "pool {} is locked",
                        pool.symbol()
                    )));
                }
                pool.quote_shares(ledger, amount0, amount1)?
            }
            None => {
                // pool not created yet: quote against a blank pool of
                // the same shape so slippage is checked before creation
                let probe = Pool::new(
                    id.clone(),
                    String::new(),
                    String::new(),
                    kind,
                    token0.to_string(),
                    token1.to_string(),
                    ledger.decimals(token0)?,
                    ledger.decimals(token1)?,
                    registry.fee_bps(),
                    now,
                );
                probe.quote_shares(ledger, amount0, amount1)?
            }
        };
        if expected < min_shares {
            return Err(AmmError::SlippageExceeded {
                minimum: min_shares,
                actual: expected,
            });
        }
        ensure_pullable(ledger, token_a, caller, amount_a)?;
        ensure_pullable(ledger, token_b, caller, amount_b)?;
        if !pool_exists {
            registry.create_pool(ledger, token_a, token_b, kind, now)?;
        }
        ledger.transfer_from(token_a, ROUTER_ACCOUNT, caller, &id, amount_a)?;
        ledger.transfer_from(token_b, ROUTER_ACCOUNT, caller, &id, amount_b)?;
        let pool = registry
            .get_pool_mut(&id)
            .ok_or_else(|| AmmError::NotFound(format!("pool {}", id)))?;
        let shares = pool.mint(ledger, to, now)?;
        Ok((amount_a, amount_b, shares))
    }

    /// Burns `shares` of the pair's pool and pays both tokens to `to`.
    /// Pro-rata amounts are checked against the caller minimums before
    /// any shares move. Returns the amounts in caller order.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        registry: &mut Registry,
        ledger: &mut TokenLedger,
        caller: &str,
        token_a: &str,
        token_b: &str,
        kind: PoolKind,
        shares: u128,
        amount_a_min: u128,
        amount_b_min: u128,
        to: &str,
        deadline: u64,
        now: u64,
    ) -> Result<(u128, u128), AmmError> {
        check_deadline(deadline, now)?;
        if shares == 0 {
            return Err(AmmError::InvalidInput("zero shares".to_string()));
        }
        let id = registry.pool_for(token_a, token_b, kind)?;
        let pool = registry.get_pool(&id).ok_or_else(|| {
            AmmError::NotFound(format!("pool {}/{}", token_a, token_b))
        })?;
        if pool.is_locked() {
            return Err(AmmError::InvariantViolation(format!(
                "pool {} is locked",
                pool.symbol()
            )));
        }
        let token0 = pool.token0().to_string();
        let total = pool.total_shares(ledger);
        let balance0 = ledger.balance_of(&token0, &id);
        let balance1 = ledger.balance_of(pool.token1(), &id);
        let amount0 = mul_div(shares, balance0, total)?;
        let amount1 = mul_div(shares, balance1, total)?;
        if amount0 == 0 || amount1 == 0 {
            return Err(AmmError::InvalidInput(
                "insufficient liquidity burned".to_string(),
            ));
        }
        let (amount_a, amount_b) = if token_a == token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < amount_a_min {
            return Err(AmmError::SlippageExceeded {
                minimum: amount_a_min,
                actual: amount_a,
            });
        }
        if amount_b < amount_b_min {
            return Err(AmmError::SlippageExceeded {
                minimum: amount_b_min,
                actual: amount_b,
            });
        }
        ensure_pullable(ledger, &id, caller, shares)?;
        ledger.transfer_from(&id, ROUTER_ACCOUNT, caller, &id, shares)?;
        let pool = registry
            .get_pool_mut(&id)
            .ok_or_else(|| AmmError::NotFound(format!("pool {}", id)))?;
        let (out0, out1) = pool.burn(ledger, to, now)?;
        let (out_a, out_b) = if token_a == token0 {
            (out0, out1)
        } else {
            (out1, out0)
        };
        Ok((out_a, out_b))
    }

    /// Swaps an exact input along a path of pools, delivering at least
    /// `amount_out_min` of the final token to `to` or failing with no
    /// effect. Returns the per-hop amounts actually traded.
    ///
    /// Each hop sends its output straight to the next pool's account,
    /// so intermediate tokens never rest anywhere else. A path may not
    /// visit the same pool twice: hop quotes are static and a repeat
    /// visit would execute against reserves the quote did not see.
    #[allow(clippy::too_many_arguments)]
    pub fn swap_exact_tokens_for_tokens(
        registry: &mut Registry,
        ledger: &mut TokenLedger,
        caller: &str,
        amount_in: u128,
        amount_out_min: u128,
        routes: &[Route],
        to: &str,
        deadline: u64,
        now: u64,
    ) -> Result<Vec<u128>, AmmError> {
        check_deadline(deadline, now)?;
        let amounts = Self::get_amounts_out(registry, amount_in, routes)?;
        let final_out = amounts[amounts.len() - 1];
        if final_out < amount_out_min {
            return Err(AmmError::SlippageExceeded {
                minimum: amount_out_min,
                actual: final_out,
            });
        }
        let mut pool_ids: Vec<String> = Vec::with_capacity(routes.len());
        for route in routes {
            let id = registry.pool_for(&route.from, &route.to, route.kind)?;
            if pool_ids.contains(&id) {
                return Err(AmmError::InvalidInput(
                    "route visits a pool twice".to_string(),
                ));
            }
            let pool = registry
                .get_pool(&id)
                .ok_or_else(|| AmmError::NotFound(format!("pool {}", id)))?;
            if pool.is_locked() {
                return Err(AmmError::InvariantViolation(format!(
                    "pool {} is locked",
                    pool.symbol()
                )));
            }
            pool_ids.push(id);
        }
        if let Some(last_pool) = registry.get_pool(&pool_ids[pool_ids.len() - 1]) {
            if to == last_pool.token0() || to == last_pool.token1() {
                return Err(AmmError::InvalidInput(
                    "swap recipient is a pool token".to_string(),
                ));
            }
        }
        ensure_pullable(ledger, &routes[0].from, caller, amount_in)?;
        ledger.transfer_from(&routes[0].from, ROUTER_ACCOUNT, caller, &pool_ids[0], amount_in)?;
        for (i, route) in routes.iter().enumerate() {
            let recipient = if i + 1 < pool_ids.len() {
                pool_ids[i + 1].clone()
            } else {
                to.to_string()
            };
            let pool = registry
                .get_pool_mut(&pool_ids[i])
                .ok_or_else(|| AmmError::NotFound(format!("pool {}", pool_ids[i])))?;
            let out = amounts[i + 1];
            let out_is_token0 = route.to == pool.token0();
            let (amount0_out, amount1_out) = if out_is_token0 { (out, 0) } else { (0, out) };
            pool.swap(ledger, amount0_out, amount1_out, &recipient, now)?;
        }
        Ok(amounts)
    }
}

fn check_deadline(deadline: u64, now: u64) -> Result<(), AmmError> {
    if now > deadline {
        return Err(AmmError::DeadlineExpired { deadline, now });
    }
    Ok(())
}

/// Verifies the router can pull `amount` of `token` from `owner`
/// before any part of an operation executes.
fn ensure_pullable(
    ledger: &TokenLedger,
    token: &str,
    owner: &str,
    amount: u128,
) -> Result<(), AmmError> {
    if !ledger.has_token(token) {
        return Err(AmmError::NotFound(format!("token {}", token)));
    }
    let allowed = ledger.allowance(token, owner, ROUTER_ACCOUNT);
    if allowed < amount {
        return Err(AmmError::Unauthorized(format!(
            "router allowance {} of token {}, needs {}",
            allowed, token, amount
        )));
    }
    let balance = ledger.balance_of(token, owner);
    if balance < amount {
        return Err(AmmError::InvalidInput(format!(
            "account {} holds {} of token {}, needs {}",
            owner, balance, token, amount
        )));
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TESTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
