// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - SWAP CURVES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Pricing math for the two pool kinds. Volatile pools price on the
// constant product k = x * y. Stable pools price on the flatter curve
// k = x * y * (x^2 + y^2) over reserves normalized to a common
// 18-decimal basis, which keeps near-parity swaps close to 1:1.
//
// All arithmetic widens to 256 bits before multiplying so intermediate
// products cannot wrap. Quantities that genuinely exceed the 256-bit
// range are reported as errors rather than silently truncated.

use basin_core::math::{mul_div, narrow, U256};
use basin_core::AmmError;

use crate::NORMALIZED_ONE;

/// Iteration cap for the stable-curve Newton solver.
pub const MAX_SOLVER_ITERATIONS: usize = 255;

// ─────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────

/// Scales a raw token amount to the 18-decimal basis.
///
/// `unit` is the token's own base unit, `10^decimals`. Exact for every
/// supported decimal count because `decimals <= 18`.
pub fn normalize(amount: u128, unit: u128) -> Result<u128, AmmError> {
    mul_div(amount, NORMALIZED_ONE, unit)
}

/// Scales an 18-decimal amount back to raw token units, flooring.
pub fn denormalize(amount: u128, unit: u128) -> Result<u128, AmmError> {
    mul_div(amount, unit, NORMALIZED_ONE)
}

// ─────────────────────────────────────────────────────────────────────
// Invariants
// ─────────────────────────────────────────────────────────────────────

/// Constant-product invariant for volatile pools, k = x * y.
///
/// Two 128-bit reserves always fit a 256-bit product.
pub fn k_volatile(reserve0: u128, reserve1: u128) -> U256 {
    U256::from(reserve0) * U256::from(reserve1)
}

/// Stable invariant k = x * y * (x^2 + y^2) / 1e54 over normalized
/// reserves, i.e. both inputs must already be on the 18-decimal basis.
///
/// Evaluated through the same expanded form the Newton solver uses, so
/// a root the solver accepts always satisfies the invariant check with
/// identical flooring.
pub fn k_stable(x: u128, y: u128) -> Result<U256, AmmError> {
    curve_f(U256::from(x), U256::from(y)).ok_or_else(|| {
        AmmError::InvalidInput("reserve magnitude overflows the stable invariant".to_string())
    })
}

/// f(x, y) = x*y^3/1e36 + x^3*y/1e36, the stable invariant expanded for
/// the Newton iteration. `None` on 256-bit overflow.
fn curve_f(x: U256, y: U256) -> Option<U256> {
    let one = U256::from(NORMALIZED_ONE);
    let y3 = y.checked_mul(y)? / one;
    let y3 = y3.checked_mul(y)? / one;
    let x3 = x.checked_mul(x)? / one;
    let x3 = x3.checked_mul(x)? / one;
    let term0 = x.checked_mul(y3)? / one;
    let term1 = x3.checked_mul(y)?;
    term0.checked_add(term1 / one)
}

/// df/dy = 3*x*y^2/1e36 + x^3/1e36. `None` on 256-bit overflow.
fn curve_d(x: U256, y: U256) -> Option<U256> {
    let one = U256::from(NORMALIZED_ONE);
    let y2 = y.checked_mul(y)? / one;
    let term0 = U256::from(3u64).checked_mul(x)?.checked_mul(y2)? / one;
    let x3 = x.checked_mul(x)? / one;
    let x3 = x3.checked_mul(x)? / one;
    term0.checked_add(x3)
}

fn overflow_err() -> AmmError {
    AmmError::InvalidInput("amount magnitude overflows the stable curve".to_string())
}

/// Solves f(x0, y) = k for y with Newton's method.
///
/// `x0` is the post-swap input-side reserve and `y_start` the current
/// output-side reserve, both on the 18-decimal basis. Converges when
/// successive iterates differ by at most one unit; the returned root is
/// then nudged up if needed so the invariant at (x0, y) never falls
/// below `k`. Fails if the solver stalls, diverges below zero, or does
/// not converge within [`MAX_SOLVER_ITERATIONS`] rounds.
pub fn solve_y(x0: u128, k: U256, y_start: u128) -> Result<u128, AmmError> {
    let one = U256::from(NORMALIZED_ONE);
    let x = U256::from(x0);
    let mut y = U256::from(y_start);
    for _ in 0..MAX_SOLVER_ITERATIONS {
        let y_prev = y;
        let f = curve_f(x, y).ok_or_else(overflow_err)?;
        let d = curve_d(x, y).ok_or_else(overflow_err)?;
        if d.is_zero() {
            return Err(AmmError::InvariantViolation(
                "stable curve solver stalled on a flat derivative".to_string(),
            ));
        }
        if f < k {
            let dy = (k - f).checked_mul(one).ok_or_else(overflow_err)? / d;
            y = y.checked_add(dy).ok_or_else(overflow_err)?;
        } else {
            let dy = (f - k).checked_mul(one).ok_or_else(overflow_err)? / d;
            y = y.checked_sub(dy).ok_or_else(|| {
                AmmError::InvariantViolation("stable curve solver diverged below zero".to_string())
            })?;
        }
        let step = if y > y_prev { y - y_prev } else { y_prev - y };
        if step <= U256::from(1u64) {
            // land on or above the curve so the post-swap invariant
            // check cannot fail by a rounding unit
            if curve_f(x, y).ok_or_else(overflow_err)? < k {
                y += U256::from(1u64);
            }
            return narrow(y);
        }
    }
    Err(AmmError::InvariantViolation(
        "stable curve solver did not converge".to_string(),
    ))
}

// ─────────────────────────────────────────────────────────────────────
// Quoting
// ─────────────────────────────────────────────────────────────────────

/// Output amount for a volatile swap: amount_in * reserve_out /
/// (reserve_in + amount_in). The fee must already be deducted from
/// `amount_in`.
pub fn volatile_amount_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<u128, AmmError> {
    let denominator = reserve_in
        .checked_add(amount_in)
        .ok_or_else(|| AmmError::InvalidInput("swap input overflows reserves".to_string()))?;
    mul_div(amount_in, reserve_out, denominator)
}

/// Output amount for a stable swap, in raw units of the output token.
///
/// Normalizes both reserves and the input to the 18-decimal basis,
/// solves the curve for the new output-side reserve, and floors the
/// difference back into raw units. The fee must already be deducted
/// from `amount_in`.
pub fn stable_amount_out(
    amount_in: u128,
    in_is_token0: bool,
    reserve0: u128,
    reserve1: u128,
    unit0: u128,
    unit1: u128,
) -> Result<u128, AmmError> {
    let x18 = normalize(reserve0, unit0)?;
    let y18 = normalize(reserve1, unit1)?;
    let k = k_stable(x18, y18)?;
    let (reserve_in, reserve_out, unit_in, unit_out) = if in_is_token0 {
        (x18, y18, unit0, unit1)
    } else {
        (y18, x18, unit1, unit0)
    };
    let amount_in_18 = normalize(amount_in, unit_in)?;
    let x_new = reserve_in
        .checked_add(amount_in_18)
        .ok_or_else(|| AmmError::InvalidInput("swap input overflows reserves".to_string()))?;
    let y_new = solve_y(x_new, k, reserve_out)?;
    let out_18 = reserve_out.saturating_sub(y_new);
    denormalize(out_18, unit_out)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TESTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
