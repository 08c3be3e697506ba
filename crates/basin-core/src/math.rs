//! Integer math helpers shared by the pool, router, and reward crates.
//!
//! Amounts are u128 atomic units. Products that can exceed 128 bits
//! (invariant values, proportional-share numerators) widen to `U256`
//! and fail loudly when a result no longer fits in u128.

use crate::error::AmmError;
use ruint::Uint;

/// 256-bit unsigned integer for invariant and share arithmetic.
pub type U256 = Uint<256, 4>;

/// Floor integer square root via Newton's method.
pub fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = x.div_ceil(2);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Floor integer square root over the 256-bit domain.
///
/// Same Newton iteration as [`isqrt`], widened so share math can take
/// the root of a full 128-bit by 128-bit product.
pub fn isqrt_wide(n: U256) -> U256 {
    if n <= U256::from(1u64) {
        return n;
    }
    let mut x = n;
    let mut y = (n >> 1) + U256::from(1u64);
    while y < x {
        x = y;
        y = (y + n / y) >> 1;
    }
    x
}

/// 10^decimals. The ledger caps decimals at 18, so this never overflows.
pub fn pow10(decimals: u8) -> u128 {
    10u128.pow(decimals as u32)
}

/// Floor of `a * b / denom`, computed exactly through a 256-bit
/// intermediate. Errors rather than saturating: quote and share math
/// must not silently distort.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128, AmmError> {
    if denom == 0 {
        return Err(AmmError::InvalidInput("division by zero".to_string()));
    }
    let wide = U256::from(a) * U256::from(b) / U256::from(denom);
    narrow(wide)
}

/// Convert a `U256` back to u128, failing if the value does not fit.
pub fn narrow(v: U256) -> Result<u128, AmmError> {
    u128::try_from(v).map_err(|_| AmmError::InvalidInput("amount exceeds 128 bits".to_string()))
}
