// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - AMM MODULE
//
// The exchange proper: swap curves, liquidity pools, the pool registry,
// and the stateless router. Pools and their LP shares live inside the
// basin-core token ledger; everything here is a deterministic state
// machine driven by explicit timestamps.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod curve;
pub mod pool;
pub mod registry;
pub mod router;

pub use pool::{Pool, PoolKind, PoolMetadata};
pub use registry::{sort_tokens, Registry};
pub use router::{Route, Router, ROUTER_ACCOUNT};

/// Basis-point denominator for fee arithmetic.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// LP shares locked forever on a pool's first mint.
pub const MINIMUM_LIQUIDITY: u128 = 1_000;

/// 1.0 on the 18-decimal normalized basis used by the stable curve and
/// the price accumulators.
pub const NORMALIZED_ONE: u128 = 1_000_000_000_000_000_000;

/// Ledger account holding permanently locked first-mint shares.
pub const ZERO_ACCOUNT: &str = "zero";
