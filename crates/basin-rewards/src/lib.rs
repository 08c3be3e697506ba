// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - REWARDS MODULE
//
// Emission plumbing on top of the exchange: gauges stream rewards to
// LP stakers, bribes stream rewards to voters, and the voter splits
// its budget across pools by vote weight. All flows move through the
// basin-core token ledger under explicit timestamps, in fixed
// seven-day streaming periods.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod bribe;
pub mod gauge;
pub mod voter;

pub use bribe::Bribe;
pub use gauge::{Gauge, RewardState};
pub use voter::Voter;

/// Length of one reward streaming period: seven days.
pub const REWARD_DURATION_SECS: u64 = 604_800;

/// Fixed-point scale for the reward-per-token accumulators.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;
