// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - CORE MODULE
//
// Shared primitives for the exchange state machine: the error taxonomy,
// integer math helpers, the fungible-token ledger collaborator, and the
// TOML exchange configuration.
// All financial arithmetic uses u128 atomic units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod config;
pub mod error;
pub mod ledger;
pub mod math;

pub use config::ExchangeConfig;
pub use error::AmmError;
pub use ledger::{TokenInfo, TokenLedger, MAX_TOKEN_DECIMALS};
pub use math::{isqrt, isqrt_wide, mul_div, pow10, U256};
