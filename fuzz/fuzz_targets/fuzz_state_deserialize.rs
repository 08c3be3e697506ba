//! Fuzz target: state JSON deserialization
//!
//! Feeds arbitrary bytes to serde_json for the three persisted state
//! shapes. Deserialization must reject garbage gracefully, never
//! panic, and a successfully parsed registry must survive a re-encode.
//!
//! Run: cargo +nightly fuzz run fuzz_state_deserialize -- -max_len=4096

#![no_main]
use libfuzzer_sys::fuzz_target;

use basin_amm::{Pool, Registry};
use basin_core::TokenLedger;

fuzz_target!(|data: &[u8]| {
    let _: Result<TokenLedger, _> = serde_json::from_slice(data);
    let _: Result<Pool, _> = serde_json::from_slice(data);

    if let Ok(registry) = serde_json::from_slice::<Registry>(data) {
        // Whatever parsed must re-encode without loss.
        let encoded = serde_json::to_string(&registry).unwrap();
        let again: Registry = serde_json::from_str(&encoded).unwrap();
        assert_eq!(again, registry);
    }
});
