//! Fuzz target: token ledger operation sequences
//!
//! Drives the ledger through an arbitrary sequence of mints, burns,
//! transfers, approvals, and delegated pulls. The ledger must never
//! panic, and after every step each token's recorded total supply must
//! equal the sum of its account balances.
//!
//! Run: cargo +nightly fuzz run fuzz_ledger_ops

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use basin_core::TokenLedger;

const TOKENS: [&str; 2] = ["alpha", "beta"];
const ACCOUNTS: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Mint { token: u8, to: u8, amount: u128 },
    Burn { token: u8, from: u8, amount: u128 },
    Transfer { token: u8, from: u8, to: u8, amount: u128 },
    Approve { token: u8, owner: u8, spender: u8, amount: u128 },
    TransferFrom { token: u8, spender: u8, from: u8, to: u8, amount: u128 },
}

fn token(idx: u8) -> &'static str {
    TOKENS[idx as usize % TOKENS.len()]
}

fn account(idx: u8) -> &'static str {
    ACCOUNTS[idx as usize % ACCOUNTS.len()]
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let mut ledger = TokenLedger::new();
    ledger.register_token("alpha", "ALPHA", 18).unwrap();
    ledger.register_token("beta", "BETA", 6).unwrap();

    // Bound the sequence so huge inputs stay fast.
    for op in ops.iter().take(64) {
        // Every call must return, never panic.
        let _ = match op {
            FuzzOp::Mint { token: t, to, amount } => {
                ledger.mint(token(*t), account(*to), *amount)
            }
            FuzzOp::Burn { token: t, from, amount } => {
                ledger.burn(token(*t), account(*from), *amount)
            }
            FuzzOp::Transfer { token: t, from, to, amount } => {
                ledger.transfer(token(*t), account(*from), account(*to), *amount)
            }
            FuzzOp::Approve { token: t, owner, spender, amount } => {
                ledger.approve(token(*t), account(*owner), account(*spender), *amount)
            }
            FuzzOp::TransferFrom { token: t, spender, from, to, amount } => ledger
                .transfer_from(
                    token(*t),
                    account(*spender),
                    account(*from),
                    account(*to),
                    *amount,
                ),
        };

        // Supply always equals the sum of balances.
        for t in TOKENS {
            let held: u128 = ACCOUNTS
                .iter()
                .map(|account| ledger.balance_of(t, account))
                .sum();
            assert_eq!(held, ledger.total_supply(t), "supply drifted for {}", t);
        }
    }
});
