// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - REWARDS BENCHMARKS
//
// Hot-path costs of the emission machinery: earned-so-far lookups at
// several staker counts, a deposit checkpoint, a full vote over two
// pools, and a distribution run.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion,
};

use basin_amm::{PoolKind, Registry};
use basin_core::{ExchangeConfig, TokenLedger};
use basin_rewards::{Gauge, Voter, REWARD_DURATION_SECS};

const GAUGE_ID: &str = "gauge";
const VOTER_ID: &str = "voter";
const LP: &str = "lp";
const RWD: &str = "rwd";
const VE: &str = "ve";

/// A gauge with `stakers` accounts staked and one live reward stream.
fn seeded_gauge(stakers: u64) -> (TokenLedger, Gauge) {
    let mut ledger = TokenLedger::new();
    ledger.register_token(LP, "LP", 18).unwrap();
    ledger.register_token(RWD, "RWD", 18).unwrap();
    ledger.mint(RWD, "funder", 1_000_000_000_000).unwrap();
    ledger.approve(RWD, "funder", GAUGE_ID, u128::MAX).unwrap();
    let mut gauge = Gauge::new(GAUGE_ID.to_string(), LP.to_string());
    for i in 0..stakers {
        let account = format!("staker-{}", i);
        ledger.mint(LP, &account, 1_000_000_000).unwrap();
        ledger.approve(LP, &account, GAUGE_ID, u128::MAX).unwrap();
        gauge
            .deposit(&mut ledger, &account, 1_000_000_000, &account, 0)
            .unwrap();
    }
    gauge
        .notify_reward_amount(&mut ledger, "funder", RWD, 1_000_000_000, 0)
        .unwrap();
    (ledger, gauge)
}

/// A voter over two pools with alice's vote split across them and a
/// budget parked on the voter account.
fn seeded_voter() -> (TokenLedger, Voter, String, String) {
    let mut ledger = TokenLedger::new();
    ledger.register_token(VE, "VE", 18).unwrap();
    ledger.register_token("mim", "MIM", 18).unwrap();
    ledger.register_token("ust", "UST", 6).unwrap();
    ledger.mint(VE, "alice", 1_000_000_000_000).unwrap();
    ledger.mint(VE, VOTER_ID, 1_000_000_000_000).unwrap();
    let mut registry = Registry::new(&ExchangeConfig::default()).unwrap();
    let pool_a = registry
        .create_pool(&mut ledger, "mim", "ust", PoolKind::Stable, 0)
        .unwrap();
    let pool_b = registry
        .create_pool(&mut ledger, "mim", "ust", PoolKind::Volatile, 0)
        .unwrap();
    let mut voter = Voter::new(VOTER_ID.to_string(), VE.to_string());
    voter.create_gauge(&registry, &pool_a).unwrap();
    voter.create_gauge(&registry, &pool_b).unwrap();
    voter
        .vote(&ledger, "alice", &[pool_a.clone(), pool_b.clone()], &[3, 1], 0)
        .unwrap();
    (ledger, voter, pool_a, pool_b)
}

fn bench_gauge_earned(c: &mut Criterion) {
    let mut group = c.benchmark_group("gauge_earned");
    for stakers in [1u64, 10, 100] {
        let (_ledger, gauge) = seeded_gauge(stakers);
        group.bench_with_input(BenchmarkId::from_parameter(stakers), &stakers, |b, _| {
            b.iter(|| gauge.earned(black_box(RWD), black_box("staker-0"), black_box(1_000)))
        });
    }
    group.finish();
}

fn bench_gauge_deposit(c: &mut Criterion) {
    c.bench_function("gauge_deposit", |b| {
        b.iter_batched(
            || seeded_gauge(10),
            |(mut ledger, mut gauge)| {
                ledger.mint(LP, "fresh", 1_000_000).unwrap();
                ledger.approve(LP, "fresh", GAUGE_ID, u128::MAX).unwrap();
                gauge.deposit(&mut ledger, "fresh", 1_000_000, "fresh", 500).unwrap();
                (ledger, gauge)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_voter_vote(c: &mut Criterion) {
    c.bench_function("voter_vote", |b| {
        b.iter_batched(
            seeded_voter,
            |(ledger, mut voter, pool_a, pool_b)| {
                voter
                    .vote(&ledger, "alice", &[pool_a, pool_b], &[1, 2], 10)
                    .unwrap();
                (ledger, voter)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_voter_distribute(c: &mut Criterion) {
    c.bench_function("voter_distribute", |b| {
        b.iter_batched(
            seeded_voter,
            |(mut ledger, mut voter, _pool_a, _pool_b)| {
                voter.distribute(&mut ledger, 100).unwrap();
                (ledger, voter)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_gauge_earned,
    bench_gauge_deposit,
    bench_voter_vote,
    bench_voter_distribute
);
criterion_main!(benches);
