// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BASIN - POOL REGISTRY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Creates pools and owns them in a flat arena. Pool ids are content
// addresses: a SHA3-256 over a domain tag, the registry label, the
// sorted token pair, the kind byte, and the pool code fingerprint.
// Anyone holding the same inputs derives the same id without touching
// registry state, which is what lets the router resolve pools purely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use basin_core::{AmmError, ExchangeConfig, TokenLedger};

use crate::pool::{Pool, PoolKind};

/// Domain tag for pool-id derivation. Never reuse for other hashes.
const POOL_ID_DOMAIN: &[u8] = b"basin:pool:v1";

/// Version tag hashed into every pool id, the analogue of a deployment
/// bytecode hash. Bump only with a pricing-incompatible pool change.
const POOL_CODE_TAG: &[u8] = b"basin:pool-code:v1";

/// Orders a token pair canonically (lexicographic ascending).
///
/// Every id derivation and reserve layout uses this order, so
/// (a, b) and (b, a) always name the same pool.
pub fn sort_tokens<'a>(
    token_a: &'a str,
    token_b: &'a str,
) -> Result<(&'a str, &'a str), AmmError> {
    if token_a == token_b {
        return Err(AmmError::InvalidInput(format!(
            "identical tokens: {}",
            token_a
        )));
    }
    if token_a.is_empty() || token_b.is_empty() {
        return Err(AmmError::InvalidInput("empty token id".to_string()));
    }
    if token_a < token_b {
        Ok((token_a, token_b))
    } else {
        Ok((token_b, token_a))
    }
}

fn pool_code_digest() -> [u8; 32] {
    Sha3_256::digest(POOL_CODE_TAG).into()
}

/// The factory and directory of all pools under one exchange label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    label: String,
    fee_bps: u64,
    /// Pool arena keyed by derived pool id.
    pools: BTreeMap<String, Pool>,
    /// Pool ids in creation order.
    all_pools: Vec<String>,
}

impl Registry {
    pub fn new(config: &ExchangeConfig) -> Result<Self, AmmError> {
        config.validate().map_err(AmmError::InvalidInput)?;
        Ok(Registry {
            label: config.label.clone(),
            fee_bps: config.fee_bps,
            pools: BTreeMap::new(),
            all_pools: Vec::new(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fee in basis points stamped onto every pool this registry
    /// creates. Existing pools keep the fee they were created with.
    pub fn fee_bps(&self) -> u64 {
        self.fee_bps
    }

    /// Hex fingerprint of the pool implementation version, exposed so
    /// off-machine tooling can derive pool ids independently.
    pub fn pool_code_hash() -> String {
        hex::encode(pool_code_digest())
    }

    /// Derives the deterministic id a pool for this pair would have.
    /// Pure: depends only on the inputs, never on registry state.
    pub fn derive_pool_id(
        label: &str,
        token_a: &str,
        token_b: &str,
        kind: PoolKind,
    ) -> Result<String, AmmError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        let mut hasher = Sha3_256::new();
        hasher.update(POOL_ID_DOMAIN);
        hasher.update(label.as_bytes());
        hasher.update([0u8]);
        hasher.update(token0.as_bytes());
        hasher.update([0u8]);
        hasher.update(token1.as_bytes());
        hasher.update([kind.discriminant()]);
        hasher.update(pool_code_digest());
        Ok(hex::encode(hasher.finalize()))
    }

    /// Id this registry's pool for the pair has or would have.
    pub fn pool_for(
        &self,
        token_a: &str,
        token_b: &str,
        kind: PoolKind,
    ) -> Result<String, AmmError> {
        Self::derive_pool_id(&self.label, token_a, token_b, kind)
    }

    /// Creates the pool for a token pair and kind, registering its LP
    /// share as a ledger token under the pool id. Fails if either
    /// token is unknown or the pool already exists.
    pub fn create_pool(
        &mut self,
        ledger: &mut TokenLedger,
        token_a: &str,
        token_b: &str,
        kind: PoolKind,
        now: u64,
    ) -> Result<String, AmmError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        let info0 = ledger
            .token_info(token0)
            .ok_or_else(|| AmmError::NotFound(format!("token {}", token0)))?;
        let info1 = ledger
            .token_info(token1)
            .ok_or_else(|| AmmError::NotFound(format!("token {}", token1)))?;
        let symbol = format!("{}-{}/{}", kind.prefix(), info0.symbol, info1.symbol);
        let name = format!("{} - {}/{}", kind.describe(), info0.symbol, info1.symbol);
        let decimals0 = info0.decimals;
        let decimals1 = info1.decimals;
        let id = Self::derive_pool_id(&self.label, token0, token1, kind)?;
        if self.pools.contains_key(&id) {
            return Err(AmmError::DuplicateCreation(format!("pool {}", symbol)));
        }
        // LP shares are display-normalized to 18 decimals; share math
        // never reads this figure
        ledger.register_token(&id, &symbol, 18)?;
        let pool = Pool::new(
            id.clone(),
            name,
            symbol,
            kind,
            token0.to_string(),
            token1.to_string(),
            decimals0,
            decimals1,
            self.fee_bps,
            now,
        );
        self.pools.insert(id.clone(), pool);
        self.all_pools.push(id.clone());
        Ok(id)
    }

    pub fn get_pool(&self, id: &str) -> Option<&Pool> {
        self.pools.get(id)
    }

    pub fn get_pool_mut(&mut self, id: &str) -> Option<&mut Pool> {
        self.pools.get_mut(id)
    }

    /// Resolves a pair directly to its pool, if created.
    pub fn lookup(&self, token_a: &str, token_b: &str, kind: PoolKind) -> Option<&Pool> {
        let id = Self::derive_pool_id(&self.label, token_a, token_b, kind).ok()?;
        self.pools.get(&id)
    }

    pub fn is_pool(&self, id: &str) -> bool {
        self.pools.contains_key(id)
    }

    pub fn pool_count(&self) -> usize {
        self.all_pools.len()
    }

    /// Pool id by creation index.
    pub fn pool_at(&self, index: usize) -> Option<&str> {
        self.all_pools.get(index).map(String::as_str)
    }

    /// All pool ids in creation order.
    pub fn all_pools(&self) -> &[String] {
        &self.all_pools
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TESTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
