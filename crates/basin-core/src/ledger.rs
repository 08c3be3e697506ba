//! In-process fungible-token ledger.
//!
//! The exchange treats tokens as an external collaborator with standard
//! mint/transfer/approve semantics. This module provides that collaborator:
//! a registry of token metadata plus per-token balance and allowance maps.
//! Components (pools, gauges, the voter) hold balances under their own
//! string identifiers like any other account.
//!
//! All maps are `BTreeMap` with string keys: deterministic iteration and
//! JSON-safe serialization.

use crate::error::AmmError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on token decimals (the common ERC-20 ceiling).
pub const MAX_TOKEN_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenLedger {
    /// token id → metadata
    tokens: BTreeMap<String, TokenInfo>,
    /// token id → account → balance
    balances: BTreeMap<String, BTreeMap<String, u128>>,
    /// token id → owner → spender → allowance
    allowances: BTreeMap<String, BTreeMap<String, BTreeMap<String, u128>>>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token id with its metadata. Ids are caller-chosen and
    /// must be unique; pool LP tokens reuse the pool id.
    pub fn register_token(
        &mut self,
        token: &str,
        symbol: &str,
        decimals: u8,
    ) -> Result<(), AmmError> {
        if token.is_empty() || symbol.is_empty() {
            return Err(AmmError::InvalidInput(
                "token id and symbol must be non-empty".to_string(),
            ));
        }
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(AmmError::InvalidInput(format!(
                "decimals {} exceeds maximum {}",
                decimals, MAX_TOKEN_DECIMALS
            )));
        }
        if self.tokens.contains_key(token) {
            return Err(AmmError::DuplicateCreation(format!("token {}", token)));
        }
        self.tokens.insert(
            token.to_string(),
            TokenInfo {
                symbol: symbol.to_string(),
                decimals,
                total_supply: 0,
            },
        );
        Ok(())
    }

    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn token_info(&self, token: &str) -> Option<&TokenInfo> {
        self.tokens.get(token)
    }

    pub fn decimals(&self, token: &str) -> Result<u8, AmmError> {
        self.tokens
            .get(token)
            .map(|info| info.decimals)
            .ok_or_else(|| AmmError::NotFound(format!("token {}", token)))
    }

    pub fn total_supply(&self, token: &str) -> u128 {
        self.tokens.get(token).map_or(0, |info| info.total_supply)
    }

    pub fn balance_of(&self, token: &str, account: &str) -> u128 {
        self.balances
            .get(token)
            .and_then(|accounts| accounts.get(account))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, token: &str, owner: &str, spender: &str) -> u128 {
        self.allowances
            .get(token)
            .and_then(|owners| owners.get(owner))
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Create `amount` new units credited to `to`.
    pub fn mint(&mut self, token: &str, to: &str, amount: u128) -> Result<(), AmmError> {
        let info = self
            .tokens
            .get_mut(token)
            .ok_or_else(|| AmmError::NotFound(format!("token {}", token)))?;
        info.total_supply = info
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| AmmError::InvalidInput("total supply overflow".to_string()))?;
        self.credit(token, to, amount);
        Ok(())
    }

    /// Destroy `amount` units held by `from`, reducing total supply.
    pub fn burn(&mut self, token: &str, from: &str, amount: u128) -> Result<(), AmmError> {
        if !self.tokens.contains_key(token) {
            return Err(AmmError::NotFound(format!("token {}", token)));
        }
        self.debit(token, from, amount)?;
        // debit succeeded, so total_supply >= amount holds
        if let Some(info) = self.tokens.get_mut(token) {
            info.total_supply = info.total_supply.saturating_sub(amount);
        }
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), AmmError> {
        if !self.tokens.contains_key(token) {
            return Err(AmmError::NotFound(format!("token {}", token)));
        }
        self.debit(token, from, amount)?;
        self.credit(token, to, amount);
        Ok(())
    }

    /// Set (not add to) the allowance `owner` grants `spender`.
    pub fn approve(
        &mut self,
        token: &str,
        owner: &str,
        spender: &str,
        amount: u128,
    ) -> Result<(), AmmError> {
        if !self.tokens.contains_key(token) {
            return Err(AmmError::NotFound(format!("token {}", token)));
        }
        self.allowances
            .entry(token.to_string())
            .or_default()
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to` on the authority of `spender`'s
    /// allowance, which is reduced by the amount spent.
    pub fn transfer_from(
        &mut self,
        token: &str,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), AmmError> {
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(AmmError::Unauthorized(format!(
                "spender {} allowed {} of token {}, needs {}",
                spender, allowed, token, amount
            )));
        }
        self.transfer(token, from, to, amount)?;
        if let Some(spenders) = self
            .allowances
            .get_mut(token)
            .and_then(|owners| owners.get_mut(from))
        {
            spenders.insert(spender.to_string(), allowed - amount);
        }
        Ok(())
    }

    fn credit(&mut self, token: &str, account: &str, amount: u128) {
        let balance = self
            .balances
            .entry(token.to_string())
            .or_default()
            .entry(account.to_string())
            .or_insert(0);
        // supply is checked at mint time, so balances cannot overflow
        *balance = balance.saturating_add(amount);
    }

    fn debit(&mut self, token: &str, account: &str, amount: u128) -> Result<(), AmmError> {
        let balance = self.balance_of(token, account);
        if balance < amount {
            return Err(AmmError::InvalidInput(format!(
                "insufficient balance: account {} holds {} of token {}, needs {}",
                account, balance, token, amount
            )));
        }
        if let Some(accounts) = self.balances.get_mut(token) {
            accounts.insert(account.to_string(), balance - amount);
        }
        Ok(())
    }
}
