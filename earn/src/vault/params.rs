//! # Vault Parameters
//!
//! Governance decides which vaults exist and which strategy backs each one.
//! The engine only reads these parameters; it never creates or edits an
//! [`AllowedVault`].
//!
//! Parameters are plain JSON so they can live in a genesis file:
//!
//! ```json
//! {
//!   "allowed_vaults": [
//!     { "denom": "usdc", "strategy": "stablecoin" },
//!     { "denom": "ukava", "strategy": "money_market", "min_deposit": 1000 }
//!   ]
//! }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::strategy::StrategyType;
use crate::types::{validate_denom, AccAddress, CoinError};

/// Errors found while validating parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("invalid vault denom: {0}")]
    InvalidDenom(#[from] CoinError),

    #[error("duplicate vault denom: {0}")]
    DuplicateDenom(String),

    #[error("private vault {0} has no allowed depositors")]
    NoAllowedDepositors(String),

    #[error("vault {denom} lists depositor {depositor} more than once")]
    DuplicateDepositor { denom: String, depositor: AccAddress },

    #[error("malformed params: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A vault governance has approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedVault {
    /// Underlying asset of the vault.
    pub denom: String,
    /// Strategy that manages the vault's assets.
    pub strategy: StrategyType,
    /// When set, only `allowed_depositors` may deposit.
    #[serde(default)]
    pub is_private_vault: bool,
    #[serde(default)]
    pub allowed_depositors: Vec<AccAddress>,
    /// Smallest accepted deposit, in asset units.
    #[serde(default)]
    pub min_deposit: u128,
}

impl AllowedVault {
    /// A public vault with no deposit minimum.
    pub fn new(denom: impl Into<String>, strategy: StrategyType) -> Self {
        Self {
            denom: denom.into(),
            strategy,
            is_private_vault: false,
            allowed_depositors: Vec::new(),
            min_deposit: 0,
        }
    }

    /// Restrict deposits to the listed accounts.
    pub fn private(mut self, depositors: Vec<AccAddress>) -> Self {
        self.is_private_vault = true;
        self.allowed_depositors = depositors;
        self
    }

    pub fn with_min_deposit(mut self, min_deposit: u128) -> Self {
        self.min_deposit = min_deposit;
        self
    }

    /// Whether `depositor` may deposit into this vault.
    pub fn is_account_allowed(&self, depositor: &AccAddress) -> bool {
        !self.is_private_vault || self.allowed_depositors.contains(depositor)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        validate_denom(&self.denom)?;

        if self.is_private_vault && self.allowed_depositors.is_empty() {
            return Err(ParamsError::NoAllowedDepositors(self.denom.clone()));
        }

        let mut seen = HashSet::new();
        for depositor in &self.allowed_depositors {
            if !seen.insert(depositor) {
                return Err(ParamsError::DuplicateDepositor {
                    denom: self.denom.clone(),
                    depositor: *depositor,
                });
            }
        }
        Ok(())
    }
}

/// The module's governance parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnParams {
    #[serde(default)]
    pub allowed_vaults: Vec<AllowedVault>,
}

impl EarnParams {
    pub fn new(allowed_vaults: Vec<AllowedVault>) -> Self {
        Self { allowed_vaults }
    }

    pub fn allowed_vault(&self, denom: &str) -> Option<&AllowedVault> {
        self.allowed_vaults.iter().find(|v| v.denom == denom)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let mut seen = HashSet::new();
        for vault in &self.allowed_vaults {
            vault.validate()?;
            if !seen.insert(vault.denom.as_str()) {
                return Err(ParamsError::DuplicateDenom(vault.denom.clone()));
            }
        }
        Ok(())
    }

    /// Parse and validate parameters from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Read, parse, and validate a parameters file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading params file {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("parsing params file {}", path.display()))
    }
}
