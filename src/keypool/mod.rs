//! Credential rotation and usage accounting
//!
//! # Module Structure
//!
//! - `pool`: KeyPool and Credential
//! - `pricing`: per-model cost rates and defaults
//! - `usage`: ledger entry and statistics types

mod pool;
mod pricing;
mod usage;

#[cfg(test)]
mod tests;

pub use pool::{Credential, KeyPool};
pub use pricing::{
    default_rates, ModelRates, PricingTable, DEFAULT_MODEL, FALLBACK_COMPLETION_RATE_PER_1K,
    FALLBACK_PROMPT_RATE_PER_1K,
};
pub use usage::{ModelStats, UsageEntry, UsageStats};
