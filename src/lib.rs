//! llm-quota - Credential rotation and request admission
//!
//! This crate provides the two reusable control-plane pieces of an
//! LLM-backed web service:
//! - `KeyPool`: round-robin API credential dispenser with a usage/cost ledger
//! - `RateLimiter`: per-identity fixed-window request admission
//!
//! Both components are process-local by design. Request handlers ask the
//! `RateLimiter` whether a caller may proceed, take a credential from the
//! `KeyPool` for the outbound LLM call, and record the call's token usage
//! back into the pool afterwards. Neither component performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod keypool;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use keypool::{
    Credential, KeyPool, ModelRates, ModelStats, PricingTable, UsageEntry, UsageStats,
};
pub use rate_limit::RateLimiter;
