//! Usage ledger types
//!
//! Records of completed LLM calls and the statistics aggregated over them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single completed LLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEntry {
    /// When the call was recorded
    pub timestamp: DateTime<Utc>,
    /// Model identifier
    pub model: String,
    /// Prompt (input) tokens
    pub prompt_tokens: u64,
    /// Completion (output) tokens
    pub completion_tokens: u64,
    /// Prompt + completion tokens
    pub total_tokens: u64,
    /// Estimated cost (USD)
    pub estimated_cost_usd: f64,
    /// Index of the credential that served this call, if one was dispensed
    pub key_index: Option<usize>,
}

/// Aggregated statistics over the usage ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    /// Total recorded calls
    pub total_requests: u64,
    /// Total prompt tokens
    pub total_prompt_tokens: u64,
    /// Total completion tokens
    pub total_completion_tokens: u64,
    /// Total tokens (prompt + completion)
    pub total_tokens: u64,
    /// Total estimated cost (USD)
    pub total_cost_usd: f64,
    /// Usage by model
    pub by_model: HashMap<String, ModelStats>,
    /// The recorded entries, oldest first
    pub entries: Vec<UsageEntry>,
}

/// Per-model statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStats {
    /// Model identifier
    pub model: String,
    /// Total tokens
    pub total_tokens: u64,
    /// Total estimated cost (USD)
    pub total_cost_usd: f64,
    /// Recorded call count
    pub request_count: u64,
}
