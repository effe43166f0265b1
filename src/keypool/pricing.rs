//! Model pricing
//!
//! Per-1K-token USD rates for the models the service calls, with fallback
//! rates for anything unrecognized.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fallback prompt rate (USD per 1K tokens) when even the default model is unpriced
pub const FALLBACK_PROMPT_RATE_PER_1K: f64 = 0.005;

/// Fallback completion rate (USD per 1K tokens) when even the default model is unpriced
pub const FALLBACK_COMPLETION_RATE_PER_1K: f64 = 0.015;

/// Model used for rate lookup when the requested model is unrecognized
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Cost rates for one model (USD per 1K tokens)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRates {
    /// Cost per 1K prompt tokens (USD)
    pub prompt_per_1k: f64,
    /// Cost per 1K completion tokens (USD)
    pub completion_per_1k: f64,
}

impl ModelRates {
    /// Estimated cost for the given token counts.
    #[must_use]
    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 / 1000.0) * self.prompt_per_1k
            + (completion_tokens as f64 / 1000.0) * self.completion_per_1k
    }
}

/// Mapping from model identifier to rates, plus the default model whose rates
/// back any unrecognized lookup. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct PricingTable {
    rates: HashMap<String, ModelRates>,
    default_model: String,
}

impl PricingTable {
    /// Create a table from explicit rates and a default model name.
    #[must_use]
    pub fn new(rates: HashMap<String, ModelRates>, default_model: impl Into<String>) -> Self {
        Self {
            rates,
            default_model: default_model.into(),
        }
    }

    /// Rates for `model`, falling back to the default model's rates and then
    /// to the hard fallback constants. Never fails on an unknown model.
    #[must_use]
    pub fn rates_for(&self, model: &str) -> ModelRates {
        if let Some(rates) = self.rates.get(model) {
            return *rates;
        }
        self.rates
            .get(&self.default_model)
            .copied()
            .unwrap_or(ModelRates {
                prompt_per_1k: FALLBACK_PROMPT_RATE_PER_1K,
                completion_per_1k: FALLBACK_COMPLETION_RATE_PER_1K,
            })
    }

    /// Whether `model` has an explicit entry.
    #[must_use]
    pub fn contains(&self, model: &str) -> bool {
        self.rates.contains_key(model)
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::new(default_rates(), DEFAULT_MODEL)
    }
}

/// Default rates for the models the service calls (USD per 1K tokens)
#[must_use]
pub fn default_rates() -> HashMap<String, ModelRates> {
    let mut rates = HashMap::new();

    rates.insert(
        "gpt-4o-mini".to_string(),
        ModelRates {
            prompt_per_1k: 0.000_15,
            completion_per_1k: 0.000_60,
        },
    );

    rates.insert(
        "gpt-4o".to_string(),
        ModelRates {
            prompt_per_1k: 0.002_50,
            completion_per_1k: 0.010_00,
        },
    );

    rates.insert(
        "gpt-4.1-mini".to_string(),
        ModelRates {
            prompt_per_1k: 0.000_40,
            completion_per_1k: 0.001_60,
        },
    );

    rates.insert(
        "gemini-2.0-flash".to_string(),
        ModelRates {
            prompt_per_1k: 0.000_10,
            completion_per_1k: 0.000_40,
        },
    );

    rates.insert(
        "gemini-1.5-pro".to_string(),
        ModelRates {
            prompt_per_1k: 0.001_25,
            completion_per_1k: 0.005_00,
        },
    );

    rates
}
