//! Round-robin credential pool
//!
//! Dispenses API credentials in cyclic order and accumulates a usage/cost
//! ledger for the calls made with them.

use super::pricing::PricingTable;
use super::usage::{ModelStats, UsageEntry, UsageStats};
use crate::error::{Error, Result};
use chrono::Utc;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A dispensed API credential.
///
/// The secret value stays wrapped so it never shows up in `Debug` output or
/// logs; callers expose it only at the point of the outbound request.
#[derive(Clone)]
pub struct Credential {
    value: SecretString,
    index: usize,
}

impl Credential {
    /// The secret key material.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Position of this credential in the pool.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("index", &self.index)
            .field("value", &"***")
            .finish()
    }
}

/// Round-robin credential dispenser plus usage ledger.
///
/// The credential list is fixed at construction. A pool built with zero
/// credentials is valid but degraded: [`KeyPool::next`] always returns `None`
/// and callers must treat that as a recoverable condition. The ledger is
/// append-only for the lifetime of the pool.
///
/// State is process-local; separate instances (or separate processes) do not
/// coordinate. A non-empty pool starts its cursor at a random offset so
/// concurrently started instances sharing a credential set do not all hammer
/// credential 0 first.
#[derive(Debug)]
pub struct KeyPool {
    credentials: Vec<SecretString>,
    pricing: PricingTable,
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    cursor: usize,
    last_index: Option<usize>,
    entries: Vec<UsageEntry>,
}

impl KeyPool {
    /// Create a pool from an explicit credential list.
    #[must_use]
    pub fn new(keys: Vec<String>, pricing: PricingTable) -> Self {
        let credentials: Vec<SecretString> = keys
            .into_iter()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
            .collect();

        let cursor = if credentials.is_empty() {
            warn!("key pool has no credentials; next() will always be unavailable");
            0
        } else {
            rand::thread_rng().gen_range(0..credentials.len())
        };

        Self {
            credentials,
            pricing,
            inner: RwLock::new(Inner {
                cursor,
                last_index: None,
                entries: Vec::new(),
            }),
        }
    }

    /// Create a pool from environment variables with default pricing.
    ///
    /// Reads `{PREFIX}_API_KEYS` (comma-separated), then `{PREFIX}_API_KEY`,
    /// then numbered `{PREFIX}_API_KEY_2`, `{PREFIX}_API_KEY_3`, ... until
    /// the first missing variable. Blank values are skipped. An environment
    /// with none of these set yields an empty (degraded) pool.
    #[must_use]
    pub fn from_env(prefix: &str) -> Self {
        let mut keys = Vec::new();

        if let Ok(list) = std::env::var(format!("{prefix}_API_KEYS")) {
            keys.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from),
            );
        }

        if let Ok(key) = std::env::var(format!("{prefix}_API_KEY")) {
            keys.push(key);
        }

        for n in 2.. {
            match std::env::var(format!("{prefix}_API_KEY_{n}")) {
                Ok(key) => keys.push(key),
                Err(_) => break,
            }
        }

        Self::new(keys, PricingTable::default())
    }

    /// Number of credentials in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the pool has no credentials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Dispense the next credential in round-robin order.
    ///
    /// Returns `None` if the pool has no credentials. No health checking and
    /// no back-off: a key that keeps failing upstream is the caller's concern.
    pub async fn next(&self) -> Option<Credential> {
        if self.credentials.is_empty() {
            return None;
        }

        let mut inner = self.inner.write().await;
        let index = inner.cursor;
        inner.cursor = (inner.cursor + 1) % self.credentials.len();
        inner.last_index = Some(index);

        debug!(key_index = index, "dispensing credential");
        Some(Credential {
            value: self.credentials[index].clone(),
            index,
        })
    }

    /// Record the token usage of a completed call.
    ///
    /// Cost is looked up from the pricing table; an unrecognized model
    /// degrades to the default model's rates rather than erroring. The entry
    /// is attributed to the credential most recently dispensed by
    /// [`KeyPool::next`]. Fails only on negative token counts, which would
    /// corrupt the aggregate statistics.
    pub async fn record_usage(
        &self,
        prompt_tokens: i64,
        completion_tokens: i64,
        model: &str,
    ) -> Result<UsageEntry> {
        if prompt_tokens < 0 || completion_tokens < 0 {
            return Err(Error::InvalidUsage {
                prompt: prompt_tokens,
                completion: completion_tokens,
            });
        }
        let prompt = prompt_tokens as u64;
        let completion = completion_tokens as u64;

        let rates = self.pricing.rates_for(model);
        let estimated_cost_usd = rates.cost(prompt, completion);

        let mut inner = self.inner.write().await;
        let entry = UsageEntry {
            timestamp: Utc::now(),
            model: model.to_string(),
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
            estimated_cost_usd,
            key_index: inner.last_index,
        };
        inner.entries.push(entry.clone());

        debug!(
            model,
            total_tokens = entry.total_tokens,
            cost_usd = estimated_cost_usd,
            "recorded usage"
        );
        Ok(entry)
    }

    /// Aggregate the usage ledger.
    pub async fn stats(&self) -> UsageStats {
        let inner = self.inner.read().await;
        let mut stats = UsageStats::default();

        for entry in &inner.entries {
            stats.total_requests += 1;
            stats.total_prompt_tokens += entry.prompt_tokens;
            stats.total_completion_tokens += entry.completion_tokens;
            stats.total_tokens += entry.total_tokens;
            stats.total_cost_usd += entry.estimated_cost_usd;

            let model_stats = stats
                .by_model
                .entry(entry.model.clone())
                .or_insert_with(|| ModelStats {
                    model: entry.model.clone(),
                    ..Default::default()
                });
            model_stats.total_tokens += entry.total_tokens;
            model_stats.total_cost_usd += entry.estimated_cost_usd;
            model_stats.request_count += 1;
        }

        stats.entries = inner.entries.clone();
        stats
    }
}
