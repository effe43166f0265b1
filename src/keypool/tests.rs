//! Tests for the keypool module

use super::*;
use crate::error::Error;
use std::collections::{HashMap, HashSet};

fn pool_with_keys(keys: &[&str]) -> KeyPool {
    KeyPool::new(
        keys.iter().map(|k| k.to_string()).collect(),
        PricingTable::default(),
    )
}

fn table_with_model_x() -> PricingTable {
    let mut rates = HashMap::new();
    rates.insert(
        "model-x".to_string(),
        ModelRates {
            prompt_per_1k: 10.0,
            completion_per_1k: 20.0,
        },
    );
    rates.insert(
        "model-default".to_string(),
        ModelRates {
            prompt_per_1k: 1.0,
            completion_per_1k: 2.0,
        },
    );
    PricingTable::new(rates, "model-default")
}

#[tokio::test]
async fn test_round_robin_covers_all_keys_once() {
    let pool = pool_with_keys(&["k1", "k2", "k3"]);
    assert_eq!(pool.len(), 3);

    let mut seen = HashSet::new();
    for _ in 0..3 {
        let cred = pool.next().await.expect("non-empty pool");
        seen.insert(cred.expose().to_string());
    }
    assert_eq!(seen.len(), 3);
    assert!(seen.contains("k1") && seen.contains("k2") && seen.contains("k3"));
}

#[tokio::test]
async fn test_round_robin_cycle_repeats() {
    let pool = pool_with_keys(&["k1", "k2", "k3"]);

    let first = pool.next().await.unwrap();
    pool.next().await.unwrap();
    pool.next().await.unwrap();
    let fourth = pool.next().await.unwrap();

    assert_eq!(first.expose(), fourth.expose());
    assert_eq!(first.index(), fourth.index());
}

#[tokio::test]
async fn test_empty_pool_is_unavailable_not_panicking() {
    let pool = pool_with_keys(&[]);
    assert!(pool.is_empty());

    for _ in 0..10 {
        assert!(pool.next().await.is_none());
    }
}

#[tokio::test]
async fn test_blank_keys_are_dropped() {
    let pool = pool_with_keys(&["", "  ", "k1"]);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.next().await.unwrap().expose(), "k1");
}

#[tokio::test]
async fn test_cost_accounting_known_model() {
    let pool = KeyPool::new(vec!["k1".to_string()], table_with_model_x());

    let entry = pool.record_usage(100, 50, "model-x").await.unwrap();
    assert_eq!(entry.total_tokens, 150);
    // (100/1000)*10 + (50/1000)*20 = 1.0 + 1.0
    assert!((entry.estimated_cost_usd - 2.0).abs() < 1e-9);

    let stats = pool.stats().await;
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.total_tokens, 150);
    assert!((stats.total_cost_usd - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_cost_accounting_doubles_on_repeat() {
    let pool = KeyPool::new(vec!["k1".to_string()], table_with_model_x());

    pool.record_usage(100, 50, "model-x").await.unwrap();
    pool.record_usage(100, 50, "model-x").await.unwrap();

    let stats = pool.stats().await;
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.total_tokens, 300);
    assert!((stats.total_cost_usd - 4.0).abs() < 1e-9);
    assert_eq!(stats.entries.len(), 2);
}

#[tokio::test]
async fn test_unknown_model_uses_default_rates() {
    let pool = KeyPool::new(vec!["k1".to_string()], table_with_model_x());

    let entry = pool
        .record_usage(100, 50, "nonexistent-model")
        .await
        .unwrap();
    // model-default: (100/1000)*1 + (50/1000)*2 = 0.1 + 0.1
    assert!((entry.estimated_cost_usd - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_unpriced_default_model_uses_fallback_rates() {
    let table = PricingTable::new(HashMap::new(), "missing-model");
    let rates = table.rates_for("also-missing");
    assert!((rates.prompt_per_1k - FALLBACK_PROMPT_RATE_PER_1K).abs() < 1e-12);
    assert!((rates.completion_per_1k - FALLBACK_COMPLETION_RATE_PER_1K).abs() < 1e-12);
}

#[tokio::test]
async fn test_negative_tokens_rejected() {
    let pool = pool_with_keys(&["k1"]);

    let err = pool.record_usage(-1, 50, "gpt-4o-mini").await.unwrap_err();
    assert!(matches!(err, Error::InvalidUsage { .. }));

    // The rejected record must not reach the ledger.
    let stats = pool.stats().await;
    assert_eq!(stats.total_requests, 0);
}

#[tokio::test]
async fn test_usage_attributed_to_last_dispensed_key() {
    let pool = pool_with_keys(&["k1", "k2"]);

    let before = pool.record_usage(10, 10, "gpt-4o-mini").await.unwrap();
    assert_eq!(before.key_index, None);

    let cred = pool.next().await.unwrap();
    let after = pool.record_usage(10, 10, "gpt-4o-mini").await.unwrap();
    assert_eq!(after.key_index, Some(cred.index()));
}

#[tokio::test]
async fn test_stats_by_model_breakdown() {
    let pool = pool_with_keys(&["k1"]);

    pool.record_usage(100, 50, "gpt-4o-mini").await.unwrap();
    pool.record_usage(200, 100, "gpt-4o-mini").await.unwrap();
    pool.record_usage(10, 5, "gpt-4o").await.unwrap();

    let stats = pool.stats().await;
    assert_eq!(stats.by_model.len(), 2);

    let mini = &stats.by_model["gpt-4o-mini"];
    assert_eq!(mini.request_count, 2);
    assert_eq!(mini.total_tokens, 450);

    let full = &stats.by_model["gpt-4o"];
    assert_eq!(full.request_count, 1);
    assert_eq!(full.total_tokens, 15);
}

#[tokio::test]
async fn test_from_env_collects_list_and_numbered_keys() {
    std::env::set_var("LLMQ_POOLTEST_API_KEYS", "a1, a2 ,");
    std::env::set_var("LLMQ_POOLTEST_API_KEY", "b1");
    std::env::set_var("LLMQ_POOLTEST_API_KEY_2", "b2");
    std::env::set_var("LLMQ_POOLTEST_API_KEY_3", "b3");

    let pool = KeyPool::from_env("LLMQ_POOLTEST");
    assert_eq!(pool.len(), 5);

    std::env::remove_var("LLMQ_POOLTEST_API_KEYS");
    std::env::remove_var("LLMQ_POOLTEST_API_KEY");
    std::env::remove_var("LLMQ_POOLTEST_API_KEY_2");
    std::env::remove_var("LLMQ_POOLTEST_API_KEY_3");
}

#[tokio::test]
async fn test_from_env_without_vars_is_degraded() {
    let pool = KeyPool::from_env("LLMQ_NO_SUCH_PREFIX");
    assert!(pool.is_empty());
    assert!(pool.next().await.is_none());
}

#[tokio::test]
async fn test_credential_debug_is_redacted() {
    let pool = pool_with_keys(&["sk-super-secret"]);
    let cred = pool.next().await.unwrap();

    let rendered = format!("{cred:?}");
    assert!(!rendered.contains("sk-super-secret"));
    assert!(rendered.contains("***"));
}

#[tokio::test]
async fn test_usage_entry_serializes() {
    let pool = pool_with_keys(&["k1"]);
    pool.next().await.unwrap();
    let entry = pool.record_usage(100, 50, "gpt-4o-mini").await.unwrap();

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["total_tokens"], 150);
    assert!(json["timestamp"].is_string());
}

#[test]
fn test_default_rates_cover_served_models() {
    let rates = default_rates();
    assert!(rates.contains_key(DEFAULT_MODEL));
    assert!(rates.contains_key("gpt-4o"));
    assert!(rates.contains_key("gemini-2.0-flash"));
}

#[test]
fn test_model_rates_cost_formula() {
    let rates = ModelRates {
        prompt_per_1k: 0.5,
        completion_per_1k: 1.5,
    };
    let cost = rates.cost(2000, 1000);
    assert!((cost - 2.5).abs() < 1e-9);
}
