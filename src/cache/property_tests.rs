//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain HashMap model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::cache::{Cache, Ttl};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Helpers ==
fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

// == Strategies ==
/// Generates keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // With no entry ever expiring, the cache behaves exactly like a HashMap
    // and the hit/miss counters match the lookups performed.
    #[test]
    fn prop_matches_hashmap_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        block_on(async {
            let cache = Cache::new(TEST_DEFAULT_TTL, Duration::ZERO);
            let mut model: HashMap<String, String> = HashMap::new();
            let mut expected_hits = 0u64;
            let mut expected_misses = 0u64;

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        cache.set(key.clone(), value.clone(), Ttl::Default).await;
                        model.insert(key, value);
                    }
                    CacheOp::Get { key } => {
                        let got = cache.get(&key).await;
                        match &got {
                            Some(_) => expected_hits += 1,
                            None => expected_misses += 1,
                        }
                        prop_assert_eq!(got.as_ref(), model.get(&key));
                    }
                    CacheOp::Delete { key } => {
                        let result = cache.delete(&key).await;
                        match model.remove(&key) {
                            Some(_) => prop_assert!(result.is_ok()),
                            None => prop_assert_eq!(result, Err(CacheError::NotFound(key))),
                        }
                    }
                }
            }

            let stats = cache.stats().await;
            prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
            prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
            prop_assert_eq!(cache.count().await, model.len());
            prop_assert_eq!(stats.total_entries, model.len());
            Ok(())
        })?;
    }

    // Storing a pair and reading it back before expiration returns the value.
    #[test]
    fn prop_roundtrip_storage(
        key in key_strategy(),
        value in value_strategy(),
        default_secs in 0u64..3600
    ) {
        block_on(async {
            let cache = Cache::new(Duration::from_secs(default_secs), Duration::ZERO);

            cache.set(key.clone(), value.clone(), Duration::ZERO).await;

            prop_assert_eq!(cache.get(&key).await, Some(value.clone()));
            let entry = cache.get_item(&key).await.unwrap();
            prop_assert_eq!(entry.value, value);
            prop_assert_eq!(entry.expiration == 0, default_secs == 0);
            Ok(())
        })?;
    }

    // The last write to a key wins, and a key is only ever counted once.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 1..10)
    ) {
        block_on(async {
            let cache = Cache::new(Duration::ZERO, Duration::ZERO);

            for value in &values {
                cache.set(key.clone(), value.clone(), Ttl::Never).await;
            }

            let got = cache.get(&key).await;
            prop_assert_eq!(got.as_ref(), values.last());
            prop_assert_eq!(cache.count().await, 1);
            Ok(())
        })?;
    }

    // Absent keys always read as expired; live keys never do.
    #[test]
    fn prop_is_expired_tracks_presence(
        present in prop::collection::hash_set(key_strategy(), 0..10),
        lookup_key in key_strategy()
    ) {
        block_on(async {
            let cache = Cache::new(TEST_DEFAULT_TTL, Duration::ZERO);
            for key in &present {
                cache.set(key.clone(), 0u8, Ttl::Default).await;
            }

            prop_assert_eq!(cache.is_expired(&lookup_key).await, !present.contains(&lookup_key));
            Ok(())
        })?;
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After its TTL elapses an entry is hidden from reads but still counted
    // until something removes it.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        block_on(async {
            let cache = Cache::new(Duration::ZERO, Duration::ZERO);

            cache.set(key.clone(), value.clone(), Duration::from_millis(30)).await;
            prop_assert_eq!(cache.get(&key).await, Some(value));

            tokio::time::sleep(Duration::from_millis(60)).await;

            prop_assert!(cache.get(&key).await.is_none());
            prop_assert!(cache.is_expired(&key).await);
            prop_assert_eq!(cache.count().await, 1);

            prop_assert_eq!(cache.delete_expired().await, 1);
            prop_assert_eq!(cache.count().await, 0);
            Ok(())
        })?;
    }
}
