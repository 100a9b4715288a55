//! Property-Based Tests for the Cache Facade
//!
//! Uses proptest to check the add/set/remove/get contract over the in-process store.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use chrono::Duration;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use tokio_test::block_on;

use crate::cache::{Cache, Expiry};
use crate::error::CacheError;
use crate::store::MemoryStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
    tags: Vec<String>,
}

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,32}"
}

fn user_strategy() -> impl Strategy<Value = User> {
    (
        any::<u64>(),
        ".{0,24}",
        prop::collection::vec("[a-z]{1,8}", 0..4),
    )
        .prop_map(|(id, name, tags)| User { id, name, tags })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: String, id: u64 },
    Set { key: String, id: u64 },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations collide
    let key = "[a-c]";
    prop_oneof![
        (key, any::<u64>()).prop_map(|(key, id)| CacheOp::Add { key, id }),
        (key, any::<u64>()).prop_map(|(key, id)| CacheOp::Set { key, id }),
        key.prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn new_cache() -> Cache {
    Cache::new(Arc::new(MemoryStore::new()))
}

fn expiry() -> Expiry {
    Expiry::after(Duration::minutes(5))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Storing then retrieving before expiry returns an equal value.
    #[test]
    fn prop_roundtrip(key in key_strategy(), user in user_strategy()) {
        let cache = new_cache();
        let retrieved: User = block_on(async {
            cache.set(&key, &user, expiry()).await.unwrap();
            cache.get(&key).await.unwrap()
        });
        prop_assert_eq!(retrieved, user);
    }

    // A second add on a live key fails and leaves the first value in place.
    #[test]
    fn prop_add_never_overwrites(key in key_strategy(), first in user_strategy(), second in user_strategy()) {
        let cache = new_cache();
        let (result, stored) = block_on(async {
            cache.add(&key, &first, expiry()).await.unwrap();
            let result = cache.add(&key, &second, expiry()).await;
            (result, cache.get::<User>(&key).await.unwrap())
        });
        prop_assert!(matches!(result, Err(CacheError::AlreadyExists(_))));
        prop_assert_eq!(stored, first);
    }

    // Set always leaves the most recent value.
    #[test]
    fn prop_set_overwrites(key in key_strategy(), values in prop::collection::vec(user_strategy(), 1..5)) {
        let cache = new_cache();
        let stored: User = block_on(async {
            for value in &values {
                cache.set(&key, value, expiry()).await.unwrap();
            }
            cache.get(&key).await.unwrap()
        });
        prop_assert_eq!(&stored, values.last().unwrap());
    }

    // Any operation sequence agrees with a plain map model.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        let cache = new_cache();
        let mut model: HashMap<String, u64> = HashMap::new();

        block_on(async {
            for op in ops {
                match op {
                    CacheOp::Add { key, id } => {
                        let result = cache.add(&key, &id, expiry()).await;
                        if model.contains_key(&key) {
                            assert!(matches!(result, Err(CacheError::AlreadyExists(_))));
                        } else {
                            result.unwrap();
                            model.insert(key, id);
                        }
                    }
                    CacheOp::Set { key, id } => {
                        cache.set(&key, &id, expiry()).await.unwrap();
                        model.insert(key, id);
                    }
                    CacheOp::Remove { key } => {
                        cache.remove(&key).await.unwrap();
                        model.remove(&key);
                    }
                }
            }

            for key in ["a", "b", "c"] {
                let cached: Option<u64> = cache.try_get(key).await.unwrap();
                assert_eq!(cached, model.get(key).copied(), "key {key}");
            }
        });
    }

    // get-or-acquire on a miss returns the produced value and persists it.
    #[test]
    fn prop_acquire_persists(key in key_strategy(), user in user_strategy()) {
        let cache = new_cache();
        let produced = user.clone();
        let (returned, stored) = block_on(async {
            let returned: User = cache
                .get_or_acquire(&key, || async move { Ok::<_, Infallible>(produced) }, expiry(), false)
                .await
                .unwrap();
            (returned, cache.get::<User>(&key).await.unwrap())
        });
        prop_assert_eq!(&returned, &user);
        prop_assert_eq!(stored, user);
    }
}
