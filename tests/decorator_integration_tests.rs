//! Integration Tests for the Decorator Layer
//!
//! Exercises the public API end to end: key derivation from real argument
//! shapes, caching and invalidation across decorators sharing a backend,
//! and the dedicated-backend options.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use memocache::{
    CacheBackend, CacheDecorator, CacheError, CacheOptions, CallArgs, InMemoryCache, KeySpec,
    Lookup, LruCache, SharedBackend,
};

// == Helper Functions ==

static INIT_TRACING: std::sync::Once = std::sync::Once::new();

fn shared_backend() -> SharedBackend {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "memocache=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
    Arc::new(InMemoryCache::new())
}

fn cached_on(backend: &SharedBackend, key: &str) -> CacheDecorator {
    CacheOptions::new()
        .cache_key(key)
        .backend(backend.clone())
        .build()
        .unwrap()
}

fn expiring_on(backend: &SharedBackend, key: &str) -> CacheDecorator {
    CacheOptions::new()
        .expire_key(key)
        .backend(backend.clone())
        .build()
        .unwrap()
}

// == Caching Scenarios ==

#[test]
fn test_literal_key_caches_first_result() {
    let backend = shared_backend();
    let deco = cached_on(&backend, "simple_key");

    let run = |count: i64| -> String {
        deco.call(&CallArgs::new().positional(count), move || {
            format!("{count}:cached_value")
        })
        .unwrap()
    };

    assert_eq!(run(1), "1:cached_value");
    assert_eq!(run(2), "1:cached_value");
    assert_eq!(run(3), "1:cached_value");
    assert_eq!(
        backend.get("simple_key").unwrap(),
        Lookup::Hit(json!("1:cached_value"))
    );
}

#[test]
fn test_positional_template_key() {
    let backend = shared_backend();
    let deco = cached_on(&backend, "{0}");

    let run = |x: &str, y: i64| -> String {
        deco.call(
            &CallArgs::new().positional(x).positional(y),
            move || format!("{y}:cached_value"),
        )
        .unwrap()
    };

    assert_eq!(run("key", 1), "1:cached_value");
    assert_eq!(run("key", 2), "1:cached_value");
    assert_eq!(run("new_key", 3), "3:cached_value");

    assert_eq!(backend.get("key").unwrap(), Lookup::Hit(json!("1:cached_value")));
    assert_eq!(
        backend.get("new_key").unwrap(),
        Lookup::Hit(json!("3:cached_value"))
    );
}

#[test]
fn test_keyword_template_key() {
    let backend = shared_backend();
    let deco = cached_on(&backend, "{somearg}");

    let run = |count: i64, somearg: &str| -> String {
        deco.call(
            &CallArgs::new().positional(count).named("somearg", somearg),
            move || format!("{count}:cached_value"),
        )
        .unwrap()
    };

    assert_eq!(run(1, "key"), "1:cached_value");
    assert_eq!(run(2, "key"), "1:cached_value");
    assert_eq!(run(3, "new_key"), "3:cached_value");
}

#[test]
fn test_mixed_template_key() {
    let backend = shared_backend();
    let deco = cached_on(&backend, "{0}_{keyword}");

    let run = |positional: &str, count: i64, keyword: &str| -> String {
        deco.call(
            &CallArgs::new()
                .positional(positional)
                .positional(count)
                .named("keyword", keyword),
            move || format!("{count}:cached_value"),
        )
        .unwrap()
    };

    assert_eq!(run("some", 1, "key"), "1:cached_value");
    assert_eq!(run("some", 2, "key"), "1:cached_value");
    assert_eq!(run("some_other", 1, "new_key"), "1:cached_value");
    assert!(backend.get("some_key").unwrap().is_hit());
    assert!(backend.get("some_other_new_key").unwrap().is_hit());
}

#[test]
fn test_list_element_key() {
    let backend = shared_backend();
    let deco = cached_on(&backend, "{0}_{arglist[0]}");

    let run = |positional: &str, count: i64, arglist: serde_json::Value| -> String {
        deco.call(
            &CallArgs::new()
                .positional(positional)
                .positional(count)
                .named("arglist", arglist),
            move || format!("{count}:cached_value"),
        )
        .unwrap()
    };

    assert_eq!(run("some", 1, json!(["key", "dummy"])), "1:cached_value");
    assert_eq!(run("some", 2, json!(["key", "changed"])), "1:cached_value");
    assert_eq!(run("some_other", 1, json!(["new_key", "dummy"])), "1:cached_value");
    assert!(backend.get("some_key").unwrap().is_hit());
    assert!(backend.get("some_other_new_key").unwrap().is_hit());
}

#[test]
fn test_struct_field_key() {
    #[derive(Serialize, Deserialize)]
    struct Account {
        name: String,
        balance: i64,
    }

    let backend = shared_backend();
    let deco = cached_on(&backend, "{0}_{arg.name}");

    let run = |positional: &str, count: i64, account: &Account| -> String {
        deco.call(
            &CallArgs::new()
                .positional(positional)
                .positional(count)
                .named("arg", serde_json::to_value(account).unwrap()),
            move || format!("{count}:cached_value"),
        )
        .unwrap()
    };

    let key_account = Account { name: "key".to_string(), balance: 10 };
    let other_account = Account { name: "new_key".to_string(), balance: 20 };

    assert_eq!(run("some", 1, &key_account), "1:cached_value");
    assert_eq!(run("some", 2, &key_account), "1:cached_value");
    assert_eq!(run("some_other", 1, &other_account), "1:cached_value");
    assert!(backend.get("some_key").unwrap().is_hit());
}

#[test]
fn test_generator_key() {
    let backend = shared_backend();
    let deco = CacheOptions::new()
        .cache_key(KeySpec::generator(|args| {
            // composite key over every positional argument
            let parts: Vec<String> = (0..args.len())
                .filter_map(|i| args.by_index(i).map(|v| v.to_string()))
                .collect();
            Ok(parts.join("|"))
        }))
        .backend(backend.clone())
        .build()
        .unwrap();

    let calls = AtomicUsize::new(0);
    let run = |a: i64, b: i64| -> i64 {
        deco.call(&CallArgs::new().positional(a).positional(b), || {
            calls.fetch_add(1, Ordering::SeqCst);
            a + b
        })
        .unwrap()
    };

    assert_eq!(run(2, 3), 5);
    assert_eq!(run(2, 3), 5);
    assert_eq!(run(4, 1), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_structured_results_round_trip() {
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Report {
        rows: Vec<String>,
        total: u64,
    }

    let backend = shared_backend();
    let deco = cached_on(&backend, "report:{0}");
    let calls = AtomicUsize::new(0);

    let run = |month: &str| -> Report {
        deco.call(&CallArgs::new().positional(month), || {
            calls.fetch_add(1, Ordering::SeqCst);
            Report {
                rows: vec!["a".to_string(), "b".to_string()],
                total: 2,
            }
        })
        .unwrap()
    };

    let first = run("2024-01");
    let second = run("2024-01");
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// == Invalidation Scenarios ==

#[test]
fn test_expiry_decorator_shares_keys_with_caching_decorator() {
    let backend = shared_backend();
    let cacher = cached_on(&backend, "shared_key");
    let expirer = expiring_on(&backend, "shared_key");

    let _: String = cacher
        .call(&CallArgs::new(), || "simple_value".to_string())
        .unwrap();
    assert!(backend.get("shared_key").unwrap().is_hit());

    let result: String = expirer
        .call(&CallArgs::new(), || "ignored_value".to_string())
        .unwrap();
    assert_eq!(result, "ignored_value");
    assert_eq!(backend.get("shared_key").unwrap(), Lookup::Miss);

    // Expiring an already-absent key stays quiet
    let _: String = expirer
        .call(&CallArgs::new(), || "ignored_value".to_string())
        .unwrap();
    assert_eq!(backend.get("shared_key").unwrap(), Lookup::Miss);
}

#[test]
fn test_cache_evict_recompute_cycle() {
    let backend = shared_backend();
    let f = cached_on(&backend, "{0}");
    let g = expiring_on(&backend, "{0}");
    let computed = AtomicUsize::new(0);

    let call_f = |x: &str, y: i64| -> String {
        f.call(&CallArgs::new().positional(x).positional(y), || {
            computed.fetch_add(1, Ordering::SeqCst);
            format!("{y}:value")
        })
        .unwrap()
    };

    // First call computes, second is served from cache
    assert_eq!(call_f("k", 1), "1:value");
    assert_eq!(call_f("k", 2), "1:value");
    assert_eq!(computed.load(Ordering::SeqCst), 1);

    // Eviction through the companion decorator
    let _: String = g
        .call(&CallArgs::new().positional("k"), || "done".to_string())
        .unwrap();

    // Next call recomputes
    assert_eq!(call_f("k", 3), "3:value");
    assert_eq!(computed.load(Ordering::SeqCst), 2);
}

// == Dedicated Backend Options ==

#[test]
fn test_lru_bound_through_options() {
    let deco = CacheOptions::new()
        .cache_key("{0}")
        .max_items(2)
        .build()
        .unwrap();
    let calls = AtomicUsize::new(0);

    let run = |key: &str| -> String {
        deco.call(&CallArgs::new().positional(key), || {
            calls.fetch_add(1, Ordering::SeqCst);
            format!("value_{key}")
        })
        .unwrap()
    };

    run("a");
    run("b");
    run("c"); // evicts "a"
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    run("c"); // hit
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    run("a"); // recomputed after eviction
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_ttl_through_options() {
    let deco = CacheOptions::new()
        .cache_key("ttl_key")
        .max_age(Duration::from_millis(150))
        .build()
        .unwrap();
    let calls = AtomicUsize::new(0);

    let run = || -> i64 {
        deco.call(&CallArgs::new(), || {
            calls.fetch_add(1, Ordering::SeqCst) as i64
        })
        .unwrap()
    };

    assert_eq!(run(), 0);
    assert_eq!(run(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(run(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_backend_stats_observable_through_decorated_calls() {
    let lru = Arc::new(LruCache::new(4));
    let backend: SharedBackend = lru.clone();
    let deco = cached_on(&backend, "{0}");

    let run = |key: &str| -> String {
        deco.call(&CallArgs::new().positional(key), || format!("value_{key}"))
            .unwrap()
    };

    run("a"); // computed and stored
    run("a"); // served from cache
    run("b"); // computed and stored

    let stats = lru.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.total_entries, 2);
    assert!((stats.hit_rate() - 1.0 / 3.0).abs() < 1e-9);
}

// == Shared Backend Under Concurrency ==

#[test]
fn test_concurrent_calls_share_one_backend_without_corruption() {
    let backend = shared_backend();
    let deco = Arc::new(cached_on(&backend, "{0}"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let deco = Arc::clone(&deco);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let key = format!("key{}", i % 5);
                    let value: String = deco
                        .call(&CallArgs::new().positional(key.as_str()), || {
                            format!("value{}", i % 5)
                        })
                        .unwrap();
                    // Concurrent misses for one key all store this same
                    // value, so every observation is complete and well-formed
                    assert_eq!(value, format!("value{}", i % 5));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..5 {
        assert!(backend.get(&format!("key{i}")).unwrap().is_hit());
    }
}

// == Error Surface ==

#[test]
fn test_unresolvable_key_fails_the_call() {
    let backend = shared_backend();
    let deco = cached_on(&backend, "{2}");

    let result: memocache::Result<String> = deco.call(
        &CallArgs::new().positional("only_one"),
        || "never".to_string(),
    );
    assert!(matches!(result, Err(CacheError::KeyResolution(_))));
}

#[test]
fn test_decoration_time_validation() {
    let err = CacheOptions::new().build().unwrap_err();
    assert!(matches!(err, CacheError::Configuration(_)));

    let err = CacheOptions::new()
        .cache_key("a")
        .expire_key("b")
        .build()
        .unwrap_err();
    assert!(matches!(err, CacheError::Configuration(_)));
}
