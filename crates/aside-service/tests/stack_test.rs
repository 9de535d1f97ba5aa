//! Settings, factories and service wired together with in-process backends.

mod common;

use aside_service::CacheAsideService;
use aside_service::settings::from_builder;
use aside_stores::{create_cache, create_store};
use common::{key_of, user_record};
use config::{Config, File, FileFormat};

#[tokio::test]
async fn test_seeded_stack_reads_through() {
    let dir = tempfile::tempdir().unwrap();
    let seed = dir.path().join("records.json");
    tokio::fs::write(&seed, r#"{"u:7": {"id": 7, "name": "x"}}"#)
        .await
        .unwrap();

    let toml = format!(
        r#"
        [service]
        default_ttl = 120
        namespace = "it"

        [cache]
        type = "memory"

        [store.memory]
        seed = "{}"
        "#,
        seed.display()
    );
    let settings =
        from_builder(Config::builder().add_source(File::from_str(&toml, FileFormat::Toml))).unwrap();

    let cache = create_cache(&settings.cache).await.unwrap();
    let store = create_store(&settings.store).await.unwrap();
    let service = CacheAsideService::builder()
        .cache(cache.clone())
        .store(store.clone())
        .default_ttl(settings.service.default_ttl)
        .namespace(settings.service.namespace.clone())
        .build()
        .unwrap();

    assert_eq!(
        service.get(&key_of("u:7"), None).await.unwrap(),
        Some(user_record())
    );
    assert!(cache.get("it:u:7").await.unwrap().is_some());
    assert_eq!(service.get(&key_of("u:9"), None).await.unwrap(), None);

    assert_eq!(
        service.get(&key_of("u:7"), None).await.unwrap(),
        Some(user_record())
    );
    assert_eq!(service.metrics().hits(), 1);
    assert_eq!(service.metrics().store_reads(), 2);

    cache.close().await.unwrap();
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_noop_cache_always_reads_store() {
    let settings = from_builder(
        Config::builder().add_source(File::from_str("[cache]\ntype = \"noop\"\n", FileFormat::Toml)),
    )
    .unwrap();

    let cache = create_cache(&settings.cache).await.unwrap();
    let store = aside_stores::MemoryStore::new();
    store.insert(key_of("u:7"), user_record());
    let service = CacheAsideService::new(
        cache,
        std::sync::Arc::new(store),
        settings.service.default_ttl,
    );

    for _ in 0..3 {
        assert!(service.get(&key_of("u:7"), None).await.unwrap().is_some());
    }
    assert_eq!(service.metrics().hits(), 0);
    assert_eq!(service.metrics().store_reads(), 3);
    assert_eq!(service.metrics().cache_errors(), 0);
}

#[cfg(feature = "cache-redis")]
#[tokio::test]
async fn test_unreachable_cache_still_serves_store_records() {
    use aside_stores::{CacheBackend, RedisConfig, create_cache_or_noop};

    let backend = CacheBackend::Redis(RedisConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        connect_timeout_secs: 1,
        ..Default::default()
    });
    assert!(create_cache(&backend).await.is_err());

    let cache = create_cache_or_noop(&backend).await.unwrap();
    assert_eq!(cache.name(), "noop");

    let store = aside_stores::MemoryStore::new();
    store.insert(key_of("u:7"), user_record());
    let service = CacheAsideService::new(cache, std::sync::Arc::new(store), common::ttl(60));

    assert_eq!(
        service.get(&key_of("u:7"), None).await.unwrap(),
        Some(user_record())
    );
    assert_eq!(service.metrics().store_reads(), 1);
}
