use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use aside_core::{Key, Record, Ttl};
use aside_service::{CacheAsideService, codec};
use aside_stores::{MemoryCache, MemoryCacheConfig, MemoryStore, NoopCache};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::runtime::Runtime;

/// Crea un Record de prueba con N campos
fn create_test_record(num_fields: usize) -> Record {
    (0..num_fields)
        .map(|i| (format!("field_{}", i), serde_json::json!(format!("value-{}", i))))
        .collect()
}

fn ttl() -> Ttl {
    Ttl::from_secs(3600).unwrap()
}

/// Benchmark: get servido desde cache
fn bench_get_hit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let store = MemoryStore::new();
    let key = Key::new("u:7").unwrap();
    store.insert(key.clone(), create_test_record(50));

    let service = CacheAsideService::new(
        Arc::new(MemoryCache::new(MemoryCacheConfig::default())),
        Arc::new(store),
        ttl(),
    );

    // Pre-populate cache
    rt.block_on(async {
        service.get(&key, None).await.unwrap();
    });

    c.bench_function("service_get_hit", |b| {
        b.to_async(&rt).iter(|| async {
            let result = service.get(&key, None).await;
            std::hint::black_box(result)
        });
    });
}

/// Benchmark: miss + store read + populate, con una key nueva por iteracion
fn bench_get_miss(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = Arc::new(MemoryStore::new());
    for i in 0..10_000 {
        store.insert(
            Key::new(format!("u:{}", i)).unwrap(),
            create_test_record(50),
        );
    }

    let service = CacheAsideService::new(Arc::new(NoopCache), store, ttl());
    let counter = Arc::new(AtomicU64::new(0));

    c.bench_function("service_get_miss", |b| {
        b.to_async(&rt).iter(|| {
            let service = service.clone();
            let counter = Arc::clone(&counter);
            async move {
                let i = counter.fetch_add(1, Ordering::Relaxed) % 10_000;
                let key = Key::new(format!("u:{}", i)).unwrap();
                std::hint::black_box(service.get(&key, None).await)
            }
        });
    });
}

/// Benchmark: codec con distintos tamanos de record
fn bench_codec_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_round_trip");

    for size in [10, 100, 1000] {
        let record = create_test_record(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &record, |b, record| {
            b.iter(|| {
                let bytes = codec::encode(record).unwrap();
                std::hint::black_box(codec::decode(&bytes).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_get_miss, bench_codec_sizes);
criterion_main!(benches);
