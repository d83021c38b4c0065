//! # Message Bus Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | post | Enqueue cost under the bus lock |
//! | drain (test host) | Pump overhead without an engine |
//! | drain (Lua) | Full delivery into Lua callbacks |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ez_bus::testing::TestHost;
use ez_bus::{BusConfig, MessageBus, DEFAULT_QUEUE_CAPACITY};
use ez_script::{ScriptBus, ScriptRuntime};
use serde_json::json;

fn bench_post(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus-post");
    group.throughput(Throughput::Elements(DEFAULT_QUEUE_CAPACITY as u64));

    group.bench_function("text", |b| {
        let host = TestHost::new();
        let bus = MessageBus::<TestHost>::new();
        b.iter(|| {
            for _ in 0..DEFAULT_QUEUE_CAPACITY {
                bus.post(black_box("screen/pushed"), black_box("Home"));
            }
            bus.process(&host)
        })
    });

    group.bench_function("record", |b| {
        let host = TestHost::new();
        let bus = MessageBus::<TestHost>::new();
        b.iter(|| {
            for _ in 0..DEFAULT_QUEUE_CAPACITY {
                bus.post_record("debug/memory", json!({"heap": 1024}));
            }
            bus.process(&host)
        })
    });

    group.finish();
}

fn bench_drain_test_host(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus-drain-test-host");

    for subscribers in [1usize, 4, 16] {
        let host = TestHost::new();
        let bus = MessageBus::<TestHost>::new();
        for _ in 0..subscribers {
            bus.subscribe_script("t", host.function(|_, _| Ok(())));
        }

        group.throughput(Throughput::Elements(
            (DEFAULT_QUEUE_CAPACITY * subscribers) as u64,
        ));
        group.bench_with_input(
            BenchmarkId::new("deliveries", subscribers),
            &subscribers,
            |b, _| {
                b.iter(|| {
                    for _ in 0..DEFAULT_QUEUE_CAPACITY {
                        bus.post("t", "x");
                    }
                    black_box(bus.process(&host))
                })
            },
        );
    }

    group.finish();
}

fn bench_drain_lua(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus-drain-lua");
    group.throughput(Throughput::Elements(DEFAULT_QUEUE_CAPACITY as u64));

    let bus = Arc::new(ScriptBus::with_config(BusConfig::default()).expect("bus"));
    let runtime = ScriptRuntime::new(Arc::clone(&bus)).expect("runtime");
    runtime
        .exec(
            "n = 0; ez.bus.subscribe('t', function(_, d) n = n + #d end)",
            "bench",
        )
        .expect("subscribe");

    group.bench_function("text", |b| {
        b.iter(|| {
            for _ in 0..DEFAULT_QUEUE_CAPACITY {
                bus.post("t", "payload");
            }
            black_box(runtime.update())
        })
    });

    group.bench_function("table", |b| {
        b.iter(|| {
            for _ in 0..DEFAULT_QUEUE_CAPACITY {
                bus.post_record("t", json!({"len": 7}));
            }
            black_box(runtime.update())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_post, bench_drain_test_host, bench_drain_lua);
criterion_main!(benches);
