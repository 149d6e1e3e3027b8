//! # Message Bus Benchmarks
//!
//! | Path | Measures |
//! |------|----------|
//! | `publish` | direct fan-out to N subscribers |
//! | `drain` | post a full inbound queue, then drain it |
//! | `unrouted` | cost of discarding a message nobody wants |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use message_bus::{Bus, BusConfig, Message, Terminal, WILDCARD};

// ============================================================================
// Fan-out width
// ============================================================================

fn bench_publish_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");

    for subscribers in [1usize, 8, 64] {
        let bus: Bus<u64> = Bus::new();
        let terminals: Vec<Terminal<u64>> = (0..subscribers).map(|_| Terminal::new(&bus)).collect();
        for t in &terminals {
            t.subscribe("tick");
        }

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::new("fan_out", subscribers),
            &terminals,
            |b, terminals| {
                b.iter(|| {
                    let outcome = bus.publish(Message::new("tick", black_box(7)));
                    for t in terminals {
                        if let Some(d) = t.get_message() {
                            d.release();
                        }
                    }
                    black_box(outcome)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Inbound drain
// ============================================================================

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");

    for batch in [30usize, 256] {
        let config = BusConfig::default()
            .with_inbound_capacity(batch)
            .with_inbox_capacity(batch);
        let bus: Bus<u64> = match Bus::with_config(config) {
            Ok(bus) => bus,
            Err(e) => panic!("invalid bench config: {e}"),
        };
        let producer = Terminal::new(&bus);
        let consumer = Terminal::new(&bus);
        consumer.subscribe(WILDCARD);

        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("post_drain_consume", batch), &batch, |b, &batch| {
            b.iter(|| {
                for i in 0..batch {
                    let _ = producer.post(Message::new("event", i as u64));
                }
                let report = bus.drain_and_publish();
                while let Some(d) = consumer.get_message() {
                    d.release();
                }
                black_box(report)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Discard path
// ============================================================================

fn bench_unrouted(c: &mut Criterion) {
    let bus: Bus<Vec<u8>> = Bus::new();
    let _listener = Terminal::new(&bus);

    c.bench_function("unrouted/discard", |b| {
        b.iter(|| black_box(bus.publish(Message::new("nobody", vec![0u8; 64]))))
    });
}

criterion_group!(benches, bench_publish_fan_out, bench_drain, bench_unrouted);
criterion_main!(benches);
