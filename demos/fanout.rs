//! Fan-out demo: many producers, one consumer per shard.
//!
//! Run with `RUST_LOG=nqueue=debug cargo run --example fanout` to see the
//! close and pool events.

use nqueue::{MetricsCollector, QueueConfig, ShardedQueue};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const SHARDS: usize = 4;
const PRODUCERS: u64 = 1_000;

fn main() {
    nqueue::trace::init_tracing();

    let queues = Arc::new(ShardedQueue::<u64>::with_config(
        SHARDS,
        QueueConfig::default().pool_capacity(256),
    ));
    let started = Instant::now();

    let consumers: Vec<_> = (0..SHARDS)
        .map(|i| {
            let queues = Arc::clone(&queues);
            thread::spawn(move || {
                let mut sum = 0u64;
                let _ = queues.shard(i).dequeue_func(|value, _closed| {
                    sum += value;
                    true
                });
                sum
            })
        })
        .collect();

    let producers: Vec<_> = (1..=PRODUCERS)
        .map(|id| {
            let queues = Arc::clone(&queues);
            thread::spawn(move || {
                if let Err(err) = queues.enqueue(id) {
                    eprintln!("producer {id}: {err}");
                }
            })
        })
        .collect();
    for producer in producers {
        let _ = producer.join();
    }
    queues.close();

    let sum: u64 = consumers.into_iter().filter_map(|c| c.join().ok()).sum();
    println!("sum = {sum} (expected {})", PRODUCERS * (PRODUCERS + 1) / 2);
    println!("elapsed = {:?}", started.elapsed());

    for (i, shard) in queues.shards().iter().enumerate() {
        let m = shard.metrics();
        println!(
            "shard {i}: enqueued={} dequeued={} waits={} pool hit rate={:.2}",
            m.enqueued,
            m.dequeued,
            m.waits,
            m.pool_hit_rate()
        );
    }
}
