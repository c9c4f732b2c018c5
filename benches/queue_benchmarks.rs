//! Throughput benchmarks for nqueue
//!
//! Compares the linked queue (with and without node pooling) and the ring
//! queue against:
//! - std::sync::mpsc (standard library channel)
//! - crossbeam::channel (unbounded channel)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::{mpsc as std_mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

use nqueue::{NQueue, QueueConfig, RingQueue, ShardedQueue};

use crossbeam::channel::unbounded as crossbeam_unbounded;

// Benchmark configurations
const BATCH_SIZES: &[usize] = &[100, 1_000, 10_000];
const THREAD_COUNTS: &[usize] = &[1, 2, 4, 8];
const OPERATIONS_PER_PRODUCER: usize = 10_000;

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread_enqueue_dequeue");

    for &size in BATCH_SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("nqueue_pooled", size), &size, |b, &size| {
            let queue = NQueue::new();
            b.iter(|| {
                for i in 0..size {
                    queue.enqueue(black_box(i)).unwrap();
                }
                for _ in 0..size {
                    black_box(queue.dequeue());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("nqueue_unpooled", size), &size, |b, &size| {
            let queue = NQueue::with_config(QueueConfig::default().pool_capacity(0));
            b.iter(|| {
                for i in 0..size {
                    queue.enqueue(black_box(i)).unwrap();
                }
                for _ in 0..size {
                    black_box(queue.dequeue());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("ring_queue", size), &size, |b, &size| {
            let queue = RingQueue::new();
            b.iter(|| {
                for i in 0..size {
                    queue.enqueue(black_box(i)).unwrap();
                }
                for _ in 0..size {
                    black_box(queue.dequeue());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("nqueue_batch", size), &size, |b, &size| {
            let queue = NQueue::new();
            b.iter(|| {
                queue.enqueue_batch(0..size).unwrap();
                black_box(queue.dequeue_batch(size));
            })
        });

        group.bench_with_input(BenchmarkId::new("std_mpsc", size), &size, |b, &size| {
            let (tx, rx) = std_mpsc::channel();
            b.iter(|| {
                for i in 0..size {
                    tx.send(black_box(i)).unwrap();
                }
                for _ in 0..size {
                    black_box(rx.try_recv().unwrap());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("crossbeam_unbounded", size), &size, |b, &size| {
            let (tx, rx) = crossbeam_unbounded();
            b.iter(|| {
                for i in 0..size {
                    tx.send(black_box(i)).unwrap();
                }
                for _ in 0..size {
                    black_box(rx.try_recv().unwrap());
                }
            })
        });
    }

    group.finish();
}

fn bench_producers_one_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("producers_to_one_drain_loop");
    group.measurement_time(Duration::from_secs(10));

    for &producers in THREAD_COUNTS {
        group.throughput(Throughput::Elements((producers * OPERATIONS_PER_PRODUCER) as u64));

        group.bench_with_input(BenchmarkId::new("nqueue", producers), &producers, |b, &producers| {
            b.iter(|| {
                let queue = Arc::new(NQueue::new());
                let barrier = Arc::new(Barrier::new(producers + 1));

                let consumer = {
                    let queue = Arc::clone(&queue);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        let mut sum = 0usize;
                        let _ = queue.dequeue_func(|v, _| {
                            sum = sum.wrapping_add(v);
                            true
                        });
                        black_box(sum)
                    })
                };

                let handles: Vec<_> = (0..producers)
                    .map(|_| {
                        let queue = Arc::clone(&queue);
                        let barrier = Arc::clone(&barrier);
                        thread::spawn(move || {
                            barrier.wait();
                            for i in 0..OPERATIONS_PER_PRODUCER {
                                queue.enqueue(i).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                queue.close();
                consumer.join().unwrap();
            })
        });

        group.bench_with_input(
            BenchmarkId::new("crossbeam_unbounded", producers),
            &producers,
            |b, &producers| {
                b.iter(|| {
                    let (tx, rx) = crossbeam_unbounded::<usize>();
                    let barrier = Arc::new(Barrier::new(producers + 1));

                    let consumer = {
                        let barrier = Arc::clone(&barrier);
                        thread::spawn(move || {
                            barrier.wait();
                            let sum = rx.iter().fold(0usize, |acc, v| acc.wrapping_add(v));
                            black_box(sum)
                        })
                    };

                    let handles: Vec<_> = (0..producers)
                        .map(|_| {
                            let tx = tx.clone();
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                barrier.wait();
                                for i in 0..OPERATIONS_PER_PRODUCER {
                                    tx.send(i).unwrap();
                                }
                            })
                        })
                        .collect();
                    drop(tx);
                    for handle in handles {
                        handle.join().unwrap();
                    }
                    consumer.join().unwrap();
                })
            },
        );
    }

    group.finish();
}

fn bench_sharded_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharded_fan_out");
    group.measurement_time(Duration::from_secs(10));
    let producers = 8;

    for &shards in &[1usize, 2, 4, 8] {
        group.throughput(Throughput::Elements((producers * OPERATIONS_PER_PRODUCER) as u64));

        group.bench_with_input(BenchmarkId::new("shards", shards), &shards, |b, &shards| {
            b.iter(|| {
                let queues = Arc::new(ShardedQueue::<usize>::new(shards));

                let consumers: Vec<_> = (0..shards)
                    .map(|i| {
                        let queues = Arc::clone(&queues);
                        thread::spawn(move || {
                            let mut n = 0usize;
                            while queues.shard(i).dequeue_wait().is_ok() {
                                n += 1;
                            }
                            n
                        })
                    })
                    .collect();

                let handles: Vec<_> = (0..producers)
                    .map(|_| {
                        let queues = Arc::clone(&queues);
                        thread::spawn(move || {
                            for i in 0..OPERATIONS_PER_PRODUCER {
                                queues.enqueue(i).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                queues.close();

                let total: usize = consumers.into_iter().map(|c| c.join().unwrap()).sum();
                assert_eq!(total, producers * OPERATIONS_PER_PRODUCER);
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_thread,
    bench_producers_one_drain,
    bench_sharded_fan_out
);

criterion_main!(benches);
