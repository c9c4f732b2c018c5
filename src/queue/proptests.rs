//! Property-based tests for the queues using proptest
//!
//! These tests check the FIFO, count and close invariants against a
//! `VecDeque` model over arbitrary operation sequences.

use crate::config::QueueConfig;
use crate::queue::{Dequeued, NQueue, RingQueue, ShardedQueue};
use crate::Error;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    Enqueue(i32),
    Dequeue,
    Batch(Vec<i32>),
    Close,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<i32>().prop_map(Op::Enqueue),
        4 => Just(Op::Dequeue),
        1 => prop::collection::vec(any::<i32>(), 0..8).prop_map(Op::Batch),
        1 => Just(Op::Close),
    ]
}

/// Property: the linked queue behaves like a closable `VecDeque`
mod model_properties {
    use super::*;

    proptest! {
        #[test]
        fn test_matches_model(
            ops in prop::collection::vec(op_strategy(), 1..200),
            pool_capacity in 0usize..16,
        ) {
            let queue = NQueue::with_config(QueueConfig::default().pool_capacity(pool_capacity));
            let mut model = VecDeque::new();
            let mut open = true;

            for op in ops {
                match op {
                    Op::Enqueue(v) => {
                        let result = queue.enqueue(v);
                        if open {
                            prop_assert_eq!(result, Ok(()));
                            model.push_back(v);
                        } else {
                            prop_assert_eq!(result, Err(Error::Closed));
                        }
                    }
                    Op::Dequeue => {
                        let expected = Dequeued { value: model.pop_front(), closed: !open };
                        prop_assert_eq!(queue.dequeue(), expected);
                    }
                    Op::Batch(values) => {
                        let result = queue.enqueue_batch(values.clone());
                        if open {
                            prop_assert_eq!(result, Ok(values.len()));
                            model.extend(values);
                        } else {
                            prop_assert_eq!(result, Err(Error::Closed));
                        }
                    }
                    Op::Close => {
                        queue.close();
                        open = false;
                    }
                }

                // count == 0 exactly when the chain is empty
                prop_assert_eq!(queue.count(), model.len() as i64);
                prop_assert_eq!(queue.is_empty(), model.is_empty());
                prop_assert!(queue.pooled_nodes() <= pool_capacity);
            }
        }

        #[test]
        fn test_fifo_ordering_ring(
            values in prop::collection::vec(any::<i32>(), 0..100)
        ) {
            let queue = RingQueue::new();
            for &v in &values {
                queue.enqueue(v).unwrap();
            }
            queue.close();

            let mut drained = Vec::new();
            let result = queue.dequeue_func(|v, closed| {
                drained.push((v, closed));
                true
            });

            prop_assert_eq!(result, Err(Error::ClosedEmpty));
            prop_assert_eq!(drained, values.into_iter().map(|v| (v, true)).collect::<Vec<_>>());
        }

        #[test]
        fn test_dequeue_func_stops_after_n(
            values in prop::collection::vec(any::<u16>(), 1..50),
            stop_after in 1usize..50,
        ) {
            let queue = NQueue::new();
            queue.enqueue_batch(values.iter().copied()).unwrap();
            queue.close();

            let mut seen = Vec::new();
            let result = queue.dequeue_func(|v, _| {
                seen.push(v);
                seen.len() < stop_after
            });

            if stop_after <= values.len() {
                prop_assert_eq!(result, Ok(()));
                prop_assert_eq!(seen.len(), stop_after);
                prop_assert_eq!(queue.count(), (values.len() - stop_after) as i64);
            } else {
                prop_assert_eq!(result, Err(Error::ClosedEmpty));
                prop_assert_eq!(queue.count(), 0);
            }
            prop_assert_eq!(&seen[..], &values[..seen.len()]);
        }
    }
}

/// Property: concurrent producers lose and duplicate nothing
mod concurrent_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_concurrent_producers_sum(
            num_producers in 1usize..6,
            per_producer in 1usize..200,
            shards in 1usize..4,
        ) {
            let queues = Arc::new(ShardedQueue::<usize>::new(shards));

            let consumers: Vec<_> = (0..shards)
                .map(|i| {
                    let queues = Arc::clone(&queues);
                    thread::spawn(move || {
                        let mut received = Vec::new();
                        let _ = queues.shard(i).dequeue_func(|v, _| {
                            received.push(v);
                            true
                        });
                        received
                    })
                })
                .collect();

            let producers: Vec<_> = (0..num_producers)
                .map(|p| {
                    let queues = Arc::clone(&queues);
                    thread::spawn(move || {
                        for i in 0..per_producer {
                            queues.enqueue(p * per_producer + i).unwrap();
                        }
                    })
                })
                .collect();
            for producer in producers {
                producer.join().unwrap();
            }
            queues.close();

            let mut all: Vec<usize> = consumers
                .into_iter()
                .flat_map(|c| c.join().unwrap())
                .collect();
            all.sort_unstable();

            let expected: Vec<usize> = (0..num_producers * per_producer).collect();
            prop_assert_eq!(all, expected);
            prop_assert_eq!(queues.count(), 0);
        }
    }
}
