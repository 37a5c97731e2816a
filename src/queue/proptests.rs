//! Property-based tests for the bounded blocking queue using proptest
//!
//! Single-threaded operation sequences are replayed against a `VecDeque`
//! model; a threaded property checks exactly-once delivery.

use crate::queue::BoundedBlockingQueue;
use crate::Error;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    TryPush(i32),
    TryPop,
    Drain,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<i32>().prop_map(Op::TryPush),
        3 => Just(Op::TryPop),
        1 => Just(Op::Drain),
    ]
}

proptest! {
    #[test]
    fn test_fifo_ordering_single_thread(
        values in prop::collection::vec(any::<i32>(), 0..200)
    ) {
        let queue = BoundedBlockingQueue::new(values.len());
        for &value in &values {
            queue.push(value);
        }
        prop_assert!(queue.is_full());

        for &expected in &values {
            prop_assert_eq!(queue.pop(), expected);
        }
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn test_matches_model_and_respects_capacity(
        capacity in 0usize..16,
        ops in prop::collection::vec(op_strategy(), 1..200)
    ) {
        let queue = BoundedBlockingQueue::new(capacity);
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                Op::TryPush(value) => match queue.try_push(value) {
                    Ok(()) => {
                        prop_assert!(model.len() < capacity);
                        model.push_back(value);
                    }
                    Err(rejected) => {
                        prop_assert_eq!(model.len(), capacity);
                        prop_assert_eq!(rejected.reason(), Error::WouldBlock);
                        prop_assert_eq!(rejected.into_inner(), value);
                    }
                },
                Op::TryPop => {
                    prop_assert_eq!(queue.try_pop(), model.pop_front());
                }
                Op::Drain => {
                    let expected: Vec<i32> = model.drain(..).collect();
                    prop_assert_eq!(queue.drain(), expected);
                }
            }

            prop_assert!(queue.len() <= queue.capacity());
            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.remaining(), capacity - model.len());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_concurrent_exactly_once(
        capacity in 1usize..8,
        producers in 1usize..4,
        items_per_producer in 1usize..200
    ) {
        let queue = Arc::new(BoundedBlockingQueue::new(capacity));
        let total = producers * items_per_producer;

        let handles: Vec<_> = (0..producers)
            .map(|producer_id| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..items_per_producer {
                        queue.push(producer_id * items_per_producer + i);
                    }
                })
            })
            .collect();

        let mut received: Vec<usize> = (0..total).map(|_| queue.pop()).collect();
        for handle in handles {
            handle.join().unwrap();
        }

        received.sort_unstable();
        prop_assert_eq!(received, (0..total).collect::<Vec<_>>());
        prop_assert!(queue.is_empty());
    }
}
