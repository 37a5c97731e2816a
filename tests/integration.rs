//! Integration tests for boundq
//!
//! These exercise the public API the way an application would: queues
//! shared through `Arc`, producer and consumer threads, out-of-band
//! end-of-stream signalling and the timed/non-blocking variants.

#![cfg(not(loom))]

use boundq::{BoundedBlockingQueue, Error, MetricsCollector, PushError};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug, PartialEq)]
enum Message<T> {
    Item(T),
    EndOfStream,
}

#[test]
fn test_writer_reader_pipeline_with_end_of_stream() {
    let queue = Arc::new(BoundedBlockingQueue::new(2));

    let writer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            // Zero is a legitimate payload, not a terminator.
            for value in [0, 1, 2, 0, 3] {
                queue.push(Message::Item(value));
                thread::sleep(Duration::from_millis(2));
            }
            queue.push(Message::EndOfStream);
        })
    };

    let reader = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut received = Vec::new();
            while let Message::Item(value) = queue.pop() {
                received.push(value);
            }
            received
        })
    };

    writer.join().unwrap();
    assert_eq!(reader.join().unwrap(), vec![0, 1, 2, 0, 3]);
    assert!(queue.is_empty());
}

#[test]
fn test_multiple_readers_stop_on_one_marker_each() {
    let readers = 3;
    let items = 300;
    let queue = Arc::new(BoundedBlockingQueue::new(4));
    let barrier = Arc::new(Barrier::new(readers + 1));

    let handles: Vec<_> = (0..readers)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut received = Vec::new();
                while let Message::Item(value) = queue.pop() {
                    received.push(value);
                }
                received
            })
        })
        .collect();

    barrier.wait();
    for value in 0..items {
        queue.push(Message::Item(value));
    }
    for _ in 0..readers {
        queue.push(Message::EndOfStream);
    }

    let mut all: Vec<i32> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..items).collect::<Vec<_>>());
}

#[test]
fn test_len_never_exceeds_capacity_under_contention() {
    let capacity = 3;
    let queue = Arc::new(BoundedBlockingQueue::new(capacity));
    let rounds = 1_000;

    let producers: Vec<_> = (0..2)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..rounds {
                    queue.push(i);
                }
            })
        })
        .collect();

    for _ in 0..2 * rounds {
        let len = queue.len();
        assert!(len <= queue.capacity(), "len {len} exceeded capacity");
        queue.pop();
    }

    for producer in producers {
        producer.join().unwrap();
    }
    assert!(queue.metrics().peak_len <= capacity);
}

#[test]
fn test_rejected_push_returns_item() {
    let queue = BoundedBlockingQueue::new(1);
    queue.push(String::from("kept"));

    let err: PushError<String> = queue.try_push(String::from("returned")).unwrap_err();
    assert_eq!(err.reason(), Error::WouldBlock);
    assert_eq!(err.into_inner(), "returned");

    let err = queue
        .push_timeout(String::from("late"), Duration::from_millis(10))
        .unwrap_err();
    assert_eq!(err.reason(), Error::Timeout);
    assert_eq!(err.item(), "late");

    assert_eq!(queue.pop(), "kept");
}

#[test]
fn test_push_error_converts_for_question_mark() {
    fn enqueue_all(queue: &BoundedBlockingQueue<u8>, values: &[u8]) -> Result<(), Error> {
        for &value in values {
            queue.try_push(value)?;
        }
        Ok(())
    }

    let queue = BoundedBlockingQueue::new(2);
    assert_eq!(enqueue_all(&queue, &[1, 2]), Ok(()));
    assert_eq!(enqueue_all(&queue, &[3]), Err(Error::WouldBlock));
    assert_eq!(queue.drain(), vec![1, 2]);
}

#[test]
fn test_try_new_from_signed_configuration() {
    let configured: i64 = -5;
    assert_eq!(
        BoundedBlockingQueue::<u8>::try_new(configured).unwrap_err(),
        Error::InvalidCapacity
    );

    let queue = BoundedBlockingQueue::<u8>::try_new(8i64).unwrap();
    assert_eq!(queue.capacity(), 8);
    assert_eq!(queue.remaining(), 8);
}
