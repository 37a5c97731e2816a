//! Writer/reader demonstration
//!
//! One writer thread pushes `1..=items` into a small queue with a delay
//! between pushes; one reader thread starts late, so the writer hits the
//! capacity limit and blocks until the reader catches up. The end of the
//! stream is signalled with a dedicated message variant, so every `i64`,
//! zero included, is a valid payload.
//!
//! ```text
//! RUST_LOG=info cargo run --example producer_consumer -- --delay-ms 200
//! ```

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use argh::FromArgs;
use boundq::{BoundedBlockingQueue, MetricsCollector};

#[derive(Debug, FromArgs)]
/// Exchange values between a writer and a reader thread over a bounded queue
#[argh(help_triggers("--help"))]
struct Args {
    /// maximum number of queued items
    #[argh(option, default = "2")]
    capacity: i64,
    /// number of values the writer produces
    #[argh(option, default = "5")]
    items: i64,
    /// pause between pushes, in milliseconds
    #[argh(option, default = "1000")]
    delay_ms: u64,
    /// pause before the reader starts, in milliseconds
    #[argh(option, default = "2000")]
    reader_delay_ms: u64,
}

#[derive(Debug)]
enum Message<T> {
    Item(T),
    EndOfStream,
}

fn writer(queue: &BoundedBlockingQueue<Message<i64>>, items: i64, delay: Duration) {
    tracing::info!("writer started");
    for value in 1..=items {
        queue.push(Message::Item(value));
        tracing::info!("push({value}), queued={}", queue.len());
        thread::sleep(delay);
    }
    queue.push(Message::EndOfStream);
    tracing::info!("writer finished");
}

fn reader(queue: &BoundedBlockingQueue<Message<i64>>, delay: Duration) -> usize {
    thread::sleep(delay);
    tracing::info!("reader started");
    let mut received = 0;
    while let Message::Item(value) = queue.pop() {
        received += 1;
        tracing::info!("pop() -> {value}");
    }
    tracing::info!("reader finished, received={received}");
    received
}

/// End a stream whose writer never ran
fn release_reader(queue: &BoundedBlockingQueue<Message<i64>>) {
    tracing::warn!("writer unavailable, ending the stream");
    queue.push(Message::EndOfStream);
}

pub fn main() -> Result<()> {
    let args = argh::from_env::<Args>();
    tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if args.capacity == 0 {
        return Err(anyhow!("a zero-capacity queue would block the writer forever"));
    }
    let queue: BoundedBlockingQueue<Message<i64>> =
        BoundedBlockingQueue::try_new(args.capacity)
            .map_err(|e| anyhow!("capacity {}: {e}", args.capacity))?;
    tracing::info!("main started, capacity={}", queue.capacity());

    // The reader goes first: if the writer then fails to start, the reader is
    // released with an end-of-stream message instead of blocking the scope.
    let received = thread::scope(|s| -> Result<usize> {
        let reader_handle = thread::Builder::new()
            .name("reader".into())
            .spawn_scoped(s, || reader(&queue, Duration::from_millis(args.reader_delay_ms)))?;
        let writer_handle = thread::Builder::new()
            .name("writer".into())
            .spawn_scoped(s, || writer(&queue, args.items, Duration::from_millis(args.delay_ms)))
            .map_err(|e| {
                release_reader(&queue);
                anyhow!("failed to start writer: {e}")
            })?;

        writer_handle.join().map_err(|_| anyhow!("writer thread panicked"))?;
        reader_handle.join().map_err(|_| anyhow!("reader thread panicked"))
    })?;

    let metrics = queue.metrics();
    tracing::info!(
        "main finished, received={received}, blocked_pushes={}, blocked_pops={}, peak_len={}",
        metrics.blocked_pushes,
        metrics.blocked_pops,
        metrics.peak_len,
    );
    Ok(())
}
