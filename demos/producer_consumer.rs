//! Producer/consumer example for blocking-deque
//!
//! Several producers hand work to a pool of consumers through one shared deque.
//! Urgent work is pushed at the front; shutdown uses one sentinel per consumer.
//!
//! Run with `RUST_LOG=trace cargo run --example producer_consumer` to see consumers
//! suspend and resume.

use blocking_deque::{ConcurrentDeque, MetricsCollector};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Task {
    Normal(u32),
    Urgent(u32),
    Stop,
}

fn main() {
    env_logger::init();

    println!("blocking-deque producer/consumer example");
    println!("========================================");

    let tasks: Arc<ConcurrentDeque<Task>> = Arc::new(ConcurrentDeque::with_capacity(64));
    let num_consumers = 3;

    let consumers: Vec<_> = (0..num_consumers)
        .map(|id| {
            let tasks = Arc::clone(&tasks);
            thread::spawn(move || {
                let mut done = 0;
                loop {
                    match tasks.pop_front() {
                        Task::Normal(n) => {
                            thread::sleep(Duration::from_micros(200));
                            done += n;
                        }
                        Task::Urgent(n) => {
                            println!("   Consumer {} handling urgent task {}", id, n);
                            done += n;
                        }
                        Task::Stop => break,
                    }
                }
                println!("   Consumer {} finished, sum = {}", id, done);
                done
            })
        })
        .collect();

    let producers: Vec<_> = (0..2)
        .map(|id| {
            let tasks = Arc::clone(&tasks);
            thread::spawn(move || {
                for n in 0..50 {
                    if n % 10 == 0 {
                        tasks.push_front(Task::Urgent(id * 100 + n));
                    } else {
                        tasks.emplace_back(|| Task::Normal(id * 100 + n));
                    }
                    thread::sleep(Duration::from_micros(50));
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().expect("producer panicked");
    }
    println!("\nProducers done, {} tasks still queued", tasks.len());

    for _ in 0..num_consumers {
        tasks.push_back(Task::Stop);
    }

    let total: u32 = consumers
        .into_iter()
        .map(|c| c.join().expect("consumer panicked"))
        .sum();

    let metrics = tasks.metrics();
    println!("\nResults:");
    println!("   Sum of handled tasks: {}", total);
    println!("   Insertions: {}", metrics.insertions);
    println!("   Removals: {}", metrics.removals);
    println!("   Peak length: {}", metrics.peak_len);
    println!("   Blocked operations: {}", metrics.blocked_operations);
    println!("   Blocking rate: {:.1}%", metrics.blocking_rate());
    println!("   Average wait: {:?}", metrics.avg_wait_time());
    println!("   Longest wait: {:?}", metrics.max_wait_time());
}
