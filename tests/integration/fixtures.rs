//! Negative concurrency fixtures
//!
//! These reproduce the two bug classes the pipeline is built to avoid and
//! check that the harness detects them. Nothing outside this file shares
//! their structure. Each broken fixture has a correctly-ordered control.
//!
//! The third class, a `Vec` appended to from several threads with no lock,
//! is rejected by the compiler; see the `compile_fail` example in the
//! `ripple_crawl::storage` module docs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Barrier, Mutex};

const DEADLOCK_WAIT: Duration = Duration::from_millis(250);

/// Spawns a task that takes `first` then `second`, meeting the other task in between
fn lock_pair(
    first: Arc<Mutex<u32>>,
    second: Arc<Mutex<u32>>,
    barrier: Arc<Barrier>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut a = first.lock().await;
        barrier.wait().await;
        let mut b = second.lock().await;
        *a += 1;
        *b += 1;
    })
}

#[tokio::test]
async fn test_lock_order_inversion_deadlocks() {
    let left = Arc::new(Mutex::new(0));
    let right = Arc::new(Mutex::new(0));
    let barrier = Arc::new(Barrier::new(2));

    let mut forward = lock_pair(left.clone(), right.clone(), barrier.clone());
    let mut backward = lock_pair(right.clone(), left.clone(), barrier);

    let both = async {
        let _ = (&mut forward).await;
        let _ = (&mut backward).await;
    };
    let outcome = tokio::time::timeout(DEADLOCK_WAIT, both).await;

    assert!(
        outcome.is_err(),
        "tasks taking two locks in opposite order both completed"
    );

    forward.abort();
    backward.abort();
}

#[tokio::test]
async fn test_consistent_lock_order_completes() {
    let left = Arc::new(Mutex::new(0));
    let right = Arc::new(Mutex::new(0));

    // Same order in both tasks; a single-party barrier never waits
    let first = lock_pair(left.clone(), right.clone(), Arc::new(Barrier::new(1)));
    let second = lock_pair(left.clone(), right.clone(), Arc::new(Barrier::new(1)));

    tokio::time::timeout(DEADLOCK_WAIT, async {
        first.await.unwrap();
        second.await.unwrap();
    })
    .await
    .expect("consistently ordered locks deadlocked");

    assert_eq!(*left.lock().await, 2);
    assert_eq!(*right.lock().await, 2);
}

#[test]
fn test_split_read_modify_write_loses_update() {
    let counter = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(std::sync::Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let seen = counter.load(Ordering::SeqCst);
                // Both threads have read before either writes
                barrier.wait();
                counter.store(seen + 1, Ordering::SeqCst);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        counter.load(Ordering::SeqCst),
        1,
        "two unsynchronized increments should collapse into one"
    );
}

#[test]
fn test_atomic_increment_keeps_every_update() {
    let counter = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(std::sync::Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 2);
}
