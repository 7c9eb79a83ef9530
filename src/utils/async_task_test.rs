use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;

use super::async_task::spawn_deferred;
use crate::Error;

#[tokio::test(start_paused = true)]
async fn test_spawn_deferred_waits_for_delay() {
    let counter = Arc::new(AtomicU32::new(0));
    let task_counter = counter.clone();

    let mut handles = Vec::new();
    let started = Instant::now();
    spawn_deferred(
        "test_task",
        Duration::from_millis(100),
        async move {
            task_counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        Some(&mut handles),
    );

    tokio::time::sleep(Duration::from_millis(99)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    join_all(handles).await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_spawn_deferred_without_handles() {
    let counter = Arc::new(AtomicU32::new(0));
    let task_counter = counter.clone();

    spawn_deferred(
        "test_task",
        Duration::from_millis(10),
        async move {
            task_counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        None,
    );

    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_spawn_deferred_with_error() {
    let mut handles = Vec::new();
    spawn_deferred(
        "error_task",
        Duration::ZERO,
        async move { Err(Error::Fatal("Task error".to_string())) },
        Some(&mut handles),
    );

    assert_eq!(handles.len(), 1);

    // errors are logged, never propagated as panics
    for result in join_all(handles).await {
        assert!(result.is_ok());
    }
}
