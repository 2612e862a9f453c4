mod common;

use std::time::Duration;

use anyhow::Result;
use exception_mailer::{
    clients::queue::{MemoryQueue, QueueStore},
    dispatcher::QueueDispatcher,
};

use common::{FailingQueue, FakeMailer, FakeOutcome, sample_record};

fn queue() -> MemoryQueue {
    MemoryQueue::open("admin_error_notifications", Duration::from_secs(3600))
}

/// Test: a fully successful wave leaves the queue empty
#[tokio::test]
async fn test_successful_wave_drains_to_empty() -> Result<()> {
    let queue = queue();
    let dispatcher = QueueDispatcher::new(queue.clone(), FakeMailer::new());

    let records = vec![
        sample_record("a@example.com"),
        sample_record("b@example.com"),
    ];

    dispatcher.dispatch(records).await?;

    assert!(queue.is_empty());
    assert_eq!(
        dispatcher.mailer().processed_recipients(),
        vec!["a@example.com", "b@example.com"]
    );

    Ok(())
}

/// Test: a suspend signal halts the drain and releases the item
#[tokio::test]
async fn test_suspend_halts_drain_and_releases_item() -> Result<()> {
    let queue = queue();
    let mailer = FakeMailer::new();
    mailer.set_outcome("b@example.com", FakeOutcome::Suspend);
    let dispatcher = QueueDispatcher::new(queue.clone(), mailer);

    let records = vec![
        sample_record("a@example.com"),
        sample_record("b@example.com"),
        sample_record("c@example.com"),
    ];

    dispatcher.dispatch(records).await?;

    // "a" delivered, "b" suspended and released, "c" never claimed.
    assert_eq!(
        dispatcher.mailer().processed_recipients(),
        vec!["a@example.com", "b@example.com"]
    );
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pending_count(), 2);
    assert_eq!(queue.claimed_count(), 0);

    Ok(())
}

/// Test: a non-suspend failure does not stop the drain
#[tokio::test]
async fn test_item_failure_continues_drain() -> Result<()> {
    let queue = queue();
    let mailer = FakeMailer::new();
    mailer.set_outcome("b@example.com", FakeOutcome::Fail);
    let dispatcher = QueueDispatcher::new(queue.clone(), mailer);

    let records = vec![
        sample_record("a@example.com"),
        sample_record("b@example.com"),
        sample_record("c@example.com"),
    ];

    dispatcher.dispatch(records).await?;

    assert_eq!(
        dispatcher.mailer().processed_recipients(),
        vec!["a@example.com", "b@example.com", "c@example.com"]
    );

    // The failed item is abandoned under its claim lease, not deleted and
    // not visible to the next claim.
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.claimed_count(), 1);
    assert_eq!(queue.pending_count(), 0);

    Ok(())
}

/// Test: the drain is queue-wide and picks up leftovers from earlier waves
#[tokio::test]
async fn test_drain_processes_leftover_items() -> Result<()> {
    let queue = queue();
    queue.enqueue(&sample_record("leftover@example.com")).await?;

    let dispatcher = QueueDispatcher::new(queue.clone(), FakeMailer::new());
    dispatcher.dispatch(vec![sample_record("new@example.com")]).await?;

    assert!(queue.is_empty());
    assert_eq!(
        dispatcher.mailer().processed_recipients(),
        vec!["leftover@example.com", "new@example.com"]
    );

    Ok(())
}

/// Test: an enqueue failure is fatal to the dispatch call
#[tokio::test]
async fn test_enqueue_failure_propagates() {
    let dispatcher = QueueDispatcher::new(FailingQueue, FakeMailer::new());

    let result = dispatcher.dispatch(vec![sample_record("a@example.com")]).await;

    assert!(result.is_err(), "storage failure must reach the caller");
    assert!(dispatcher.mailer().processed().is_empty());
}

/// Test: dispatching an empty wave still drains existing items
#[tokio::test]
async fn test_empty_wave_still_drains() -> Result<()> {
    let queue = queue();
    queue.enqueue(&sample_record("leftover@example.com")).await?;

    let dispatcher = QueueDispatcher::new(queue.clone(), FakeMailer::new());
    dispatcher.dispatch(Vec::new()).await?;

    assert!(queue.is_empty());
    assert_eq!(
        dispatcher.mailer().processed_recipients(),
        vec!["leftover@example.com"]
    );

    Ok(())
}

/// Test: a released item is retried by the next drain
#[tokio::test]
async fn test_next_drain_retries_released_item() -> Result<()> {
    let queue = queue();
    let mailer = FakeMailer::new();
    mailer.set_outcome("a@example.com", FakeOutcome::Suspend);
    let dispatcher = QueueDispatcher::new(queue.clone(), mailer);

    dispatcher.dispatch(vec![sample_record("a@example.com")]).await?;
    assert_eq!(queue.pending_count(), 1);

    // Transport recovered.
    dispatcher
        .mailer()
        .set_outcome("a@example.com", FakeOutcome::Deliver);
    dispatcher.drain().await;

    assert!(queue.is_empty());
    assert_eq!(
        dispatcher.mailer().processed_recipients(),
        vec!["a@example.com", "a@example.com"]
    );

    Ok(())
}
