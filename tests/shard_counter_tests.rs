/// Sharded counter tests
///
/// Concurrent increments must never lose updates, and aggregation must fold
/// shard values into exact canonical totals.
/// Run with: cargo test --test shard_counter_tests
use std::sync::Arc;

use spotlight::{Config, FixedClock, Metric, Spotlight};
use tokio::sync::Barrier;

fn fixture() -> (Arc<Spotlight>, FixedClock) {
    let clock = FixedClock::at("2020-02-24T18:00:00Z".parse().unwrap());
    let service = Arc::new(Spotlight::new(&Config::default(), Arc::new(clock.clone())));
    (service, clock)
}

#[tokio::test]
async fn concurrent_increments_aggregate_exactly() {
    let (service, _clock) = fixture();
    service.on_daily_rollover().await;

    let num_tasks = 20;
    let per_task = 50;
    let barrier = Arc::new(Barrier::new(num_tasks));

    let mut handles = vec![];
    for _ in 0..num_tasks {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            for _ in 0..per_task {
                let outcome = service.increment_metric(Metric::Heart).await;
                assert!(outcome.accepted);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    service.on_aggregate_tick().await;

    let profile = service.current_profile().await.unwrap();
    assert_eq!(profile.totals.hearts, (num_tasks * per_task) as u64);
    assert_eq!(profile.totals.views, 0);
    assert_eq!(profile.totals.crosses, 0);
}

#[tokio::test]
async fn metrics_are_tracked_independently() {
    let (service, _clock) = fixture();
    service.on_daily_rollover().await;

    for _ in 0..3 {
        service.increment_metric(Metric::View).await;
    }
    for _ in 0..2 {
        service.increment_metric(Metric::Heart).await;
    }
    service.increment_metric(Metric::Cross).await;

    service.on_aggregate_tick().await;

    let profile = service.current_profile().await.unwrap();
    assert_eq!(profile.totals.views, 3);
    assert_eq!(profile.totals.hearts, 2);
    assert_eq!(profile.totals.crosses, 1);
}

#[tokio::test]
async fn ping_before_rollover_is_dropped_silently() {
    let (service, _clock) = fixture();

    // No rollover has run; the day is unprovisioned.
    let outcome = service.increment_metric(Metric::View).await;
    assert!(!outcome.accepted);

    // Once the day exists, pings land again.
    service.on_daily_rollover().await;
    let outcome = service.increment_metric(Metric::View).await;
    assert!(outcome.accepted);
}

#[tokio::test]
async fn aggregation_is_idempotent() {
    let (service, _clock) = fixture();
    service.on_daily_rollover().await;

    for _ in 0..7 {
        service.increment_metric(Metric::Heart).await;
    }

    service.on_aggregate_tick().await;
    let first = service.current_profile().await.unwrap().totals;

    // No intervening increments: a re-run writes the same totals.
    service.on_aggregate_tick().await;
    let second = service.current_profile().await.unwrap().totals;

    assert_eq!(first, second);
    assert_eq!(second.hearts, 7);
}

#[tokio::test]
async fn aggregation_overwrites_rather_than_accumulates() {
    let (service, _clock) = fixture();
    service.on_daily_rollover().await;

    for _ in 0..4 {
        service.increment_metric(Metric::View).await;
    }
    service.on_aggregate_tick().await;

    for _ in 0..4 {
        service.increment_metric(Metric::View).await;
    }
    service.on_aggregate_tick().await;

    // 8 total increments, not 4 + (4+8) from re-adding prior totals.
    let profile = service.current_profile().await.unwrap();
    assert_eq!(profile.totals.views, 8);
}
