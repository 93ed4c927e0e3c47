/// Concurrent bidding tests
///
/// Two bids racing the same stale top must never both be accepted; the loser
/// observes the winner's commit and is re-validated or rejected.
/// Run with: cargo test --test concurrent_bid_tests
use std::sync::Arc;

use futures::future::join_all;
use spotlight::{Clock, Config, FixedClock, Spotlight};
use tokio::sync::Barrier;

fn fixture(config: Config) -> (Arc<Spotlight>, FixedClock) {
    let clock = FixedClock::at("2020-02-24T18:00:00Z".parse().unwrap());
    let service = Arc::new(Spotlight::new(&config, Arc::new(clock.clone())));
    (service, clock)
}

#[tokio::test]
async fn racing_bids_never_both_pass_a_stale_check() {
    // Run the race many times; every interleaving must satisfy the invariant.
    for _ in 0..50 {
        let (service, clock) = fixture(Config::default());
        service.on_daily_rollover().await;
        service.on_auction_open().await;
        for user in ["ada", "bob", "eve"] {
            service.on_user_created(user).await;
        }
        let day = clock.today();

        assert!(service.place_bid("eve", 40).await.accepted);

        let barrier = Arc::new(Barrier::new(2));
        let mut handles = vec![];
        for (user, amount) in [("ada", 50u64), ("bob", 60u64)] {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                (amount, service.place_bid(user, amount).await)
            }));
        }

        let mut accepted_50 = false;
        let mut accepted_60 = false;
        for handle in handles {
            let (amount, outcome) = handle.await.unwrap();
            match amount {
                50 => accepted_50 = outcome.accepted,
                60 => accepted_60 = outcome.accepted,
                _ => unreachable!(),
            }
        }

        // 60 beats whatever it observed (40 or 50), so it is always accepted;
        // 50 is accepted only if it was applied before 60.
        assert!(accepted_60);

        let auction = service.auction(day).await.unwrap();
        assert_eq!(auction.top_bid, 60);
        assert_eq!(auction.bid_count as usize, auction.bids.len());
        assert_eq!(
            auction.bid_count,
            1 + accepted_50 as u64 + accepted_60 as u64
        );

        let amounts: Vec<u64> = auction.bids.iter().map(|b| b.amount).collect();
        assert!(
            amounts.windows(2).all(|w| w[0] < w[1]),
            "bid log not strictly increasing: {amounts:?}"
        );
    }
}

#[tokio::test]
async fn many_concurrent_bidders_keep_the_log_monotonic() {
    // A generous retry budget so no bidder gives up under contention.
    let (service, clock) = fixture(Config::new().max_bid_retries(50));
    service.on_daily_rollover().await;
    service.on_auction_open().await;
    let day = clock.today();

    let num_bidders = 16;
    for i in 0..num_bidders {
        service.on_user_created(&format!("user-{i}")).await;
    }

    let barrier = Arc::new(Barrier::new(num_bidders));
    let mut handles = vec![];
    for i in 0..num_bidders {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let amount = (i as u64 + 1) * 10;
            service.place_bid(&format!("user-{i}"), amount).await
        }));
    }

    let outcomes = join_all(handles).await;
    let accepted = outcomes
        .into_iter()
        .filter(|o| o.as_ref().unwrap().accepted)
        .count();

    let auction = service.auction(day).await.unwrap();
    assert_eq!(auction.bid_count as usize, accepted);
    assert_eq!(auction.bid_count as usize, auction.bids.len());

    let amounts: Vec<u64> = auction.bids.iter().map(|b| b.amount).collect();
    assert!(
        amounts.windows(2).all(|w| w[0] < w[1]),
        "bid log not strictly increasing: {amounts:?}"
    );

    // The highest amount always survives every race it loses.
    assert_eq!(auction.top_bid, num_bidders as u64 * 10);
}

#[tokio::test]
async fn loser_observes_the_new_top_after_the_race() {
    let (service, clock) = fixture(Config::default());
    service.on_daily_rollover().await;
    service.on_auction_open().await;
    for user in ["ada", "bob"] {
        service.on_user_created(user).await;
    }

    assert!(service.place_bid("ada", 60).await.accepted);

    // A later bid at the committed top is rejected against 60, not 0.
    let outcome = service.place_bid("bob", 60).await;
    assert!(!outcome.accepted);

    let auction = service.auction(clock.today()).await.unwrap();
    assert_eq!(auction.top_bid, 60);
    assert_eq!(auction.bid_count, 1);
}
