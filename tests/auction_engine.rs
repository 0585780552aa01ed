mod common;

use std::{sync::Arc, time::Duration};

use common::{category, player, team, FakeStore};
use league_auction::{
    auction::{AuctionDefaults, AuctionEngine},
    error::AppError,
    protocol::ServerMsg,
};
use tokio::sync::broadcast::Receiver;

fn notices(rx: &mut Receiver<ServerMsg>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        if let ServerMsg::Notice { message } = msg {
            out.push(message);
        }
    }
    out
}

async fn engine_with(store: Arc<FakeStore>) -> Arc<AuctionEngine> {
    let engine = AuctionEngine::new(store, AuctionDefaults::default());
    engine.reload().await.unwrap();
    engine
}

fn league() -> (Arc<FakeStore>, uuid::Uuid) {
    let strikers = team("Strikers", 1_000_000);
    let id = strikers.id;
    let store = FakeStore::new(
        vec![player("Hardik", "", None), player("Axar", "", None)],
        vec![strikers, team("Titans", 2_000_000)],
        vec![],
    );
    (Arc::new(store), id)
}

#[tokio::test]
async fn over_budget_settle_writes_nothing() {
    let (store, strikers) = league();
    let engine = engine_with(store.clone()).await;
    let mut feed = engine.subscribe();

    engine.select_team(strikers).await.unwrap();
    assert!(engine.adjust_bid(1_000_000).await.accepted);

    let err = engine.settle(None, None).await.unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)));
    assert_eq!(store.writes(), 0);
    assert_eq!(store.budget_of(strikers), 1_000_000);

    let snap = engine.snapshot().await;
    let slot = snap.teams.iter().find(|s| s.team.id == strikers).unwrap();
    assert_eq!(slot.team.budget, 1_000_000);
    assert!(notices(&mut feed)
        .iter()
        .any(|m| m.starts_with("Insufficient budget!")));
}

#[tokio::test]
async fn settle_commits_then_mirrors() {
    let (store, strikers) = league();
    let engine = engine_with(store.clone()).await;

    let snap = engine.settle(Some(strikers), Some(300_000)).await.unwrap();
    assert_eq!(store.writes(), 1);
    assert_eq!(store.budget_of(strikers), 700_000);

    let slot = snap.teams.iter().find(|s| s.team.id == strikers).unwrap();
    assert_eq!(slot.team.budget, 700_000);
    assert_eq!(slot.players_count, 1);
    let sold = snap.player.unwrap();
    assert_eq!(sold.team_id, Some(strikers));
    assert_eq!(sold.sold_price, Some(300_000));
    assert_eq!(engine.team_roster(strikers).await.len(), 1);

    // a second sale of the same player is refused locally
    assert!(engine.settle(Some(strikers), Some(300_000)).await.is_err());
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn release_restores_budget_and_count() {
    let (store, strikers) = league();
    let engine = engine_with(store.clone()).await;
    engine.settle(Some(strikers), Some(300_000)).await.unwrap();

    let snap = engine.release().await.unwrap();
    assert_eq!(store.budget_of(strikers), 1_000_000);
    let slot = snap.teams.iter().find(|s| s.team.id == strikers).unwrap();
    assert_eq!(slot.team.budget, 1_000_000);
    assert_eq!(slot.players_count, 0);
    assert_eq!(snap.current_bid, 200_000);
    assert_eq!(snap.selected_team_id, None);
    assert!(snap.player.unwrap().team_id.is_none());
}

#[tokio::test]
async fn failed_write_leaves_state_alone() {
    let (store, strikers) = league();
    let engine = engine_with(store.clone()).await;
    let mut feed = engine.subscribe();
    store.fail_writes(true);

    let err = engine.settle(Some(strikers), Some(300_000)).await.unwrap_err();
    assert!(matches!(err, AppError::Db(_)));

    let snap = engine.snapshot().await;
    assert!(snap.player.unwrap().team_id.is_none());
    let slot = snap.teams.iter().find(|s| s.team.id == strikers).unwrap();
    assert_eq!(slot.team.budget, 1_000_000);
    assert_eq!(slot.players_count, 0);
    assert!(notices(&mut feed).iter().any(|m| m.contains("Reload")));
}

#[tokio::test]
async fn rejected_bid_is_reported_not_raised() {
    let (store, _) = league();
    let engine = engine_with(store).await;

    let out = engine.adjust_bid(-1).await;
    assert!(!out.accepted);
    assert_eq!(out.state.current_bid, 200_000);

    let out = engine.select_player(-1).await;
    assert!(!out.accepted);
    let out = engine.select_player(1).await;
    assert!(out.accepted);
    assert_eq!(out.state.current_index, 1);
}

#[tokio::test]
async fn state_changes_reach_subscribers() {
    let (store, _) = league();
    let engine = engine_with(store).await;
    let mut feed = engine.subscribe();

    engine.next_player().await;
    match feed.try_recv().unwrap() {
        ServerMsg::State { state } => assert_eq!(state.current_index, 1),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_once_per_second() {
    let store = Arc::new(FakeStore::new(
        vec![player("Virat", "A+", Some(500_000))],
        vec![],
        vec![category("A+", 500_000, 15)],
    ));
    let engine = engine_with(store).await;
    assert_eq!(engine.snapshot().await.timer, 15);

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(engine.snapshot().await.timer, 12);
}

#[tokio::test(start_paused = true)]
async fn rearming_replaces_the_old_ticker() {
    let store = Arc::new(FakeStore::new(
        vec![player("Virat", "A+", Some(500_000))],
        vec![],
        vec![category("A+", 500_000, 15)],
    ));
    let engine = engine_with(store).await;

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(engine.snapshot().await.timer, 13);

    assert!(engine.adjust_bid(50_000).await.accepted);
    assert_eq!(engine.snapshot().await.timer, 15);

    // only the new ticker runs: 3.5 s and 4.5 s
    tokio::time::sleep(Duration::from_millis(2_200)).await;
    assert_eq!(engine.snapshot().await.timer, 13);
}

#[tokio::test(start_paused = true)]
async fn clock_parks_at_zero() {
    let (store, _) = league();
    let engine = engine_with(store).await;
    assert!(engine.countdown_running());

    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(engine.snapshot().await.timer, 0);
    assert!(!engine.countdown_running());
    // nothing was sold by the clock running out
    assert!(engine.snapshot().await.player.unwrap().team_id.is_none());
}

#[tokio::test(start_paused = true)]
async fn stop_countdown_freezes_the_clock() {
    let (store, _) = league();
    let engine = engine_with(store).await;

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    engine.stop_countdown();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(engine.snapshot().await.timer, 9);
}
