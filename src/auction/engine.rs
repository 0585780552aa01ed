//! One live auction session shared by every HTTP handler, WebSocket and the
//! countdown task.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::auction::{
    countdown::Countdown,
    state::{AuctionDefaults, AuctionSnapshot, AuctionState},
    store::AuctionStore,
    AuctionError,
};
use crate::db::models::Player;
use crate::error::AppError;
use crate::metrics::AUCTION;
use crate::protocol::ServerMsg;

const TICK: Duration = Duration::from_secs(1);

/// Result of a command that may be silently ignored (out-of-range cursor,
/// bid below the floor).
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub accepted: bool,
    pub state: AuctionSnapshot,
}

pub struct AuctionEngine {
    state: Mutex<AuctionState>,
    store: Arc<dyn AuctionStore>,
    feed: broadcast::Sender<ServerMsg>,
    countdown: Countdown,
    me: Weak<AuctionEngine>,
}

impl AuctionEngine {
    pub fn new(store: Arc<dyn AuctionStore>, defaults: AuctionDefaults) -> Arc<Self> {
        let (feed, _) = broadcast::channel(128);
        Arc::new_cyclic(|me| Self {
            state: Mutex::new(AuctionState::new(defaults)),
            store,
            feed,
            countdown: Countdown::new(),
            me: me.clone(),
        })
    }

    /// Live feed of state changes, clock ticks and operator notices.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.feed.subscribe()
    }

    pub async fn snapshot(&self) -> AuctionSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Re-read players, teams and categories from the store. This is also the
    /// way to reconcile after a failed write.
    pub async fn reload(&self) -> Result<AuctionSnapshot, AppError> {
        let loaded = tokio::try_join!(
            self.store.players(),
            self.store.teams(),
            self.store.categories()
        );
        let (players, teams, categories) = match loaded {
            Ok(rows) => rows,
            Err(e) => return Err(self.remote_failure("loading auction data", e)),
        };

        let mut st = self.state.lock().await;
        st.load(players, teams, categories);
        log::info!(
            "auction loaded: {} players, {} teams",
            st.players().len(),
            st.teams().len()
        );
        Ok(self.publish_and_rearm(&st))
    }

    pub async fn select_player(&self, index: i64) -> Outcome {
        let mut st = self.state.lock().await;
        let accepted = usize::try_from(index)
            .map(|i| st.select_player(i))
            .unwrap_or(false);
        self.outcome(&st, accepted)
    }

    pub async fn next_player(&self) -> Outcome {
        let mut st = self.state.lock().await;
        let accepted = st.next_player();
        self.outcome(&st, accepted)
    }

    pub async fn prev_player(&self) -> Outcome {
        let mut st = self.state.lock().await;
        let accepted = st.prev_player();
        self.outcome(&st, accepted)
    }

    /// Deep-link selection. An unknown id is kept and resolved on reload.
    pub async fn jump_to_player(&self, player_id: Uuid) -> Outcome {
        let mut st = self.state.lock().await;
        let accepted = st.jump_to_player(player_id);
        self.outcome(&st, accepted)
    }

    pub async fn select_team(&self, team_id: Uuid) -> Result<AuctionSnapshot, AppError> {
        let mut st = self.state.lock().await;
        if let Err(e) = st.select_team(team_id) {
            return Err(self.rejected(e));
        }
        let snap = st.snapshot();
        self.publish(ServerMsg::State {
            state: snap.clone(),
        });
        Ok(snap)
    }

    pub async fn adjust_bid(&self, delta: i64) -> Outcome {
        let mut st = self.state.lock().await;
        let accepted = st.adjust_bid(delta);
        self.outcome(&st, accepted)
    }

    /// Sell the current player. `team_id`/`bid` override the selected team
    /// and the live bid. Local state only changes once the store has
    /// committed.
    pub async fn settle(
        &self,
        team_id: Option<Uuid>,
        bid: Option<i64>,
    ) -> Result<AuctionSnapshot, AppError> {
        let mut st = self.state.lock().await;
        let sale = st.plan_sale(team_id, bid).map_err(|e| self.rejected(e))?;

        let (player, team) = match self.store.commit_sale(&sale).await {
            Ok(rows) => rows,
            Err(e) => return Err(self.remote_failure("sale", e)),
        };
        log::info!(
            "sold {} to {} for {} (budget left {})",
            player.name,
            team.name,
            sale.price,
            team.budget
        );
        st.apply_sale(&sale, player, team);
        AUCTION.settlements.inc();

        let snap = st.snapshot();
        self.publish(ServerMsg::State {
            state: snap.clone(),
        });
        Ok(snap)
    }

    /// Undo the current player's sale and refund the team.
    pub async fn release(&self) -> Result<AuctionSnapshot, AppError> {
        let mut st = self.state.lock().await;
        let release = st.plan_release().map_err(|e| self.rejected(e))?;

        let (player, team) = match self.store.commit_release(&release).await {
            Ok(rows) => rows,
            Err(e) => return Err(self.remote_failure("release", e)),
        };
        log::info!(
            "released {} from {} (refund {}, budget now {})",
            player.name,
            team.name,
            release.refund,
            team.budget
        );
        st.apply_release(&release, player, team);
        AUCTION.releases.inc();

        Ok(self.publish_and_rearm(&st))
    }

    pub async fn team_roster(&self, team_id: Uuid) -> Vec<Player> {
        self.state.lock().await.team_roster(team_id)
    }

    /// One second off the clock; driven by the countdown task.
    pub async fn tick(&self) -> u32 {
        let remaining = self.state.lock().await.tick();
        self.publish(ServerMsg::Tick { remaining });
        remaining
    }

    pub fn stop_countdown(&self) {
        self.countdown.cancel();
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_armed()
    }

    fn outcome(&self, st: &AuctionState, accepted: bool) -> Outcome {
        let state = if accepted {
            self.publish_and_rearm(st)
        } else {
            st.snapshot()
        };
        Outcome { accepted, state }
    }

    /// Broadcast the new state and restart the clock; every path that resets
    /// the timer comes through here.
    fn publish_and_rearm(&self, st: &AuctionState) -> AuctionSnapshot {
        let snap = st.snapshot();
        self.publish(ServerMsg::State {
            state: snap.clone(),
        });
        self.restart_countdown();
        snap
    }

    fn restart_countdown(&self) {
        let me = self.me.clone();
        self.countdown.arm(TICK, move || {
            let me = me.clone();
            async move {
                // the clock parks at zero until something re-arms it
                match me.upgrade() {
                    Some(engine) => engine.tick().await > 0,
                    None => false,
                }
            }
        });
    }

    fn publish(&self, msg: ServerMsg) {
        // no subscribers is fine
        let _ = self.feed.send(msg);
    }

    fn notify(&self, message: String) {
        self.publish(ServerMsg::Notice { message });
    }

    fn rejected(&self, err: AuctionError) -> AppError {
        log::warn!("auction command rejected: {err}");
        let err = AppError::from(err);
        self.notify(err.to_string());
        err
    }

    fn remote_failure(&self, what: &str, err: AppError) -> AppError {
        log::error!("auction {what} failed: {err:?}");
        AUCTION.store_failures.inc();
        if err.is_remote() {
            self.notify(format!("Failed to complete {what}. Reload and try again."));
        } else {
            self.notify(err.to_string());
        }
        err
    }
}
