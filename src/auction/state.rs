//! The auctioneer's in-memory view: running order, cursor, live bid, clock
//! and a mirror of every team's budget. Pure data, no I/O; the engine wraps
//! it with store writes and the countdown task.

use serde::Serialize;
use uuid::Uuid;

use crate::auction::AuctionError;
use crate::config::settings;
use crate::db::models::{AuctionCategory, Player, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionDefaults {
    /// Clock length for players without a resolvable category.
    pub timer_secs: u32,
    /// Floor bid for players without a base price.
    pub base_price: i64,
}

impl AuctionDefaults {
    pub fn from_settings() -> Self {
        let s = settings();
        Self {
            timer_secs: s.default_timer_secs,
            base_price: s.default_base_price,
        }
    }
}

impl Default for AuctionDefaults {
    fn default() -> Self {
        Self {
            timer_secs: 10,
            base_price: 200_000,
        }
    }
}

/// A team plus the number of players bought so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSlot {
    #[serde(flatten)]
    pub team: Team,
    pub players_count: u32,
}

/// A checked, not yet committed, sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sale {
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub price: i64,
}

/// A checked, not yet committed, release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub refund: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuctionSnapshot {
    pub current_index: usize,
    pub total: usize,
    pub player: Option<Player>,
    pub base_price: i64,
    pub current_bid: i64,
    pub timer: u32,
    pub selected_team_id: Option<Uuid>,
    pub selected_team_name: Option<String>,
    pub pending_player_id: Option<Uuid>,
    pub teams: Vec<TeamSlot>,
}

#[derive(Debug, Clone)]
pub struct AuctionState {
    players: Vec<Player>,
    teams: Vec<TeamSlot>,
    categories: Vec<AuctionCategory>,
    current: Option<usize>,
    base_price: i64,
    current_bid: i64,
    timer: u32,
    selected_team: Option<Uuid>,
    pending_player: Option<Uuid>,
    defaults: AuctionDefaults,
}

impl AuctionState {
    pub fn new(defaults: AuctionDefaults) -> Self {
        Self {
            players: Vec::new(),
            teams: Vec::new(),
            categories: Vec::new(),
            current: None,
            base_price: 0,
            current_bid: 0,
            timer: defaults.timer_secs,
            selected_team: None,
            pending_player: None,
            defaults,
        }
    }

    /// Replace everything with fresh store data. A pending jump target wins
    /// once it shows up; until then it stays pending and the previously shown
    /// player (or the first one) is selected.
    pub fn load(&mut self, players: Vec<Player>, teams: Vec<Team>, categories: Vec<AuctionCategory>) {
        let pending = self.pending_player.take();
        let shown = self.current_player().map(|p| p.id);

        self.teams = teams
            .into_iter()
            .map(|team| {
                let players_count = players
                    .iter()
                    .filter(|p| p.team_id == Some(team.id))
                    .count() as u32;
                TeamSlot { team, players_count }
            })
            .collect();
        self.players = players;
        self.categories = categories;

        self.current = None;
        self.selected_team = None;
        self.base_price = 0;
        self.current_bid = 0;
        self.timer = self.defaults.timer_secs;

        let target = match pending {
            Some(id) => match self.position_of(id) {
                Some(i) => Some(i),
                None => {
                    self.pending_player = Some(id);
                    None
                }
            },
            None => None,
        };
        let start = target
            .or_else(|| shown.and_then(|id| self.position_of(id)))
            .unwrap_or(0);
        self.select_player(start);
    }

    /// Move the cursor. Out-of-range indices change nothing.
    pub fn select_player(&mut self, index: usize) -> bool {
        if index >= self.players.len() {
            return false;
        }
        self.current = Some(index);

        let player = &self.players[index];
        self.base_price = self.floor_for(player);
        match player.team_id {
            Some(team_id) => {
                self.current_bid = player
                    .sold_price
                    .filter(|p| *p > 0)
                    .unwrap_or(self.base_price);
                self.selected_team = Some(team_id);
            }
            None => {
                self.current_bid = self.base_price;
                self.selected_team = None;
            }
        }
        self.reset_timer();
        true
    }

    pub fn next_player(&mut self) -> bool {
        match self.current {
            Some(i) => self.select_player(i + 1),
            None => false,
        }
    }

    pub fn prev_player(&mut self) -> bool {
        match self.current {
            Some(i) if i > 0 => self.select_player(i - 1),
            _ => false,
        }
    }

    /// Select the player with `id`, or remember it until the next `load`.
    pub fn jump_to_player(&mut self, id: Uuid) -> bool {
        match self.position_of(id) {
            Some(i) => {
                self.pending_player = None;
                self.select_player(i)
            }
            None => {
                self.pending_player = Some(id);
                false
            }
        }
    }

    pub fn select_team(&mut self, team_id: Uuid) -> Result<(), AuctionError> {
        if self.current.is_none() {
            return Err(AuctionError::NoPlayer);
        }
        if self.slot(team_id).is_none() {
            return Err(AuctionError::UnknownTeam(team_id));
        }
        self.selected_team = Some(team_id);
        Ok(())
    }

    /// Raise or lower the bid. Anything that would drop below the floor is
    /// ignored; an accepted change puts the full time back on the clock.
    pub fn adjust_bid(&mut self, delta: i64) -> bool {
        if self.current.is_none() {
            return false;
        }
        match self.current_bid.checked_add(delta) {
            Some(bid) if bid >= self.base_price => {
                self.current_bid = bid;
                self.reset_timer();
                true
            }
            _ => false,
        }
    }

    /// One second off the clock. Reaching zero settles nothing.
    pub fn tick(&mut self) -> u32 {
        self.timer = self.timer.saturating_sub(1);
        self.timer
    }

    pub fn reset_timer(&mut self) {
        self.timer = match self.current_player() {
            Some(p) => self.timer_for(p),
            None => self.defaults.timer_secs,
        };
    }

    /// Clock length for `player`: its category's timer, or the default.
    pub fn timer_for(&self, player: &Player) -> u32 {
        if player.rating.is_empty() {
            return self.defaults.timer_secs;
        }
        self.categories
            .iter()
            .find(|c| c.name == player.rating)
            .and_then(|c| u32::try_from(c.timer).ok())
            .filter(|t| *t > 0)
            .unwrap_or(self.defaults.timer_secs)
    }

    fn floor_for(&self, player: &Player) -> i64 {
        player
            .base_price
            .filter(|p| *p > 0)
            .unwrap_or(self.defaults.base_price)
    }

    /// Check a sale of the current player. `team` and `bid` default to the
    /// selected team and the live bid.
    pub fn plan_sale(&self, team: Option<Uuid>, bid: Option<i64>) -> Result<Sale, AuctionError> {
        let player = self.current_player().ok_or(AuctionError::NoPlayer)?;
        if player.is_sold() {
            return Err(AuctionError::AlreadySold(player.name.clone()));
        }
        let team_id = team.or(self.selected_team).ok_or(AuctionError::NoTeam)?;
        let slot = self.slot(team_id).ok_or(AuctionError::UnknownTeam(team_id))?;

        let price = bid.unwrap_or(self.current_bid);
        if price < self.base_price {
            return Err(AuctionError::BelowBasePrice {
                bid: price,
                base: self.base_price,
            });
        }
        if slot.team.budget < price {
            return Err(AuctionError::InsufficientBudget {
                team: slot.team.name.clone(),
                budget: slot.team.budget,
            });
        }

        Ok(Sale {
            player_id: player.id,
            team_id,
            price,
        })
    }

    /// Mirror a committed sale using the rows the store handed back.
    pub fn apply_sale(&mut self, sale: &Sale, player: Player, team: Team) {
        if let Some(i) = self.position_of(sale.player_id) {
            self.players[i] = player;
        }
        if let Some(slot) = self.slot_mut(sale.team_id) {
            slot.team = team;
            slot.players_count += 1;
        }
        if self.current_player().map(|p| p.id) == Some(sale.player_id) {
            self.current_bid = sale.price;
            self.selected_team = Some(sale.team_id);
        }
    }

    pub fn plan_release(&self) -> Result<Release, AuctionError> {
        let player = self.current_player().ok_or(AuctionError::NoPlayer)?;
        let team_id = player
            .team_id
            .ok_or_else(|| AuctionError::NotSold(player.name.clone()))?;
        if self.slot(team_id).is_none() {
            return Err(AuctionError::UnknownTeam(team_id));
        }
        Ok(Release {
            player_id: player.id,
            team_id,
            refund: player.sold_price.unwrap_or(0),
        })
    }

    /// Mirror a committed release and put the player back up at base price.
    pub fn apply_release(&mut self, release: &Release, player: Player, team: Team) {
        if let Some(i) = self.position_of(release.player_id) {
            self.players[i] = player;
        }
        if let Some(slot) = self.slot_mut(release.team_id) {
            slot.team = team;
            slot.players_count = slot.players_count.saturating_sub(1);
        }
        if self.current_player().map(|p| p.id) == Some(release.player_id) {
            if let Some(p) = self.current_player() {
                self.base_price = self.floor_for(p);
            }
            self.current_bid = self.base_price;
            self.selected_team = None;
            self.reset_timer();
        }
    }

    /// Players bought by `team_id`, in running order.
    pub fn team_roster(&self, team_id: Uuid) -> Vec<Player> {
        self.players
            .iter()
            .filter(|p| p.team_id == Some(team_id))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            current_index: self.current_index(),
            total: self.players.len(),
            player: self.current_player().cloned(),
            base_price: self.base_price,
            current_bid: self.current_bid,
            timer: self.timer,
            selected_team_id: self.selected_team,
            selected_team_name: self
                .selected_team
                .and_then(|id| self.slot(id))
                .map(|s| s.team.name.clone()),
            pending_player_id: self.pending_player,
            teams: self.teams.clone(),
        }
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current.and_then(|i| self.players.get(i))
    }

    pub fn current_index(&self) -> usize {
        self.current.unwrap_or(0)
    }

    pub fn current_bid(&self) -> i64 {
        self.current_bid
    }

    pub fn base_price(&self) -> i64 {
        self.base_price
    }

    pub fn timer_remaining(&self) -> u32 {
        self.timer
    }

    pub fn selected_team(&self) -> Option<Uuid> {
        self.selected_team
    }

    pub fn pending_player(&self) -> Option<Uuid> {
        self.pending_player
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &[TeamSlot] {
        &self.teams
    }

    pub fn team(&self, team_id: Uuid) -> Option<&TeamSlot> {
        self.slot(team_id)
    }

    fn position_of(&self, player_id: Uuid) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    fn slot(&self, team_id: Uuid) -> Option<&TeamSlot> {
        self.teams.iter().find(|s| s.team.id == team_id)
    }

    fn slot_mut(&mut self, team_id: Uuid) -> Option<&mut TeamSlot> {
        self.teams.iter_mut().find(|s| s.team.id == team_id)
    }
}
