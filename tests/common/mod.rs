#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::Utc;
use league_auction::{
    auction::{AuctionStore, Release, Sale},
    db::models::{AuctionCategory, Player, Team},
    error::{AppError, AppResult},
};
use sqlx::PgPool;
use uuid::Uuid;

pub fn player(name: &str, rating: &str, base_price: Option<i64>) -> Player {
    let now = Utc::now();
    Player {
        id: Uuid::new_v4(),
        name: name.into(),
        email: format!("{}@league.test", name.to_lowercase().replace(' ', ".")),
        avatar_url: None,
        skills: vec!["Batting".into()],
        rating: rating.into(),
        gender: "Male".into(),
        availability: vec!["Weekends".into()],
        bio: None,
        team_id: None,
        base_price,
        sold_price: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn team(name: &str, budget: i64) -> Team {
    Team {
        id: Uuid::new_v4(),
        name: name.into(),
        captain: None,
        budget,
        logo_url: None,
        created_at: Utc::now(),
    }
}

pub fn category(name: &str, base_price: i64, timer: i32) -> AuctionCategory {
    AuctionCategory {
        id: Uuid::new_v4(),
        name: name.into(),
        base_price,
        timer,
        created_at: Utc::now(),
    }
}

/// In-memory record store that counts writes and can be told to fail them.
#[derive(Default)]
pub struct FakeStore {
    pub players: Mutex<Vec<Player>>,
    pub teams: Mutex<Vec<Team>>,
    pub categories: Mutex<Vec<AuctionCategory>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl FakeStore {
    pub fn new(players: Vec<Player>, teams: Vec<Team>, categories: Vec<AuctionCategory>) -> Self {
        Self {
            players: Mutex::new(players),
            teams: Mutex::new(teams),
            categories: Mutex::new(categories),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn budget_of(&self, team_id: Uuid) -> i64 {
        self.teams
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.budget)
            .unwrap()
    }

    fn write<F>(&self, player_id: Uuid, team_id: Uuid, f: F) -> AppResult<(Player, Team)>
    where
        F: FnOnce(&mut Player, &mut Team),
    {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Db(sqlx::Error::PoolTimedOut));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut players = self.players.lock().unwrap();
        let mut teams = self.teams.lock().unwrap();
        let p = players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(AppError::NotFound("player"))?;
        let t = teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(AppError::NotFound("team"))?;
        f(p, t);
        Ok((p.clone(), t.clone()))
    }
}

#[async_trait]
impl AuctionStore for FakeStore {
    async fn players(&self) -> AppResult<Vec<Player>> {
        Ok(self.players.lock().unwrap().clone())
    }

    async fn teams(&self) -> AppResult<Vec<Team>> {
        Ok(self.teams.lock().unwrap().clone())
    }

    async fn categories(&self) -> AppResult<Vec<AuctionCategory>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn commit_sale(&self, sale: &Sale) -> AppResult<(Player, Team)> {
        self.write(sale.player_id, sale.team_id, |p, t| {
            p.team_id = Some(sale.team_id);
            p.sold_price = Some(sale.price);
            t.budget -= sale.price;
        })
    }

    async fn commit_release(&self, release: &Release) -> AppResult<(Player, Team)> {
        self.write(release.player_id, release.team_id, |p, t| {
            p.team_id = None;
            p.sold_price = None;
            t.budget += release.refund;
        })
    }
}

/// Connect to the test database and bring the schema up to date. Returns
/// `None` (and the calling test passes vacuously) when `DATABASE_URL` is unset.
pub async fn pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };
    let pool = PgPool::connect(&database_url)
        .await
        .expect("DB connection failed");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");
    Some(pool)
}

/// Short unique tag so parallel tests never see each other's rows.
pub fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}
