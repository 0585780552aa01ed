use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub skills: Vec<String>,
    pub rating: String,
    pub gender: String,
    pub availability: Vec<String>,
    pub bio: Option<String>,
    pub team_id: Option<Uuid>,
    pub base_price: Option<i64>,
    pub sold_price: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    pub fn is_sold(&self) -> bool {
        self.team_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub captain: Option<String>,
    pub budget: i64,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AuctionCategory {
    pub id: Uuid,
    pub name: String,
    pub base_price: i64,
    /// Seconds on the clock for players in this tier.
    pub timer: i32,
    pub created_at: DateTime<Utc>,
}

/// Skill tags a player can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Skill {
    Batting,
    Bowling,
    Fielding,
}

/// Slots a player is available in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Weekdays,
    Weekends,
    Evenings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Skill {
    pub fn as_str(self) -> &'static str {
        match self {
            Skill::Batting => "Batting",
            Skill::Bowling => "Bowling",
            Skill::Fielding => "Fielding",
        }
    }
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Weekdays => "Weekdays",
            Availability::Weekends => "Weekends",
            Availability::Evenings => "Evenings",
        }
    }
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

/// Text-array form of a tag set, duplicates dropped, first occurrence wins.
pub fn tag_strings<T: Copy + PartialEq>(tags: &[T], as_str: fn(T) -> &'static str) -> Vec<String> {
    let mut seen: Vec<T> = Vec::with_capacity(tags.len());
    for t in tags {
        if !seen.contains(t) {
            seen.push(*t);
        }
    }
    seen.into_iter().map(|t| as_str(t).to_string()).collect()
}
