//! Live auction workflow: state machine, store seam, countdown and the
//! engine that ties them together.

pub mod countdown;
pub mod engine;
pub mod state;
pub mod store;

use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

pub use engine::{AuctionEngine, Outcome};
pub use state::{AuctionDefaults, AuctionSnapshot, AuctionState, Release, Sale, TeamSlot};
pub use store::{AuctionStore, PgStore};

#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("no player is selected")]
    NoPlayer,

    #[error("select a team first")]
    NoTeam,

    #[error("team {0} is not part of this auction")]
    UnknownTeam(Uuid),

    #[error("bid {bid} is below the base price {base}")]
    BelowBasePrice { bid: i64, base: i64 },

    #[error("Insufficient budget! {team} only has {budget}")]
    InsufficientBudget { team: String, budget: i64 },

    #[error("{0} is already sold; release the player first")]
    AlreadySold(String),

    #[error("{0} has not been sold")]
    NotSold(String),
}

impl From<AuctionError> for AppError {
    fn from(err: AuctionError) -> Self {
        AppError::Precondition(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_failures_become_preconditions() {
        let err = AppError::from(AuctionError::InsufficientBudget {
            team: "Strikers".into(),
            budget: 10,
        });
        match err {
            AppError::Precondition(msg) => assert_eq!(msg, "Insufficient budget! Strikers only has 10"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
