//! Messages exchanged over the auction WebSocket.

use serde::{Deserialize, Serialize};

use crate::auction::AuctionSnapshot;
use crate::db::models::Player;

// ---------- client → server ----------
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Player lookup by name; debounced per connection.
    Search { query: String },
}

// ---------- server → client ----------
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type")]
pub enum ServerMsg {
    State { state: AuctionSnapshot },
    Tick { remaining: u32 },
    /// Operator-facing message for rejected commands and failed writes.
    Notice { message: String },
    SearchResults { query: String, players: Vec<Player> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_search_parses() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"Search","query":"koh"}"#).unwrap();
        let ClientMsg::Search { query } = msg;
        assert_eq!(query, "koh");
    }

    #[test]
    fn tick_is_tagged() {
        let json = serde_json::to_value(ServerMsg::Tick { remaining: 7 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Tick", "remaining": 7}));
    }
}
