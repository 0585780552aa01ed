//! League live-auction server: player directory, team and category registry,
//! and the auctioneer's bidding engine behind HTTP and a WebSocket feed.

pub mod auction;
pub mod config;
pub mod db;
pub mod debounce;
pub mod error;
pub mod http;
pub mod identity;
pub mod metrics;
pub mod protocol;
pub mod storage;
pub mod ws;
