pub mod auction;
pub mod auth;
pub mod categories;
pub mod health;
pub mod media;
pub mod players;
pub mod routes;
pub mod teams;
