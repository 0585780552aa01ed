pub mod auction;
pub mod routes;
