//! Microsoft.DBforPostgreSQL adapters

mod database;
mod flexible_server;

pub use database::Database;
pub use flexible_server::FlexibleServer;

pub(crate) const API_VERSION: &str = "2022-12-01";
