//! Microsoft.Sql adapters

mod database;
mod elastic_pool;
mod server;

pub use database::Database;
pub use elastic_pool::ElasticPool;
pub use server::Server;

pub(crate) const API_VERSION: &str = "2021-11-01";
