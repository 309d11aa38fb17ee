//! Microsoft.DocumentDB (Cosmos DB) adapters

mod database_account;

pub use database_account::DatabaseAccount;
