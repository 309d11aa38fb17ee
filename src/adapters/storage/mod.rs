//! Microsoft.Storage adapters

mod account;
mod services;

pub use account::Account;
pub use services::{BlobContainer, FileShare, Queue, Table};

pub(crate) const API_VERSION: &str = "2023-05-01";
