//! Azure resource discovery
//!
//! Adapters that read Azure Resource Manager resources and map them onto
//! generic graph [`sdp::Item`]s, each carrying linked item queries that
//! describe what the resource depends on and what depends on it.
//!
//! # Module Structure
//!
//! - [`sdp`] - Item, query and link model
//! - [`scope`] - Subscription and resource group scopes
//! - [`azure`] - ARM client, credentials and resource ID parsing
//! - [`cache`] - Query result cache
//! - [`adapters`] - One adapter per Azure resource type
//! - [`engine`] - Query routing and wildcard fan-out
//! - [`config`] - Persistent configuration

pub mod adapters;
pub mod azure;
pub mod cache;
pub mod config;
pub mod engine;
pub mod scope;
pub mod sdp;

/// Version injected at compile time via AZURE_DISCOVERY_VERSION env var (set
/// by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZURE_DISCOVERY_VERSION") {
    Some(v) => v,
    None => "dev",
};
