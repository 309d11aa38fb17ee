//! Azure Resource Manager interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Token sources (service principal, Azure CLI) and token caching
//! - [`client`] - ARM client for single-resource and paginated list requests
//! - [`defaults`] - Default subscription discovery
//! - [`http`] - HTTP utilities and ARM error handling
//! - [`resource_groups`] - Resource group discovery
//! - [`resource_id`] - Parsing of ARM resource IDs
//!
//! # Example
//!
//! ```ignore
//! use azure_discovery::azure::{auth, client::ArmClient, http::ArmHttpClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let source = auth::default_token_source(
//!         auth::DEFAULT_AUTHORITY_HOST,
//!         client::DEFAULT_MANAGEMENT_ENDPOINT,
//!         ArmHttpClient::new()?,
//!     );
//!     let client = ArmClient::new(source, client::DEFAULT_MANAGEMENT_ENDPOINT)?;
//!     let disks = client
//!         .list_resources("/subscriptions/x/providers/Microsoft.Compute/disks", "2023-10-02", None)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod defaults;
pub mod http;
pub mod resource_groups;
pub mod resource_id;

pub use client::ArmClient;
pub use http::{format_arm_error, ArmError};
