//! Azure resource adapters
//!
//! One adapter per Azure resource type. Each fetches resources through the
//! [`ArmClient`](crate::azure::ArmClient), maps them onto [`Item`]s and
//! declares the linked items they depend on or affect.
//!
//! # Architecture
//!
//! - [`definition`] - Static description of a resource type ([`ResourceDef`])
//! - [`arm`] - The generic [`ArmAdapter`] and the [`ResourceMapper`] trait
//! - [`link`] - Helpers that turn ARM references into linked item queries
//! - one module per Azure service with a mapper per resource type
//!
//! Top-level resources support Get (by name) and List (per scope). Child
//! resources such as SQL databases support Get (`server|database`) and
//! Search (by parent, `server`).

pub mod arm;
pub mod definition;
pub mod link;

pub mod authorization;
pub mod compute;
pub mod documentdb;
pub mod keyvault;
pub mod managedidentity;
pub mod network;
pub mod postgresql;
pub mod sql;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use arm::{
    null_as_default, private_endpoint_links, to_item, ArmAdapter, ArmResource, NetworkRuleSet,
    PrivateEndpointConnection, ResourceMapper, SubResource,
};
pub use definition::{Category, PathSegment, ResourceDef};
pub use link::{LinkContext, Links};

use crate::azure::ArmClient;
use crate::cache::Cache;
use crate::scope::{Scope, ScopeKind};
use crate::sdp::{Item, ItemType, QueryError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Description of what an adapter can do
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterMetadata {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub descriptive_name: String,
    pub category: Category,
    pub scope_kind: ScopeKind,
    pub get: bool,
    pub list: bool,
    pub search: bool,
    pub get_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_description: Option<String>,
    pub potential_links: Vec<ItemType>,
    pub iam_permissions: Vec<String>,
}

impl AdapterMetadata {
    pub fn from_definition(def: &ResourceDef) -> Self {
        let child = def.is_child();
        Self {
            item_type: def.item_type,
            descriptive_name: def.descriptive_name.to_string(),
            category: def.category,
            scope_kind: def.scope_kind,
            get: true,
            list: !child,
            search: child,
            get_description: format!(
                "Get a {} by {}",
                def.descriptive_name,
                def.get_format()
            ),
            search_description: def
                .search_format()
                .map(|f| format!("Search {}s by {}", def.descriptive_name, f)),
            potential_links: def.potential_links.to_vec(),
            iam_permissions: def.iam_permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Get/List/Search against one resource type
#[async_trait]
pub trait Adapter: Send + Sync {
    fn item_type(&self) -> ItemType;

    fn metadata(&self) -> AdapterMetadata;

    /// Scopes this adapter serves
    fn scopes(&self) -> Vec<String>;

    async fn get(&self, scope: &str, query: &str, ignore_cache: bool) -> Result<Item, QueryError>;

    async fn list(&self, scope: &str, ignore_cache: bool) -> Result<Vec<Item>, QueryError>;

    async fn search(
        &self,
        scope: &str,
        query: &str,
        ignore_cache: bool,
    ) -> Result<Vec<Item>, QueryError>;
}

/// Shared dependencies of every adapter
#[derive(Clone)]
pub struct AdapterContext {
    pub client: ArmClient,
    pub cache: Arc<dyn Cache>,
    pub cache_ttl: Duration,
    pub scopes: Vec<Scope>,
}

impl AdapterContext {
    fn adapter<M: ResourceMapper>(&self, mapper: M) -> Arc<dyn Adapter> {
        Arc::new(ArmAdapter::new(
            mapper,
            self.client.clone(),
            self.cache.clone(),
            self.cache_ttl,
            &self.scopes,
        ))
    }
}

/// Every adapter this crate provides
pub fn all_adapters(ctx: &AdapterContext) -> Vec<Arc<dyn Adapter>> {
    vec![
        // Compute
        ctx.adapter(compute::VirtualMachine),
        ctx.adapter(compute::Disk),
        ctx.adapter(compute::AvailabilitySet),
        ctx.adapter(compute::VirtualMachineScaleSet),
        ctx.adapter(compute::Snapshot),
        ctx.adapter(compute::DiskEncryptionSet),
        ctx.adapter(compute::VirtualMachineExtension),
        // Network
        ctx.adapter(network::VirtualNetwork),
        ctx.adapter(network::Subnet),
        ctx.adapter(network::NetworkInterface),
        ctx.adapter(network::NetworkSecurityGroup),
        ctx.adapter(network::PublicIpAddress),
        ctx.adapter(network::LoadBalancer),
        ctx.adapter(network::RouteTable),
        ctx.adapter(network::NatGateway),
        ctx.adapter(network::PrivateEndpoint),
        ctx.adapter(network::DnsZone),
        // Storage
        ctx.adapter(storage::Account),
        ctx.adapter(storage::BlobContainer),
        ctx.adapter(storage::FileShare),
        ctx.adapter(storage::Queue),
        ctx.adapter(storage::Table),
        // Authorization
        ctx.adapter(authorization::RoleAssignment),
        ctx.adapter(authorization::RoleDefinition),
        // Managed identity
        ctx.adapter(managedidentity::UserAssignedIdentity),
        // Key Vault
        ctx.adapter(keyvault::Vault),
        ctx.adapter(keyvault::Secret),
        // SQL
        ctx.adapter(sql::Server),
        ctx.adapter(sql::Database),
        ctx.adapter(sql::ElasticPool),
        // PostgreSQL
        ctx.adapter(postgresql::FlexibleServer),
        ctx.adapter(postgresql::Database),
        // Cosmos DB
        ctx.adapter(documentdb::DatabaseAccount),
    ]
}
