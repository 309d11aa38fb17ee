use super::API_VERSION;
use crate::adapters::keyvault::link_vault_object;
use crate::adapters::{
    private_endpoint_links, ArmResource, Category, LinkContext, Links, PathSegment,
    PrivateEndpointConnection, ResourceDef, ResourceMapper,
};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, Health, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::PostgreSqlFlexibleServer,
    descriptive_name: "PostgreSQL Flexible Server",
    category: Category::Database,
    provider: "Microsoft.DBforPostgreSQL",
    path: &[PathSegment::named("flexibleServers")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::PostgreSqlDatabase,
        ItemType::PostgreSqlFlexibleServer,
        ItemType::NetworkSubnet,
        ItemType::NetworkPrivateDnsZone,
        ItemType::NetworkPrivateEndpoint,
        ItemType::KeyVaultKey,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.DBforPostgreSQL/flexibleServers/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleServerProperties {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    fully_qualified_domain_name: Option<String>,
    #[serde(default)]
    network: Option<Network>,
    #[serde(default)]
    data_encryption: Option<DataEncryption>,
    /// Primary of a read replica
    #[serde(default)]
    source_server_resource_id: Option<String>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    private_endpoint_connections: Vec<PrivateEndpointConnection>,
}

/// VNet integration; both IDs are absent for public access servers
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Network {
    #[serde(default)]
    delegated_subnet_resource_id: Option<String>,
    #[serde(default)]
    private_dns_zone_arm_resource_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataEncryption {
    #[serde(default, rename = "primaryKeyURI")]
    primary_key_uri: Option<String>,
    #[serde(default)]
    primary_user_assigned_identity_id: Option<String>,
}

pub struct FlexibleServer;

impl ResourceMapper for FlexibleServer {
    type Properties = FlexibleServerProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.children(ItemType::PostgreSqlDatabase, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        links.dns(props.fully_qualified_domain_name.as_deref(), BlastPropagation::BOTH);

        if let Some(network) = &props.network {
            links
                .by_id(
                    ItemType::NetworkSubnet,
                    network.delegated_subnet_resource_id.as_deref(),
                    &["virtualNetworks", "subnets"],
                    BlastPropagation::IN,
                )
                .by_id(
                    ItemType::NetworkPrivateDnsZone,
                    network.private_dns_zone_arm_resource_id.as_deref(),
                    &["privateDnsZones"],
                    BlastPropagation::IN,
                );
        }

        if let Some(encryption) = &props.data_encryption {
            link_vault_object(&mut links, encryption.primary_key_uri.as_deref(), BlastPropagation::IN);
            links.by_id(
                ItemType::ManagedIdentityUserAssignedIdentity,
                encryption.primary_user_assigned_identity_id.as_deref(),
                &["userAssignedIdentities"],
                BlastPropagation::IN,
            );
        }

        // A replica follows its primary; promoting or deleting the replica
        // leaves the primary alone
        links.by_id(
            ItemType::PostgreSqlFlexibleServer,
            props.source_server_resource_id.as_deref(),
            &["flexibleServers"],
            BlastPropagation::IN,
        );
        private_endpoint_links(&props.private_endpoint_connections, &mut links);

        links.into_vec()
    }

    /// Flexible servers report `state`, e.g. `Ready` or `Stopped`
    fn health(&self, resource: &ArmResource<Self::Properties>) -> Option<Health> {
        let state = resource.properties.as_ref()?.state.as_deref()?;
        Some(Health::from_provisioning_state(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{assert_link, map, rg_id, SCOPE};
    use crate::sdp::QueryMethod;
    use serde_json::json;

    #[test]
    fn test_links_vnet_integration_and_replica() {
        let item = map(
            &FlexibleServer,
            json!({
                "id": rg_id("Microsoft.DBforPostgreSQL/flexibleServers/pg-replica"),
                "name": "pg-replica",
                "sku": {"name": "Standard_D2ds_v4", "tier": "GeneralPurpose"},
                "properties": {
                    "state": "Ready",
                    "version": "15",
                    "fullyQualifiedDomainName": "pg-replica.postgres.database.azure.com",
                    "replicationRole": "AsyncReplica",
                    "sourceServerResourceId": rg_id("Microsoft.DBforPostgreSQL/flexibleServers/pg-primary"),
                    "network": {
                        "publicNetworkAccess": "Disabled",
                        "delegatedSubnetResourceId": rg_id("Microsoft.Network/virtualNetworks/vnet-1/subnets/pg"),
                        "privateDnsZoneArmResourceId": rg_id("Microsoft.Network/privateDnsZones/pg.private.postgres.database.azure.com")
                    },
                    "dataEncryption": {
                        "type": "AzureKeyVault",
                        "primaryKeyURI": "https://kv-data.vault.azure.net/keys/pg-cmk/abc123",
                        "primaryUserAssignedIdentityId": rg_id("Microsoft.ManagedIdentity/userAssignedIdentities/id-pg")
                    }
                }
            }),
            &[],
        );

        assert_eq!(item.health, Some(Health::Ok));
        assert_link(&item, ItemType::PostgreSqlDatabase, QueryMethod::Search, "pg-replica", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::Dns, QueryMethod::Search, "pg-replica.postgres.database.azure.com", "global", BlastPropagation::BOTH);
        assert_link(&item, ItemType::NetworkSubnet, QueryMethod::Get, "vnet-1|pg", SCOPE, BlastPropagation::IN);
        assert_link(
            &item,
            ItemType::NetworkPrivateDnsZone,
            QueryMethod::Get,
            "pg.private.postgres.database.azure.com",
            SCOPE,
            BlastPropagation::IN,
        );
        assert_link(&item, ItemType::KeyVaultKey, QueryMethod::Get, "kv-data|pg-cmk", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::ManagedIdentityUserAssignedIdentity, QueryMethod::Get, "id-pg", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::PostgreSqlFlexibleServer, QueryMethod::Get, "pg-primary", SCOPE, BlastPropagation::IN);
    }

    #[test]
    fn test_stopped_server_is_warning() {
        let item = map(
            &FlexibleServer,
            json!({"name": "pg-dev", "properties": {"state": "Stopped"}}),
            &[],
        );
        assert_eq!(item.health, Some(Health::Warning));
        assert_eq!(item.linked_item_queries.len(), 1);
    }
}
