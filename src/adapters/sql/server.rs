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
    item_type: ItemType::SqlServer,
    descriptive_name: "SQL Server",
    category: Category::Database,
    provider: "Microsoft.Sql",
    path: &[PathSegment::named("servers")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::SqlDatabase,
        ItemType::SqlElasticPool,
        ItemType::NetworkPrivateEndpoint,
        ItemType::KeyVaultKey,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Sql/servers/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerProperties {
    #[serde(default)]
    fully_qualified_domain_name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    /// Customer managed TDE protector, a Key Vault key URL
    #[serde(default)]
    key_id: Option<String>,
    #[serde(default)]
    primary_user_assigned_identity_id: Option<String>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    private_endpoint_connections: Vec<PrivateEndpointConnection>,
}

pub struct Server;

impl ResourceMapper for Server {
    type Properties = ServerProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links
            .children(ItemType::SqlDatabase, BlastPropagation::BOTH)
            .children(ItemType::SqlElasticPool, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        links
            .dns(props.fully_qualified_domain_name.as_deref(), BlastPropagation::BOTH)
            .by_id(
                ItemType::ManagedIdentityUserAssignedIdentity,
                props.primary_user_assigned_identity_id.as_deref(),
                &["userAssignedIdentities"],
                BlastPropagation::IN,
            );
        link_vault_object(&mut links, props.key_id.as_deref(), BlastPropagation::IN);
        private_endpoint_links(&props.private_endpoint_connections, &mut links);

        links.into_vec()
    }

    /// Servers report `state` rather than a provisioning state
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
    fn test_links_children_dns_and_key() {
        let item = map(
            &Server,
            json!({
                "id": rg_id("Microsoft.Sql/servers/sql-orders"),
                "name": "sql-orders",
                "kind": "v12.0",
                "identity": {
                    "type": "UserAssigned",
                    "userAssignedIdentities": {
                        rg_id("Microsoft.ManagedIdentity/userAssignedIdentities/id-sql"): {}
                    }
                },
                "properties": {
                    "state": "Ready",
                    "version": "12.0",
                    "fullyQualifiedDomainName": "sql-orders.database.windows.net",
                    "primaryUserAssignedIdentityId": rg_id("Microsoft.ManagedIdentity/userAssignedIdentities/id-sql"),
                    "keyId": "https://kv-data.vault.azure.net/keys/tde/0123456789abcdef",
                    "privateEndpointConnections": [{
                        "id": rg_id("Microsoft.Sql/servers/sql-orders/privateEndpointConnections/pec"),
                        "properties": {"privateEndpoint": {"id": rg_id("Microsoft.Network/privateEndpoints/pe-sql")}}
                    }]
                }
            }),
            &[],
        );

        assert_eq!(item.health, Some(Health::Ok));
        assert_link(&item, ItemType::SqlDatabase, QueryMethod::Search, "sql-orders", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::SqlElasticPool, QueryMethod::Search, "sql-orders", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::Dns, QueryMethod::Search, "sql-orders.database.windows.net", "global", BlastPropagation::BOTH);
        assert_link(&item, ItemType::KeyVaultKey, QueryMethod::Get, "kv-data|tde", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::NetworkPrivateEndpoint, QueryMethod::Get, "pe-sql", SCOPE, BlastPropagation::BOTH);
        // Named both in the identity block and as the primary identity
        assert_eq!(item.links_to(ItemType::ManagedIdentityUserAssignedIdentity).count(), 1);
    }
}
