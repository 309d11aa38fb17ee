use crate::adapters::keyvault::link_vault_object;
use crate::adapters::{
    private_endpoint_links, ArmResource, Category, LinkContext, Links, PathSegment,
    PrivateEndpointConnection, ResourceDef, ResourceMapper, SubResource,
};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::DocumentDbDatabaseAccount,
    descriptive_name: "Cosmos DB Account",
    category: Category::Database,
    provider: "Microsoft.DocumentDB",
    path: &[PathSegment::named("databaseAccounts")],
    api_version: "2024-05-15",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkSubnet,
        ItemType::NetworkPrivateEndpoint,
        ItemType::KeyVaultKey,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::Ip,
        ItemType::Http,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.DocumentDB/databaseAccounts/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAccountProperties {
    #[serde(default)]
    document_endpoint: Option<String>,
    /// One entry per replicated region, each with its own endpoint
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    locations: Vec<Location>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    ip_rules: Vec<IpAddressOrRange>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    virtual_network_rules: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    private_endpoint_connections: Vec<PrivateEndpointConnection>,
    #[serde(default)]
    key_vault_key_uri: Option<String>,
    /// `FirstPartyIdentity`, `SystemAssignedIdentity` or
    /// `UserAssignedIdentity={resource id}`
    #[serde(default)]
    default_identity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    #[serde(default)]
    document_endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpAddressOrRange {
    #[serde(default)]
    ip_address_or_range: Option<String>,
}

pub struct DatabaseAccount;

impl ResourceMapper for DatabaseAccount {
    type Properties = DatabaseAccountProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        links.http(props.document_endpoint.as_deref(), BlastPropagation::BOTH);
        for location in &props.locations {
            links.http(location.document_endpoint.as_deref(), BlastPropagation::BOTH);
        }

        for rule in &props.virtual_network_rules {
            links.by_id(
                ItemType::NetworkSubnet,
                rule.id(),
                &["virtualNetworks", "subnets"],
                BlastPropagation::IN,
            );
        }
        for rule in &props.ip_rules {
            links.ip_rule(rule.ip_address_or_range.as_deref(), BlastPropagation::IN);
        }
        private_endpoint_links(&props.private_endpoint_connections, &mut links);

        link_vault_object(&mut links, props.key_vault_key_uri.as_deref(), BlastPropagation::IN);
        let identity = props
            .default_identity
            .as_deref()
            .and_then(|i| i.strip_prefix("UserAssignedIdentity="));
        links.by_id(
            ItemType::ManagedIdentityUserAssignedIdentity,
            identity,
            &["userAssignedIdentities"],
            BlastPropagation::IN,
        );

        links.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{assert_link, map, rg_id, SCOPE};
    use crate::sdp::{Health, QueryMethod};
    use serde_json::json;

    #[test]
    fn test_links_endpoints_firewall_and_key() {
        let item = map(
            &DatabaseAccount,
            json!({
                "id": rg_id("Microsoft.DocumentDB/databaseAccounts/cosmos-orders"),
                "name": "cosmos-orders",
                "kind": "GlobalDocumentDB",
                "properties": {
                    "provisioningState": "Succeeded",
                    "documentEndpoint": "https://cosmos-orders.documents.azure.com:443/",
                    "locations": [
                        {"locationName": "West Europe", "documentEndpoint": "https://cosmos-orders-westeurope.documents.azure.com:443/"}
                    ],
                    "ipRules": [{"ipAddressOrRange": "203.0.113.9"}, {"ipAddressOrRange": "10.1.0.0/16"}],
                    "isVirtualNetworkFilterEnabled": true,
                    "virtualNetworkRules": [{"id": rg_id("Microsoft.Network/virtualNetworks/vnet-1/subnets/app"), "ignoreMissingVNetServiceEndpoint": false}],
                    "keyVaultKeyUri": "https://kv-data.vault.azure.net/keys/cosmos-cmk",
                    "defaultIdentity": format!("UserAssignedIdentity={}", rg_id("Microsoft.ManagedIdentity/userAssignedIdentities/id-cosmos"))
                }
            }),
            &[],
        );

        assert_eq!(item.health, Some(Health::Ok));
        assert_link(&item, ItemType::Http, QueryMethod::Search, "https://cosmos-orders.documents.azure.com:443/", "global", BlastPropagation::BOTH);
        assert_link(&item, ItemType::Dns, QueryMethod::Search, "cosmos-orders-westeurope.documents.azure.com", "global", BlastPropagation::BOTH);
        assert_link(&item, ItemType::NetworkSubnet, QueryMethod::Get, "vnet-1|app", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::Ip, QueryMethod::Get, "203.0.113.9", "global", BlastPropagation::IN);
        assert_eq!(item.links_to(ItemType::Ip).count(), 1);
        assert_link(&item, ItemType::KeyVaultKey, QueryMethod::Get, "kv-data|cosmos-cmk", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::ManagedIdentityUserAssignedIdentity, QueryMethod::Get, "id-cosmos", SCOPE, BlastPropagation::IN);
    }

    #[test]
    fn test_system_identity_is_not_linked() {
        let item = map(
            &DatabaseAccount,
            json!({"name": "cosmos-dev", "properties": {"defaultIdentity": "FirstPartyIdentity"}}),
            &[],
        );
        assert!(item.linked_item_queries.is_empty());
    }
}
