use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkPrivateEndpoint,
    descriptive_name: "Private Endpoint",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("privateEndpoints")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkSubnet,
        ItemType::NetworkNetworkInterface,
        ItemType::NetworkApplicationSecurityGroup,
        ItemType::NetworkPrivateLinkService,
        ItemType::StorageAccount,
        ItemType::KeyVaultVault,
        ItemType::SqlServer,
        ItemType::PostgreSqlFlexibleServer,
        ItemType::DocumentDbDatabaseAccount,
        ItemType::Ip,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Network/privateEndpoints/read"],
};

/// Services a private endpoint can connect to
const PRIVATE_LINK_TARGETS: &[(&str, ItemType)] = &[
    ("Microsoft.Storage/storageAccounts", ItemType::StorageAccount),
    ("Microsoft.KeyVault/vaults", ItemType::KeyVaultVault),
    ("Microsoft.Sql/servers", ItemType::SqlServer),
    ("Microsoft.DBforPostgreSQL/flexibleServers", ItemType::PostgreSqlFlexibleServer),
    ("Microsoft.DocumentDB/databaseAccounts", ItemType::DocumentDbDatabaseAccount),
    ("Microsoft.Network/privateLinkServices", ItemType::NetworkPrivateLinkService),
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateEndpointProperties {
    #[serde(default)]
    subnet: Option<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    network_interfaces: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    application_security_groups: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    private_link_service_connections: Vec<ServiceConnection>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    manual_private_link_service_connections: Vec<ServiceConnection>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    custom_dns_configs: Vec<CustomDnsConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceConnection {
    #[serde(default)]
    properties: Option<ServiceConnectionProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceConnectionProperties {
    #[serde(default)]
    private_link_service_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomDnsConfig {
    #[serde(default)]
    fqdn: Option<String>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    ip_addresses: Vec<String>,
}

pub struct PrivateEndpoint;

impl ResourceMapper for PrivateEndpoint {
    type Properties = PrivateEndpointProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        links.by_id(
            ItemType::NetworkSubnet,
            props.subnet.as_ref().and_then(|s| s.id()),
            &["virtualNetworks", "subnets"],
            BlastPropagation::IN,
        );
        for nic in &props.network_interfaces {
            links.by_id(ItemType::NetworkNetworkInterface, nic.id(), &["networkInterfaces"], BlastPropagation::BOTH);
        }
        for asg in &props.application_security_groups {
            links.by_id(
                ItemType::NetworkApplicationSecurityGroup,
                asg.id(),
                &["applicationSecurityGroups"],
                BlastPropagation::IN,
            );
        }

        let connections = props
            .private_link_service_connections
            .iter()
            .chain(&props.manual_private_link_service_connections)
            .filter_map(|c| c.properties.as_ref());
        for connection in connections {
            links.by_resource_type(
                connection.private_link_service_id.as_deref(),
                PRIVATE_LINK_TARGETS,
                BlastPropagation::BOTH,
            );
        }

        for config in &props.custom_dns_configs {
            links.dns(config.fqdn.as_deref(), BlastPropagation::BOTH);
            for address in &config.ip_addresses {
                links.ip(Some(address.as_str()), BlastPropagation::BOTH);
            }
        }

        links.into_vec()
    }
}
