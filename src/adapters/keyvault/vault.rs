use crate::adapters::{
    private_endpoint_links, ArmResource, Category, LinkContext, Links, NetworkRuleSet,
    PathSegment, PrivateEndpointConnection, ResourceDef, ResourceMapper,
};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::KeyVaultVault,
    descriptive_name: "Key Vault",
    category: Category::Security,
    provider: "Microsoft.KeyVault",
    path: &[PathSegment::named("vaults")],
    api_version: "2023-07-01",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::KeyVaultSecret,
        ItemType::KeyVaultKey,
        ItemType::NetworkSubnet,
        ItemType::NetworkPrivateEndpoint,
        ItemType::Ip,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.KeyVault/vaults/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultProperties {
    #[serde(default)]
    vault_uri: Option<String>,
    #[serde(default)]
    network_acls: Option<NetworkRuleSet>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    private_endpoint_connections: Vec<PrivateEndpointConnection>,
}

pub struct Vault;

impl ResourceMapper for Vault {
    type Properties = VaultProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links
            .children(ItemType::KeyVaultSecret, BlastPropagation::BOTH)
            .children(ItemType::KeyVaultKey, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        if let Some(host) = props
            .vault_uri
            .as_deref()
            .and_then(|u| url::Url::parse(u).ok())
            .and_then(|u| u.host_str().map(str::to_string))
        {
            links.dns(Some(host.as_str()), BlastPropagation::BOTH);
        }

        if let Some(acls) = &props.network_acls {
            acls.link(&mut links);
        }
        private_endpoint_links(&props.private_endpoint_connections, &mut links);

        links.into_vec()
    }
}
