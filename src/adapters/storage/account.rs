use super::API_VERSION;
use crate::adapters::{
    private_endpoint_links, ArmResource, Category, LinkContext, Links, NetworkRuleSet,
    PathSegment, PrivateEndpointConnection, ResourceDef, ResourceMapper,
};
use crate::azure::resource_id::composite_key;
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::StorageAccount,
    descriptive_name: "Storage Account",
    category: Category::Storage,
    provider: "Microsoft.Storage",
    path: &[PathSegment::named("storageAccounts")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::StorageBlobContainer,
        ItemType::StorageFileShare,
        ItemType::StorageQueue,
        ItemType::StorageTable,
        ItemType::NetworkSubnet,
        ItemType::NetworkPrivateEndpoint,
        ItemType::KeyVaultVault,
        ItemType::KeyVaultKey,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::Ip,
        ItemType::Http,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Storage/storageAccounts/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    #[serde(default)]
    primary_endpoints: Option<Endpoints>,
    #[serde(default)]
    network_acls: Option<NetworkRuleSet>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    private_endpoint_connections: Vec<PrivateEndpointConnection>,
    #[serde(default)]
    encryption: Option<Encryption>,
    #[serde(default)]
    custom_domain: Option<CustomDomain>,
}

#[derive(Debug, Default, Deserialize)]
struct Endpoints {
    #[serde(default)]
    blob: Option<String>,
    #[serde(default)]
    queue: Option<String>,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    dfs: Option<String>,
    #[serde(default)]
    web: Option<String>,
}

impl Endpoints {
    fn all(&self) -> impl Iterator<Item = &str> {
        [&self.blob, &self.queue, &self.table, &self.file, &self.dfs, &self.web]
            .into_iter()
            .filter_map(|e| e.as_deref())
    }
}

/// Customer managed keys; ARM spells these fields in lower case
#[derive(Debug, Default, Deserialize)]
struct Encryption {
    #[serde(default, rename = "keyvaultproperties")]
    key_vault_properties: Option<KeyVaultProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyVaultProperties {
    #[serde(default, rename = "keyvaulturi")]
    key_vault_uri: Option<String>,
    #[serde(default, rename = "keyname")]
    key_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CustomDomain {
    #[serde(default)]
    name: Option<String>,
}

pub struct Account;

impl Account {
    fn link_encryption_key(links: &mut Links<'_>, key: &KeyVaultProperties) {
        let Some(vault_host) = key
            .key_vault_uri
            .as_deref()
            .and_then(|u| url::Url::parse(u).ok())
            .and_then(|u| u.host_str().map(str::to_string))
        else {
            return;
        };
        let vault = vault_host.split('.').next().unwrap_or(&vault_host);

        // Without the key the account's data cannot be decrypted
        links.by_name(ItemType::KeyVaultVault, vault, BlastPropagation::IN);
        if let Some(key_name) = key.key_name.as_deref() {
            links.by_name(ItemType::KeyVaultKey, &composite_key(&[vault, key_name]), BlastPropagation::IN);
        }
        links.dns(Some(vault_host.as_str()), BlastPropagation::IN);
    }
}

impl ResourceMapper for Account {
    type Properties = StorageAccountProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links
            .children(ItemType::StorageBlobContainer, BlastPropagation::BOTH)
            .children(ItemType::StorageFileShare, BlastPropagation::BOTH)
            .children(ItemType::StorageQueue, BlastPropagation::BOTH)
            .children(ItemType::StorageTable, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        if let Some(endpoints) = &props.primary_endpoints {
            for endpoint in endpoints.all() {
                links.http(Some(endpoint), BlastPropagation::BOTH);
            }
        }
        links.dns(
            props.custom_domain.as_ref().and_then(|d| d.name.as_deref()),
            BlastPropagation::BOTH,
        );

        if let Some(acls) = &props.network_acls {
            acls.link(&mut links);
        }
        private_endpoint_links(&props.private_endpoint_connections, &mut links);

        if let Some(key) = props.encryption.as_ref().and_then(|e| e.key_vault_properties.as_ref()) {
            Self::link_encryption_key(&mut links, key);
        }

        links.into_vec()
    }
}
