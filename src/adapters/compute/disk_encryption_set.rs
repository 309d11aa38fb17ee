use crate::adapters::keyvault::link_vault_object;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ComputeDiskEncryptionSet,
    descriptive_name: "Disk Encryption Set",
    category: Category::Security,
    provider: "Microsoft.Compute",
    path: &[PathSegment::named("diskEncryptionSets")],
    api_version: "2023-10-02",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::KeyVaultVault,
        ItemType::KeyVaultKey,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Compute/diskEncryptionSets/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskEncryptionSetProperties {
    #[serde(default)]
    active_key: Option<KeyForDiskEncryptionSet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyForDiskEncryptionSet {
    #[serde(default)]
    key_url: Option<String>,
    #[serde(default)]
    source_vault: Option<SubResource>,
}

pub struct DiskEncryptionSet;

impl ResourceMapper for DiskEncryptionSet {
    type Properties = DiskEncryptionSetProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(key) = resource.properties.as_ref().and_then(|p| p.active_key.as_ref()) else {
            return links.into_vec();
        };

        // Losing the key makes every disk using this set unreadable
        links.by_id(
            ItemType::KeyVaultVault,
            key.source_vault.as_ref().and_then(|v| v.id()),
            &["vaults"],
            BlastPropagation::IN,
        );
        link_vault_object(&mut links, key.key_url.as_deref(), BlastPropagation::IN);

        links.into_vec()
    }
}
