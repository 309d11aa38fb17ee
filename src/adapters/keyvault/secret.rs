use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, Health, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::KeyVaultSecret,
    descriptive_name: "Key Vault Secret",
    category: Category::Security,
    provider: "Microsoft.KeyVault",
    path: &[PathSegment::named("vaults"), PathSegment::named("secrets")],
    api_version: "2023-07-01",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::KeyVaultVault],
    iam_permissions: &["Microsoft.KeyVault/vaults/secrets/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretProperties {
    #[serde(default)]
    attributes: Option<SecretAttributes>,
}

/// Times are Unix seconds
#[derive(Debug, Default, Deserialize)]
struct SecretAttributes {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    exp: Option<i64>,
}

pub struct Secret;

impl ResourceMapper for Secret {
    type Properties = SecretProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, _resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.parent(ItemType::KeyVaultVault, BlastPropagation::BOTH);
        links.into_vec()
    }

    /// Secrets have no provisioning state; expiry and the enabled flag stand in
    fn health(&self, resource: &ArmResource<Self::Properties>) -> Option<Health> {
        let attributes = resource.properties.as_ref()?.attributes.as_ref()?;
        if attributes.exp.is_some_and(|exp| exp <= chrono::Utc::now().timestamp()) {
            return Some(Health::Error);
        }
        if attributes.enabled == Some(false) {
            return Some(Health::Warning);
        }
        Some(Health::Ok)
    }
}
