use crate::adapters::keyvault::link_vault_object;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;
use serde_json::Value;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ComputeVirtualMachineExtension,
    descriptive_name: "Virtual Machine Extension",
    category: Category::Configuration,
    provider: "Microsoft.Compute",
    path: &[
        PathSegment::named("virtualMachines"),
        PathSegment::named("extensions"),
    ],
    api_version: "2024-07-01",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::ComputeVirtualMachine,
        ItemType::KeyVaultVault,
        ItemType::KeyVaultSecret,
        ItemType::Http,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Compute/virtualMachines/extensions/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionProperties {
    /// Publisher specific, only `fileUris` is read
    #[serde(default)]
    settings: Option<Value>,
    #[serde(default)]
    protected_settings_from_key_vault: Option<KeyVaultSecretReference>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyVaultSecretReference {
    #[serde(default)]
    secret_url: Option<String>,
    #[serde(default)]
    source_vault: Option<SubResource>,
}

pub struct VirtualMachineExtension;

impl ResourceMapper for VirtualMachineExtension {
    type Properties = ExtensionProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.parent(ItemType::ComputeVirtualMachine, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        // Custom script extensions download their payload on every run
        let file_uris = props
            .settings
            .as_ref()
            .and_then(|s| s.get("fileUris"))
            .and_then(|u| u.as_array());
        for uri in file_uris.into_iter().flatten().filter_map(|u| u.as_str()) {
            links.http(Some(uri), BlastPropagation::IN);
        }

        if let Some(reference) = &props.protected_settings_from_key_vault {
            links.by_id(
                ItemType::KeyVaultVault,
                reference.source_vault.as_ref().and_then(|v| v.id()),
                &["vaults"],
                BlastPropagation::IN,
            );
            link_vault_object(&mut links, reference.secret_url.as_deref(), BlastPropagation::IN);
        }

        links.into_vec()
    }
}
