use super::{link_creation_source, link_encryption, CreationData, Encryption};
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, Health, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ComputeDisk,
    descriptive_name: "Managed Disk",
    category: Category::Storage,
    provider: "Microsoft.Compute",
    path: &[PathSegment::named("disks")],
    api_version: "2023-10-02",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::ComputeVirtualMachine,
        ItemType::ComputeDiskEncryptionSet,
        ItemType::ComputeSnapshot,
        ItemType::ComputeDisk,
        ItemType::ComputeImage,
        ItemType::ComputeGalleryImage,
        ItemType::StorageAccount,
        ItemType::Http,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Compute/disks/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskProperties {
    #[serde(default)]
    disk_state: Option<String>,
    #[serde(default)]
    creation_data: Option<CreationData>,
    #[serde(default)]
    encryption: Option<Encryption>,
}

pub struct Disk;

impl ResourceMapper for Disk {
    type Properties = DiskProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);

        links.by_id(
            ItemType::ComputeVirtualMachine,
            resource.managed_by.as_deref(),
            &["virtualMachines"],
            BlastPropagation::BOTH,
        );

        if let Some(props) = &resource.properties {
            link_encryption(&mut links, props.encryption.as_ref());
            if let Some(data) = &props.creation_data {
                link_creation_source(&mut links, data);
            }
        }

        links.into_vec()
    }

    /// Disks with an active export SAS are flagged
    fn health(&self, resource: &ArmResource<Self::Properties>) -> Option<Health> {
        let state = resource.properties.as_ref()?.disk_state.as_deref()?;
        if state.eq_ignore_ascii_case("ActiveSAS") || state.eq_ignore_ascii_case("ActiveSASFrozen") {
            return Some(Health::Warning);
        }
        None
    }
}
