use super::{link_creation_source, link_encryption, CreationData, Encryption};
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ComputeSnapshot,
    descriptive_name: "Snapshot",
    category: Category::Storage,
    provider: "Microsoft.Compute",
    path: &[PathSegment::named("snapshots")],
    api_version: "2023-10-02",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::ComputeDisk,
        ItemType::ComputeSnapshot,
        ItemType::ComputeDiskEncryptionSet,
        ItemType::ComputeImage,
        ItemType::ComputeGalleryImage,
        ItemType::StorageAccount,
        ItemType::Http,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Compute/snapshots/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotProperties {
    #[serde(default)]
    creation_data: Option<CreationData>,
    #[serde(default)]
    encryption: Option<Encryption>,
}

pub struct Snapshot;

impl ResourceMapper for Snapshot {
    type Properties = SnapshotProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        if let Some(props) = &resource.properties {
            if let Some(data) = &props.creation_data {
                link_creation_source(&mut links, data);
            }
            link_encryption(&mut links, props.encryption.as_ref());
        }
        links.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{assert_link, map, SCOPE};
    use crate::sdp::{BlastPropagation, QueryMethod};
    use serde_json::json;

    #[test]
    fn test_links_source_disk_in_other_group() {
        let item = map(
            &Snapshot,
            json!({
                "name": "snap-1",
                "properties": {
                    "provisioningState": "Succeeded",
                    "incremental": true,
                    "creationData": {
                        "createOption": "Copy",
                        "sourceResourceId": "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/rg-vms/providers/Microsoft.Compute/disks/vm-web-1-os"
                    }
                }
            }),
            &[],
        );

        assert_eq!(item.scope, SCOPE);
        assert_link(
            &item,
            ItemType::ComputeDisk,
            QueryMethod::Get,
            "vm-web-1-os",
            "00000000-0000-0000-0000-000000000001.rg-vms",
            BlastPropagation::IN,
        );
        assert_eq!(item.linked_item_queries.len(), 1);
    }
}
