//! Microsoft.Compute adapters

mod availability_set;
mod disk;
mod disk_encryption_set;
mod snapshot;
mod virtual_machine;
mod virtual_machine_extension;
mod virtual_machine_scale_set;

pub use availability_set::AvailabilitySet;
pub use disk::Disk;
pub use disk_encryption_set::DiskEncryptionSet;
pub use snapshot::Snapshot;
pub use virtual_machine::VirtualMachine;
pub use virtual_machine_extension::VirtualMachineExtension;
pub use virtual_machine_scale_set::VirtualMachineScaleSet;

use crate::adapters::{Links, SubResource};
use crate::sdp::{BlastPropagation, ItemType};
use serde::Deserialize;

/// Where a disk or snapshot was created from
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreationData {
    #[serde(default)]
    source_resource_id: Option<String>,
    #[serde(default)]
    source_uri: Option<String>,
    #[serde(default)]
    storage_account_id: Option<String>,
    #[serde(default)]
    image_reference: Option<SubResource>,
    #[serde(default)]
    gallery_image_reference: Option<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Encryption {
    #[serde(default)]
    disk_encryption_set_id: Option<String>,
}

/// Managed image or Compute Gallery image, told apart by the ID
pub(crate) fn link_image(links: &mut Links<'_>, id: Option<&str>, blast: BlastPropagation) {
    let Some(id) = id else {
        return;
    };
    if id.to_ascii_lowercase().contains("/galleries/") {
        links.by_id(ItemType::ComputeGalleryImage, Some(id), &["galleries", "images"], blast);
    } else {
        links.by_id(ItemType::ComputeImage, Some(id), &["images"], blast);
    }
}

/// Links from a disk or snapshot to whatever it was copied or imported from
pub(crate) fn link_creation_source(links: &mut Links<'_>, data: &CreationData) {
    if let Some(source) = data.source_resource_id.as_deref() {
        let lower = source.to_ascii_lowercase();
        if lower.contains("/snapshots/") {
            links.by_id(ItemType::ComputeSnapshot, Some(source), &["snapshots"], BlastPropagation::IN);
        } else if lower.contains("/disks/") {
            links.by_id(ItemType::ComputeDisk, Some(source), &["disks"], BlastPropagation::IN);
        }
    }

    link_image(links, data.image_reference.as_ref().and_then(|r| r.id()), BlastPropagation::IN);
    link_image(
        links,
        data.gallery_image_reference.as_ref().and_then(|r| r.id()),
        BlastPropagation::IN,
    );

    links
        .by_id(
            ItemType::StorageAccount,
            data.storage_account_id.as_deref(),
            &["storageAccounts"],
            BlastPropagation::IN,
        )
        .http(data.source_uri.as_deref(), BlastPropagation::IN);
}

pub(crate) fn link_encryption(links: &mut Links<'_>, encryption: Option<&Encryption>) {
    links.by_id(
        ItemType::ComputeDiskEncryptionSet,
        encryption.and_then(|e| e.disk_encryption_set_id.as_deref()),
        &["diskEncryptionSets"],
        BlastPropagation::IN,
    );
}
