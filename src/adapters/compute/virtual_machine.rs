use super::link_image;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ComputeVirtualMachine,
    descriptive_name: "Virtual Machine",
    category: Category::Compute,
    provider: "Microsoft.Compute",
    path: &[PathSegment::named("virtualMachines")],
    api_version: "2024-07-01",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::ComputeDisk,
        ItemType::ComputeDiskEncryptionSet,
        ItemType::NetworkNetworkInterface,
        ItemType::ComputeAvailabilitySet,
        ItemType::ComputeVirtualMachineScaleSet,
        ItemType::ComputeProximityPlacementGroup,
        ItemType::ComputeDedicatedHostGroup,
        ItemType::ComputeCapacityReservationGroup,
        ItemType::ComputeImage,
        ItemType::ComputeGalleryImage,
        ItemType::ComputeVirtualMachineExtension,
        ItemType::KeyVaultVault,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::Http,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Compute/virtualMachines/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    #[serde(default)]
    storage_profile: Option<StorageProfile>,
    #[serde(default)]
    network_profile: Option<NetworkProfile>,
    #[serde(default)]
    availability_set: Option<SubResource>,
    #[serde(default)]
    virtual_machine_scale_set: Option<SubResource>,
    #[serde(default)]
    proximity_placement_group: Option<SubResource>,
    #[serde(default)]
    host_group: Option<SubResource>,
    #[serde(default)]
    capacity_reservation: Option<CapacityReservationProfile>,
    #[serde(default)]
    diagnostics_profile: Option<DiagnosticsProfile>,
    #[serde(default)]
    os_profile: Option<OsProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageProfile {
    #[serde(default)]
    image_reference: Option<SubResource>,
    #[serde(default)]
    os_disk: Option<VmDisk>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    data_disks: Vec<VmDisk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VmDisk {
    #[serde(default)]
    managed_disk: Option<ManagedDisk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedDisk {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    disk_encryption_set: Option<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkProfile {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    network_interfaces: Vec<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapacityReservationProfile {
    #[serde(default)]
    capacity_reservation_group: Option<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticsProfile {
    #[serde(default)]
    boot_diagnostics: Option<BootDiagnostics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BootDiagnostics {
    #[serde(default)]
    storage_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OsProfile {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    secrets: Vec<VaultSecretGroup>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultSecretGroup {
    #[serde(default)]
    source_vault: Option<SubResource>,
}

pub struct VirtualMachine;

impl ResourceMapper for VirtualMachine {
    type Properties = VirtualMachineProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);

        // Extensions only exist inside the VM
        links.children(ItemType::ComputeVirtualMachineExtension, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        if let Some(storage) = &props.storage_profile {
            let disks = storage.os_disk.iter().chain(storage.data_disks.iter());
            for disk in disks.filter_map(|d| d.managed_disk.as_ref()) {
                // Detaching or deleting a disk breaks the VM; deleting the VM
                // can delete its disks
                links.by_id(ItemType::ComputeDisk, disk.id.as_deref(), &["disks"], BlastPropagation::BOTH);
                links.by_id(
                    ItemType::ComputeDiskEncryptionSet,
                    disk.disk_encryption_set.as_ref().and_then(|s| s.id()),
                    &["diskEncryptionSets"],
                    BlastPropagation::IN,
                );
            }

            link_image(
                &mut links,
                storage.image_reference.as_ref().and_then(|i| i.id()),
                BlastPropagation::IN,
            );
        }

        if let Some(network) = &props.network_profile {
            for nic in &network.network_interfaces {
                links.by_id(
                    ItemType::NetworkNetworkInterface,
                    nic.id(),
                    &["networkInterfaces"],
                    BlastPropagation::BOTH,
                );
            }
        }

        links
            .by_id(
                ItemType::ComputeAvailabilitySet,
                props.availability_set.as_ref().and_then(|s| s.id()),
                &["availabilitySets"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::ComputeVirtualMachineScaleSet,
                props.virtual_machine_scale_set.as_ref().and_then(|s| s.id()),
                &["virtualMachineScaleSets"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::ComputeProximityPlacementGroup,
                props.proximity_placement_group.as_ref().and_then(|s| s.id()),
                &["proximityPlacementGroups"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::ComputeDedicatedHostGroup,
                props.host_group.as_ref().and_then(|s| s.id()),
                &["hostGroups"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::ComputeCapacityReservationGroup,
                props
                    .capacity_reservation
                    .as_ref()
                    .and_then(|c| c.capacity_reservation_group.as_ref())
                    .and_then(|s| s.id()),
                &["capacityReservationGroups"],
                BlastPropagation::IN,
            );

        if let Some(uri) = props
            .diagnostics_profile
            .as_ref()
            .and_then(|d| d.boot_diagnostics.as_ref())
            .and_then(|b| b.storage_uri.as_deref())
        {
            links.http(Some(uri), BlastPropagation::IN);
        }

        if let Some(os) = &props.os_profile {
            for group in &os.secrets {
                links.by_id(
                    ItemType::KeyVaultVault,
                    group.source_vault.as_ref().and_then(|v| v.id()),
                    &["vaults"],
                    BlastPropagation::IN,
                );
            }
        }

        links.into_vec()
    }
}
