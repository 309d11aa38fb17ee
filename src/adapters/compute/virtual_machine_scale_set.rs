use super::link_image;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ComputeVirtualMachineScaleSet,
    descriptive_name: "Virtual Machine Scale Set",
    category: Category::Compute,
    provider: "Microsoft.Compute",
    path: &[PathSegment::named("virtualMachineScaleSets")],
    api_version: "2024-07-01",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkSubnet,
        ItemType::NetworkLoadBalancer,
        ItemType::NetworkApplicationGateway,
        ItemType::NetworkApplicationSecurityGroup,
        ItemType::NetworkNetworkSecurityGroup,
        ItemType::ComputeImage,
        ItemType::ComputeGalleryImage,
        ItemType::ComputeDiskEncryptionSet,
        ItemType::ComputeProximityPlacementGroup,
        ItemType::ComputeDedicatedHostGroup,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::Http,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Compute/virtualMachineScaleSets/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetProperties {
    #[serde(default)]
    virtual_machine_profile: Option<VmProfile>,
    #[serde(default)]
    proximity_placement_group: Option<SubResource>,
    #[serde(default)]
    host_group: Option<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VmProfile {
    #[serde(default)]
    storage_profile: Option<StorageProfile>,
    #[serde(default)]
    network_profile: Option<NetworkProfile>,
    #[serde(default)]
    diagnostics_profile: Option<DiagnosticsProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageProfile {
    #[serde(default)]
    image_reference: Option<SubResource>,
    #[serde(default)]
    os_disk: Option<ScaleSetDisk>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    data_disks: Vec<ScaleSetDisk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScaleSetDisk {
    #[serde(default)]
    managed_disk: Option<ScaleSetManagedDisk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScaleSetManagedDisk {
    #[serde(default)]
    disk_encryption_set: Option<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkProfile {
    #[serde(default)]
    health_probe: Option<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    network_interface_configurations: Vec<NicConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
struct NicConfiguration {
    #[serde(default)]
    properties: Option<NicConfigurationProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NicConfigurationProperties {
    #[serde(default)]
    network_security_group: Option<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    ip_configurations: Vec<IpConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
struct IpConfiguration {
    #[serde(default)]
    properties: Option<IpConfigurationProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpConfigurationProperties {
    #[serde(default)]
    subnet: Option<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    load_balancer_backend_address_pools: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    load_balancer_inbound_nat_pools: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    application_gateway_backend_address_pools: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    application_security_groups: Vec<SubResource>,
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

pub struct VirtualMachineScaleSet;

impl VirtualMachineScaleSet {
    fn link_ip_configuration(links: &mut Links<'_>, ip: &IpConfigurationProperties) {
        links.by_id(
            ItemType::NetworkSubnet,
            ip.subnet.as_ref().and_then(|s| s.id()),
            &["virtualNetworks", "subnets"],
            BlastPropagation::IN,
        );

        let lb_pools = ip
            .load_balancer_backend_address_pools
            .iter()
            .chain(&ip.load_balancer_inbound_nat_pools);
        for pool in lb_pools {
            links.by_id(ItemType::NetworkLoadBalancer, pool.id(), &["loadBalancers"], BlastPropagation::BOTH);
        }
        for pool in &ip.application_gateway_backend_address_pools {
            links.by_id(
                ItemType::NetworkApplicationGateway,
                pool.id(),
                &["applicationGateways"],
                BlastPropagation::BOTH,
            );
        }
        for asg in &ip.application_security_groups {
            links.by_id(
                ItemType::NetworkApplicationSecurityGroup,
                asg.id(),
                &["applicationSecurityGroups"],
                BlastPropagation::IN,
            );
        }
    }
}

impl ResourceMapper for VirtualMachineScaleSet {
    type Properties = ScaleSetProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        links
            .by_id(
                ItemType::ComputeProximityPlacementGroup,
                props.proximity_placement_group.as_ref().and_then(|p| p.id()),
                &["proximityPlacementGroups"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::ComputeDedicatedHostGroup,
                props.host_group.as_ref().and_then(|h| h.id()),
                &["hostGroups"],
                BlastPropagation::IN,
            );

        let Some(profile) = &props.virtual_machine_profile else {
            return links.into_vec();
        };

        if let Some(storage) = &profile.storage_profile {
            link_image(
                &mut links,
                storage.image_reference.as_ref().and_then(|i| i.id()),
                BlastPropagation::IN,
            );
            let disks = storage.os_disk.iter().chain(&storage.data_disks);
            for managed in disks.filter_map(|d| d.managed_disk.as_ref()) {
                links.by_id(
                    ItemType::ComputeDiskEncryptionSet,
                    managed.disk_encryption_set.as_ref().and_then(|s| s.id()),
                    &["diskEncryptionSets"],
                    BlastPropagation::IN,
                );
            }
        }

        if let Some(network) = &profile.network_profile {
            // Instances are taken out of rotation when the probe fails
            links.by_id(
                ItemType::NetworkLoadBalancer,
                network.health_probe.as_ref().and_then(|p| p.id()),
                &["loadBalancers"],
                BlastPropagation::BOTH,
            );
            for nic in network.network_interface_configurations.iter().filter_map(|n| n.properties.as_ref()) {
                links.by_id(
                    ItemType::NetworkNetworkSecurityGroup,
                    nic.network_security_group.as_ref().and_then(|n| n.id()),
                    &["networkSecurityGroups"],
                    BlastPropagation::IN,
                );
                for ip in nic.ip_configurations.iter().filter_map(|i| i.properties.as_ref()) {
                    Self::link_ip_configuration(&mut links, ip);
                }
            }
        }

        if let Some(uri) = profile
            .diagnostics_profile
            .as_ref()
            .and_then(|d| d.boot_diagnostics.as_ref())
            .and_then(|b| b.storage_uri.as_deref())
        {
            links.http(Some(uri), BlastPropagation::IN);
        }

        links.into_vec()
    }
}
