use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkLoadBalancer,
    descriptive_name: "Load Balancer",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("loadBalancers")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkPublicIpAddress,
        ItemType::NetworkPublicIpPrefix,
        ItemType::NetworkSubnet,
        ItemType::NetworkNetworkInterface,
        ItemType::ComputeVirtualMachineScaleSet,
        ItemType::NetworkVirtualNetwork,
        ItemType::Ip,
    ],
    iam_permissions: &["Microsoft.Network/loadBalancers/read"],
};

/// Backend members are addressed by IP configuration
const BACKEND_OWNERS: &[(&str, ItemType)] = &[
    ("networkInterfaces", ItemType::NetworkNetworkInterface),
    ("virtualMachineScaleSets", ItemType::ComputeVirtualMachineScaleSet),
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerProperties {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default", rename = "frontendIPConfigurations")]
    frontend_ip_configurations: Vec<Child<FrontendProperties>>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    backend_address_pools: Vec<Child<BackendPoolProperties>>,
}

/// Sub-resource with its own `properties` block
#[derive(Debug, Deserialize)]
#[serde(bound = "P: Deserialize<'de>")]
struct Child<P> {
    #[serde(default)]
    properties: Option<P>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontendProperties {
    #[serde(default, rename = "privateIPAddress")]
    private_ip_address: Option<String>,
    #[serde(default, rename = "publicIPAddress")]
    public_ip_address: Option<SubResource>,
    #[serde(default, rename = "publicIPPrefix")]
    public_ip_prefix: Option<SubResource>,
    #[serde(default)]
    subnet: Option<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendPoolProperties {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default", rename = "backendIPConfigurations")]
    backend_ip_configurations: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    load_balancer_backend_addresses: Vec<Child<BackendAddressProperties>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendAddressProperties {
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    virtual_network: Option<SubResource>,
}

pub struct LoadBalancer;

impl ResourceMapper for LoadBalancer {
    type Properties = LoadBalancerProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        for frontend in props.frontend_ip_configurations.iter().filter_map(|f| f.properties.as_ref()) {
            links
                .ip(frontend.private_ip_address.as_deref(), BlastPropagation::BOTH)
                .by_id(
                    ItemType::NetworkPublicIpAddress,
                    frontend.public_ip_address.as_ref().and_then(|p| p.id()),
                    &["publicIPAddresses"],
                    BlastPropagation::BOTH,
                )
                .by_id(
                    ItemType::NetworkPublicIpPrefix,
                    frontend.public_ip_prefix.as_ref().and_then(|p| p.id()),
                    &["publicIPPrefixes"],
                    BlastPropagation::IN,
                )
                .by_id(
                    ItemType::NetworkSubnet,
                    frontend.subnet.as_ref().and_then(|s| s.id()),
                    &["virtualNetworks", "subnets"],
                    BlastPropagation::IN,
                );
        }

        for pool in props.backend_address_pools.iter().filter_map(|p| p.properties.as_ref()) {
            for config in &pool.backend_ip_configurations {
                links.by_resource_type(config.id(), BACKEND_OWNERS, BlastPropagation::BOTH);
            }
            for address in pool.load_balancer_backend_addresses.iter().filter_map(|a| a.properties.as_ref()) {
                links
                    .ip(address.ip_address.as_deref(), BlastPropagation::BOTH)
                    .by_id(
                        ItemType::NetworkVirtualNetwork,
                        address.virtual_network.as_ref().and_then(|v| v.id()),
                        &["virtualNetworks"],
                        BlastPropagation::IN,
                    );
            }
        }

        links.into_vec()
    }
}
