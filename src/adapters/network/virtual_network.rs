use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkVirtualNetwork,
    descriptive_name: "Virtual Network",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("virtualNetworks")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkSubnet,
        ItemType::NetworkVirtualNetwork,
        ItemType::NetworkDdosProtectionPlan,
        ItemType::Ip,
    ],
    iam_permissions: &["Microsoft.Network/virtualNetworks/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    #[serde(default)]
    dhcp_options: Option<DhcpOptions>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    virtual_network_peerings: Vec<Peering>,
    #[serde(default)]
    ddos_protection_plan: Option<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DhcpOptions {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    dns_servers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Peering {
    #[serde(default)]
    properties: Option<PeeringProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeeringProperties {
    #[serde(default)]
    remote_virtual_network: Option<SubResource>,
}

pub struct VirtualNetwork;

impl ResourceMapper for VirtualNetwork {
    type Properties = VirtualNetworkProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.children(ItemType::NetworkSubnet, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        for peering in props.virtual_network_peerings.iter().filter_map(|p| p.properties.as_ref()) {
            links.by_id(
                ItemType::NetworkVirtualNetwork,
                peering.remote_virtual_network.as_ref().and_then(|v| v.id()),
                &["virtualNetworks"],
                BlastPropagation::BOTH,
            );
        }

        links.by_id(
            ItemType::NetworkDdosProtectionPlan,
            props.ddos_protection_plan.as_ref().and_then(|p| p.id()),
            &["ddosProtectionPlans"],
            BlastPropagation::IN,
        );

        for server in props.dhcp_options.iter().flat_map(|d| &d.dns_servers) {
            links.ip(Some(server.as_str()), BlastPropagation::IN);
        }

        links.into_vec()
    }
}
