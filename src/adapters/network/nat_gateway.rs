use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkNatGateway,
    descriptive_name: "NAT Gateway",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("natGateways")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkPublicIpAddress,
        ItemType::NetworkPublicIpPrefix,
        ItemType::NetworkSubnet,
    ],
    iam_permissions: &["Microsoft.Network/natGateways/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatGatewayProperties {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    public_ip_addresses: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    public_ip_prefixes: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    subnets: Vec<SubResource>,
}

pub struct NatGateway;

impl ResourceMapper for NatGateway {
    type Properties = NatGatewayProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        for ip in &props.public_ip_addresses {
            links.by_id(ItemType::NetworkPublicIpAddress, ip.id(), &["publicIPAddresses"], BlastPropagation::BOTH);
        }
        for prefix in &props.public_ip_prefixes {
            links.by_id(ItemType::NetworkPublicIpPrefix, prefix.id(), &["publicIPPrefixes"], BlastPropagation::BOTH);
        }
        // Outbound traffic of every attached subnet goes through the gateway
        for subnet in &props.subnets {
            links.by_id(ItemType::NetworkSubnet, subnet.id(), &["virtualNetworks", "subnets"], BlastPropagation::OUT);
        }

        links.into_vec()
    }
}
