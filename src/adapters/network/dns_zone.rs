use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkDnsZone,
    descriptive_name: "DNS Zone",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("dnsZones")],
    api_version: "2018-05-01",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::Dns, ItemType::NetworkVirtualNetwork],
    iam_permissions: &["Microsoft.Network/dnszones/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZoneProperties {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    name_servers: Vec<String>,
    /// Only set on legacy private zones
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    registration_virtual_networks: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    resolution_virtual_networks: Vec<SubResource>,
}

pub struct DnsZone;

impl ResourceMapper for DnsZone {
    type Properties = DnsZoneProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);

        // The zone apex resolves through public DNS
        links.dns(resource.name.as_deref(), BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        for server in &props.name_servers {
            links.dns(Some(server.as_str()), BlastPropagation::IN);
        }
        let vnets = props
            .registration_virtual_networks
            .iter()
            .chain(&props.resolution_virtual_networks);
        for vnet in vnets {
            links.by_id(ItemType::NetworkVirtualNetwork, vnet.id(), &["virtualNetworks"], BlastPropagation::OUT);
        }

        links.into_vec()
    }
}
