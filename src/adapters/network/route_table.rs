use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkRouteTable,
    descriptive_name: "Route Table",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("routeTables")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::NetworkSubnet, ItemType::Ip],
    iam_permissions: &["Microsoft.Network/routeTables/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTableProperties {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    routes: Vec<Route>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    subnets: Vec<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
struct Route {
    #[serde(default)]
    properties: Option<RouteProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteProperties {
    /// Set when the next hop type is `VirtualAppliance`
    #[serde(default)]
    next_hop_ip_address: Option<String>,
}

pub struct RouteTable;

impl ResourceMapper for RouteTable {
    type Properties = RouteTableProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        for route in props.routes.iter().filter_map(|r| r.properties.as_ref()) {
            links.ip(route.next_hop_ip_address.as_deref(), BlastPropagation::IN);
        }
        for subnet in &props.subnets {
            links.by_id(ItemType::NetworkSubnet, subnet.id(), &["virtualNetworks", "subnets"], BlastPropagation::OUT);
        }

        links.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{assert_link, map, rg_id, SCOPE};
    use crate::sdp::QueryMethod;
    use serde_json::json;

    #[test]
    fn test_links_next_hops_and_subnets() {
        let item = map(
            &RouteTable,
            json!({
                "name": "rt-app",
                "properties": {
                    "provisioningState": "Succeeded",
                    "routes": [
                        {"name": "default", "properties": {"addressPrefix": "0.0.0.0/0", "nextHopType": "VirtualAppliance", "nextHopIpAddress": "10.0.0.4"}},
                        {"name": "local", "properties": {"addressPrefix": "10.1.0.0/16", "nextHopType": "VnetLocal"}}
                    ],
                    "subnets": [{"id": rg_id("Microsoft.Network/virtualNetworks/vnet-1/subnets/app")}]
                }
            }),
            &[],
        );

        assert_link(&item, ItemType::Ip, QueryMethod::Get, "10.0.0.4", "global", BlastPropagation::IN);
        assert_link(&item, ItemType::NetworkSubnet, QueryMethod::Get, "vnet-1|app", SCOPE, BlastPropagation::OUT);
        assert_eq!(item.linked_item_queries.len(), 2);
    }
}
