use super::{API_VERSION, IP_CONFIGURATION_OWNERS};
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkSubnet,
    descriptive_name: "Subnet",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[
        PathSegment::named("virtualNetworks"),
        PathSegment::named("subnets"),
    ],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkVirtualNetwork,
        ItemType::NetworkNetworkSecurityGroup,
        ItemType::NetworkRouteTable,
        ItemType::NetworkNatGateway,
        ItemType::NetworkNetworkInterface,
        ItemType::ComputeVirtualMachineScaleSet,
        ItemType::NetworkLoadBalancer,
        ItemType::NetworkApplicationGateway,
        ItemType::NetworkVirtualNetworkGateway,
        ItemType::NetworkPrivateLinkService,
        ItemType::NetworkPrivateEndpoint,
    ],
    iam_permissions: &["Microsoft.Network/virtualNetworks/subnets/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    #[serde(default)]
    network_security_group: Option<SubResource>,
    #[serde(default)]
    route_table: Option<SubResource>,
    #[serde(default)]
    nat_gateway: Option<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    ip_configurations: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    private_endpoints: Vec<SubResource>,
}

pub struct Subnet;

impl ResourceMapper for Subnet {
    type Properties = SubnetProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.parent(ItemType::NetworkVirtualNetwork, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        links
            .by_id(
                ItemType::NetworkNetworkSecurityGroup,
                props.network_security_group.as_ref().and_then(|n| n.id()),
                &["networkSecurityGroups"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::NetworkRouteTable,
                props.route_table.as_ref().and_then(|r| r.id()),
                &["routeTables"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::NetworkNatGateway,
                props.nat_gateway.as_ref().and_then(|n| n.id()),
                &["natGateways"],
                BlastPropagation::IN,
            );

        // Everything addressed out of this subnet breaks if it goes
        for config in &props.ip_configurations {
            links.by_resource_type(config.id(), IP_CONFIGURATION_OWNERS, BlastPropagation::OUT);
        }
        for endpoint in &props.private_endpoints {
            links.by_id(
                ItemType::NetworkPrivateEndpoint,
                endpoint.id(),
                &["privateEndpoints"],
                BlastPropagation::OUT,
            );
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
    fn test_links_parent_policy_and_consumers() {
        let item = map(
            &Subnet,
            json!({
                "id": rg_id("Microsoft.Network/virtualNetworks/vnet-1/subnets/app"),
                "name": "app",
                "properties": {
                    "provisioningState": "Succeeded",
                    "addressPrefix": "10.0.1.0/24",
                    "networkSecurityGroup": {"id": rg_id("Microsoft.Network/networkSecurityGroups/nsg-app")},
                    "routeTable": {"id": rg_id("Microsoft.Network/routeTables/rt-app")},
                    "natGateway": {"id": rg_id("Microsoft.Network/natGateways/nat-1")},
                    "ipConfigurations": [
                        {"id": rg_id("Microsoft.Network/networkInterfaces/nic-web-1/ipConfigurations/ipconfig1")},
                        {"id": rg_id("Microsoft.Compute/virtualMachineScaleSets/vmss-api/virtualMachines/0/networkInterfaces/nic/ipConfigurations/ipconfig")},
                        {"id": rg_id("Microsoft.Network/loadBalancers/lb-int/frontendIPConfigurations/fe")}
                    ],
                    "privateEndpoints": [{"id": rg_id("Microsoft.Network/privateEndpoints/pe-kv")}]
                }
            }),
            &["vnet-1"],
        );

        assert_eq!(item.unique_attribute_value().as_deref(), Some("vnet-1|app"));
        assert_link(&item, ItemType::NetworkVirtualNetwork, QueryMethod::Get, "vnet-1", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::NetworkNetworkSecurityGroup, QueryMethod::Get, "nsg-app", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::NetworkRouteTable, QueryMethod::Get, "rt-app", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::NetworkNatGateway, QueryMethod::Get, "nat-1", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::NetworkNetworkInterface, QueryMethod::Get, "nic-web-1", SCOPE, BlastPropagation::OUT);
        assert_link(&item, ItemType::ComputeVirtualMachineScaleSet, QueryMethod::Get, "vmss-api", SCOPE, BlastPropagation::OUT);
        assert_link(&item, ItemType::NetworkLoadBalancer, QueryMethod::Get, "lb-int", SCOPE, BlastPropagation::OUT);
        assert_link(&item, ItemType::NetworkPrivateEndpoint, QueryMethod::Get, "pe-kv", SCOPE, BlastPropagation::OUT);
    }
}
