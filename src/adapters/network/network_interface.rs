use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkNetworkInterface,
    descriptive_name: "Network Interface",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("networkInterfaces")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::ComputeVirtualMachine,
        ItemType::NetworkSubnet,
        ItemType::NetworkPublicIpAddress,
        ItemType::NetworkLoadBalancer,
        ItemType::NetworkApplicationGateway,
        ItemType::NetworkApplicationSecurityGroup,
        ItemType::NetworkNetworkSecurityGroup,
        ItemType::NetworkPrivateEndpoint,
        ItemType::NetworkPrivateLinkService,
        ItemType::Ip,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Network/networkInterfaces/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    #[serde(default)]
    virtual_machine: Option<SubResource>,
    #[serde(default)]
    network_security_group: Option<SubResource>,
    #[serde(default)]
    private_endpoint: Option<SubResource>,
    #[serde(default)]
    private_link_service: Option<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    ip_configurations: Vec<IpConfiguration>,
    #[serde(default)]
    dns_settings: Option<DnsSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct IpConfiguration {
    #[serde(default)]
    properties: Option<IpConfigurationProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpConfigurationProperties {
    #[serde(default, rename = "privateIPAddress")]
    private_ip_address: Option<String>,
    #[serde(default)]
    subnet: Option<SubResource>,
    #[serde(default, rename = "publicIPAddress")]
    public_ip_address: Option<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    load_balancer_backend_address_pools: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    load_balancer_inbound_nat_rules: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    application_gateway_backend_address_pools: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    application_security_groups: Vec<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DnsSettings {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    dns_servers: Vec<String>,
    #[serde(default)]
    internal_fqdn: Option<String>,
}

pub struct NetworkInterface;

impl NetworkInterface {
    fn link_ip_configuration(links: &mut Links<'_>, ip: &IpConfigurationProperties) {
        links
            .ip(ip.private_ip_address.as_deref(), BlastPropagation::BOTH)
            .by_id(
                ItemType::NetworkSubnet,
                ip.subnet.as_ref().and_then(|s| s.id()),
                &["virtualNetworks", "subnets"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::NetworkPublicIpAddress,
                ip.public_ip_address.as_ref().and_then(|p| p.id()),
                &["publicIPAddresses"],
                BlastPropagation::BOTH,
            );

        let lb_refs = ip
            .load_balancer_backend_address_pools
            .iter()
            .chain(&ip.load_balancer_inbound_nat_rules);
        for lb in lb_refs {
            links.by_id(ItemType::NetworkLoadBalancer, lb.id(), &["loadBalancers"], BlastPropagation::BOTH);
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

impl ResourceMapper for NetworkInterface {
    type Properties = NetworkInterfaceProperties;

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
                ItemType::ComputeVirtualMachine,
                props.virtual_machine.as_ref().and_then(|v| v.id()),
                &["virtualMachines"],
                BlastPropagation::BOTH,
            )
            .by_id(
                ItemType::NetworkNetworkSecurityGroup,
                props.network_security_group.as_ref().and_then(|n| n.id()),
                &["networkSecurityGroups"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::NetworkPrivateEndpoint,
                props.private_endpoint.as_ref().and_then(|p| p.id()),
                &["privateEndpoints"],
                BlastPropagation::BOTH,
            )
            .by_id(
                ItemType::NetworkPrivateLinkService,
                props.private_link_service.as_ref().and_then(|p| p.id()),
                &["privateLinkServices"],
                BlastPropagation::BOTH,
            );

        for ip in props.ip_configurations.iter().filter_map(|c| c.properties.as_ref()) {
            Self::link_ip_configuration(&mut links, ip);
        }

        if let Some(dns) = &props.dns_settings {
            for server in &dns.dns_servers {
                links.ip(Some(server.as_str()), BlastPropagation::IN);
            }
            links.dns(dns.internal_fqdn.as_deref(), BlastPropagation::BOTH);
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
    fn test_links_vm_and_ip_configuration() {
        let item = map(
            &NetworkInterface,
            json!({
                "name": "nic-web-1",
                "properties": {
                    "provisioningState": "Succeeded",
                    "virtualMachine": {"id": rg_id("Microsoft.Compute/virtualMachines/vm-web-1")},
                    "networkSecurityGroup": {"id": rg_id("Microsoft.Network/networkSecurityGroups/nsg-web")},
                    "ipConfigurations": [{
                        "name": "ipconfig1",
                        "properties": {
                            "privateIPAddress": "10.0.1.4",
                            "privateIPAllocationMethod": "Dynamic",
                            "subnet": {"id": rg_id("Microsoft.Network/virtualNetworks/vnet-1/subnets/app")},
                            "publicIPAddress": {"id": rg_id("Microsoft.Network/publicIPAddresses/pip-web-1")},
                            "loadBalancerBackendAddressPools": [
                                {"id": rg_id("Microsoft.Network/loadBalancers/lb-web/backendAddressPools/web")}
                            ],
                            "applicationSecurityGroups": [
                                {"id": rg_id("Microsoft.Network/applicationSecurityGroups/asg-web")}
                            ]
                        }
                    }],
                    "dnsSettings": {"dnsServers": [], "internalFqdn": "vm-web-1.internal.cloudapp.net"}
                }
            }),
            &[],
        );

        assert_link(&item, ItemType::ComputeVirtualMachine, QueryMethod::Get, "vm-web-1", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::NetworkNetworkSecurityGroup, QueryMethod::Get, "nsg-web", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::NetworkSubnet, QueryMethod::Get, "vnet-1|app", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::NetworkPublicIpAddress, QueryMethod::Get, "pip-web-1", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::NetworkLoadBalancer, QueryMethod::Get, "lb-web", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::NetworkApplicationSecurityGroup, QueryMethod::Get, "asg-web", SCOPE, BlastPropagation::IN);
        assert_link(&item, ItemType::Ip, QueryMethod::Get, "10.0.1.4", "global", BlastPropagation::BOTH);
        assert_link(&item, ItemType::Dns, QueryMethod::Search, "vm-web-1.internal.cloudapp.net", "global", BlastPropagation::BOTH);
    }
}
