//! Microsoft.Network adapters

mod dns_zone;
mod load_balancer;
mod nat_gateway;
mod network_interface;
mod network_security_group;
mod private_endpoint;
mod public_ip_address;
mod route_table;
mod subnet;
mod virtual_network;

pub use dns_zone::DnsZone;
pub use load_balancer::LoadBalancer;
pub use nat_gateway::NatGateway;
pub use network_interface::NetworkInterface;
pub use network_security_group::NetworkSecurityGroup;
pub use private_endpoint::PrivateEndpoint;
pub use public_ip_address::PublicIpAddress;
pub use route_table::RouteTable;
pub use subnet::Subnet;
pub use virtual_network::VirtualNetwork;

use crate::sdp::ItemType;

pub(crate) const API_VERSION: &str = "2024-05-01";

/// Resources that own IP configurations, keyed by the outermost resource
/// type of an `.../ipConfigurations/...` ID
pub(crate) const IP_CONFIGURATION_OWNERS: &[(&str, ItemType)] = &[
    ("networkInterfaces", ItemType::NetworkNetworkInterface),
    ("virtualMachineScaleSets", ItemType::ComputeVirtualMachineScaleSet),
    ("loadBalancers", ItemType::NetworkLoadBalancer),
    ("applicationGateways", ItemType::NetworkApplicationGateway),
    ("virtualNetworkGateways", ItemType::NetworkVirtualNetworkGateway),
    ("privateLinkServices", ItemType::NetworkPrivateLinkService),
];
