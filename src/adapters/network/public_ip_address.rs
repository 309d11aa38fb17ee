use super::{API_VERSION, IP_CONFIGURATION_OWNERS};
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkPublicIpAddress,
    descriptive_name: "Public IP Address",
    category: Category::Network,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("publicIPAddresses")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkNetworkInterface,
        ItemType::ComputeVirtualMachineScaleSet,
        ItemType::NetworkLoadBalancer,
        ItemType::NetworkApplicationGateway,
        ItemType::NetworkVirtualNetworkGateway,
        ItemType::NetworkPrivateLinkService,
        ItemType::NetworkNatGateway,
        ItemType::NetworkPublicIpPrefix,
        ItemType::NetworkDdosProtectionPlan,
        ItemType::Ip,
        ItemType::Dns,
    ],
    iam_permissions: &["Microsoft.Network/publicIPAddresses/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressProperties {
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    dns_settings: Option<DnsSettings>,
    #[serde(default)]
    ip_configuration: Option<SubResource>,
    #[serde(default)]
    nat_gateway: Option<SubResource>,
    #[serde(default, rename = "publicIPPrefix")]
    public_ip_prefix: Option<SubResource>,
    #[serde(default)]
    ddos_settings: Option<DdosSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DnsSettings {
    #[serde(default)]
    fqdn: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DdosSettings {
    #[serde(default)]
    ddos_protection_plan: Option<SubResource>,
}

pub struct PublicIpAddress;

impl ResourceMapper for PublicIpAddress {
    type Properties = PublicIpAddressProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        links
            .ip(props.ip_address.as_deref(), BlastPropagation::BOTH)
            .dns(props.dns_settings.as_ref().and_then(|d| d.fqdn.as_deref()), BlastPropagation::BOTH)
            .by_resource_type(
                props.ip_configuration.as_ref().and_then(|c| c.id()),
                IP_CONFIGURATION_OWNERS,
                BlastPropagation::BOTH,
            )
            .by_id(
                ItemType::NetworkNatGateway,
                props.nat_gateway.as_ref().and_then(|n| n.id()),
                &["natGateways"],
                BlastPropagation::BOTH,
            )
            .by_id(
                ItemType::NetworkPublicIpPrefix,
                props.public_ip_prefix.as_ref().and_then(|p| p.id()),
                &["publicIPPrefixes"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::NetworkDdosProtectionPlan,
                props
                    .ddos_settings
                    .as_ref()
                    .and_then(|d| d.ddos_protection_plan.as_ref())
                    .and_then(|p| p.id()),
                &["ddosProtectionPlans"],
                BlastPropagation::IN,
            );

        links.into_vec()
    }
}
