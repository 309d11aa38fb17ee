use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::NetworkNetworkSecurityGroup,
    descriptive_name: "Network Security Group",
    category: Category::Security,
    provider: "Microsoft.Network",
    path: &[PathSegment::named("networkSecurityGroups")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::NetworkNetworkInterface,
        ItemType::NetworkSubnet,
        ItemType::NetworkApplicationSecurityGroup,
        ItemType::Ip,
    ],
    iam_permissions: &["Microsoft.Network/networkSecurityGroups/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSecurityGroupProperties {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    security_rules: Vec<SecurityRule>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    network_interfaces: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    subnets: Vec<SubResource>,
}

#[derive(Debug, Default, Deserialize)]
struct SecurityRule {
    #[serde(default)]
    properties: Option<SecurityRuleProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecurityRuleProperties {
    #[serde(default)]
    source_address_prefix: Option<String>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    source_address_prefixes: Vec<String>,
    #[serde(default)]
    destination_address_prefix: Option<String>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    destination_address_prefixes: Vec<String>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    source_application_security_groups: Vec<SubResource>,
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    destination_application_security_groups: Vec<SubResource>,
}

impl SecurityRuleProperties {
    fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.source_address_prefix
            .iter()
            .chain(&self.source_address_prefixes)
            .chain(&self.destination_address_prefix)
            .chain(&self.destination_address_prefixes)
            .map(String::as_str)
    }
}

/// Service tags and wildcards are not addresses
fn is_address(prefix: &str) -> bool {
    prefix
        .split('/')
        .next()
        .is_some_and(|addr| addr.parse::<std::net::IpAddr>().is_ok())
}

pub struct NetworkSecurityGroup;

impl ResourceMapper for NetworkSecurityGroup {
    type Properties = NetworkSecurityGroupProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        // Rule changes hit everything the group is attached to
        for nic in &props.network_interfaces {
            links.by_id(ItemType::NetworkNetworkInterface, nic.id(), &["networkInterfaces"], BlastPropagation::OUT);
        }
        for subnet in &props.subnets {
            links.by_id(ItemType::NetworkSubnet, subnet.id(), &["virtualNetworks", "subnets"], BlastPropagation::OUT);
        }

        for rule in props.security_rules.iter().filter_map(|r| r.properties.as_ref()) {
            let groups = rule
                .source_application_security_groups
                .iter()
                .chain(&rule.destination_application_security_groups);
            for asg in groups {
                links.by_id(
                    ItemType::NetworkApplicationSecurityGroup,
                    asg.id(),
                    &["applicationSecurityGroups"],
                    BlastPropagation::IN,
                );
            }
            for prefix in rule.prefixes().filter(|p| is_address(p)) {
                links.ip_rule(Some(prefix), BlastPropagation::IN);
            }
        }

        links.into_vec()
    }
}
