use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper, SubResource};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ComputeAvailabilitySet,
    descriptive_name: "Availability Set",
    category: Category::Compute,
    provider: "Microsoft.Compute",
    path: &[PathSegment::named("availabilitySets")],
    api_version: "2024-07-01",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::ComputeVirtualMachine,
        ItemType::ComputeProximityPlacementGroup,
    ],
    iam_permissions: &["Microsoft.Compute/availabilitySets/read"],
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySetProperties {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    virtual_machines: Vec<SubResource>,
    #[serde(default)]
    proximity_placement_group: Option<SubResource>,
}

pub struct AvailabilitySet;

impl ResourceMapper for AvailabilitySet {
    type Properties = AvailabilitySetProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        for vm in &props.virtual_machines {
            // Fault and update domains are shared by every member
            links.by_id(ItemType::ComputeVirtualMachine, vm.id(), &["virtualMachines"], BlastPropagation::OUT);
        }
        links.by_id(
            ItemType::ComputeProximityPlacementGroup,
            props.proximity_placement_group.as_ref().and_then(|p| p.id()),
            &["proximityPlacementGroups"],
            BlastPropagation::IN,
        );

        links.into_vec()
    }
}
