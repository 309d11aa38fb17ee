use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{Health, ItemType, LinkedItemQuery};
use serde::de::IgnoredAny;

/// Built-in definitions are visible from every subscription, so these are
/// served per subscription rather than per resource group
static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::AuthorizationRoleDefinition,
    descriptive_name: "Role Definition",
    category: Category::Security,
    provider: "Microsoft.Authorization",
    path: &[PathSegment::named("roleDefinitions")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::Subscription,
    list_filter: None,
    potential_links: &[],
    iam_permissions: &["Microsoft.Authorization/roleDefinitions/read"],
};

pub struct RoleDefinition;

impl ResourceMapper for RoleDefinition {
    type Properties = IgnoredAny;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, _resource: &ArmResource<Self::Properties>, _ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        Vec::new()
    }

    /// Definitions have no provisioning state
    fn health(&self, _resource: &ArmResource<Self::Properties>) -> Option<Health> {
        Some(Health::Ok)
    }
}
