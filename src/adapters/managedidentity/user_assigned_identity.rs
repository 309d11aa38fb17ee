use crate::adapters::{ArmResource, Category, LinkContext, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{ItemType, LinkedItemQuery};
use serde::de::IgnoredAny;

/// Resources point at the identities they use, not the other way round, so
/// an identity has no outgoing links of its own.
static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::ManagedIdentityUserAssignedIdentity,
    descriptive_name: "User Assigned Identity",
    category: Category::Security,
    provider: "Microsoft.ManagedIdentity",
    path: &[PathSegment::named("userAssignedIdentities")],
    api_version: "2023-01-31",
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[],
    iam_permissions: &["Microsoft.ManagedIdentity/userAssignedIdentities/read"],
};

pub struct UserAssignedIdentity;

impl ResourceMapper for UserAssignedIdentity {
    type Properties = IgnoredAny;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, _resource: &ArmResource<Self::Properties>, _ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        Vec::new()
    }
}
