use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::Deserialize;

/// Listing uses `atScope()` so the resource group's view includes
/// assignments inherited from the subscription; items keep the queried scope.
static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::AuthorizationRoleAssignment,
    descriptive_name: "Role Assignment",
    category: Category::Security,
    provider: "Microsoft.Authorization",
    path: &[PathSegment::named("roleAssignments")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: Some("atScope()"),
    potential_links: &[
        ItemType::AuthorizationRoleDefinition,
        ItemType::ManagedIdentityUserAssignedIdentity,
        ItemType::StorageAccount,
        ItemType::KeyVaultVault,
        ItemType::SqlServer,
        ItemType::PostgreSqlFlexibleServer,
        ItemType::DocumentDbDatabaseAccount,
        ItemType::ComputeVirtualMachine,
        ItemType::NetworkVirtualNetwork,
    ],
    iam_permissions: &["Microsoft.Authorization/roleAssignments/read"],
};

/// Resources an assignment can be scoped to that have adapters here
const ASSIGNABLE_RESOURCES: &[(&str, ItemType)] = &[
    ("Microsoft.Storage/storageAccounts", ItemType::StorageAccount),
    ("Microsoft.KeyVault/vaults", ItemType::KeyVaultVault),
    ("Microsoft.Sql/servers", ItemType::SqlServer),
    ("Microsoft.DBforPostgreSQL/flexibleServers", ItemType::PostgreSqlFlexibleServer),
    ("Microsoft.DocumentDB/databaseAccounts", ItemType::DocumentDbDatabaseAccount),
    ("Microsoft.Compute/virtualMachines", ItemType::ComputeVirtualMachine),
    ("Microsoft.Network/virtualNetworks", ItemType::NetworkVirtualNetwork),
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentProperties {
    #[serde(default)]
    role_definition_id: Option<String>,
    /// ARM path the assignment grants access to
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    delegated_managed_identity_resource_id: Option<String>,
}

pub struct RoleAssignment;

impl ResourceMapper for RoleAssignment {
    type Properties = RoleAssignmentProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        // Deleting the definition voids the assignment; the assignment never
        // changes the definition
        links
            .by_id(
                ItemType::AuthorizationRoleDefinition,
                props.role_definition_id.as_deref(),
                &["roleDefinitions"],
                BlastPropagation::IN,
            )
            .by_resource_type(props.scope.as_deref(), ASSIGNABLE_RESOURCES, BlastPropagation::OUT)
            .by_id(
                ItemType::ManagedIdentityUserAssignedIdentity,
                props.delegated_managed_identity_resource_id.as_deref(),
                &["userAssignedIdentities"],
                BlastPropagation::IN,
            );

        links.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{assert_link, map, rg_id, SCOPE, SUB};
    use crate::sdp::QueryMethod;
    use serde_json::json;

    #[test]
    fn test_links_definition_at_subscription_scope() {
        let item = map(
            &RoleAssignment,
            json!({
                "id": format!("/subscriptions/{}/providers/Microsoft.Authorization/roleAssignments/6f1f0c1a", SUB),
                "name": "6f1f0c1a",
                "type": "Microsoft.Authorization/roleAssignments",
                "properties": {
                    "roleDefinitionId": format!("/subscriptions/{}/providers/Microsoft.Authorization/roleDefinitions/ba92f5b4-2d11-453d-a403-e96b0029c9fe", SUB),
                    "principalId": "0b4c1f2e",
                    "principalType": "ServicePrincipal",
                    "scope": format!("/subscriptions/{}", SUB)
                }
            }),
            &[],
        );

        // Inherited assignments keep the scope they were queried in
        assert_eq!(item.scope, SCOPE);
        assert_link(
            &item,
            ItemType::AuthorizationRoleDefinition,
            QueryMethod::Get,
            "ba92f5b4-2d11-453d-a403-e96b0029c9fe",
            SUB,
            BlastPropagation::IN,
        );
        assert_eq!(item.linked_item_queries.len(), 1);
    }

    #[test]
    fn test_links_assigned_resource() {
        let item = map(
            &RoleAssignment,
            json!({
                "name": "a1",
                "properties": {
                    "roleDefinitionId": "/providers/Microsoft.Authorization/roleDefinitions/ba92f5b4",
                    "scope": rg_id("Microsoft.Storage/storageAccounts/stweb")
                }
            }),
            &[],
        );

        // Tenant-level definition ids carry no subscription
        assert_link(&item, ItemType::AuthorizationRoleDefinition, QueryMethod::Get, "ba92f5b4", SUB, BlastPropagation::IN);
        assert_link(&item, ItemType::StorageAccount, QueryMethod::Get, "stweb", SCOPE, BlastPropagation::OUT);
    }
}
