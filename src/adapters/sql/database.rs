use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, Health, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::SqlDatabase,
    descriptive_name: "SQL Database",
    category: Category::Database,
    provider: "Microsoft.Sql",
    path: &[PathSegment::named("servers"), PathSegment::named("databases")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[
        ItemType::SqlServer,
        ItemType::SqlElasticPool,
        ItemType::SqlDatabase,
        ItemType::ManagedIdentityUserAssignedIdentity,
    ],
    iam_permissions: &["Microsoft.Sql/servers/databases/read"],
};

const SERVER_DATABASE: &[&str] = &["servers", "databases"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseProperties {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    elastic_pool_id: Option<String>,
    /// Set on copies, restores and secondaries
    #[serde(default)]
    source_database_id: Option<String>,
}

pub struct Database;

impl ResourceMapper for Database {
    type Properties = DatabaseProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.parent(ItemType::SqlServer, BlastPropagation::BOTH);

        let Some(props) = &resource.properties else {
            return links.into_vec();
        };

        // The pool supplies the database's compute
        links
            .by_id(
                ItemType::SqlElasticPool,
                props.elastic_pool_id.as_deref(),
                &["servers", "elasticPools"],
                BlastPropagation::IN,
            )
            .by_id(
                ItemType::SqlDatabase,
                props.source_database_id.as_deref(),
                SERVER_DATABASE,
                BlastPropagation::IN,
            );

        links.into_vec()
    }

    /// Databases report `status`, e.g. `Online` or `Paused`
    fn health(&self, resource: &ArmResource<Self::Properties>) -> Option<Health> {
        let status = resource.properties.as_ref()?.status.as_deref()?;
        Some(match status {
            "Online" => Health::Ok,
            "Creating" | "Copying" | "Restoring" | "Recovering" | "Scaling" | "Pausing"
            | "Resuming" | "OnlineChangingDwPerformanceTiers" | "Starting" | "Stopping" => {
                Health::Pending
            }
            "Paused" | "AutoClosed" | "Disabled" | "Offline" | "Stopped" | "Inaccessible"
            | "Standby" => Health::Warning,
            "EmergencyMode" | "Suspect" | "Shutdown" | "OfflineSecondary"
            | "OfflineChangingDwPerformanceTiers" | "RecoveryPending" => Health::Error,
            _ => Health::Unknown,
        })
    }
}
