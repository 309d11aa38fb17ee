use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::de::IgnoredAny;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::PostgreSqlDatabase,
    descriptive_name: "PostgreSQL Database",
    category: Category::Database,
    provider: "Microsoft.DBforPostgreSQL",
    path: &[
        PathSegment::named("flexibleServers"),
        PathSegment::named("databases"),
    ],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::PostgreSqlFlexibleServer],
    iam_permissions: &["Microsoft.DBforPostgreSQL/flexibleServers/databases/read"],
};

pub struct Database;

impl ResourceMapper for Database {
    type Properties = IgnoredAny;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, _resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.parent(ItemType::PostgreSqlFlexibleServer, BlastPropagation::BOTH);
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
    fn test_links_server() {
        let item = map(
            &Database,
            json!({
                "id": rg_id("Microsoft.DBforPostgreSQL/flexibleServers/pg-main/databases/app"),
                "name": "app",
                "type": "Microsoft.DBforPostgreSQL/flexibleServers/databases",
                "properties": {"charset": "UTF8", "collation": "en_US.utf8"}
            }),
            &["pg-main"],
        );

        assert_eq!(item.unique_attribute_value().as_deref(), Some("pg-main|app"));
        assert_eq!(item.attribute("properties.charset"), Some(&json!("UTF8")));
        assert_link(&item, ItemType::PostgreSqlFlexibleServer, QueryMethod::Get, "pg-main", SCOPE, BlastPropagation::BOTH);
    }
}
