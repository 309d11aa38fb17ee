//! Blob containers, file shares, queues and tables
//!
//! Each lives under the account's single `default` service, e.g.
//! `storageAccounts/{account}/blobServices/default/containers/{name}`, so a
//! query only names the account and the child.

use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery};
use serde::de::IgnoredAny;

static BLOB_CONTAINER: ResourceDef = ResourceDef {
    item_type: ItemType::StorageBlobContainer,
    descriptive_name: "Blob Container",
    category: Category::Storage,
    provider: "Microsoft.Storage",
    path: &[
        PathSegment::named("storageAccounts"),
        PathSegment::fixed("blobServices", "default"),
        PathSegment::named("containers"),
    ],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::StorageAccount],
    iam_permissions: &["Microsoft.Storage/storageAccounts/blobServices/containers/read"],
};

static FILE_SHARE: ResourceDef = ResourceDef {
    item_type: ItemType::StorageFileShare,
    descriptive_name: "File Share",
    category: Category::Storage,
    provider: "Microsoft.Storage",
    path: &[
        PathSegment::named("storageAccounts"),
        PathSegment::fixed("fileServices", "default"),
        PathSegment::named("shares"),
    ],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::StorageAccount],
    iam_permissions: &["Microsoft.Storage/storageAccounts/fileServices/shares/read"],
};

static QUEUE: ResourceDef = ResourceDef {
    item_type: ItemType::StorageQueue,
    descriptive_name: "Storage Queue",
    category: Category::Storage,
    provider: "Microsoft.Storage",
    path: &[
        PathSegment::named("storageAccounts"),
        PathSegment::fixed("queueServices", "default"),
        PathSegment::named("queues"),
    ],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::StorageAccount],
    iam_permissions: &["Microsoft.Storage/storageAccounts/queueServices/queues/read"],
};

static TABLE: ResourceDef = ResourceDef {
    item_type: ItemType::StorageTable,
    descriptive_name: "Storage Table",
    category: Category::Storage,
    provider: "Microsoft.Storage",
    path: &[
        PathSegment::named("storageAccounts"),
        PathSegment::fixed("tableServices", "default"),
        PathSegment::named("tables"),
    ],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::StorageAccount],
    iam_permissions: &["Microsoft.Storage/storageAccounts/tableServices/tables/read"],
};

/// Data lives in the account; deleting either side loses it
fn link_account(ctx: &LinkContext) -> Vec<LinkedItemQuery> {
    let mut links = Links::new(ctx);
    links.parent(ItemType::StorageAccount, BlastPropagation::BOTH);
    links.into_vec()
}

macro_rules! storage_child {
    ($(#[$meta:meta])* $name:ident, $def:ident) => {
        $(#[$meta])*
        pub struct $name;

        impl ResourceMapper for $name {
            type Properties = IgnoredAny;

            fn definition(&self) -> &'static ResourceDef {
                &$def
            }

            fn link(&self, _resource: &ArmResource<IgnoredAny>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
                link_account(ctx)
            }
        }
    };
}

storage_child!(BlobContainer, BLOB_CONTAINER);
storage_child!(FileShare, FILE_SHARE);
storage_child!(Queue, QUEUE);
storage_child!(Table, TABLE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{assert_link, map, rg_id, SCOPE};
    use crate::scope::Scope;
    use crate::sdp::QueryMethod;
    use serde_json::json;

    #[test]
    fn test_container_links_account() {
        let item = map(
            &BlobContainer,
            json!({
                "id": rg_id("Microsoft.Storage/storageAccounts/stweb/blobServices/default/containers/logs"),
                "name": "logs",
                "type": "Microsoft.Storage/storageAccounts/blobServices/containers",
                "properties": {"publicAccess": "None", "leaseState": "Available"}
            }),
            &["stweb"],
        );

        assert_eq!(item.unique_attribute, "uniqueAttr");
        assert_eq!(item.unique_attribute_value().as_deref(), Some("stweb|logs"));
        assert_eq!(item.health, None);
        assert_link(&item, ItemType::StorageAccount, QueryMethod::Get, "stweb", SCOPE, BlastPropagation::BOTH);
    }

    #[test]
    fn test_queue_and_table_use_their_own_service() {
        let scope = Scope::resource_group("s", "rg");
        assert_eq!(
            QUEUE.resource_path(&scope, &["acct", "jobs"]),
            "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct/queueServices/default/queues/jobs"
        );
        assert_eq!(
            TABLE.resource_path(&scope, &["acct"]),
            "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct/tableServices/default/tables"
        );
        assert_eq!(FILE_SHARE.search_format().as_deref(), Some("storageAccounts"));
    }

    #[test]
    fn test_share_maps_without_properties() {
        let item = map(&FileShare, json!({"name": "profiles"}), &["stweb"]);
        assert_eq!(item.unique_attribute_value().as_deref(), Some("stweb|profiles"));
        assert_eq!(item.linked_item_queries.len(), 1);
    }
}
