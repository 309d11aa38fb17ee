//! Helpers for mapper tests

use super::{to_item, ResourceMapper};
use crate::sdp::{BlastPropagation, Item, ItemType, LinkedItemQuery, QueryMethod};
use serde_json::Value;

pub(crate) const SUB: &str = "00000000-0000-0000-0000-000000000001";
pub(crate) const SCOPE: &str = "00000000-0000-0000-0000-000000000001.rg-test";

/// ARM id in the test resource group
pub(crate) fn rg_id(rest: &str) -> String {
    format!("/subscriptions/{}/resourceGroups/rg-test/providers/{}", SUB, rest)
}

/// Map a resource and check that every link targets a declared potential link
pub(crate) fn map<M: ResourceMapper>(mapper: &M, value: Value, parents: &[&str]) -> Item {
    let item = to_item(mapper, value, SCOPE, parents).expect("resource should map");
    let declared = mapper.definition().potential_links;
    for link in &item.linked_item_queries {
        assert!(
            declared.contains(&link.query.item_type),
            "{} links to undeclared type {}",
            item.item_type,
            link.query.item_type
        );
    }
    item
}

pub(crate) fn find_link<'a>(
    item: &'a Item,
    item_type: ItemType,
    query: &str,
) -> Option<&'a LinkedItemQuery> {
    item.linked_item_queries
        .iter()
        .find(|l| l.query.item_type == item_type && l.query.query == query)
}

#[track_caller]
pub(crate) fn assert_link(
    item: &Item,
    item_type: ItemType,
    method: QueryMethod,
    query: &str,
    scope: &str,
    blast: BlastPropagation,
) {
    let Some(link) = find_link(item, item_type, query) else {
        panic!(
            "missing link to {} '{}', have: {:#?}",
            item_type, query, item.linked_item_queries
        );
    };
    assert_eq!(link.query.method, method, "method of link to {}", item_type);
    assert_eq!(link.query.scope, scope, "scope of link to {}", item_type);
    assert_eq!(link.blast_propagation, blast, "blast of link to {}", item_type);
}
