//! Items, queries and links

use super::ItemType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Scope used by the network primitive types (`ip`, `dns`, `http`)
pub const GLOBAL_SCOPE: &str = "global";

/// How a query looks items up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryMethod {
    Get,
    List,
    Search,
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryMethod::Get => "GET",
            QueryMethod::List => "LIST",
            QueryMethod::Search => "SEARCH",
        };
        f.write_str(s)
    }
}

/// A request for items of one type in one scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub method: QueryMethod,
    #[serde(default)]
    pub query: String,
    pub scope: String,
}

impl Query {
    pub fn new(
        item_type: ItemType,
        method: QueryMethod,
        query: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            item_type,
            method,
            query: query.into(),
            scope: scope.into(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {}",
            self.method, self.item_type, self.query, self.scope
        )
    }
}

/// Direction in which a change travels across a link.
///
/// `in_` means a change to the linked item can affect this item, `out` means
/// a change to this item can affect the linked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlastPropagation {
    #[serde(rename = "in")]
    pub in_: bool,
    pub out: bool,
}

impl BlastPropagation {
    pub const fn new(in_: bool, out: bool) -> Self {
        Self { in_, out }
    }

    /// Both directions
    pub const BOTH: BlastPropagation = BlastPropagation::new(true, true);
    /// Only changes in the linked item affect this one
    pub const IN: BlastPropagation = BlastPropagation::new(true, false);
    /// Only changes in this item affect the linked one
    pub const OUT: BlastPropagation = BlastPropagation::new(false, true);
    /// Informational link only
    pub const NONE: BlastPropagation = BlastPropagation::new(false, false);
}

/// A declared edge from an item to other items
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedItemQuery {
    pub query: Query,
    pub blast_propagation: BlastPropagation,
}

impl LinkedItemQuery {
    pub fn new(query: Query, blast_propagation: BlastPropagation) -> Self {
        Self {
            query,
            blast_propagation,
        }
    }

    /// Link by exact lookup
    pub fn get(
        item_type: ItemType,
        query: impl Into<String>,
        scope: impl Into<String>,
        blast_propagation: BlastPropagation,
    ) -> Self {
        Self::new(
            Query::new(item_type, QueryMethod::Get, query, scope),
            blast_propagation,
        )
    }

    /// Link by search
    pub fn search(
        item_type: ItemType,
        query: impl Into<String>,
        scope: impl Into<String>,
        blast_propagation: BlastPropagation,
    ) -> Self {
        Self::new(
            Query::new(item_type, QueryMethod::Search, query, scope),
            blast_propagation,
        )
    }
}

/// Health of an item, derived from the ARM provisioning state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Health {
    Ok,
    Warning,
    Error,
    Pending,
    Unknown,
}

impl Health {
    /// Map an ARM `provisioningState` value
    pub fn from_provisioning_state(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "succeeded" | "ready" | "online" => Health::Ok,
            "creating" | "updating" | "deleting" | "accepted" | "provisioning" | "migrating"
            | "starting" | "stopping" | "restarting" | "dropping" | "scaling" => Health::Pending,
            "failed" | "canceled" | "cancelled" => Health::Error,
            "disabled" | "stopped" | "paused" | "offline" => Health::Warning,
            _ => Health::Unknown,
        }
    }
}

/// A discovered resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub unique_attribute: String,
    pub attributes: Map<String, Value>,
    pub scope: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(default)]
    pub linked_item_queries: Vec<LinkedItemQuery>,
}

impl Item {
    /// Value of the unique attribute, rendered as a string
    pub fn unique_attribute_value(&self) -> Option<String> {
        match self.attributes.get(&self.unique_attribute)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// `{type}.{scope}.{unique value}`, unique across every source
    pub fn globally_unique_name(&self) -> Option<String> {
        let value = self.unique_attribute_value()?;
        Some(format!("{}.{}.{}", self.item_type, self.scope, value))
    }

    /// Look up an attribute with a dot-separated path
    pub fn attribute(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.attributes.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    /// Add a link unless an identical one is already present
    pub fn add_link(&mut self, link: LinkedItemQuery) {
        if !self.linked_item_queries.contains(&link) {
            self.linked_item_queries.push(link);
        }
    }

    /// Linked queries that point at `item_type`
    pub fn links_to(&self, item_type: ItemType) -> impl Iterator<Item = &LinkedItemQuery> {
        self.linked_item_queries
            .iter()
            .filter(move |l| l.query.item_type == item_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> Item {
        let attributes = json!({
            "name": "vm-1",
            "properties": {
                "networkProfile": {
                    "networkInterfaces": [{"id": "nic-a"}, {"id": "nic-b"}]
                }
            }
        });
        Item {
            item_type: ItemType::ComputeVirtualMachine,
            unique_attribute: "name".to_string(),
            attributes: attributes.as_object().cloned().unwrap(),
            scope: "sub.rg".to_string(),
            tags: BTreeMap::new(),
            health: None,
            linked_item_queries: Vec::new(),
        }
    }

    #[test]
    fn test_unique_attribute_value() {
        let item = sample_item();
        assert_eq!(item.unique_attribute_value().as_deref(), Some("vm-1"));
        assert_eq!(
            item.globally_unique_name().as_deref(),
            Some("azure-compute-virtual-machine.sub.rg.vm-1")
        );
    }

    #[test]
    fn test_empty_unique_value_is_missing() {
        let mut item = sample_item();
        item.attributes.insert("name".to_string(), json!(""));
        assert!(item.unique_attribute_value().is_none());
        assert!(item.globally_unique_name().is_none());
    }

    #[test]
    fn test_attribute_path_walks_arrays() {
        let item = sample_item();
        assert_eq!(
            item.attribute("properties.networkProfile.networkInterfaces.1.id"),
            Some(&json!("nic-b"))
        );
        assert!(item.attribute("properties.missing").is_none());
    }

    #[test]
    fn test_add_link_deduplicates() {
        let mut item = sample_item();
        let link = LinkedItemQuery::get(
            ItemType::ComputeDisk,
            "disk-1",
            "sub.rg",
            BlastPropagation::BOTH,
        );
        item.add_link(link.clone());
        item.add_link(link);
        assert_eq!(item.linked_item_queries.len(), 1);
        assert_eq!(item.links_to(ItemType::ComputeDisk).count(), 1);
    }

    #[test]
    fn test_health_from_provisioning_state() {
        assert_eq!(Health::from_provisioning_state("Succeeded"), Health::Ok);
        assert_eq!(Health::from_provisioning_state("Updating"), Health::Pending);
        assert_eq!(Health::from_provisioning_state("Failed"), Health::Error);
        assert_eq!(Health::from_provisioning_state("Canceled"), Health::Error);
        assert_eq!(Health::from_provisioning_state("Weird"), Health::Unknown);
    }

    #[test]
    fn test_blast_propagation_serializes_in_field() {
        let json = serde_json::to_value(BlastPropagation::IN).unwrap();
        assert_eq!(json, json!({"in": true, "out": false}));
    }

    #[test]
    fn test_query_display() {
        let query = Query::new(ItemType::SqlDatabase, QueryMethod::Get, "srv|db", "s.rg");
        assert_eq!(query.to_string(), "GET azure-sql-database srv|db @ s.rg");
    }
}
