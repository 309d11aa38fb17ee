//! Static resource type descriptions

use crate::azure::resource_id::QUERY_SEPARATOR;
use crate::scope::{Scope, ScopeKind};
use crate::sdp::ItemType;
use serde::Serialize;

/// Broad grouping of resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Compute,
    Network,
    Storage,
    Security,
    Database,
    Configuration,
}

/// One `{collection}/{name}` pair of an ARM resource path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment {
    pub collection: &'static str,
    /// Set for singleton segments such as `blobServices/default`
    pub fixed_name: Option<&'static str>,
}

impl PathSegment {
    pub const fn named(collection: &'static str) -> Self {
        Self {
            collection,
            fixed_name: None,
        }
    }

    pub const fn fixed(collection: &'static str, name: &'static str) -> Self {
        Self {
            collection,
            fixed_name: Some(name),
        }
    }
}

/// Everything needed to fetch and describe one resource type
#[derive(Debug)]
pub struct ResourceDef {
    pub item_type: ItemType,
    pub descriptive_name: &'static str,
    pub category: Category,
    /// Provider namespace, e.g. `Microsoft.Compute`
    pub provider: &'static str,
    pub path: &'static [PathSegment],
    pub api_version: &'static str,
    pub scope_kind: ScopeKind,
    /// `$filter` added to list requests
    pub list_filter: Option<&'static str>,
    pub potential_links: &'static [ItemType],
    pub iam_permissions: &'static [&'static str],
}

impl ResourceDef {
    /// Segments whose names come from the query
    pub fn named_segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.path.iter().filter(|s| s.fixed_name.is_none())
    }

    /// Number of names in a Get query
    pub fn name_parts(&self) -> usize {
        self.named_segments().count()
    }

    /// Child resources are fetched by parent, not listed per scope
    pub fn is_child(&self) -> bool {
        self.name_parts() > 1
    }

    pub fn unique_attribute(&self) -> &'static str {
        if self.is_child() {
            "uniqueAttr"
        } else {
            "name"
        }
    }

    /// Human description of the Get query, e.g. `servers|databases`
    pub fn get_format(&self) -> String {
        self.named_segments()
            .map(|s| s.collection)
            .collect::<Vec<_>>()
            .join(QUERY_SEPARATOR)
    }

    /// Human description of the Search query for child types
    pub fn search_format(&self) -> Option<String> {
        if !self.is_child() {
            return None;
        }
        let parents: Vec<&str> = self
            .named_segments()
            .map(|s| s.collection)
            .collect();
        Some(parents[..parents.len() - 1].join(QUERY_SEPARATOR))
    }

    /// ARM path for a resource (all names given) or its collection (last name omitted)
    pub fn resource_path(&self, scope: &Scope, names: &[&str]) -> String {
        let mut path = format!("{}/providers/{}", scope.arm_path(), self.provider);
        let mut names = names.iter();

        for segment in self.path {
            path.push('/');
            path.push_str(segment.collection);
            let name = match segment.fixed_name {
                Some(fixed) => fixed.to_string(),
                None => match names.next() {
                    Some(name) => urlencoding::encode(name).into_owned(),
                    None => break,
                },
            };
            path.push('/');
            path.push_str(&name);
        }

        path
    }
}
