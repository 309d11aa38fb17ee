//! ARM resource IDs
//!
//! Resource IDs look like
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{type}/{name}...]`.
//! The helpers here pull names, scopes and path parameters out of them so
//! adapters can turn a referenced ID into a linked item query.

use std::fmt;
use std::str::FromStr;

/// Separator used to join the names of a child resource and its parents
pub const QUERY_SEPARATOR: &str = "|";

/// Error parsing a resource ID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceIdError {
    #[error("resource id is empty")]
    Empty,
    #[error("resource id '{id}' has no value after '{segment}'")]
    MissingValue { id: String, segment: String },
}

/// A parsed ARM resource ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    /// Provider namespace of the innermost resource, e.g. `Microsoft.Compute`
    pub provider: Option<String>,
    /// `(type, name)` pairs following the provider namespace, outermost first
    pub resources: Vec<(String, String)>,
}

impl ResourceId {
    pub fn parse(id: &str) -> Result<Self, ResourceIdError> {
        let segments: Vec<&str> = id.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(ResourceIdError::Empty);
        }

        let missing = |segment: &str| ResourceIdError::MissingValue {
            id: id.to_string(),
            segment: segment.to_string(),
        };

        let mut parsed = ResourceId {
            subscription_id: None,
            resource_group: None,
            provider: None,
            resources: Vec::new(),
        };

        let mut i = 0;
        while i < segments.len() {
            let segment = segments[i];
            if segment.eq_ignore_ascii_case("subscriptions") && parsed.provider.is_none() {
                let value = segments.get(i + 1).ok_or_else(|| missing(segment))?;
                parsed.subscription_id = Some(value.to_string());
                i += 2;
            } else if segment.eq_ignore_ascii_case("resourceGroups") && parsed.provider.is_none() {
                let value = segments.get(i + 1).ok_or_else(|| missing(segment))?;
                parsed.resource_group = Some(value.to_string());
                i += 2;
            } else if segment.eq_ignore_ascii_case("providers") {
                // Extension resources repeat `providers`; the innermost wins.
                let value = segments.get(i + 1).ok_or_else(|| missing(segment))?;
                parsed.provider = Some(value.to_string());
                parsed.resources.clear();
                i += 2;
            } else {
                let value = segments.get(i + 1).ok_or_else(|| missing(segment))?;
                parsed
                    .resources
                    .push((segment.to_string(), value.to_string()));
                i += 2;
            }
        }

        Ok(parsed)
    }

    /// Name of the innermost resource
    pub fn name(&self) -> Option<&str> {
        self.resources
            .last()
            .map(|(_, name)| name.as_str())
            .or(self.resource_group.as_deref())
            .or(self.subscription_id.as_deref())
    }

    /// Names of all nested resources, outermost first
    pub fn names(&self) -> Vec<&str> {
        self.resources.iter().map(|(_, name)| name.as_str()).collect()
    }

    /// Item scope this resource lives in
    pub fn scope(&self) -> Option<String> {
        let sub = self.subscription_id.as_deref()?;
        Some(match self.resource_group.as_deref() {
            Some(rg) => format!("{}.{}", sub, rg),
            None => sub.to_string(),
        })
    }
}

impl FromStr for ResourceId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceId::parse(s)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sub) = &self.subscription_id {
            write!(f, "/subscriptions/{}", sub)?;
        }
        if let Some(rg) = &self.resource_group {
            write!(f, "/resourceGroups/{}", rg)?;
        }
        if let Some(provider) = &self.provider {
            write!(f, "/providers/{}", provider)?;
        }
        for (resource_type, name) in &self.resources {
            write!(f, "/{}/{}", resource_type, name)?;
        }
        Ok(())
    }
}

/// Last non-empty segment of a resource ID
pub fn extract_resource_name(id: &str) -> Option<&str> {
    id.split('/').filter(|s| !s.is_empty()).last()
}

/// Values following each of `keys` in the ID, in the order of `keys`.
///
/// Returns `None` unless every key is present and followed by a value.
/// Keys match case-insensitively and only in key position, so a resource
/// group called `disks` is never mistaken for the `disks` segment.
pub fn extract_path_params(id: &str, keys: &[&str]) -> Option<Vec<String>> {
    let segments: Vec<&str> = id.split('/').filter(|s| !s.is_empty()).collect();
    keys.iter()
        .map(|key| {
            let pos = segments
                .iter()
                .step_by(2)
                .position(|s| s.eq_ignore_ascii_case(key))?;
            segments.get(pos * 2 + 1).map(|v| v.to_string())
        })
        .collect()
}

/// `{subscription}.{resourceGroup}`, or `{subscription}` when the ID has no resource group
pub fn extract_scope(id: &str) -> Option<String> {
    let sub = extract_subscription_id(id)?;
    Some(match extract_resource_group(id) {
        Some(rg) => format!("{}.{}", sub, rg),
        None => sub,
    })
}

pub fn extract_subscription_id(id: &str) -> Option<String> {
    extract_path_params(id, &["subscriptions"]).and_then(|mut v| v.pop())
}

pub fn extract_resource_group(id: &str) -> Option<String> {
    extract_path_params(id, &["resourceGroups"]).and_then(|mut v| v.pop())
}

/// Join names into a composite lookup key
pub fn composite_key<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(QUERY_SEPARATOR)
}

/// Split a composite lookup key, requiring exactly `expected` non-empty parts
pub fn split_composite_key(query: &str, expected: usize) -> Option<Vec<&str>> {
    let parts: Vec<&str> = query.split(QUERY_SEPARATOR).collect();
    if parts.len() != expected || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}
