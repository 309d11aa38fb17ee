//! Scopes
//!
//! A scope names the Azure location a resource or query applies to:
//! `{subscriptionId}.{resourceGroup}` for resource-group level resources and
//! `{subscriptionId}` for subscription level resources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scope that matches every scope an adapter serves
pub const WILDCARD_SCOPE: &str = "*";

/// Whether a resource type lives in a resource group or directly in a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    ResourceGroup,
    Subscription,
}

/// A parsed scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Subscription {
        subscription_id: String,
    },
    ResourceGroup {
        subscription_id: String,
        resource_group: String,
    },
}

impl Scope {
    pub fn subscription(subscription_id: impl Into<String>) -> Self {
        Scope::Subscription {
            subscription_id: subscription_id.into(),
        }
    }

    pub fn resource_group(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        Scope::ResourceGroup {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
        }
    }

    pub fn subscription_id(&self) -> &str {
        match self {
            Scope::Subscription { subscription_id } => subscription_id,
            Scope::ResourceGroup {
                subscription_id, ..
            } => subscription_id,
        }
    }

    pub fn resource_group_name(&self) -> Option<&str> {
        match self {
            Scope::Subscription { .. } => None,
            Scope::ResourceGroup { resource_group, .. } => Some(resource_group),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Subscription { .. } => ScopeKind::Subscription,
            Scope::ResourceGroup { .. } => ScopeKind::ResourceGroup,
        }
    }

    /// ARM path prefix for this scope, e.g. `/subscriptions/x/resourceGroups/y`
    pub fn arm_path(&self) -> String {
        match self {
            Scope::Subscription { subscription_id } => format!("/subscriptions/{}", subscription_id),
            Scope::ResourceGroup {
                subscription_id,
                resource_group,
            } => format!(
                "/subscriptions/{}/resourceGroups/{}",
                subscription_id,
                urlencoding::encode(resource_group)
            ),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Subscription { subscription_id } => f.write_str(subscription_id),
            Scope::ResourceGroup {
                subscription_id,
                resource_group,
            } => write!(f, "{}.{}", subscription_id, resource_group),
        }
    }
}

/// Error for a scope string that cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scope '{0}'")]
pub struct InvalidScope(pub String);

impl FromStr for Scope {
    type Err = InvalidScope;

    /// Splits on the first `.`: subscription ids never contain one, resource
    /// group names may.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == WILDCARD_SCOPE {
            return Err(InvalidScope(s.to_string()));
        }

        match s.split_once('.') {
            None => Ok(Scope::subscription(s)),
            Some((sub, rg)) if !sub.is_empty() && !rg.is_empty() => {
                Ok(Scope::resource_group(sub, rg))
            }
            Some(_) => Err(InvalidScope(s.to_string())),
        }
    }
}
