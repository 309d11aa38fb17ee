//! Building linked item queries from resource references

use crate::azure::resource_id::{composite_key, extract_path_params, extract_scope, ResourceId};
use crate::sdp::{BlastPropagation, ItemType, LinkedItemQuery, GLOBAL_SCOPE};

/// What a mapper knows about the item it is linking from
#[derive(Debug, Clone)]
pub struct LinkContext {
    /// Scope of the item being built
    pub scope: String,
    /// Name parts of the item, outermost parent first
    pub names: Vec<String>,
}

impl LinkContext {
    pub fn new(scope: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            scope: scope.into(),
            names,
        }
    }

    /// Composite key of the item, usable as a Search query for its children
    pub fn key(&self) -> String {
        composite_key(&self.names)
    }

    pub fn subscription_id(&self) -> &str {
        self.scope.split('.').next().unwrap_or(&self.scope)
    }
}

/// Scope a target lives in, given a resource ID that points at it
fn target_scope(target: ItemType, id: &str, fallback: &str) -> String {
    if target == ItemType::AuthorizationRoleDefinition {
        let parsed = ResourceId::parse(id).ok();
        return parsed
            .and_then(|p| p.subscription_id)
            .unwrap_or_else(|| fallback.split('.').next().unwrap_or(fallback).to_string());
    }
    extract_scope(id).unwrap_or_else(|| fallback.to_string())
}

/// Address of a CIDR rule that covers exactly one host
fn single_address(rule: &str) -> Option<&str> {
    match rule.split_once('/') {
        None => Some(rule),
        Some((addr, "32")) | Some((addr, "128")) => Some(addr),
        Some(_) => None,
    }
}

/// Collects links for one item
pub struct Links<'a> {
    ctx: &'a LinkContext,
    links: Vec<LinkedItemQuery>,
}

impl<'a> Links<'a> {
    pub fn new(ctx: &'a LinkContext) -> Self {
        Self {
            ctx,
            links: Vec::new(),
        }
    }

    fn push(&mut self, link: LinkedItemQuery) {
        if !self.links.contains(&link) {
            self.links.push(link);
        }
    }

    /// Link to the resource with ARM `id`, taking the query from the path
    /// segments following `keys` (one key for top-level resources, one per
    /// level for child resources).
    pub fn by_id(
        &mut self,
        target: ItemType,
        id: Option<&str>,
        keys: &[&str],
        blast: BlastPropagation,
    ) -> &mut Self {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return self;
        };
        match extract_path_params(id, keys) {
            Some(names) => {
                let scope = target_scope(target, id, &self.ctx.scope);
                self.push(LinkedItemQuery::get(target, composite_key(&names), scope, blast));
            }
            None => tracing::debug!("could not link {} from id {}", target, id),
        }
        self
    }

    /// Link an ID whose target type depends on its outermost resource type,
    /// e.g. an IP configuration owned by a NIC, a load balancer or a gateway.
    /// `targets` pairs a resource type segment, optionally prefixed with its
    /// provider, with the item type it maps to.
    pub fn by_resource_type(
        &mut self,
        id: Option<&str>,
        targets: &[(&str, ItemType)],
        blast: BlastPropagation,
    ) -> &mut Self {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return self;
        };
        let Ok(parsed) = ResourceId::parse(id) else {
            return self;
        };
        let Some((kind, _)) = parsed.resources.first() else {
            return self;
        };
        // Keys may be qualified with the provider, `Microsoft.Sql/servers`
        let provider = parsed.provider.as_deref().unwrap_or_default();
        let found = targets.iter().find_map(|(key, target)| {
            let (key_provider, key_type) = match key.rsplit_once('/') {
                Some((p, t)) => (Some(p), t),
                None => (None, *key),
            };
            let provider_ok = key_provider.map_or(true, |p| p.eq_ignore_ascii_case(provider));
            (provider_ok && key_type.eq_ignore_ascii_case(kind)).then_some((key_type, *target))
        });
        match found {
            Some((key_type, target)) => self.by_id(target, Some(id), &[key_type], blast),
            None => {
                tracing::debug!("no item type for {} in {}", kind, id);
                self
            }
        }
    }

    /// Link by name within the item's own scope
    pub fn by_name(&mut self, target: ItemType, name: &str, blast: BlastPropagation) -> &mut Self {
        if !name.is_empty() {
            let link = LinkedItemQuery::get(target, name, self.ctx.scope.clone(), blast);
            self.push(link);
        }
        self
    }

    /// Search the children of this item
    pub fn children(&mut self, target: ItemType, blast: BlastPropagation) -> &mut Self {
        let link = LinkedItemQuery::search(target, self.ctx.key(), self.ctx.scope.clone(), blast);
        self.push(link);
        self
    }

    /// Link a child back to its parent (the item's names minus the last)
    pub fn parent(&mut self, target: ItemType, blast: BlastPropagation) -> &mut Self {
        if self.ctx.names.len() > 1 {
            let parent = composite_key(&self.ctx.names[..self.ctx.names.len() - 1]);
            let link = LinkedItemQuery::get(target, parent, self.ctx.scope.clone(), blast);
            self.push(link);
        }
        self
    }

    pub fn ip(&mut self, address: Option<&str>, blast: BlastPropagation) -> &mut Self {
        if let Some(address) = address.filter(|a| !a.is_empty()) {
            self.push(LinkedItemQuery::get(ItemType::Ip, address, GLOBAL_SCOPE, blast));
        }
        self
    }

    /// Firewall rule value; only single-host rules map onto an IP item
    pub fn ip_rule(&mut self, rule: Option<&str>, blast: BlastPropagation) -> &mut Self {
        self.ip(rule.and_then(single_address), blast)
    }

    pub fn dns(&mut self, hostname: Option<&str>, blast: BlastPropagation) -> &mut Self {
        if let Some(hostname) = hostname.filter(|h| !h.is_empty()) {
            let hostname = hostname.trim_end_matches('.');
            self.push(LinkedItemQuery::search(ItemType::Dns, hostname, GLOBAL_SCOPE, blast));
        }
        self
    }

    /// Link an HTTP(S) endpoint and the DNS name it is served from
    pub fn http(&mut self, endpoint: Option<&str>, blast: BlastPropagation) -> &mut Self {
        let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) else {
            return self;
        };
        self.push(LinkedItemQuery::search(ItemType::Http, endpoint, GLOBAL_SCOPE, blast));
        if let Ok(url) = url::Url::parse(endpoint) {
            if let Some(host) = url.host_str() {
                let host = host.to_string();
                self.dns(Some(host.as_str()), blast);
            }
        }
        self
    }

    pub fn into_vec(self) -> Vec<LinkedItemQuery> {
        self.links
    }
}
