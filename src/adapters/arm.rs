//! Generic ARM adapter
//!
//! [`ArmAdapter`] does the fetching, caching and item building for every
//! resource type. The per-type knowledge lives in a [`ResourceMapper`]: the
//! static [`ResourceDef`], a typed model of the properties the links need,
//! and the link rules themselves.

use super::definition::ResourceDef;
use super::link::{LinkContext, Links};
use super::{Adapter, AdapterMetadata};
use crate::azure::resource_id::{composite_key, split_composite_key};
use crate::azure::{ArmClient, ArmError};
use crate::cache::{Cache, CacheHit, CacheKey};
use crate::scope::{Scope, ScopeKind};
use crate::sdp::{BlastPropagation, Health, Item, ItemType, LinkedItemQuery, QueryError, QueryMethod};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Reference to another resource, `{"id": "..."}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubResource {
    #[serde(default)]
    pub id: Option<String>,
}

impl SubResource {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// `identity` block shared by most resource types
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedServiceIdentity {
    #[serde(default, rename = "type")]
    pub identity_type: Option<String>,
    #[serde(default)]
    pub principal_id: Option<String>,
    /// Keyed by the user-assigned identity's resource ID
    #[serde(default)]
    pub user_assigned_identities: Option<HashMap<String, Value>>,
}

/// `networkAcls` of Key Vault and Storage
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRuleSet {
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    pub ip_rules: Vec<IpRule>,
    /// Subnet IDs
    #[serde(default, deserialize_with = "crate::adapters::null_as_default")]
    pub virtual_network_rules: Vec<SubResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpRule {
    #[serde(default)]
    pub value: Option<String>,
}

impl NetworkRuleSet {
    /// Subnets and addresses allowed through the firewall; losing them cuts
    /// the resource off from its clients
    pub fn link(&self, links: &mut Links<'_>) {
        for rule in &self.virtual_network_rules {
            links.by_id(
                ItemType::NetworkSubnet,
                rule.id(),
                &["virtualNetworks", "subnets"],
                BlastPropagation::IN,
            );
        }
        for rule in &self.ip_rules {
            links.ip_rule(rule.value.as_deref(), BlastPropagation::IN);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrivateEndpointConnection {
    #[serde(default)]
    pub properties: Option<PrivateEndpointConnectionProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateEndpointConnectionProperties {
    #[serde(default)]
    pub private_endpoint: Option<SubResource>,
}

pub fn private_endpoint_links(connections: &[PrivateEndpointConnection], links: &mut Links<'_>) {
    for connection in connections.iter().filter_map(|c| c.properties.as_ref()) {
        links.by_id(
            ItemType::NetworkPrivateEndpoint,
            connection.private_endpoint.as_ref().and_then(|p| p.id()),
            &["privateEndpoints"],
            BlastPropagation::BOTH,
        );
    }
}

/// Accept `null` wherever a collection or other defaulted value is expected;
/// ARM sends `null` for empty lists on some resource types
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level fields shared by every ARM resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    resource_type: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    managed_by: Option<String>,
    #[serde(default)]
    identity: Option<ManagedServiceIdentity>,
    #[serde(default)]
    zones: Option<Vec<String>>,
}

/// An ARM resource with its `properties` decoded into the mapper's model.
///
/// `properties` is `None` when the resource has none or when they do not
/// match the model; the envelope fields are decoded independently.
#[derive(Debug, Clone)]
pub struct ArmResource<P> {
    pub id: Option<String>,
    pub name: Option<String>,
    pub resource_type: Option<String>,
    pub location: Option<String>,
    pub kind: Option<String>,
    pub managed_by: Option<String>,
    pub identity: Option<ManagedServiceIdentity>,
    pub zones: Option<Vec<String>>,
    pub properties: Option<P>,
}

impl<P: DeserializeOwned> ArmResource<P> {
    /// Decode a resource object. Shape problems are logged against `label`
    /// and only drop the part that failed.
    pub fn decode(value: &Map<String, Value>, label: &str) -> Self {
        let top: Map<String, Value> = value
            .iter()
            .filter(|(key, _)| key.as_str() != "properties")
            .map(|(key, v)| (key.clone(), v.clone()))
            .collect();
        let envelope = match Envelope::deserialize(&Value::Object(top)) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("{}: unexpected resource shape: {}", label, e);
                Envelope {
                    name: value.get("name").and_then(|v| v.as_str()).map(str::to_string),
                    ..Envelope::default()
                }
            }
        };

        let properties = match value.get("properties") {
            None | Some(Value::Null) => None,
            Some(raw) => match P::deserialize(raw) {
                Ok(properties) => Some(properties),
                Err(e) => {
                    tracing::warn!("{}: unexpected property shape, skipping property links: {}", label, e);
                    None
                }
            },
        };

        Self {
            id: envelope.id,
            name: envelope.name,
            resource_type: envelope.resource_type,
            location: envelope.location,
            kind: envelope.kind,
            managed_by: envelope.managed_by,
            identity: envelope.identity,
            zones: envelope.zones,
            properties,
        }
    }
}

/// Per-type mapping rules
pub trait ResourceMapper: Send + Sync + 'static {
    /// Typed view of the `properties` the links are built from
    type Properties: DeserializeOwned + Send;

    fn definition(&self) -> &'static ResourceDef;

    fn link(&self, resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery>;

    /// Health when the provisioning state alone is not the right signal
    fn health(&self, _resource: &ArmResource<Self::Properties>) -> Option<Health> {
        None
    }
}

/// Links to user-assigned managed identities; the identity's permissions
/// flow into the resource but the resource cannot change the identity
fn identity_links(identity: Option<&ManagedServiceIdentity>, links: &mut Links<'_>) {
    let Some(identities) = identity.and_then(|i| i.user_assigned_identities.as_ref()) else {
        return;
    };
    let mut ids: Vec<&String> = identities.keys().collect();
    ids.sort();
    for id in ids {
        links.by_id(
            ItemType::ManagedIdentityUserAssignedIdentity,
            Some(id.as_str()),
            &["userAssignedIdentities"],
            BlastPropagation::IN,
        );
    }
}

/// Build an item from an ARM resource.
///
/// `parents` are the names of the enclosing resources for child types, taken
/// from the query that fetched the resource.
pub fn to_item<M: ResourceMapper>(
    mapper: &M,
    value: Value,
    scope: &str,
    parents: &[&str],
) -> Result<Item, QueryError> {
    let def = mapper.definition();
    let Value::Object(mut attributes) = value else {
        return Err(QueryError::Other(anyhow::anyhow!(
            "{} response is not a JSON object",
            def.item_type
        )));
    };

    let name = attributes
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            QueryError::Other(anyhow::anyhow!("{} resource has no name", def.item_type))
        })?;

    let mut names: Vec<String> = parents.iter().map(|p| p.to_string()).collect();
    names.push(name);
    if def.is_child() {
        attributes.insert("uniqueAttr".to_string(), Value::String(composite_key(&names)));
    }

    let tags: BTreeMap<String, String> = match attributes.remove("tags") {
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        _ => BTreeMap::new(),
    };

    let provisioning_health = attributes
        .get("properties")
        .and_then(|p| p.get("provisioningState"))
        .and_then(|s| s.as_str())
        .map(Health::from_provisioning_state);

    let ctx = LinkContext::new(scope, names);
    let mut item = Item {
        item_type: def.item_type,
        unique_attribute: def.unique_attribute().to_string(),
        attributes,
        scope: scope.to_string(),
        tags,
        health: provisioning_health,
        linked_item_queries: Vec::new(),
    };

    let label = format!("{} {}", def.item_type, ctx.key());
    let resource = ArmResource::<M::Properties>::decode(&item.attributes, &label);
    if let Some(health) = mapper.health(&resource) {
        item.health = Some(health);
    }
    let mut common = Links::new(&ctx);
    identity_links(resource.identity.as_ref(), &mut common);
    for link in mapper.link(&resource, &ctx).into_iter().chain(common.into_vec()) {
        item.add_link(link);
    }

    Ok(item)
}

/// Adapter for one resource type
pub struct ArmAdapter<M: ResourceMapper> {
    mapper: M,
    client: ArmClient,
    cache: Arc<dyn Cache>,
    cache_ttl: Duration,
    scopes: Vec<Scope>,
}

impl<M: ResourceMapper> ArmAdapter<M> {
    /// `scopes` are the configured resource-group scopes; subscription level
    /// types serve the distinct subscriptions among them.
    pub fn new(
        mapper: M,
        client: ArmClient,
        cache: Arc<dyn Cache>,
        cache_ttl: Duration,
        scopes: &[Scope],
    ) -> Self {
        let def = mapper.definition();
        let mut served: Vec<Scope> = match def.scope_kind {
            ScopeKind::ResourceGroup => scopes
                .iter()
                .filter(|s| s.kind() == ScopeKind::ResourceGroup)
                .cloned()
                .collect(),
            ScopeKind::Subscription => scopes
                .iter()
                .map(|s| Scope::subscription(s.subscription_id()))
                .collect(),
        };
        served.sort();
        served.dedup();

        Self {
            mapper,
            client,
            cache,
            cache_ttl,
            scopes: served,
        }
    }

    fn def(&self) -> &'static ResourceDef {
        self.mapper.definition()
    }

    fn parse_scope(&self, scope: &str) -> Result<Scope, QueryError> {
        let def = self.def();
        let no_scope = || QueryError::NoScope {
            item_type: def.item_type,
            scope: scope.to_string(),
        };
        let parsed: Scope = scope.parse().map_err(|_| no_scope())?;
        if parsed.kind() != def.scope_kind {
            return Err(no_scope());
        }
        Ok(parsed)
    }

    fn arm_error(&self, err: ArmError, query: &str, scope: &str) -> QueryError {
        if err.is_not_found() {
            return QueryError::not_found(self.def().item_type, query, scope);
        }
        QueryError::Other(
            anyhow::Error::new(err)
                .context(format!("{} '{}' in {}", self.def().item_type, query, scope)),
        )
    }

    fn key(&self, method: QueryMethod, scope: &str, query: &str) -> CacheKey {
        CacheKey::new(self.def().item_type, method, scope, query)
    }

    async fn cached(
        &self,
        key: &CacheKey,
        ignore_cache: bool,
    ) -> Option<Result<Vec<Item>, QueryError>> {
        if ignore_cache {
            return None;
        }
        match self.cache.lookup(key).await? {
            CacheHit::Items(items) => Some(Ok(items)),
            CacheHit::NotFound => Some(Err(QueryError::not_found(
                key.item_type,
                &key.query,
                &key.scope,
            ))),
        }
    }

    /// Store a collection result and each of its items as a Get result
    async fn store_collection(&self, key: CacheKey, items: &[Item]) {
        for item in items {
            if let Some(value) = item.unique_attribute_value() {
                let get_key = self.key(QueryMethod::Get, &item.scope, &value);
                self.cache
                    .store_items(get_key, vec![item.clone()], self.cache_ttl)
                    .await;
            }
        }
        self.cache.store_items(key, items.to_vec(), self.cache_ttl).await;
    }

    /// Fetch a collection and map every element, skipping elements that
    /// cannot be mapped
    async fn fetch_collection(
        &self,
        scope: &Scope,
        parents: &[&str],
        query: &str,
    ) -> Result<Vec<Item>, QueryError> {
        let def = self.def();
        let scope_str = scope.to_string();
        let path = def.resource_path(scope, parents);
        let values = self
            .client
            .list_resources(&path, def.api_version, def.list_filter)
            .await
            .map_err(|e| self.arm_error(e, query, &scope_str))?;

        let mut items = Vec::with_capacity(values.len());
        for value in values {
            match to_item(&self.mapper, value, &scope_str, parents) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("skipping {} in {}: {}", def.item_type, scope_str, e),
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl<M: ResourceMapper> Adapter for ArmAdapter<M> {
    fn item_type(&self) -> ItemType {
        self.def().item_type
    }

    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata::from_definition(self.def())
    }

    fn scopes(&self) -> Vec<String> {
        self.scopes.iter().map(|s| s.to_string()).collect()
    }

    async fn get(&self, scope: &str, query: &str, ignore_cache: bool) -> Result<Item, QueryError> {
        let def = self.def();
        let parsed_scope = self.parse_scope(scope)?;
        let names = split_composite_key(query, def.name_parts()).ok_or_else(|| {
            QueryError::invalid_query(
                def.item_type,
                format!("expected '{}', got '{}'", def.get_format(), query),
            )
        })?;

        let key = self.key(QueryMethod::Get, scope, query);
        if let Some(cached) = self.cached(&key, ignore_cache).await {
            let mut items = cached?;
            if let Some(item) = items.pop() {
                return Ok(item);
            }
        }

        let path = def.resource_path(&parsed_scope, &names);
        let value = match self.client.get_resource(&path, def.api_version).await {
            Ok(value) => value,
            Err(e) => {
                let err = self.arm_error(e, query, scope);
                if err.is_not_found() {
                    self.cache.store_not_found(key, self.cache_ttl).await;
                }
                return Err(err);
            }
        };

        let item = to_item(&self.mapper, value, scope, &names[..names.len() - 1])?;
        self.cache
            .store_items(key, vec![item.clone()], self.cache_ttl)
            .await;
        Ok(item)
    }

    async fn list(&self, scope: &str, ignore_cache: bool) -> Result<Vec<Item>, QueryError> {
        let def = self.def();
        if def.is_child() {
            return Err(QueryError::Unsupported {
                item_type: def.item_type,
                method: QueryMethod::List,
            });
        }
        let parsed_scope = self.parse_scope(scope)?;

        let key = self.key(QueryMethod::List, scope, "");
        if let Some(cached) = self.cached(&key, ignore_cache).await {
            return cached;
        }

        let items = self.fetch_collection(&parsed_scope, &[], "").await?;
        self.store_collection(key, &items).await;
        Ok(items)
    }

    async fn search(
        &self,
        scope: &str,
        query: &str,
        ignore_cache: bool,
    ) -> Result<Vec<Item>, QueryError> {
        let def = self.def();
        if !def.is_child() {
            return Err(QueryError::Unsupported {
                item_type: def.item_type,
                method: QueryMethod::Search,
            });
        }
        let parsed_scope = self.parse_scope(scope)?;
        let parents = split_composite_key(query, def.name_parts() - 1).ok_or_else(|| {
            QueryError::invalid_query(
                def.item_type,
                format!(
                    "expected '{}', got '{}'",
                    def.search_format().unwrap_or_default(),
                    query
                ),
            )
        })?;

        let key = self.key(QueryMethod::Search, scope, query);
        if let Some(cached) = self.cached(&key, ignore_cache).await {
            return cached;
        }

        match self.fetch_collection(&parsed_scope, &parents, query).await {
            Ok(items) => {
                self.store_collection(key, &items).await;
                Ok(items)
            }
            Err(err) => {
                if err.is_not_found() {
                    self.cache.store_not_found(key, self.cache_ttl).await;
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::network::Subnet;
    use crate::adapters::test_support::{assert_link, rg_id, SCOPE};
    use serde_json::json;

    // Subnets do not declare identity links, so map without the declared
    // link check
    fn map_subnet(value: Value) -> Item {
        to_item(&Subnet, value, SCOPE, &["vnet-1"]).expect("subnet should map")
    }

    fn subnet(properties: Value) -> Value {
        json!({
            "id": rg_id("Microsoft.Network/virtualNetworks/vnet-1/subnets/app"),
            "name": "app",
            "identity": {
                "type": "UserAssigned",
                "userAssignedIdentities": {
                    rg_id("Microsoft.ManagedIdentity/userAssignedIdentities/id-app"): {}
                }
            },
            "properties": properties
        })
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let err = to_item(&Subnet, json!({"id": "x", "properties": {}}), SCOPE, &["vnet-1"])
            .expect_err("nameless resource should not map");
        assert!(err.to_string().contains("has no name"), "{}", err);

        let err = to_item(&Subnet, json!({"name": ""}), SCOPE, &["vnet-1"])
            .expect_err("empty name should not map");
        assert!(err.to_string().contains("has no name"), "{}", err);
    }

    #[test]
    fn test_non_object_is_an_error() {
        let err = to_item(&Subnet, json!([1]), SCOPE, &[]).expect_err("array should not map");
        assert!(err.to_string().contains("not a JSON object"), "{}", err);
    }

    #[test]
    fn test_null_collection_keeps_other_links() {
        let item = map_subnet(subnet(json!({
            "networkSecurityGroup": {"id": rg_id("Microsoft.Network/networkSecurityGroups/nsg-app")},
            "ipConfigurations": null,
            "privateEndpoints": null
        })));

        assert_link(&item, ItemType::NetworkVirtualNetwork, QueryMethod::Get, "vnet-1", SCOPE, BlastPropagation::BOTH);
        assert_link(&item, ItemType::NetworkNetworkSecurityGroup, QueryMethod::Get, "nsg-app", SCOPE, BlastPropagation::IN);
        assert!(item.links_to(ItemType::NetworkPrivateEndpoint).next().is_none());
    }

    #[test]
    fn test_bad_property_shape_keeps_envelope_links() {
        let item = map_subnet(subnet(json!({
            "provisioningState": "Failed",
            "networkSecurityGroup": "oops",
            "ipConfigurations": 5
        })));

        assert_eq!(item.health, Some(Health::Error));
        assert_link(&item, ItemType::NetworkVirtualNetwork, QueryMethod::Get, "vnet-1", SCOPE, BlastPropagation::BOTH);
        assert_link(
            &item,
            ItemType::ManagedIdentityUserAssignedIdentity,
            QueryMethod::Get,
            "id-app",
            SCOPE,
            BlastPropagation::IN,
        );
        assert!(item.links_to(ItemType::NetworkNetworkSecurityGroup).next().is_none());
    }

    #[test]
    fn test_bad_envelope_shape_keeps_property_links() {
        let item = map_subnet(json!({
            "name": "app",
            "identity": "not-an-object",
            "properties": {
                "routeTable": {"id": rg_id("Microsoft.Network/routeTables/rt-app")}
            }
        }));

        assert_link(&item, ItemType::NetworkRouteTable, QueryMethod::Get, "rt-app", SCOPE, BlastPropagation::IN);
        assert!(item.links_to(ItemType::ManagedIdentityUserAssignedIdentity).next().is_none());
    }

    #[test]
    fn test_decode_without_properties() {
        let Value::Object(raw) = json!({"name": "app", "location": "westeurope", "properties": null}) else {
            unreachable!()
        };
        let resource = ArmResource::<Value>::decode(&raw, "test");
        assert_eq!(resource.name.as_deref(), Some("app"));
        assert_eq!(resource.location.as_deref(), Some("westeurope"));
        assert!(resource.properties.is_none());
    }

    #[test]
    fn test_null_as_default() {
        #[derive(Deserialize)]
        struct Rules {
            #[serde(default, deserialize_with = "null_as_default")]
            rules: Vec<String>,
        }

        let null: Rules = serde_json::from_value(json!({"rules": null})).unwrap();
        assert!(null.rules.is_empty());
        let missing: Rules = serde_json::from_value(json!({})).unwrap();
        assert!(missing.rules.is_empty());
        let set: Rules = serde_json::from_value(json!({"rules": ["a"]})).unwrap();
        assert_eq!(set.rules, vec!["a".to_string()]);
    }
}
