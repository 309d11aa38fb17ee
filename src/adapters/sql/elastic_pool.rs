use super::API_VERSION;
use crate::adapters::{ArmResource, Category, LinkContext, Links, PathSegment, ResourceDef, ResourceMapper};
use crate::scope::ScopeKind;
use crate::sdp::{BlastPropagation, Health, ItemType, LinkedItemQuery};
use serde::Deserialize;

static DEFINITION: ResourceDef = ResourceDef {
    item_type: ItemType::SqlElasticPool,
    descriptive_name: "SQL Elastic Pool",
    category: Category::Database,
    provider: "Microsoft.Sql",
    path: &[PathSegment::named("servers"), PathSegment::named("elasticPools")],
    api_version: API_VERSION,
    scope_kind: ScopeKind::ResourceGroup,
    list_filter: None,
    potential_links: &[ItemType::SqlServer],
    iam_permissions: &["Microsoft.Sql/servers/elasticPools/read"],
};

#[derive(Debug, Default, Deserialize)]
pub struct ElasticPoolProperties {
    #[serde(default)]
    state: Option<String>,
}

pub struct ElasticPool;

impl ResourceMapper for ElasticPool {
    type Properties = ElasticPoolProperties;

    fn definition(&self) -> &'static ResourceDef {
        &DEFINITION
    }

    fn link(&self, _resource: &ArmResource<Self::Properties>, ctx: &LinkContext) -> Vec<LinkedItemQuery> {
        let mut links = Links::new(ctx);
        links.parent(ItemType::SqlServer, BlastPropagation::BOTH);
        links.into_vec()
    }

    fn health(&self, resource: &ArmResource<Self::Properties>) -> Option<Health> {
        let state = resource.properties.as_ref()?.state.as_deref()?;
        Some(Health::from_provisioning_state(state))
    }
}
