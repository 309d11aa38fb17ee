//! Query execution
//!
//! The [`Engine`] routes a [`Query`] to the adapter for its item type. A
//! query with the wildcard scope `*` is run in every scope the adapter
//! serves, a bounded number at a time.

mod registry;

pub use registry::AdapterRegistry;

use crate::adapters::Adapter;
use crate::scope::WILDCARD_SCOPE;
use crate::sdp::{Item, Query, QueryError, QueryMethod};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

/// Default number of scopes queried at once
pub const DEFAULT_MAX_PARALLEL: usize = 8;

/// Items and errors of one query
#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub items: Vec<Item>,
    pub errors: Vec<QueryError>,
}

impl ExecutionResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.errors.is_empty()
    }
}

pub struct Engine {
    registry: AdapterRegistry,
    max_parallel: usize,
}

impl Engine {
    pub fn new(registry: AdapterRegistry, max_parallel: usize) -> Self {
        Self {
            registry,
            max_parallel: max_parallel.max(1),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Run a query. Errors are returned beside whatever items were found.
    pub async fn execute(&self, query: &Query, ignore_cache: bool) -> ExecutionResult {
        let Some(adapter) = self.registry.get(query.item_type) else {
            return ExecutionResult {
                items: Vec::new(),
                errors: vec![QueryError::Other(anyhow::anyhow!(
                    "no adapter for {}",
                    query.item_type
                ))],
            };
        };

        let wildcard = query.scope == WILDCARD_SCOPE;
        let scopes = if wildcard {
            adapter.scopes()
        } else {
            vec![query.scope.clone()]
        };
        if scopes.is_empty() {
            tracing::warn!("{} serves no scopes, nothing to query", query.item_type);
            return ExecutionResult::default();
        }

        let mut outcomes: Vec<(String, Result<Vec<Item>, QueryError>)> = stream::iter(scopes)
            .map(|scope| async move {
                let outcome = run(adapter.as_ref(), query, &scope, ignore_cache).await;
                (scope, outcome)
            })
            .buffer_unordered(self.max_parallel)
            .collect()
            .await;
        // Completion order is arbitrary; report in scope order
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));

        let scope_count = outcomes.len();
        let mut result = ExecutionResult::default();
        let mut seen = HashSet::new();
        for (scope, outcome) in outcomes {
            match outcome {
                Ok(items) => {
                    for item in items {
                        let name = item.globally_unique_name();
                        if name.map_or(true, |n| seen.insert(n)) {
                            result.items.push(item);
                        }
                    }
                }
                Err(e) if wildcard && e.is_not_found() => {
                    tracing::debug!("{} not found in {}", query.item_type, scope);
                }
                Err(e) => {
                    tracing::warn!("{} failed in {}: {}", query, scope, e);
                    result.errors.push(e);
                }
            }
        }

        if wildcard {
            tracing::info!(
                "{}: {} item(s), {} error(s) across {} scope(s)",
                query,
                result.items.len(),
                result.errors.len(),
                scope_count
            );
        }

        result
    }
}

async fn run(
    adapter: &dyn Adapter,
    query: &Query,
    scope: &str,
    ignore_cache: bool,
) -> Result<Vec<Item>, QueryError> {
    match query.method {
        QueryMethod::Get => adapter
            .get(scope, &query.query, ignore_cache)
            .await
            .map(|item| vec![item]),
        QueryMethod::List => adapter.list(scope, ignore_cache).await,
        QueryMethod::Search => adapter.search(scope, &query.query, ignore_cache).await,
    }
}
