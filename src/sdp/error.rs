use super::{ItemType, QueryMethod};

/// Error returned by an adapter for a single query
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{item_type} '{query}' not found in scope {scope}")]
    NotFound {
        item_type: ItemType,
        query: String,
        scope: String,
    },

    #[error("scope {scope} is not served by the {item_type} adapter")]
    NoScope { item_type: ItemType, scope: String },

    #[error("invalid query for {item_type}: {reason}")]
    InvalidQuery { item_type: ItemType, reason: String },

    #[error("{method} is not supported by the {item_type} adapter")]
    Unsupported {
        item_type: ItemType,
        method: QueryMethod,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QueryError {
    pub fn not_found(item_type: ItemType, query: &str, scope: &str) -> Self {
        QueryError::NotFound {
            item_type,
            query: query.to_string(),
            scope: scope.to_string(),
        }
    }

    pub fn invalid_query(item_type: ItemType, reason: impl Into<String>) -> Self {
        QueryError::InvalidQuery {
            item_type,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }
}
