//! Microsoft.Authorization adapters

mod role_assignment;
mod role_definition;

pub use role_assignment::RoleAssignment;
pub use role_definition::RoleDefinition;

pub(crate) const API_VERSION: &str = "2022-04-01";
