//! Microsoft.ManagedIdentity adapters

mod user_assigned_identity;

pub use user_assigned_identity::UserAssignedIdentity;
