//! Resource groups
//!
//! When no resource groups are configured, every group of the subscription
//! becomes a scope.

use super::client::ArmClient;
use super::http::ArmError;
use serde_json::Value;

const API_VERSION: &str = "2021-04-01";

/// Resource group information
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup {
    pub name: String,
    pub location: String,
    pub provisioning_state: String,
}

impl From<&Value> for ResourceGroup {
    fn from(value: &Value) -> Self {
        Self {
            name: value
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            location: value
                .get("location")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string(),
            provisioning_state: value
                .get("properties")
                .and_then(|p| p.get("provisioningState"))
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string(),
        }
    }
}

/// List the resource groups of a subscription, skipping ones being deleted
pub async fn list_resource_groups(
    client: &ArmClient,
    subscription_id: &str,
) -> Result<Vec<ResourceGroup>, ArmError> {
    let path = format!("/subscriptions/{}/resourcegroups", subscription_id);
    let values = client.list_resources(&path, API_VERSION, None).await?;

    Ok(values
        .iter()
        .map(ResourceGroup::from)
        .filter(|rg| !rg.name.is_empty() && rg.provisioning_state != "Deleting")
        .collect())
}

/// Resource group names as a simple list
pub async fn list_resource_group_names(
    client: &ArmClient,
    subscription_id: &str,
) -> Result<Vec<String>, ArmError> {
    let groups = list_resource_groups(client, subscription_id).await?;
    Ok(groups.into_iter().map(|rg| rg.name).collect())
}
