//! Default subscription discovery
//!
//! Reads the subscription from the environment or from the Azure CLI's
//! profile, the same places `az` itself looks.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct AzureProfile {
    #[serde(default)]
    subscriptions: Vec<ProfileSubscription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSubscription {
    id: String,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    state: Option<String>,
}

/// Subscription IDs are GUIDs
pub fn validate_subscription_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

/// Get the Azure CLI configuration directory
pub fn get_azure_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("AZURE_CONFIG_DIR") {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|p| p.join(".azure"))
}

/// Read the default subscription from an `azureProfile.json` file
pub fn read_profile_default_subscription(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    // The CLI writes the profile with a byte order mark
    let content = content.trim_start_matches('\u{feff}');

    let profile: AzureProfile = match serde_json::from_str(content) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Could not parse {:?}: {}", path, e);
            return None;
        }
    };

    profile
        .subscriptions
        .into_iter()
        .filter(|s| s.state.as_deref().map_or(true, |st| st == "Enabled"))
        .find(|s| s.is_default)
        .map(|s| s.id)
        .filter(|id| validate_subscription_id(id))
}

/// Get the default subscription
/// Environment first, then the Azure CLI profile
pub fn get_default_subscription() -> Option<String> {
    if let Ok(sub) = std::env::var("AZURE_SUBSCRIPTION_ID") {
        if validate_subscription_id(&sub) {
            return Some(sub);
        }
        tracing::warn!("Invalid subscription ID format in AZURE_SUBSCRIPTION_ID");
    }

    let profile = get_azure_config_dir()?.join("azureProfile.json");
    read_profile_default_subscription(&profile)
}
