//! Microsoft.KeyVault adapters

mod secret;
mod vault;

pub use secret::Secret;
pub use vault::Vault;

use crate::adapters::Links;
use crate::azure::resource_id::composite_key;
use crate::sdp::{BlastPropagation, ItemType};

/// Link a key or secret referenced by its data-plane URL,
/// `https://{vault}.vault.azure.net/{keys|secrets}/{name}[/{version}]`.
///
/// The URL carries no resource group, so the link uses the item's own scope.
pub(crate) fn link_vault_object(links: &mut Links<'_>, url: Option<&str>, blast: BlastPropagation) {
    let Some(parsed) = url.and_then(|u| url::Url::parse(u).ok()) else {
        return;
    };
    let Some(host) = parsed.host_str() else {
        return;
    };
    let vault = host.split('.').next().unwrap_or(host);

    let mut segments = parsed.path_segments().into_iter().flatten().filter(|s| !s.is_empty());
    let target = match segments.next() {
        Some("keys") => ItemType::KeyVaultKey,
        Some("secrets") => ItemType::KeyVaultSecret,
        _ => {
            tracing::debug!("not a key vault object url: {}", parsed);
            return;
        }
    };
    if let Some(name) = segments.next() {
        links.by_name(target, &composite_key(&[vault, name]), blast);
    }
    links.dns(Some(host), blast);
}
