//! Item types
//!
//! Every type an item or a linked item query can carry. Types with an adapter
//! and types that only appear as link targets share the same enum so that a
//! link can never name a type that does not exist.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! item_types {
    ($($variant:ident => $name:literal,)+) => {
        /// Type of a graph item
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ItemType {
            $($variant,)+
        }

        impl ItemType {
            /// All known item types
            pub const ALL: &'static [ItemType] = &[$(ItemType::$variant,)+];

            /// Stable string form used on the wire
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ItemType::$variant => $name,)+
                }
            }
        }

        impl FromStr for ItemType {
            type Err = UnknownItemType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(ItemType::$variant),)+
                    _ => Err(UnknownItemType(s.to_string())),
                }
            }
        }
    };
}

item_types! {
    // Compute
    ComputeVirtualMachine => "azure-compute-virtual-machine",
    ComputeDisk => "azure-compute-disk",
    ComputeAvailabilitySet => "azure-compute-availability-set",
    ComputeVirtualMachineScaleSet => "azure-compute-virtual-machine-scale-set",
    ComputeSnapshot => "azure-compute-snapshot",
    ComputeDiskEncryptionSet => "azure-compute-disk-encryption-set",
    ComputeVirtualMachineExtension => "azure-compute-virtual-machine-extension",
    ComputeImage => "azure-compute-image",
    ComputeProximityPlacementGroup => "azure-compute-proximity-placement-group",
    ComputeDedicatedHostGroup => "azure-compute-dedicated-host-group",
    ComputeCapacityReservationGroup => "azure-compute-capacity-reservation-group",
    ComputeGalleryImage => "azure-compute-gallery-image",
    // Network
    NetworkVirtualNetwork => "azure-network-virtual-network",
    NetworkSubnet => "azure-network-subnet",
    NetworkNetworkInterface => "azure-network-network-interface",
    NetworkNetworkSecurityGroup => "azure-network-network-security-group",
    NetworkPublicIpAddress => "azure-network-public-ip-address",
    NetworkLoadBalancer => "azure-network-load-balancer",
    NetworkRouteTable => "azure-network-route-table",
    NetworkNatGateway => "azure-network-nat-gateway",
    NetworkPrivateEndpoint => "azure-network-private-endpoint",
    NetworkDnsZone => "azure-network-dns-zone",
    NetworkPrivateDnsZone => "azure-network-private-dns-zone",
    NetworkApplicationSecurityGroup => "azure-network-application-security-group",
    NetworkApplicationGateway => "azure-network-application-gateway",
    NetworkPublicIpPrefix => "azure-network-public-ip-prefix",
    NetworkDdosProtectionPlan => "azure-network-ddos-protection-plan",
    NetworkPrivateLinkService => "azure-network-private-link-service",
    NetworkVirtualNetworkGateway => "azure-network-virtual-network-gateway",
    // Storage
    StorageAccount => "azure-storage-account",
    StorageBlobContainer => "azure-storage-blob-container",
    StorageFileShare => "azure-storage-file-share",
    StorageQueue => "azure-storage-queue",
    StorageTable => "azure-storage-table",
    // Authorization
    AuthorizationRoleAssignment => "azure-authorization-role-assignment",
    AuthorizationRoleDefinition => "azure-authorization-role-definition",
    // Managed identity
    ManagedIdentityUserAssignedIdentity => "azure-managedidentity-user-assigned-identity",
    // Key Vault
    KeyVaultVault => "azure-keyvault-vault",
    KeyVaultSecret => "azure-keyvault-secret",
    KeyVaultKey => "azure-keyvault-key",
    // SQL
    SqlServer => "azure-sql-server",
    SqlDatabase => "azure-sql-database",
    SqlElasticPool => "azure-sql-elastic-pool",
    // PostgreSQL
    PostgreSqlFlexibleServer => "azure-dbforpostgresql-flexible-server",
    PostgreSqlDatabase => "azure-dbforpostgresql-database",
    // Cosmos DB
    DocumentDbDatabaseAccount => "azure-documentdb-database-account",
    // Network primitives shared with non-Azure sources
    Ip => "ip",
    Dns => "dns",
    Http => "http",
}

impl ItemType {
    /// Whether the type is one of the cloud-agnostic network primitives
    pub fn is_stdlib(&self) -> bool {
        matches!(self, ItemType::Ip | ItemType::Dns | ItemType::Http)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an item type string that is not known
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item type: {0}")]
pub struct UnknownItemType(pub String);

impl Serialize for ItemType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
