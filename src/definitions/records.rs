use crate::models::types::Hash;
use serde::{Deserialize, Serialize};

/// Buckets with this scope are shared by the whole account.
pub const SCOPE_ACCOUNT: i32 = 1;

/// `location` of the account-wide slot of a bucket.
pub const LOCATION_ACCOUNT_SLOT: i32 = 0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayProperties {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub has_icon: bool,
}

/// The `inventory` block of an item type definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryBlock {
    pub bucket_type_hash: Hash,
    pub max_stack_size: u32,
}

/// Item type definition (`DestinyInventoryItemDefinition`). Only the fields
/// the inventory engine dereferences are decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub hash: Hash,
    #[serde(default)]
    pub display_properties: DisplayProperties,
    pub inventory: InventoryBlock,
    #[serde(default)]
    pub damage_types: Vec<u32>,
    #[serde(default)]
    pub item_type_display_name: String,
    #[serde(default)]
    pub equippable: bool,
    #[serde(default)]
    pub non_transferrable: bool,
}

/// Bucket definition (`DestinyInventoryBucketDefinition`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDefinition {
    pub hash: Hash,
    #[serde(default)]
    pub display_properties: DisplayProperties,
    #[serde(default)]
    pub scope: i32,
    #[serde(default)]
    pub location: i32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub redacted: bool,
}

impl BucketDefinition {
    #[inline]
    pub fn is_account_scoped(&self) -> bool {
        self.scope == SCOPE_ACCOUNT
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.display_properties.name
    }
}

/// Anything we only need a name and icon from: class, race, gender, vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedDefinition {
    pub hash: Hash,
    #[serde(default)]
    pub display_properties: DisplayProperties,
}
