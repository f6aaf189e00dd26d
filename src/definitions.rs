use crate::models::types::Hash;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

mod cache;
mod error;
mod manifest;
mod memory;
mod records;

pub use cache::Definitions;
pub use error::DefinitionError;
pub use manifest::SqliteManifest;
pub use memory::MemoryDefinitions;
pub use records::{
    BucketDefinition, DisplayProperties, InventoryBlock, ItemDefinition, LOCATION_ACCOUNT_SLOT, NamedDefinition,
    SCOPE_ACCOUNT,
};

pub type DefResult<T> = Result<T, DefinitionError>;

/// Manifest tables the inventory engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    InventoryItem,
    InventoryBucket,
    Vendor,
    Class,
    Race,
    Gender,
}

impl Table {
    /// Small closed tables that are loaded in full when the definitions open.
    pub const INDEXED: [Table; 3] = [Table::Class, Table::Race, Table::Gender];

    pub fn table_name(&self) -> &'static str {
        match self {
            Table::InventoryItem => "DestinyInventoryItemDefinition",
            Table::InventoryBucket => "DestinyInventoryBucketDefinition",
            Table::Vendor => "DestinyVendorDefinition",
            Table::Class => "DestinyClassDefinition",
            Table::Race => "DestinyRaceDefinition",
            Table::Gender => "DestinyGenderDefinition",
        }
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        Self::INDEXED.contains(self)
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Where definitions come from. Implementations are scoped to one language
/// and one manifest version; switching either means a new source.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Single record by hash, `None` when the table has no such record
    async fn get(&self, table: Table, hash: Hash) -> DefResult<Option<Value>>;

    /// Whole table keyed by hash
    async fn get_all(&self, table: Table) -> DefResult<HashMap<Hash, Value>>;
}

/// Reads the `hash` field every definition record carries.
pub(crate) fn record_hash(value: &Value) -> Option<Hash> {
    value.get("hash").and_then(Value::as_u64).and_then(|h| Hash::try_from(h).ok())
}
