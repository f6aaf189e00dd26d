use crate::definitions::{DefResult, DefinitionSource, Table, record_hash};
use crate::models::types::Hash;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Definitions held in memory. Used for fixtures and for manifests that were
/// exported to JSON.
#[derive(Debug, Default, Clone)]
pub struct MemoryDefinitions {
    tables: HashMap<Table, HashMap<Hash, Value>>,
}

impl MemoryDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, keyed by its own `hash` field. Records without a hash are ignored.
    pub fn insert(&mut self, table: Table, record: Value) -> &mut Self {
        match record_hash(&record) {
            Some(hash) => {
                self.tables.entry(table).or_default().insert(hash, record);
            }
            None => tracing::warn!(%table, "definition record without hash ignored"),
        }
        self
    }

    pub fn with(mut self, table: Table, record: Value) -> Self {
        self.insert(table, record);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DefinitionSource for MemoryDefinitions {
    async fn get(&self, table: Table, hash: Hash) -> DefResult<Option<Value>> {
        Ok(self.tables.get(&table).and_then(|t| t.get(&hash)).cloned())
    }

    async fn get_all(&self, table: Table) -> DefResult<HashMap<Hash, Value>> {
        Ok(self.tables.get(&table).cloned().unwrap_or_default())
    }
}
