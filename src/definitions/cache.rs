use crate::definitions::{DefResult, DefinitionError, DefinitionSource, Table};
use crate::models::types::Hash;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cached view over a [`DefinitionSource`] for one language.
///
/// Indexed tables (class, race, gender) are loaded up front; every other
/// table is fetched per key on first use and kept. [`Definitions::invalidate`]
/// drops everything and points the cache at a new source. A lookup that was
/// started before an invalidation fails with [`DefinitionError::Invalidated`]
/// instead of handing back a record from the old language.
pub struct Definitions {
    current: RwLock<Arc<Generation>>,
    epoch: AtomicU64,
}

struct Generation {
    epoch: u64,
    language: String,
    source: Arc<dyn DefinitionSource>,
    indexed: HashMap<Table, HashMap<Hash, Arc<Value>>>,
    lazy: DashMap<(Table, Hash), Arc<Value>>,
}

impl Generation {
    async fn load(epoch: u64, language: &str, source: Arc<dyn DefinitionSource>) -> DefResult<Self> {
        let loads = Table::INDEXED.into_iter().map(|table| {
            let source = source.clone();
            async move {
                let records = source.get_all(table).await?;
                let records = records.into_iter().map(|(k, v)| (k, Arc::new(v))).collect();
                Ok::<_, DefinitionError>((table, records))
            }
        });
        let indexed = futures::future::try_join_all(loads).await?.into_iter().collect();

        Ok(Self {
            epoch,
            language: language.to_string(),
            source,
            indexed,
            lazy: DashMap::new(),
        })
    }
}

impl Definitions {
    pub async fn open(language: &str, source: Arc<dyn DefinitionSource>) -> DefResult<Self> {
        let generation = Generation::load(0, language, source).await?;
        tracing::debug!(language, "definitions opened");
        Ok(Self {
            current: RwLock::new(Arc::new(generation)),
            epoch: AtomicU64::new(0),
        })
    }

    pub fn language(&self) -> String {
        self.current.read().language.clone()
    }

    /// Tear down every cached record and switch to `source` for `language`.
    /// If the new source fails to load, lookups keep failing until the next
    /// successful invalidate.
    pub async fn invalidate(&self, language: &str, source: Arc<dyn DefinitionSource>) -> DefResult<()> {
        // Bump first: anything in flight against the old generation must fail from here on.
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Generation::load(epoch, language, source).await?;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            // A newer invalidation overtook this one
            return Err(DefinitionError::Invalidated);
        }
        *self.current.write() = Arc::new(generation);
        tracing::info!(language, "definitions invalidated");
        Ok(())
    }

    fn generation(&self) -> DefResult<Arc<Generation>> {
        let generation = self.current.read().clone();
        if generation.epoch != self.epoch.load(Ordering::SeqCst) {
            return Err(DefinitionError::Invalidated);
        }
        Ok(generation)
    }

    /// Raw record lookup.
    pub async fn get(&self, table: Table, hash: Hash) -> DefResult<Arc<Value>> {
        let generation = self.generation()?;

        if table.is_indexed() {
            return generation
                .indexed
                .get(&table)
                .and_then(|t| t.get(&hash))
                .cloned()
                .ok_or(DefinitionError::NotFound { table, hash });
        }

        if let Some(hit) = generation.lazy.get(&(table, hash)) {
            return Ok(hit.value().clone());
        }

        let fetched = generation.source.get(table, hash).await?;
        if generation.epoch != self.epoch.load(Ordering::SeqCst) {
            return Err(DefinitionError::Invalidated);
        }

        let value = Arc::new(fetched.ok_or(DefinitionError::NotFound { table, hash })?);
        generation.lazy.insert((table, hash), value.clone());
        Ok(value)
    }

    /// Record lookup decoded into one of the typed definition records.
    pub async fn get_as<T: DeserializeOwned>(&self, table: Table, hash: Hash) -> DefResult<T> {
        let value = self.get(table, hash).await?;
        Ok(T::deserialize(value.as_ref())?)
    }

    /// Number of lazily fetched records currently cached.
    pub fn cached(&self) -> usize {
        self.current.read().lazy.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{MemoryDefinitions, NamedDefinition};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    fn english() -> MemoryDefinitions {
        MemoryDefinitions::new()
            .with(Table::Class, json!({"hash": 1, "displayProperties": {"name": "Titan"}}))
            .with(Table::Vendor, json!({"hash": 7, "displayProperties": {"name": "Vault"}}))
    }

    fn french() -> MemoryDefinitions {
        MemoryDefinitions::new()
            .with(Table::Class, json!({"hash": 1, "displayProperties": {"name": "Titan (fr)"}}))
            .with(Table::Vendor, json!({"hash": 7, "displayProperties": {"name": "Coffres"}}))
    }

    #[tokio::test]
    async fn lazily_caches_records() {
        let defs = Definitions::open("en", Arc::new(english())).await.unwrap();
        assert_eq!(defs.cached(), 0);

        let vendor: NamedDefinition = defs.get_as(Table::Vendor, 7).await.unwrap();
        assert_eq!(vendor.display_properties.name, "Vault");
        assert_eq!(defs.cached(), 1);

        // indexed tables never hit the lazy cache
        let class: NamedDefinition = defs.get_as(Table::Class, 1).await.unwrap();
        assert_eq!(class.display_properties.name, "Titan");
        assert_eq!(defs.cached(), 1);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let defs = Definitions::open("en", Arc::new(english())).await.unwrap();
        let err = defs.get(Table::Vendor, 99).await.unwrap_err();
        assert!(matches!(err, DefinitionError::NotFound { table: Table::Vendor, hash: 99 }));
        let err = defs.get(Table::Race, 1).await.unwrap_err();
        assert!(matches!(err, DefinitionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn invalidate_switches_language() {
        let defs = Definitions::open("en", Arc::new(english())).await.unwrap();
        let _ = defs.get(Table::Vendor, 7).await.unwrap();

        defs.invalidate("fr", Arc::new(french())).await.unwrap();
        assert_eq!(defs.language(), "fr");
        assert_eq!(defs.cached(), 0);

        let vendor: NamedDefinition = defs.get_as(Table::Vendor, 7).await.unwrap();
        assert_eq!(vendor.display_properties.name, "Coffres");
    }

    /// Source whose lookups park until released.
    struct Gated {
        inner: MemoryDefinitions,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl DefinitionSource for Gated {
        async fn get(&self, table: Table, hash: Hash) -> DefResult<Option<Value>> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.get(table, hash).await
        }

        async fn get_all(&self, table: Table) -> DefResult<HashMap<Hash, Value>> {
            self.inner.get_all(table).await
        }
    }

    #[tokio::test]
    async fn in_flight_lookup_fails_after_invalidate() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let gated = Gated {
            inner: english(),
            entered: entered.clone(),
            release: release.clone(),
        };
        let defs = Arc::new(Definitions::open("en", Arc::new(gated)).await.unwrap());

        let lookup = {
            let defs = defs.clone();
            tokio::spawn(async move { defs.get(Table::Vendor, 7).await })
        };
        entered.notified().await;

        defs.invalidate("fr", Arc::new(french())).await.unwrap();
        release.notify_one();

        let res = lookup.await.unwrap();
        assert!(matches!(res, Err(DefinitionError::Invalidated)));
    }
}
