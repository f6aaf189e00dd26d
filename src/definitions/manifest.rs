use crate::definitions::{DefResult, DefinitionSource, Table, record_hash};
use crate::models::types::Hash;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Definitions read from the manifest database (one sqlite file per language).
///
/// Every table has an `id` column holding the hash reinterpreted as a signed
/// 32 bit integer and a `json` column with the record.
pub struct SqliteManifest {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteManifest {
    pub fn open<P: AsRef<Path>>(path: P) -> DefResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        tracing::debug!(path = %path.display(), "manifest opened");
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The manifest keys rows by the hash bit pattern as a signed integer.
#[inline]
fn row_id(hash: Hash) -> i32 {
    hash as i32
}

#[async_trait]
impl DefinitionSource for SqliteManifest {
    async fn get(&self, table: Table, hash: Hash) -> DefResult<Option<Value>> {
        let conn = self.conn.clone();
        let json = tokio::task::spawn_blocking(move || -> DefResult<Option<String>> {
            let conn = conn.lock();
            let sql = format!("SELECT json FROM {} WHERE id = ?1", table.table_name());
            let mut stmt = conn.prepare_cached(&sql)?;
            let json = stmt
                .query_row(params![row_id(hash)], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(json)
        })
        .await??;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self, table: Table) -> DefResult<HashMap<Hash, Value>> {
        let conn = self.conn.clone();
        let rows = tokio::task::spawn_blocking(move || -> DefResult<Vec<String>> {
            let conn = conn.lock();
            let sql = format!("SELECT json FROM {}", table.table_name());
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await??;

        let mut out = HashMap::with_capacity(rows.len());
        for json in rows {
            let value: Value = serde_json::from_str(&json)?;
            if let Some(hash) = record_hash(&value) {
                out.insert(hash, value);
            }
        }
        tracing::debug!(%table, count = out.len(), "indexed table loaded");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_wraps_large_hashes() {
        assert_eq!(row_id(1), 1);
        assert_eq!(row_id(3284755031), -1010212265);
    }

    #[tokio::test]
    async fn reads_records_by_signed_id() {
        let dir = std::env::temp_dir().join(format!("deliverator-manifest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.sqlite3");
        let _ = std::fs::remove_file(&path);
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE DestinyInventoryBucketDefinition (id INTEGER PRIMARY KEY, json TEXT);
                 CREATE TABLE DestinyClassDefinition (id INTEGER PRIMARY KEY, json TEXT);",
            )
            .unwrap();
            conn.execute(
                "INSERT INTO DestinyInventoryBucketDefinition (id, json) VALUES (?1, ?2)",
                params![row_id(3284755031), r#"{"hash":3284755031,"displayProperties":{"name":"Subclass"}}"#],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO DestinyClassDefinition (id, json) VALUES (?1, ?2)",
                params![row_id(671679327), r#"{"hash":671679327,"displayProperties":{"name":"Hunter"}}"#],
            )
            .unwrap();
        }

        let manifest = SqliteManifest::open(&path).unwrap();
        let bucket = manifest.get(Table::InventoryBucket, 3284755031).await.unwrap().unwrap();
        assert_eq!(bucket["displayProperties"]["name"], "Subclass");
        assert!(manifest.get(Table::InventoryBucket, 1).await.unwrap().is_none());

        let classes = manifest.get_all(Table::Class).await.unwrap();
        assert_eq!(classes.len(), 1);
        assert!(classes.contains_key(&671679327));
    }
}
