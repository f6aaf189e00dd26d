use crate::definitions::Table;
use crate::models::types::Hash;
use thiserror::Error;

// DefinitionError is the lowest level error for manifest lookups. It does not wrap any higher
// level errors.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// No record for this hash in the table
    #[error("no {table} definition for hash {hash}")]
    NotFound { table: Table, hash: Hash },

    /// The cache was torn down (language or manifest change) while the lookup was in flight
    #[error("definitions were invalidated during lookup")]
    Invalidated,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("manifest worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
