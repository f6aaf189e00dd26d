use crate::api::ApiError;
use crate::definitions::DefinitionError;
use crate::models::types::{ItemId, Owner};
use thiserror::Error;

pub type AppResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// No item with this id in the current inventory
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// Requested quantity is zero or larger than the stack
    #[error("invalid quantity: have {have}, requested {requested}")]
    InvalidQuantity { have: u32, requested: u32 },

    /// Only stacks without an instance can be split
    #[error("cannot split instanced item {0}")]
    SplitInstancedItem(ItemId),

    #[error("no active character")]
    NoActiveCharacter,

    #[error("no active membership")]
    NoActiveMembership,

    #[error("unknown owner: {0}")]
    UnknownOwner(Owner),

    /// Another transfer or equip on this item is still in flight
    #[error("item busy: {0}")]
    ItemBusy(ItemId),

    /// Some precondition failed
    #[error("precondition failed: {0}")]
    PreconditionFailed(&'static str),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl DomainError {
    /// Rejected before any remote call was made
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DomainError::ItemNotFound(_)
                | DomainError::InvalidQuantity { .. }
                | DomainError::SplitInstancedItem(_)
                | DomainError::NoActiveCharacter
                | DomainError::NoActiveMembership
                | DomainError::UnknownOwner(_)
                | DomainError::ItemBusy(_)
                | DomainError::PreconditionFailed(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(toml::de::Error),

    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(String, String),
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: ConfigErrorKind,
    },

    #[error("invalid environment: {0}")]
    Env(#[source] ConfigErrorKind),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
