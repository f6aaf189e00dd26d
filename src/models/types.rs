use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Numeric key of a manifest definition (item type, bucket, class, ...).
pub type Hash = u32;

#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)] // JSON = plain string, the remote system sends int64 ids as strings
        pub struct $name(pub String);

        impl $name {
            #[inline]
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::convert::Infallible;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(v: &str) -> Self {
                Self(v.to_string())
            }
        }
        impl From<String> for $name {
            fn from(v: String) -> Self {
                Self(v)
            }
        }
        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ItemId);
define_id!(CharacterId);
define_id!(MembershipId);

static NEXT_SYNTHETIC: AtomicU64 = AtomicU64::new(1);

impl ItemId {
    /// Prefix reserved for ids we make up locally. Remote instance ids are
    /// numeric, so they can never collide with these.
    pub const SYNTHETIC_PREFIX: &'static str = "item_";

    /// Fresh id for a non-instanced stack.
    pub fn synthetic() -> Self {
        let n = NEXT_SYNTHETIC.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}{n}", Self::SYNTHETIC_PREFIX))
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.0.starts_with(Self::SYNTHETIC_PREFIX)
    }

    /// Id as the remote system expects it: stacks without an instance are
    /// addressed by type hash, so they travel as "0".
    pub fn remote_id(&self) -> &str {
        if self.is_synthetic() { "0" } else { &self.0 }
    }
}

/// Platform a membership lives on (remote `membershipType`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformType(pub i32);

impl core::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who holds an item. Every item has exactly one owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Owner {
    /// Account-wide inventory, shared by every character
    Account,
    /// The vault
    Vault,
    /// A single character
    Character(CharacterId),
}

impl Owner {
    pub fn character_id(&self) -> Option<&CharacterId> {
        match self {
            Owner::Character(id) => Some(id),
            _ => None,
        }
    }
}

impl core::fmt::Display for Owner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Owner::Account => f.write_str("account"),
            Owner::Vault => f.write_str("vault"),
            Owner::Character(id) => f.write_str(id.as_str()),
        }
    }
}

impl core::str::FromStr for Owner {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "account" => Owner::Account,
            "vault" => Owner::Vault,
            _ => Owner::Character(CharacterId::new(s)),
        })
    }
}

/// Which storage column is shown next to the active character.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum StorageFilter {
    /// Vault plus every character that is not active
    #[default]
    All,
    Vault,
    Character(CharacterId),
}

impl core::fmt::Display for StorageFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageFilter::All => f.write_str("all"),
            StorageFilter::Vault => f.write_str("vault"),
            StorageFilter::Character(id) => f.write_str(id.as_str()),
        }
    }
}

impl core::str::FromStr for StorageFilter {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "all" => StorageFilter::All,
            "vault" => StorageFilter::Vault,
            _ => StorageFilter::Character(CharacterId::new(s)),
        })
    }
}
