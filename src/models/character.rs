use crate::models::profile::EmblemColor;
use crate::models::types::{CharacterId, Hash};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Vendor hash of the vault; its definition names and decorates the vault column.
pub const VAULT_VENDOR_HASH: Hash = 1037843411;

/// Display snapshot of one character. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub id: CharacterId,
    pub date_last_played: DateTime<Utc>,

    pub class_name: String,
    pub race: String,
    pub gender: String,

    pub light: i32,
    pub base_character_level: i32,

    pub emblem_path: String,
    pub background_path: String,
    /// `RRGGBB`, upper case
    pub emblem_color: String,
}

impl Character {
    /// Get the one-line summary used in listings
    pub fn title(&self) -> String {
        format!("{} {} {} ({})", self.race, self.gender, self.class_name, self.light)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultInfo {
    pub name: String,
    pub emblem_path: String,
}

/// Emblem colour as a six digit hex string. Alpha is ignored.
pub fn rgb_to_hex(color: &EmblemColor) -> String {
    let bin = (u32::from(color.red) << 16) | (u32::from(color.green) << 8) | u32::from(color.blue);
    format!("{bin:06X}")
}
