//! The remote game-data system: request plumbing, the operations the
//! inventory engine calls, and the profile/manifest helpers built on them.

use crate::models::profile::{CharacterResponse, ManifestInfo, Membership, ProfileResponse};
use crate::models::types::{CharacterId, Hash, PlatformType};
use async_trait::async_trait;
use serde::Serialize;

mod bootstrap;
mod client;
mod error;
pub mod paths;
mod viable;

pub use bootstrap::{ManifestLocation, hint_path_for, locate_manifest, write_hint};
pub use client::BungieClient;
pub use error::ApiError;
pub use viable::fetch_viable_profile;

pub type ApiResult<T> = Result<T, ApiError>;

/// Components requested for a full profile fetch.
pub const PROFILE_COMPONENTS: [u32; 14] = [100, 102, 103, 200, 201, 205, 300, 301, 302, 304, 305, 306, 307, 308];

/// Components requested when one character is refreshed after an equip.
pub const CHARACTER_COMPONENTS: [u32; 4] = [200, 201, 205, 300];

/// Body of a transfer call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Character context of the move. Vault moves name the character on
    /// the non-vault side.
    pub character_id: CharacterId,
    /// "0" for stacks without an instance; the remote system uses the hash then
    pub item_id: String,
    pub item_reference_hash: Hash,
    pub membership_type: PlatformType,
    pub stack_size: u32,
    pub transfer_to_vault: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipRequest {
    pub character_id: CharacterId,
    pub item_id: String,
    pub membership_type: PlatformType,
}

#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Memberships of the authenticated user
    async fn get_memberships(&self) -> ApiResult<Vec<Membership>>;

    async fn get_profile(&self, membership: &Membership, components: &[u32]) -> ApiResult<ProfileResponse>;

    async fn get_character(
        &self,
        membership: &Membership,
        character: &CharacterId,
        components: &[u32],
    ) -> ApiResult<CharacterResponse>;

    async fn transfer_item(&self, req: &TransferRequest) -> ApiResult<()>;

    async fn equip_item(&self, req: &EquipRequest) -> ApiResult<()>;

    /// Manifest metadata, including where each language's database lives
    async fn get_manifest(&self) -> ApiResult<ManifestInfo>;
}
