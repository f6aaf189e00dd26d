//! Raw records as the remote system sends them. Nothing here is normalized;
//! see `services::reconciler` for how they become [`Item`](crate::models::item::Item)s.

use crate::models::item::PrimaryStat;
use crate::models::types::{CharacterId, Hash, MembershipId, PlatformType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// An account identity on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub membership_id: MembershipId,
    pub membership_type: PlatformType,
    #[serde(default)]
    pub display_name: String,
}

/// Profile components wrap their payload in `data`, which is absent when
/// privacy settings hide it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Component<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Default for Component<T> {
    fn default() -> Self {
        Self { data: None }
    }
}

/// One item as listed in an inventory or equipment component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub item_hash: Hash,
    #[serde(default)]
    pub item_instance_id: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub location: i32,
    #[serde(default)]
    pub bucket_hash: Hash,
    #[serde(default)]
    pub transfer_status: u32,
}

fn one() -> u32 {
    1
}

impl ItemRecord {
    /// Instance id when the record has a real one.
    pub fn instance_id(&self) -> Option<&str> {
        self.item_instance_id.as_deref().filter(|id| !id.is_empty() && *id != "0")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

/// Per-instance data (damage type, stats, equippability).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceComponent {
    pub damage_type: u32,
    pub primary_stat: Option<PrimaryStat>,
    pub can_equip: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemComponents {
    #[serde(default)]
    pub instances: Component<HashMap<String, InstanceComponent>>,
}

impl ItemComponents {
    pub fn instance(&self, instance_id: Option<&str>) -> Option<&InstanceComponent> {
        let id = instance_id?;
        self.instances.data.as_ref()?.get(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmblemColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub character_id: CharacterId,
    pub date_last_played: DateTime<Utc>,
    #[serde(default)]
    pub light: i32,
    pub class_hash: Hash,
    pub race_hash: Hash,
    pub gender_hash: Hash,
    #[serde(default)]
    pub base_character_level: i32,
    #[serde(default)]
    pub emblem_path: String,
    #[serde(default)]
    pub emblem_background_path: String,
    #[serde(default)]
    pub emblem_color: EmblemColor,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub user_info: Membership,
}

/// Everything one profile fetch returns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileResponse {
    pub profile: Component<ProfileData>,
    pub profile_inventory: Component<ItemList>,
    pub characters: Component<BTreeMap<CharacterId, CharacterRecord>>,
    pub character_inventories: Component<BTreeMap<CharacterId, ItemList>>,
    pub character_equipment: Component<BTreeMap<CharacterId, ItemList>>,
    pub item_components: ItemComponents,
}

impl ProfileResponse {
    pub fn membership(&self) -> Option<&Membership> {
        self.profile.data.as_ref().map(|p| &p.user_info)
    }
}

/// A single character fetched on its own (after an equip).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterResponse {
    pub character: Component<CharacterRecord>,
    pub inventory: Component<ItemList>,
    pub equipment: Component<ItemList>,
    pub item_components: ItemComponents,
}

/// Where the manifest database lives, per language.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestInfo {
    pub version: String,
    pub mobile_world_content_paths: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserMemberships {
    pub destiny_memberships: Vec<Membership>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_profile_with_hidden_components() {
        let resp: ProfileResponse = serde_json::from_value(json!({
            "profile": { "data": { "userInfo": { "membershipId": "4611686018", "membershipType": 3 } } },
            "profileInventory": { "data": { "items": [
                { "itemHash": 1, "quantity": 5, "bucketHash": 138197802, "location": 2 },
                { "itemHash": 2, "itemInstanceId": "6917529", "bucketHash": 138197802 }
            ] } },
            "characterInventories": { "privacy": 2 },
        }))
        .unwrap();

        let membership = resp.membership().unwrap();
        assert_eq!(membership.membership_type, PlatformType(3));

        let items = &resp.profile_inventory.data.as_ref().unwrap().items;
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].instance_id(), None);
        assert_eq!(items[1].quantity, 1);
        assert_eq!(items[1].instance_id(), Some("6917529"));

        assert!(resp.character_inventories.data.is_none());
        assert!(resp.characters.data.is_none());
    }

    #[test]
    fn zero_instance_id_means_none() {
        let rec: ItemRecord = serde_json::from_value(json!({"itemHash": 1, "itemInstanceId": "0"})).unwrap();
        assert_eq!(rec.instance_id(), None);
    }
}
