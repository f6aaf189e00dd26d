#![allow(dead_code)]

use async_trait::async_trait;
use deliverator::api::{ApiError, ApiResult, EquipRequest, RemoteApi, TransferRequest};
use deliverator::definitions::{BucketDefinition, Definitions, DisplayProperties, MemoryDefinitions, Table};
use deliverator::models::bucket::BUCKET_BUILD;
use deliverator::models::character::VAULT_VENDOR_HASH;
use deliverator::models::item::{Item, TransferStatus};
use deliverator::models::profile::{CharacterResponse, ManifestInfo, Membership, ProfileResponse};
use deliverator::models::types::{CharacterId, Hash, ItemId, MembershipId, Owner, PlatformType};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

pub const TITAN: &str = "2305843009260000001";
pub const HUNTER: &str = "2305843009260000002";

pub const HELMET: Hash = 3448274439;
pub const KINETIC: Hash = 1498876634;
pub const MATERIALS: Hash = 3865314626;
pub const CONSUMABLES: Hash = 1469714392;
pub const GENERAL: Hash = 138197802;

pub const GLIMMER_MAT: Hash = 100;
pub const HELM_A: Hash = 200;
pub const HELM_B: Hash = 201;
pub const RIFLE: Hash = 300;
pub const SNACK: Hash = 400;
pub const SUBCLASS: Hash = 500;

pub fn titan() -> CharacterId {
    CharacterId::new(TITAN)
}

pub fn hunter() -> CharacterId {
    CharacterId::new(HUNTER)
}

pub fn steam() -> Membership {
    Membership {
        membership_id: MembershipId::new("4611686018400000003"),
        membership_type: PlatformType(3),
        display_name: "guardian".into(),
    }
}

pub fn xbox() -> Membership {
    Membership {
        membership_id: MembershipId::new("4611686018400000001"),
        membership_type: PlatformType(1),
        display_name: "guardian".into(),
    }
}

fn bucket_json(hash: Hash, name: &str, scope: i32, location: i32) -> Value {
    json!({"hash": hash, "displayProperties": {"name": name}, "scope": scope, "location": location, "enabled": true})
}

fn item_json(hash: Hash, name: &str, bucket: Hash, max: u32) -> Value {
    json!({
        "hash": hash,
        "displayProperties": {"name": name, "icon": format!("/icons/{hash}.png"), "hasIcon": true},
        "inventory": {"bucketTypeHash": bucket, "maxStackSize": max},
        "equippable": max == 1,
    })
}

pub fn definitions_source() -> MemoryDefinitions {
    MemoryDefinitions::new()
        .with(Table::Class, json!({"hash": 1, "displayProperties": {"name": "Titan"}}))
        .with(Table::Class, json!({"hash": 2, "displayProperties": {"name": "Hunter"}}))
        .with(Table::Race, json!({"hash": 10, "displayProperties": {"name": "Exo"}}))
        .with(Table::Gender, json!({"hash": 20, "displayProperties": {"name": "Female"}}))
        .with(
            Table::Vendor,
            json!({"hash": VAULT_VENDOR_HASH, "displayProperties": {"name": "Vault", "icon": "/img/vault.png"}}),
        )
        .with(Table::InventoryBucket, bucket_json(HELMET, "Helmet", 0, 1))
        .with(Table::InventoryBucket, bucket_json(KINETIC, "Kinetic Weapons", 0, 1))
        .with(Table::InventoryBucket, bucket_json(MATERIALS, "Materials", 1, 0))
        .with(Table::InventoryBucket, bucket_json(CONSUMABLES, "Consumables", 0, 1))
        .with(Table::InventoryBucket, bucket_json(GENERAL, "General", 1, 2))
        .with(Table::InventoryBucket, bucket_json(BUCKET_BUILD, "Subclass", 0, 1))
        .with(Table::InventoryItem, item_json(GLIMMER_MAT, "Glimmer Mat", MATERIALS, 10))
        .with(Table::InventoryItem, item_json(HELM_A, "Helm A", HELMET, 1))
        .with(Table::InventoryItem, item_json(HELM_B, "Helm B", HELMET, 1))
        .with(Table::InventoryItem, item_json(RIFLE, "Rifle", KINETIC, 1))
        .with(Table::InventoryItem, item_json(SNACK, "Snack", CONSUMABLES, 10))
        .with(Table::InventoryItem, item_json(SUBCLASS, "Striker", BUCKET_BUILD, 1))
}

pub async fn definitions() -> Arc<Definitions> {
    Arc::new(Definitions::open("en", Arc::new(definitions_source())).await.unwrap())
}

fn character_json(id: &str, class_hash: Hash, played: &str) -> Value {
    json!({
        "characterId": id,
        "dateLastPlayed": played,
        "light": 1810,
        "classHash": class_hash,
        "raceHash": 10,
        "genderHash": 20,
        "baseCharacterLevel": 50,
        "emblemPath": "/img/emblem.jpg",
        "emblemBackgroundPath": "/img/emblem_bg.jpg",
        "emblemColor": {"red": 18, "green": 52, "blue": 86, "alpha": 255},
    })
}

pub fn record(hash: Hash, instance: Option<&str>, quantity: u32, bucket: Hash, location: i32, status: u32) -> Value {
    let mut v = json!({
        "itemHash": hash,
        "quantity": quantity,
        "bucketHash": bucket,
        "location": location,
        "transferStatus": status,
    });
    if let Some(id) = instance {
        v["itemInstanceId"] = json!(id);
    }
    v
}

/// A profile with two characters, a vault and account-wide materials.
pub fn profile_json() -> Value {
    json!({
        "profile": {"data": {"userInfo": {
            "membershipId": "4611686018400000003", "membershipType": 3, "displayName": "guardian"
        }}},
        "profileInventory": {"data": {"items": [
            // account-wide materials, in their own bucket's account slot
            record(GLIMMER_MAT, None, 5, MATERIALS, 0, 0),
            // same type but parked in the vault's general bucket
            record(GLIMMER_MAT, None, 7, GENERAL, 2, 0),
            record(RIFLE, Some("6917000000000000010"), 1, GENERAL, 2, 0),
            // unknown type, dropped
            record(999, None, 1, GENERAL, 2, 0),
        ]}},
        "characters": {"data": {
            TITAN: character_json(TITAN, 1, "2025-03-01T10:00:00Z"),
            HUNTER: character_json(HUNTER, 2, "2025-03-05T10:00:00Z"),
        }},
        "characterInventories": {"data": {
            TITAN: {"items": [
                record(HELM_B, Some("6917000000000000002"), 1, HELMET, 1, 0),
                record(SNACK, None, 4, CONSUMABLES, 1, 0),
            ]},
            HUNTER: {"items": [
                record(HELM_A, Some("6917000000000000003"), 1, HELMET, 1, 0),
            ]},
        }},
        "characterEquipment": {"data": {
            TITAN: {"items": [
                record(HELM_A, Some("6917000000000000001"), 1, HELMET, 1, 1),
                record(SUBCLASS, Some("6917000000000000004"), 1, BUCKET_BUILD, 1, 1 | 2),
            ]},
            HUNTER: {"items": []},
        }},
        "itemComponents": {"instances": {"data": {
            "6917000000000000001": {"damageType": 0, "canEquip": true, "primaryStat": {"statHash": 3897883278u32, "value": 1810}},
            "6917000000000000002": {"damageType": 0, "canEquip": true},
            "6917000000000000010": {"damageType": 2, "canEquip": false},
        }}},
    })
}

pub fn profile() -> ProfileResponse {
    serde_json::from_value(profile_json()).unwrap()
}

/// Titan after an equip, as a single-character fetch returns it.
pub fn titan_after_equip() -> CharacterResponse {
    serde_json::from_value(titan_after_equip_json()).unwrap()
}

pub fn titan_after_equip_json() -> Value {
    json!({
        "character": {"data": {
            "characterId": TITAN,
            "dateLastPlayed": "2025-03-06T10:00:00Z",
            "light": 1811,
            "classHash": 1, "raceHash": 10, "genderHash": 20,
            "emblemColor": {"red": 0, "green": 0, "blue": 0, "alpha": 255},
        }},
        "inventory": {"data": {"items": [
            record(HELM_A, Some("6917000000000000001"), 1, HELMET, 1, 0),
            record(SNACK, None, 4, CONSUMABLES, 1, 0),
        ]}},
        "equipment": {"data": {"items": [
            record(HELM_B, Some("6917000000000000002"), 1, HELMET, 1, 1),
            record(SUBCLASS, Some("6917000000000000004"), 1, BUCKET_BUILD, 1, 1 | 2),
        ]}},
        "itemComponents": {"instances": {"data": {}}},
    })
}

pub fn bucket(hash: Hash, name: &str, scope: i32) -> BucketDefinition {
    BucketDefinition {
        hash,
        display_properties: DisplayProperties {
            name: name.to_string(),
            ..Default::default()
        },
        scope,
        location: 0,
        enabled: true,
        redacted: false,
    }
}

/// Hand built item, for state that is easier to write out than to fetch.
pub fn item(id: &str, hash: Hash, owner: Owner, quantity: u32, max: u32, bucket: BucketDefinition) -> Item {
    Item {
        id: ItemId::new(id),
        hash,
        owner,
        quantity,
        max_stack_size: max,
        current_bucket: bucket.clone(),
        bucket,
        location: 0,
        transfer_status: TransferStatus::default(),
        can_equip: true,
        equippable: max == 1,
        non_transferrable: false,
        name: format!("item {id}"),
        description: String::new(),
        icon: String::new(),
        type_name: String::new(),
        damage_type: 0,
        primary_stat: None,
    }
}

fn refused(what: &str) -> ApiError {
    ApiError::platform(1623, "DestinyItemNotFound", format!("{what} refused"))
}

/// Scripted remote system.
#[derive(Default)]
pub struct FakeApi {
    pub memberships: Vec<Membership>,
    /// Profiles by platform; platforms without one fail
    pub profiles: Mutex<HashMap<i32, ProfileResponse>>,
    pub character: Mutex<Option<CharacterResponse>>,
    pub fail_transfer: AtomicBool,
    pub fail_equip: AtomicBool,
    pub transfers: Mutex<Vec<TransferRequest>>,
    pub equips: Mutex<Vec<EquipRequest>>,
    /// When set, transfers park until released
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl FakeApi {
    pub fn with_profile(memberships: Vec<Membership>, platform: i32, profile: ProfileResponse) -> Self {
        let api = Self {
            memberships,
            ..Default::default()
        };
        api.profiles.lock().insert(platform, profile);
        api
    }

    pub fn fail_transfers(&self, fail: bool) {
        self.fail_transfer.store(fail, Ordering::SeqCst);
    }

    pub fn fail_equips(&self, fail: bool) {
        self.fail_equip.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteApi for FakeApi {
    async fn get_memberships(&self) -> ApiResult<Vec<Membership>> {
        Ok(self.memberships.clone())
    }

    async fn get_profile(&self, membership: &Membership, _components: &[u32]) -> ApiResult<ProfileResponse> {
        self.profiles
            .lock()
            .get(&membership.membership_type.0)
            .cloned()
            .ok_or_else(|| ApiError::platform(1601, "DestinyAccountNotFound", "no profile"))
    }

    async fn get_character(
        &self,
        _membership: &Membership,
        _character: &CharacterId,
        _components: &[u32],
    ) -> ApiResult<CharacterResponse> {
        self.character.lock().clone().ok_or(ApiError::Status(503))
    }

    async fn transfer_item(&self, req: &TransferRequest) -> ApiResult<()> {
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        if self.fail_transfer.load(Ordering::SeqCst) {
            return Err(refused("transfer"));
        }
        self.transfers.lock().push(req.clone());
        Ok(())
    }

    async fn equip_item(&self, req: &EquipRequest) -> ApiResult<()> {
        if self.fail_equip.load(Ordering::SeqCst) {
            return Err(refused("equip"));
        }
        self.equips.lock().push(req.clone());
        Ok(())
    }

    async fn get_manifest(&self) -> ApiResult<ManifestInfo> {
        Ok(ManifestInfo {
            version: "97000.25.01.01".into(),
            mobile_world_content_paths: HashMap::from([(
                "en".to_string(),
                "/common/destiny2_content/sqlite/en/world_sql_content_abc.content".to_string(),
            )]),
        })
    }
}
