use crate::api::paths::{BASE, prefix_url};
use crate::definitions::{DefResult, Definitions, NamedDefinition, Table};
use crate::models::character::{Character, VAULT_VENDOR_HASH, VaultInfo, rgb_to_hex};
use crate::models::inventory::Inventory;
use crate::models::item::Item;
use crate::models::profile::{CharacterRecord, ItemComponents, ItemList, ItemRecord, Membership, ProfileResponse};
use crate::models::types::{CharacterId, Owner};
use crate::services::normalizer::normalize_item;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Everything one profile fetch produces, committed to the store in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub membership: Option<Membership>,
    pub inventory: Inventory,
    pub characters: BTreeMap<CharacterId, Character>,
    pub vault: Option<VaultInfo>,
}

/// Joins the raw record sets of a profile into one inventory.
pub struct Reconciler {
    defs: Arc<Definitions>,
}

impl Reconciler {
    pub fn new(defs: Arc<Definitions>) -> Self {
        Self { defs }
    }

    /// Build the full inventory and the character snapshots of a profile.
    ///
    /// Records whose definitions cannot be resolved are dropped with a
    /// warning; so are characters. Nothing here fails the whole pass.
    pub async fn reconcile(&self, profile: &ProfileResponse) -> Reconciled {
        let components = &profile.item_components;
        let empty = ItemList::default();

        let profile_items = profile.profile_inventory.data.as_ref().unwrap_or(&empty);
        let inventories = profile.character_inventories.data.as_ref();
        let equipment = profile.character_equipment.data.as_ref();

        let mut character_ids: BTreeSet<CharacterId> = profile
            .characters
            .data
            .as_ref()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        if let Some(inv) = inventories {
            character_ids.extend(inv.keys().cloned());
        }

        let character_records: Vec<&CharacterRecord> =
            profile.characters.data.as_ref().map(|c| c.values().collect()).unwrap_or_default();

        let per_character = character_ids.iter().map(|id| {
            let inventory = inventories.and_then(|m| m.get(id)).unwrap_or(&empty);
            let equipped = equipment.and_then(|m| m.get(id)).unwrap_or(&empty);
            self.character_items(id, inventory, equipped, components)
        });

        let (vault_items, character_items, characters, vault) = futures::join!(
            self.normalize_all(&profile_items.items, Owner::Vault, components),
            join_all(per_character),
            join_all(character_records.into_iter().map(|r| self.character_or_warn(r))),
            self.vault_or_warn(),
        );

        let mut inventory = Inventory::new();
        for id in &character_ids {
            inventory.characters.insert(id.clone(), Vec::new());
        }
        merge_items(&mut inventory, vault_items);
        for items in character_items {
            merge_items(&mut inventory, items);
        }

        let characters: BTreeMap<CharacterId, Character> =
            characters.into_iter().flatten().map(|c| (c.id.clone(), c)).collect();

        tracing::info!(
            items = inventory.items.len(),
            characters = characters.len(),
            account = inventory.account.len(),
            vault = inventory.vault.len(),
            "profile reconciled"
        );

        Reconciled {
            membership: profile.membership().cloned(),
            inventory,
            characters,
            vault,
        }
    }

    /// Inventory and equipment of one character, normalized. Equipment
    /// records are that character's equipped slots, not extra copies.
    pub async fn character_items(
        &self,
        character: &CharacterId,
        inventory: &ItemList,
        equipment: &ItemList,
        components: &ItemComponents,
    ) -> Vec<Item> {
        let owner = Owner::Character(character.clone());
        let records: Vec<ItemRecord> = inventory.items.iter().chain(equipment.items.iter()).cloned().collect();
        self.normalize_all(&records, owner, components).await
    }

    async fn normalize_all(&self, records: &[ItemRecord], owner: Owner, components: &ItemComponents) -> Vec<Item> {
        let results = join_all(records.iter().map(|record| {
            let owner = owner.clone();
            async move {
                let instance = components.instance(record.instance_id());
                (record, normalize_item(&self.defs, record, instance, owner).await)
            }
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(record, res)| match res {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(hash = record.item_hash, instance = ?record.item_instance_id, error = %e, "dropping item record");
                    None
                }
            })
            .collect()
    }

    /// Display snapshot of a character from its record and the class, race
    /// and gender tables.
    pub async fn process_character(&self, record: &CharacterRecord) -> DefResult<Character> {
        let (class, race, gender) = tokio::try_join!(
            self.defs.get_as::<NamedDefinition>(Table::Class, record.class_hash),
            self.defs.get_as::<NamedDefinition>(Table::Race, record.race_hash),
            self.defs.get_as::<NamedDefinition>(Table::Gender, record.gender_hash),
        )?;

        Ok(Character {
            id: record.character_id.clone(),
            date_last_played: record.date_last_played,
            class_name: class.display_properties.name,
            race: race.display_properties.name,
            gender: gender.display_properties.name,
            light: record.light,
            base_character_level: record.base_character_level,
            emblem_path: prefix_url(&record.emblem_path, BASE),
            background_path: prefix_url(&record.emblem_background_path, BASE),
            emblem_color: rgb_to_hex(&record.emblem_color),
        })
    }

    async fn character_or_warn(&self, record: &CharacterRecord) -> Option<Character> {
        match self.process_character(record).await {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(character = %record.character_id, error = %e, "dropping character");
                None
            }
        }
    }

    /// Name and emblem of the vault, taken from the vault vendor.
    pub async fn vault_info(&self) -> DefResult<VaultInfo> {
        let vendor: NamedDefinition = self.defs.get_as(Table::Vendor, VAULT_VENDOR_HASH).await?;
        Ok(VaultInfo {
            name: vendor.display_properties.name,
            emblem_path: prefix_url(&vendor.display_properties.icon, BASE),
        })
    }

    async fn vault_or_warn(&self) -> Option<VaultInfo> {
        match self.vault_info().await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(error = %e, "vault definition unavailable");
                None
            }
        }
    }
}

/// Additive merge: an id that is already placed is never overwritten.
fn merge_items(inventory: &mut Inventory, items: Vec<Item>) {
    for item in items {
        if inventory.items.contains_key(&item.id) {
            tracing::warn!(id = %item.id, owner = %item.owner, "duplicate item id, keeping the first");
            continue;
        }
        inventory.insert(item);
    }
}
