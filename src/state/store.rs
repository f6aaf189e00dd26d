use crate::models::bucket::BucketView;
use crate::models::character::{Character, VaultInfo};
use crate::models::inventory::Inventory;
use crate::models::item::{Item, TransferStatus};
use crate::models::profile::Membership;
use crate::models::types::{CharacterId, ItemId, Owner, PlatformType, StorageFilter};
use crate::services::classifier;
use crate::services::reconciler::Reconciled;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// The current snapshot of one account.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub memberships: Vec<Membership>,
    pub membership: Option<Membership>,

    pub inventory: Inventory,
    pub characters: BTreeMap<CharacterId, Character>,
    pub vault: Option<VaultInfo>,

    pub active_character: Option<CharacterId>,
    pub storage_filter: StorageFilter,

    /// Bumped on every committed batch
    pub revision: u64,
}

/// A single field change on one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemUpdate {
    Quantity(u32),
    TransferStatus(TransferStatus),
}

/// Every way the store can change.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Throw away items, characters and the vault and take these instead
    FullRefresh(Box<Reconciled>),
    SetMemberships(Vec<Membership>),
    SetPlatformType(PlatformType),
    /// Put items into the map without listing them under an owner
    AddItems(Vec<Item>),
    /// Take items out of the map (and out of whatever list holds them)
    RemoveItems(Vec<ItemId>),
    AddItemIds { owner: Owner, ids: Vec<ItemId> },
    RemoveItemIds { owner: Owner, ids: Vec<ItemId> },
    UpdateItem { id: ItemId, update: ItemUpdate },
    SetCharacter(Character),
    /// Replace one character's whole item list
    ReplaceCharacterItems { character: CharacterId, items: Vec<Item> },
    SetActiveCharacter(CharacterId),
    SetStorageFilter(StorageFilter),
}

impl StoreState {
    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::FullRefresh(refresh) => {
                let Reconciled {
                    membership,
                    inventory,
                    characters,
                    vault,
                } = *refresh;
                if membership.is_some() {
                    self.membership = membership;
                }
                self.inventory = inventory;
                self.characters = characters;
                self.vault = vault;

                let keep = self
                    .active_character
                    .as_ref()
                    .is_some_and(|id| self.characters.contains_key(id));
                if !keep {
                    self.active_character = self.characters.keys().next().cloned();
                }
                if !self.filter_is_usable(&self.storage_filter) {
                    self.storage_filter = StorageFilter::All;
                }
            }
            Mutation::SetMemberships(memberships) => self.memberships = memberships,
            Mutation::SetPlatformType(platform) => {
                let membership = self.memberships.iter().find(|m| m.membership_type == platform).cloned();
                match membership {
                    Some(m) => self.membership = Some(m),
                    None => {
                        if let Some(m) = self.membership.as_mut() {
                            m.membership_type = platform;
                        }
                    }
                }
            }
            Mutation::AddItems(items) => {
                for item in items {
                    self.inventory.items.insert(item.id.clone(), item);
                }
            }
            Mutation::RemoveItems(ids) => {
                for id in ids {
                    self.inventory.remove(&id);
                }
            }
            Mutation::AddItemIds { owner, ids } => {
                for id in ids {
                    self.inventory.add_id(&owner, &id);
                }
            }
            Mutation::RemoveItemIds { owner, ids } => {
                for id in ids {
                    if !self.inventory.remove_id(&owner, &id) {
                        tracing::warn!(%id, %owner, "id not held by owner");
                    }
                }
            }
            Mutation::UpdateItem { id, update } => match self.inventory.get_mut(&id) {
                Some(item) => match update {
                    ItemUpdate::Quantity(q) => item.quantity = q,
                    ItemUpdate::TransferStatus(s) => item.transfer_status = s,
                },
                None => tracing::warn!(%id, "update for unknown item"),
            },
            Mutation::SetCharacter(character) => {
                if self.active_character.is_none() {
                    self.active_character = Some(character.id.clone());
                }
                self.characters.insert(character.id.clone(), character);
            }
            Mutation::ReplaceCharacterItems { character, items } => {
                self.inventory.replace_character(&character, items);
            }
            Mutation::SetActiveCharacter(id) => {
                if self.storage_filter == StorageFilter::Character(id.clone()) {
                    self.storage_filter = StorageFilter::All;
                }
                self.active_character = Some(id);
            }
            Mutation::SetStorageFilter(filter) => {
                self.storage_filter = if self.filter_is_usable(&filter) { filter } else { StorageFilter::All };
            }
        }
    }

    /// A character filter must name a known character other than the active one.
    fn filter_is_usable(&self, filter: &StorageFilter) -> bool {
        match filter {
            StorageFilter::Character(id) => {
                self.characters.contains_key(id) && Some(id) != self.active_character.as_ref()
            }
            _ => true,
        }
    }

    // ========================================================================
    // DERIVED VIEWS
    // ========================================================================

    pub fn active_item_ids(&self) -> Vec<ItemId> {
        classifier::active_ids(&self.inventory, self.active_character.as_ref())
    }

    pub fn inactive_item_ids(&self) -> Vec<ItemId> {
        classifier::inactive_ids(&self.inventory, self.active_character.as_ref(), &self.storage_filter)
    }

    pub fn has_items(&self) -> bool {
        !self.inventory.account.is_empty() || !self.active_item_ids().is_empty() || !self.inactive_item_ids().is_empty()
    }

    pub fn buckets(&self) -> Vec<BucketView> {
        classifier::compute_buckets(&self.inventory, self.active_character.as_ref(), &self.storage_filter)
    }

    /// Most recently played first.
    pub fn sorted_characters(&self) -> Vec<Character> {
        let mut characters: Vec<Character> = self.characters.values().cloned().collect();
        characters.sort_by(|a, b| b.date_last_played.cmp(&a.date_last_played));
        characters
    }
}

/// Holds the snapshot. Every write goes through [`Store::commit`] or one of
/// its batch forms, and a batch is applied under a single write lock, so a
/// reader sees either all of it or none of it.
#[derive(Default)]
pub struct Store {
    state: RwLock<StoreState>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the current snapshot under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.read().clone()
    }

    pub fn commit(&self, mutation: Mutation) {
        self.commit_all(vec![mutation]);
    }

    pub fn commit_all(&self, mutations: Vec<Mutation>) {
        if mutations.is_empty() {
            return;
        }
        let mut state = self.state.write();
        for m in mutations {
            state.apply(m);
        }
        state.revision += 1;
    }

    /// Plan a batch against the state it will be applied to and apply it,
    /// all under one write lock. Nothing is applied when planning fails.
    pub fn commit_with<R, E>(&self, plan: impl FnOnce(&StoreState) -> Result<(Vec<Mutation>, R), E>) -> Result<R, E> {
        let mut state = self.state.write();
        let (mutations, out) = plan(&state)?;
        if !mutations.is_empty() {
            for m in mutations {
                state.apply(m);
            }
            state.revision += 1;
        }
        Ok(out)
    }

    // ========================================================================
    // GETTERS
    // ========================================================================

    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    pub fn item(&self, id: &ItemId) -> Option<Item> {
        self.state.read().inventory.get(id).cloned()
    }

    pub fn character(&self, id: &CharacterId) -> Option<Character> {
        self.state.read().characters.get(id).cloned()
    }

    pub fn membership(&self) -> Option<Membership> {
        self.state.read().membership.clone()
    }

    pub fn memberships(&self) -> Vec<Membership> {
        self.state.read().memberships.clone()
    }

    pub fn vault(&self) -> Option<VaultInfo> {
        self.state.read().vault.clone()
    }

    pub fn active_character(&self) -> Option<CharacterId> {
        self.state.read().active_character.clone()
    }

    pub fn storage_filter(&self) -> StorageFilter {
        self.state.read().storage_filter.clone()
    }

    pub fn active_item_ids(&self) -> Vec<ItemId> {
        self.state.read().active_item_ids()
    }

    pub fn inactive_item_ids(&self) -> Vec<ItemId> {
        self.state.read().inactive_item_ids()
    }

    pub fn has_items(&self) -> bool {
        self.state.read().has_items()
    }

    pub fn buckets(&self) -> Vec<BucketView> {
        self.state.read().buckets()
    }

    pub fn sorted_characters(&self) -> Vec<Character> {
        self.state.read().sorted_characters()
    }
}
