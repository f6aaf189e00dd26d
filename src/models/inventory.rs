use crate::models::item::Item;
use crate::models::types::{CharacterId, Hash, ItemId, Owner};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Every item of an account plus the per-owner id lists.
///
/// The id lists partition the item map: each id in `items` appears in exactly
/// one list, and that list matches the item's `owner`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub items: HashMap<ItemId, Item>,
    pub account: Vec<ItemId>,
    pub vault: Vec<ItemId>,
    pub characters: BTreeMap<CharacterId, Vec<ItemId>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    /// Ids held by `owner`. Unknown characters hold nothing.
    pub fn ids(&self, owner: &Owner) -> &[ItemId] {
        match owner {
            Owner::Account => &self.account,
            Owner::Vault => &self.vault,
            Owner::Character(id) => self.characters.get(id).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    fn ids_mut(&mut self, owner: &Owner) -> &mut Vec<ItemId> {
        match owner {
            Owner::Account => &mut self.account,
            Owner::Vault => &mut self.vault,
            Owner::Character(id) => self.characters.entry(id.clone()).or_default(),
        }
    }

    /// Items held by `owner`, in list order.
    pub fn items_of<'a>(&'a self, owner: &Owner) -> impl Iterator<Item = &'a Item> + 'a {
        self.ids(owner).iter().filter_map(|id| self.items.get(id))
    }

    pub fn has_owner(&self, owner: &Owner) -> bool {
        match owner {
            Owner::Account | Owner::Vault => true,
            Owner::Character(id) => self.characters.contains_key(id),
        }
    }

    /// Insert an item and file its id under the item's owner.
    pub fn insert(&mut self, item: Item) {
        let owner = item.owner.clone();
        let id = item.id.clone();
        self.items.insert(id.clone(), item);
        self.ids_mut(&owner).push(id);
    }

    /// Append `id` to `owner`'s list and make `owner` the item's owner.
    pub fn add_id(&mut self, owner: &Owner, id: &ItemId) {
        if let Some(item) = self.items.get_mut(id) {
            item.owner = owner.clone();
        }
        self.ids_mut(owner).push(id.clone());
    }

    /// Take `id` out of `owner`'s list. Returns whether it was there.
    pub fn remove_id(&mut self, owner: &Owner, id: &ItemId) -> bool {
        let ids = match owner {
            Owner::Account => &mut self.account,
            Owner::Vault => &mut self.vault,
            Owner::Character(c) => match self.characters.get_mut(c) {
                Some(ids) => ids,
                None => return false,
            },
        };
        match ids.iter().position(|i| i == id) {
            Some(pos) => {
                ids.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Drop an item entirely: out of its owner's list and out of the map.
    pub fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let item = self.items.remove(id)?;
        self.remove_id(&item.owner, id);
        Some(item)
    }

    /// Replace everything a character holds with `items`, a fresh ingestion
    /// of that character's records. Items keep the owner they were classified
    /// with, and an incoming id replaces whatever entry held it before.
    ///
    /// Account-wide stacks without an instance cannot be matched to the
    /// stacks already placed, so they are left to the next full refresh.
    pub fn replace_character(&mut self, character: &CharacterId, items: Vec<Item>) {
        let owner = Owner::Character(character.clone());
        for id in self.characters.remove(character).unwrap_or_default() {
            self.items.remove(&id);
        }
        self.characters.insert(character.clone(), Vec::with_capacity(items.len()));
        for item in items {
            if item.owner != owner && !item.is_instanced() {
                tracing::trace!(id = %item.id, owner = %item.owner, "unmatched stack skipped on refresh");
                continue;
            }
            self.remove(&item.id);
            self.insert(item);
        }
    }

    /// Every list, account first, then vault, then characters by id.
    pub fn owners(&self) -> impl Iterator<Item = (Owner, &[ItemId])> {
        [(Owner::Account, self.account.as_slice()), (Owner::Vault, self.vault.as_slice())]
            .into_iter()
            .chain(
                self.characters
                    .iter()
                    .map(|(id, ids)| (Owner::Character(id.clone()), ids.as_slice())),
            )
    }

    /// Check that the lists partition the item map and agree with each item's owner.
    pub fn is_partitioned(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.items.len());
        for (owner, ids) in self.owners() {
            for id in ids {
                let Some(item) = self.items.get(id) else {
                    return false;
                };
                if item.owner != owner || !seen.insert(id) {
                    return false;
                }
            }
        }
        seen.len() == self.items.len()
    }

    /// Total quantity of one item type held by `owner`.
    pub fn quantity_of(&self, owner: &Owner, hash: Hash) -> u32 {
        self.items_of(owner).filter(|i| i.hash == hash).map(|i| i.quantity).sum()
    }
}
