use crate::definitions::{BucketDefinition, LOCATION_ACCOUNT_SLOT};
use crate::models::bucket::{BUCKET_BUILD, BucketView, Visibility};
use crate::models::inventory::Inventory;
use crate::models::types::{CharacterId, Hash, ItemId, Owner, StorageFilter};
use std::collections::BTreeMap;

/// Final owner of an item.
///
/// `default` is the vault for profile-level records and the character for
/// per-character records. Account-scoped buckets override it when the item
/// sits in the account-wide slot of its own display bucket.
pub fn classify_owner(default: Owner, bucket: &BucketDefinition, current: &BucketDefinition) -> Owner {
    if bucket.is_account_scoped() && bucket.hash == current.hash && current.location == LOCATION_ACCOUNT_SLOT {
        return Owner::Account;
    }
    default
}

/// Ids shown in the active column: the active character's items followed by
/// the account-wide ones.
pub fn active_ids(inventory: &Inventory, active: Option<&CharacterId>) -> Vec<ItemId> {
    let mut ids = match active {
        Some(id) => inventory.ids(&Owner::Character(id.clone())).to_vec(),
        None => Vec::new(),
    };
    ids.extend_from_slice(&inventory.account);
    ids
}

/// Ids shown in the storage column for `filter`.
pub fn inactive_ids(inventory: &Inventory, active: Option<&CharacterId>, filter: &StorageFilter) -> Vec<ItemId> {
    match filter {
        StorageFilter::All => {
            let mut ids = inventory.vault.clone();
            for (character, held) in &inventory.characters {
                if Some(character) != active {
                    ids.extend_from_slice(held);
                }
            }
            ids
        }
        StorageFilter::Vault => inventory.vault.clone(),
        StorageFilter::Character(id) => inventory.ids(&Owner::Character(id.clone())).to_vec(),
    }
}

/// Group the visible items into display buckets.
///
/// Recomputed from scratch on every call. Items in hidden buckets are left
/// out, the build bucket never appears in the storage column, empty buckets
/// are dropped, and the rest are ordered by rank then hash.
pub fn compute_buckets(inventory: &Inventory, active: Option<&CharacterId>, filter: &StorageFilter) -> Vec<BucketView> {
    let mut buckets: BTreeMap<Hash, BucketView> = BTreeMap::new();

    let mut place = |id: &ItemId, storage: bool| {
        let Some(item) = inventory.get(id) else {
            return;
        };
        if Visibility::of(&item.bucket) != Visibility::Enabled {
            return;
        }
        if storage && item.bucket.hash == BUCKET_BUILD {
            return;
        }
        let view = buckets.entry(item.bucket.hash).or_insert_with(|| BucketView::new(&item.bucket));
        if storage {
            view.inactive.push(id.clone());
        } else {
            view.active.push(id.clone());
        }
    };

    for id in active_ids(inventory, active) {
        place(&id, false);
    }
    for id in inactive_ids(inventory, active, filter) {
        place(&id, true);
    }

    let mut views: Vec<BucketView> = buckets.into_values().filter(|b| !b.is_empty()).collect();
    views.sort_by_key(|b| (b.order, b.hash));
    views
}
