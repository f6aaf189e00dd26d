use crate::api::{CHARACTER_COMPONENTS, EquipRequest, RemoteApi, TransferRequest};
use crate::error::{AppResult, DomainError};
use crate::models::inventory::Inventory;
use crate::models::item::Item;
use crate::models::profile::Membership;
use crate::models::types::{CharacterId, ItemId, Owner};
use crate::services::reconciler::Reconciler;
use crate::state::store::{ItemUpdate, Mutation, Store, StoreState};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// Where the moved stack really lands. Account-scoped items leaving the
/// vault go to account-wide storage whatever the caller named.
pub fn effective_destination(item: &Item, from: &Owner, to: &Owner) -> Owner {
    if item.bucket.is_account_scoped() && *from == Owner::Vault {
        return Owner::Account;
    }
    to.clone()
}

fn check_quantity(item: &Item, quantity: u32) -> AppResult<()> {
    if quantity == 0 || quantity > item.quantity {
        return Err(DomainError::InvalidQuantity {
            have: item.quantity,
            requested: quantity,
        });
    }
    if quantity < item.quantity && item.is_instanced() {
        return Err(DomainError::SplitInstancedItem(item.id.clone()));
    }
    Ok(())
}

/// Local mutations for a transfer the remote system has already accepted.
///
/// A full stack moves as is; a partial move splits off a fresh stack. The
/// moving stack then tops up the first destination stack of the same type
/// that has room; whatever does not fit stays at the destination as a new
/// stack. Once merged, the moving stack's id is gone.
pub fn plan_transfer(inventory: &Inventory, from: &Owner, to: &Owner, id: &ItemId, quantity: u32) -> AppResult<Vec<Mutation>> {
    let item = inventory.get(id).ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
    check_quantity(item, quantity)?;
    if item.owner != *from {
        return Err(DomainError::PreconditionFailed("item is not held by the source owner"));
    }

    let destination = effective_destination(item, from, to);
    let mut mutations = Vec::new();

    // The stack that travels, and whether it is a new split-off
    let (moving, split) = if quantity == item.quantity {
        mutations.push(Mutation::RemoveItemIds {
            owner: item.owner.clone(),
            ids: vec![item.id.clone()],
        });
        (item.clone(), false)
    } else {
        let mut clone = item.clone();
        clone.id = ItemId::synthetic();
        clone.quantity = quantity;
        mutations.push(Mutation::UpdateItem {
            id: item.id.clone(),
            update: ItemUpdate::Quantity(item.quantity - quantity),
        });
        (clone, true)
    };

    let candidate = inventory
        .items_of(&destination)
        .find(|c| c.hash == item.hash && c.id != item.id && c.spare_capacity() > 0);

    match candidate {
        None => {
            if split {
                mutations.push(Mutation::AddItems(vec![moving.clone()]));
            }
            mutations.push(Mutation::AddItemIds {
                owner: destination,
                ids: vec![moving.id],
            });
        }
        Some(candidate) => {
            let absorbed = quantity.min(candidate.spare_capacity());
            let overflow = quantity - absorbed;
            mutations.push(Mutation::UpdateItem {
                id: candidate.id.clone(),
                update: ItemUpdate::Quantity(candidate.quantity + absorbed),
            });
            if !split {
                mutations.push(Mutation::RemoveItems(vec![moving.id.clone()]));
            }
            if overflow > 0 {
                let mut rest = moving;
                rest.id = ItemId::synthetic();
                rest.quantity = overflow;
                let rest_id = rest.id.clone();
                mutations.push(Mutation::AddItems(vec![rest]));
                mutations.push(Mutation::AddItemIds {
                    owner: destination,
                    ids: vec![rest_id],
                });
            }
        }
    }

    Ok(mutations)
}

/// Local mutations for an equip the remote system has already accepted:
/// whatever that character had equipped in the same bucket is unequipped
/// and the target is equipped. Other transfer status bits are left alone.
pub fn plan_equip(inventory: &Inventory, character: &CharacterId, id: &ItemId) -> AppResult<Vec<Mutation>> {
    let target = inventory.get(id).ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
    let owner = Owner::Character(character.clone());

    let mut mutations: Vec<Mutation> = inventory
        .items_of(&owner)
        .filter(|i| i.id != target.id && i.bucket.hash == target.bucket.hash && i.is_equipped())
        .map(|i| Mutation::UpdateItem {
            id: i.id.clone(),
            update: ItemUpdate::TransferStatus(i.transfer_status.with_equipped(false)),
        })
        .collect();

    mutations.push(Mutation::UpdateItem {
        id: target.id.clone(),
        update: ItemUpdate::TransferStatus(target.transfer_status.with_equipped(true)),
    });
    Ok(mutations)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum EquipOutcome {
    Equipped { refreshed: bool },
    /// Nothing to do, no remote call was made
    AlreadyEquipped,
}

/// Held while a remote call for one item is in flight.
struct ItemLock<'a> {
    locks: &'a DashMap<ItemId, ()>,
    id: ItemId,
}

impl Drop for ItemLock<'_> {
    fn drop(&mut self) {
        self.locks.remove(&self.id);
    }
}

/// Transfer and equip actions. Each one is a remote call followed, only on
/// success, by one atomic batch of store mutations.
pub struct TransferService {
    api: Arc<dyn RemoteApi>,
    store: Arc<Store>,
    reconciler: Arc<Reconciler>,
    locks: DashMap<ItemId, ()>,
}

impl TransferService {
    pub fn new(api: Arc<dyn RemoteApi>, store: Arc<Store>, reconciler: Arc<Reconciler>) -> Self {
        Self {
            api,
            store,
            reconciler,
            locks: DashMap::new(),
        }
    }

    fn lock(&self, id: &ItemId) -> AppResult<ItemLock<'_>> {
        if self.locks.insert(id.clone(), ()).is_some() {
            return Err(DomainError::ItemBusy(id.clone()));
        }
        Ok(ItemLock {
            locks: &self.locks,
            id: id.clone(),
        })
    }

    /// Whether an operation on `id` is in flight.
    pub fn is_busy(&self, id: &ItemId) -> bool {
        self.locks.contains_key(id)
    }

    // ========================================================================
    // TRANSFER
    // ========================================================================

    /// Remote call body for a transfer, checked against the current state.
    fn transfer_request(state: &StoreState, from: &Owner, to: &Owner, id: &ItemId, quantity: u32) -> AppResult<TransferRequest> {
        let item = state.inventory.get(id).ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
        check_quantity(item, quantity)?;
        if from == to {
            return Err(DomainError::PreconditionFailed("source and destination are the same"));
        }
        if item.owner != *from {
            return Err(DomainError::PreconditionFailed("item is not held by the source owner"));
        }
        if item.non_transferrable {
            return Err(DomainError::PreconditionFailed("item cannot be transferred"));
        }
        for owner in [from, to] {
            if !state.inventory.has_owner(owner) {
                return Err(DomainError::UnknownOwner(owner.clone()));
            }
        }
        let membership = state.membership.as_ref().ok_or(DomainError::NoActiveMembership)?;

        // The remote side only knows characters and the vault flag
        let to_vault = *to == Owner::Vault;
        let context = if to_vault { from } else { to };
        let character_id = match context {
            Owner::Character(c) => c.clone(),
            Owner::Account | Owner::Vault => state.active_character.clone().ok_or(DomainError::NoActiveCharacter)?,
        };

        Ok(TransferRequest {
            character_id,
            item_id: item.id.remote_id().to_string(),
            item_reference_hash: item.hash,
            membership_type: membership.membership_type,
            stack_size: quantity,
            transfer_to_vault: to_vault,
        })
    }

    /// Move `quantity` of `id` from `from` to `to`.
    pub async fn transfer(&self, from: &Owner, to: &Owner, id: &ItemId, quantity: u32) -> AppResult<()> {
        let _lock = self.lock(id)?;
        let req = self.store.read(|s| Self::transfer_request(s, from, to, id, quantity))?;

        if let Err(e) = self.api.transfer_item(&req).await {
            tracing::warn!(%id, %from, %to, error = %e, "transfer rejected");
            return Err(e.into());
        }

        self.store
            .commit_with(|s| plan_transfer(&s.inventory, from, to, id, quantity).map(|m| (m, ())))
            .inspect_err(|e| tracing::warn!(%id, error = %e, "transfer accepted remotely but state moved on"))?;

        tracing::info!(%id, %from, %to, quantity, "item transferred");
        Ok(())
    }

    // ========================================================================
    // EQUIP
    // ========================================================================

    /// Equip `id` on `character`, then refresh that character.
    pub async fn equip(&self, character: &CharacterId, id: &ItemId) -> AppResult<EquipOutcome> {
        let _lock = self.lock(id)?;

        let checked = self.store.read(|s| -> AppResult<Option<(EquipRequest, Membership)>> {
            let item = s.inventory.get(id).ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
            if item.is_equipped() {
                return Ok(None);
            }
            if item.owner != Owner::Character(character.clone()) {
                return Err(DomainError::PreconditionFailed("item is not carried by that character"));
            }
            let membership = s.membership.clone().ok_or(DomainError::NoActiveMembership)?;
            let req = EquipRequest {
                character_id: character.clone(),
                item_id: item.id.remote_id().to_string(),
                membership_type: membership.membership_type,
            };
            Ok(Some((req, membership)))
        })?;

        let Some((req, membership)) = checked else {
            tracing::debug!(%id, "item already equipped");
            return Ok(EquipOutcome::AlreadyEquipped);
        };

        if let Err(e) = self.api.equip_item(&req).await {
            tracing::warn!(%id, %character, error = %e, "equip rejected");
            return Err(e.into());
        }

        self.store
            .commit_with(|s| plan_equip(&s.inventory, character, id).map(|m| (m, ())))
            .inspect_err(|e| tracing::warn!(%id, error = %e, "equip accepted remotely but state moved on"))?;
        tracing::info!(%id, %character, "item equipped");

        let refreshed = self.refresh_character(&membership, character).await;
        Ok(EquipOutcome::Equipped { refreshed })
    }

    /// Re-fetch one character and replace its snapshot, and its items when
    /// they came back too. Failures are logged only.
    async fn refresh_character(&self, membership: &Membership, character: &CharacterId) -> bool {
        let resp = match self.api.get_character(membership, character, &CHARACTER_COMPONENTS).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(%character, error = %e, "character refresh failed");
                return false;
            }
        };

        let mut mutations = Vec::new();
        if let Some(record) = &resp.character.data {
            match self.reconciler.process_character(record).await {
                Ok(c) => mutations.push(Mutation::SetCharacter(c)),
                Err(e) => tracing::warn!(%character, error = %e, "character refresh dropped"),
            }
        }
        if let (Some(inventory), Some(equipment)) = (&resp.inventory.data, &resp.equipment.data) {
            let items = self
                .reconciler
                .character_items(character, inventory, equipment, &resp.item_components)
                .await;
            mutations.push(Mutation::ReplaceCharacterItems {
                character: character.clone(),
                items,
            });
        }

        let refreshed = !mutations.is_empty();
        self.store.commit_all(mutations);
        refreshed
    }
}
