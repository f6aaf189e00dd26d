use crate::api::paths::{BASE, MISSING_ICON, prefix_url};
use crate::definitions::{BucketDefinition, DefResult, Definitions, ItemDefinition, Table};
use crate::models::bucket::{BUCKET_BUILD, Visibility};
use crate::models::item::{Item, TransferStatus};
use crate::models::profile::{InstanceComponent, ItemRecord};
use crate::models::types::{ItemId, Owner};
use crate::services::classifier::classify_owner;

/// Icon URL for a type definition, absolute, or the placeholder when the
/// type has none.
pub fn resolve_icon(def: &ItemDefinition) -> String {
    if !def.display_properties.has_icon || def.display_properties.icon.is_empty() {
        return MISSING_ICON.to_string();
    }
    prefix_url(&def.display_properties.icon, BASE)
}

/// Instance damage type, else the type's first default, else none (0).
pub fn resolve_damage_type(def: &ItemDefinition, instance: Option<&InstanceComponent>) -> u32 {
    instance
        .map(|i| i.damage_type)
        .filter(|d| *d != 0)
        .or_else(|| def.damage_types.first().copied())
        .unwrap_or(0)
}

/// Turn one raw record into an [`Item`].
///
/// `Ok(None)` means the record sits in a bucket that is never shown
/// (disabled, redacted, unnamed or hidden); that is filtering, not failure.
/// Any definition that cannot be resolved is an error for this record only.
pub async fn normalize_item(
    defs: &Definitions,
    record: &ItemRecord,
    instance: Option<&InstanceComponent>,
    owner: Owner,
) -> DefResult<Option<Item>> {
    let def: ItemDefinition = defs.get_as(Table::InventoryItem, record.item_hash).await?;
    let (bucket, current_bucket) = tokio::try_join!(
        defs.get_as::<BucketDefinition>(Table::InventoryBucket, def.inventory.bucket_type_hash),
        defs.get_as::<BucketDefinition>(Table::InventoryBucket, record.bucket_hash),
    )?;

    let visibility = Visibility::of(&bucket);
    if visibility != Visibility::Enabled {
        tracing::trace!(hash = record.item_hash, bucket = bucket.hash, ?visibility, "filtered");
        return Ok(None);
    }

    let id = match record.instance_id() {
        Some(instance_id) => ItemId::new(instance_id),
        None => ItemId::synthetic(),
    };
    let owner = classify_owner(owner, &bucket, &current_bucket);

    let primary_stat = instance
        .and_then(|i| i.primary_stat)
        .filter(|_| bucket.hash != BUCKET_BUILD);

    Ok(Some(Item {
        id,
        hash: record.item_hash,
        owner,
        quantity: record.quantity.max(1),
        max_stack_size: def.inventory.max_stack_size.max(1),
        location: record.location,
        transfer_status: TransferStatus(record.transfer_status),
        can_equip: instance.is_some_and(|i| i.can_equip),
        equippable: def.equippable,
        non_transferrable: def.non_transferrable,
        name: def.display_properties.name.clone(),
        description: def.display_properties.description.clone(),
        icon: resolve_icon(&def),
        type_name: def.item_type_display_name.clone(),
        damage_type: resolve_damage_type(&def, instance),
        primary_stat,
        bucket,
        current_bucket,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::MemoryDefinitions;
    use crate::models::item::PrimaryStat;
    use crate::models::types::CharacterId;
    use serde_json::json;
    use std::sync::Arc;

    const HELMET: u32 = 3448274439;

    async fn defs() -> Definitions {
        let source = MemoryDefinitions::new()
            .with(
                Table::InventoryItem,
                json!({
                    "hash": 10,
                    "displayProperties": {"name": "Helm", "icon": "/img/helm.png", "hasIcon": true},
                    "inventory": {"bucketTypeHash": HELMET, "maxStackSize": 1},
                    "damageTypes": [3],
                    "equippable": true,
                }),
            )
            .with(
                Table::InventoryItem,
                json!({
                    "hash": 11,
                    "displayProperties": {"name": "Subclass"},
                    "inventory": {"bucketTypeHash": BUCKET_BUILD, "maxStackSize": 1},
                }),
            )
            .with(
                Table::InventoryItem,
                json!({
                    "hash": 12,
                    "displayProperties": {"name": "Lost"},
                    "inventory": {"bucketTypeHash": 999, "maxStackSize": 1},
                }),
            )
            .with(
                Table::InventoryBucket,
                json!({"hash": HELMET, "displayProperties": {"name": "Helmet"}, "enabled": true}),
            )
            .with(
                Table::InventoryBucket,
                json!({"hash": BUCKET_BUILD, "displayProperties": {"name": "Subclass"}, "enabled": true}),
            )
            .with(
                Table::InventoryBucket,
                json!({"hash": 999, "displayProperties": {"name": "Lost Items"}, "enabled": true, "redacted": true}),
            );
        Definitions::open("en", Arc::new(source)).await.unwrap()
    }

    fn record(hash: u32, bucket: u32, instance: Option<&str>) -> ItemRecord {
        ItemRecord {
            item_hash: hash,
            item_instance_id: instance.map(str::to_string),
            quantity: 1,
            location: 1,
            bucket_hash: bucket,
            transfer_status: 0,
        }
    }

    fn owner() -> Owner {
        Owner::Character(CharacterId::new("1"))
    }

    #[tokio::test]
    async fn normalizes_instanced_item() {
        let defs = defs().await;
        let instance = InstanceComponent {
            damage_type: 0,
            primary_stat: Some(PrimaryStat { stat_hash: 3897883278, value: 1810 }),
            can_equip: true,
        };
        let item = normalize_item(&defs, &record(10, HELMET, Some("6917")), Some(&instance), owner())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(item.id, ItemId::new("6917"));
        assert_eq!(item.icon, "https://www.bungie.net/img/helm.png");
        assert_eq!(item.damage_type, 3);
        assert!(item.can_equip);
        assert_eq!(item.primary_stat.map(|s| s.value), Some(1810));
        assert_eq!(item.owner, owner());
    }

    #[tokio::test]
    async fn build_bucket_drops_primary_stat_and_uses_placeholder_icon() {
        let defs = defs().await;
        let instance = InstanceComponent {
            primary_stat: Some(PrimaryStat { stat_hash: 1, value: 1 }),
            ..Default::default()
        };
        let item = normalize_item(&defs, &record(11, BUCKET_BUILD, None), Some(&instance), owner())
            .await
            .unwrap()
            .unwrap();
        assert!(item.id.is_synthetic());
        assert_eq!(item.icon, MISSING_ICON);
        assert!(item.primary_stat.is_none());
        assert_eq!(item.damage_type, 0);
    }

    #[tokio::test]
    async fn redacted_bucket_is_filtered_not_failed() {
        let defs = defs().await;
        let res = normalize_item(&defs, &record(12, 999, None), None, owner()).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn unknown_type_is_an_error() {
        let defs = defs().await;
        assert!(normalize_item(&defs, &record(404, HELMET, None), None, owner()).await.is_err());
    }
}
