use crate::definitions::BucketDefinition;
use crate::models::types::{Hash, ItemId};
use serde::Serialize;

/// The subclass ("build") bucket. Only shown for the active character.
pub const BUCKET_BUILD: Hash = 3284755031;

/// Local overrides for how a bucket is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketMeta {
    pub name: &'static str,
    pub order: Option<u32>,
    pub expand: bool,
    pub hidden: bool,
}

const fn shown(name: &'static str, order: u32, expand: bool) -> BucketMeta {
    BucketMeta {
        name,
        order: Some(order),
        expand,
        hidden: false,
    }
}

pub fn bucket_meta(hash: Hash) -> Option<&'static BucketMeta> {
    static SUBCLASS: BucketMeta = shown("Subclass", 1, true);
    static KINETIC: BucketMeta = shown("Kinetic Weapons", 2, true);
    static ENERGY: BucketMeta = shown("Energy Weapons", 3, true);
    static POWER: BucketMeta = shown("Power Weapons", 4, true);
    static HELMET: BucketMeta = shown("Helmet", 5, true);
    static GAUNTLETS: BucketMeta = shown("Gauntlets", 6, true);
    static CHEST: BucketMeta = shown("Chest Armor", 7, true);
    static LEGS: BucketMeta = shown("Leg Armor", 8, true);
    static CLASS_ARMOR: BucketMeta = shown("Class Armor", 9, true);
    static SHADERS: BucketMeta = shown("Shaders", 14, false);
    static EMBLEMS: BucketMeta = shown("Emblems", 15, false);
    static EMOTES: BucketMeta = shown("Emotes", 16, false);
    static AURAS: BucketMeta = shown("Auras", 17, false);
    static CONSUMABLES: BucketMeta = shown("Consumables", 18, false);
    static MODS: BucketMeta = shown("Modifications", 19, false);
    static VEHICLE: BucketMeta = shown("Vehicle", 20, false);
    static SHIPS: BucketMeta = shown("Ships", 21, false);
    static GHOST: BucketMeta = shown("Ghost", 22, true);
    static BANNERS: BucketMeta = shown("Clan Banners", 23, false);
    static UPGRADE_POINT: BucketMeta = BucketMeta {
        name: "Upgrade Point",
        order: None,
        expand: false,
        hidden: true,
    };

    match hash {
        3284755031 => Some(&SUBCLASS),
        1498876634 => Some(&KINETIC),
        2465295065 => Some(&ENERGY),
        953998645 => Some(&POWER),
        3448274439 => Some(&HELMET),
        3551918588 => Some(&GAUNTLETS),
        14239492 => Some(&CHEST),
        20886954 => Some(&LEGS),
        1585787867 => Some(&CLASS_ARMOR),
        2973005342 => Some(&SHADERS),
        4274335291 => Some(&EMBLEMS),
        3054419239 => Some(&EMOTES),
        1269569095 => Some(&AURAS),
        1469714392 => Some(&CONSUMABLES),
        3313201758 => Some(&MODS),
        2025709351 => Some(&VEHICLE),
        284967655 => Some(&SHIPS),
        4023194814 => Some(&GHOST),
        4292445962 => Some(&BANNERS),
        2689798304 => Some(&UPGRADE_POINT),
        _ => None,
    }
}

/// Buckets that are presented together under one heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketGroupMeta {
    pub name: &'static str,
    pub order: u32,
    pub buckets: &'static [Hash],
}

pub static BUCKET_GROUPS: [BucketGroupMeta; 2] = [
    BucketGroupMeta {
        name: "Weapons",
        order: 1,
        buckets: &[1498876634, 2465295065, 953998645],
    },
    BucketGroupMeta {
        name: "Armor",
        order: 2,
        buckets: &[3448274439, 3551918588, 14239492, 20886954, 1585787867],
    },
];

pub fn bucket_group(hash: Hash) -> Option<&'static BucketGroupMeta> {
    BUCKET_GROUPS.iter().find(|g| g.buckets.contains(&hash))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Enabled,
    /// Disabled upstream, unnamed, or hidden by local metadata
    Hidden,
    Redacted,
}

impl Visibility {
    pub fn of(bucket: &BucketDefinition) -> Self {
        if bucket.redacted {
            return Visibility::Redacted;
        }
        let hidden = bucket_meta(bucket.hash).is_some_and(|m| m.hidden);
        if !bucket.enabled || bucket.name().is_empty() || hidden {
            return Visibility::Hidden;
        }
        Visibility::Enabled
    }
}

/// Sort rank of a bucket: the override table, else the hash itself.
pub fn bucket_order(hash: Hash) -> u32 {
    bucket_meta(hash).and_then(|m| m.order).unwrap_or(hash)
}

/// One display bucket with the ids shown in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketView {
    pub hash: Hash,
    pub name: String,
    pub order: u32,
    pub expand: bool,
    pub group: Option<&'static str>,
    /// Active character plus account-wide items
    pub active: Vec<ItemId>,
    /// Items in storage elsewhere
    pub inactive: Vec<ItemId>,
}

impl BucketView {
    pub fn new(bucket: &BucketDefinition) -> Self {
        let meta = bucket_meta(bucket.hash);
        Self {
            hash: bucket.hash,
            name: bucket.name().to_string(),
            order: bucket_order(bucket.hash),
            expand: meta.is_some_and(|m| m.expand),
            group: bucket_group(bucket.hash).map(|g| g.name),
            active: Vec::new(),
            inactive: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::DisplayProperties;

    fn bucket(hash: Hash, name: &str) -> BucketDefinition {
        BucketDefinition {
            hash,
            display_properties: DisplayProperties {
                name: name.to_string(),
                ..Default::default()
            },
            enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn order_falls_back_to_hash() {
        assert_eq!(bucket_order(BUCKET_BUILD), 1);
        assert_eq!(bucket_order(1469714392), 18);
        assert_eq!(bucket_order(12345), 12345);
    }

    #[test]
    fn visibility_rules() {
        assert_eq!(Visibility::of(&bucket(1469714392, "Consumables")), Visibility::Enabled);
        assert_eq!(Visibility::of(&bucket(1469714392, "")), Visibility::Hidden);
        assert_eq!(Visibility::of(&bucket(2689798304, "Upgrade Point")), Visibility::Hidden);

        let mut b = bucket(1, "Lost Items");
        b.enabled = false;
        assert_eq!(Visibility::of(&b), Visibility::Hidden);
        b.redacted = true;
        assert_eq!(Visibility::of(&b), Visibility::Redacted);
    }

    #[test]
    fn view_carries_group_and_expand() {
        let view = BucketView::new(&bucket(3448274439, "Helmet"));
        assert_eq!(view.group, Some("Armor"));
        assert!(view.expand);
        assert!(view.is_empty());

        let view = BucketView::new(&bucket(1469714392, "Consumables"));
        assert_eq!(view.group, None);
        assert!(!view.expand);
    }
}
