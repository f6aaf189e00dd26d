use crate::definitions::BucketDefinition;
use crate::models::types::{Hash, ItemId, Owner};
use serde::{Deserialize, Serialize};

/// Transfer status bitflags as reported by the remote system.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferStatus(pub u32);

impl TransferStatus {
    pub const EQUIPPED: u32 = 1;
    pub const NOT_TRANSFERRABLE: u32 = 1 << 1;

    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_equipped(&self) -> bool {
        self.0 & Self::EQUIPPED != 0
    }

    /// Same flags with the equipped bit set or cleared; every other bit is kept.
    #[inline]
    pub fn with_equipped(self, equipped: bool) -> Self {
        if equipped {
            Self(self.0 | Self::EQUIPPED)
        } else {
            Self(self.0 & !Self::EQUIPPED)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryStat {
    pub stat_hash: Hash,
    pub value: i32,
}

/// One addressable stack or instance in the account's inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Remote instance id, or a synthetic id for non-instanced stacks
    pub id: ItemId,
    /// Item type definition hash (shared by every copy of the type)
    pub hash: Hash,
    pub owner: Owner,
    pub quantity: u32,
    /// Stack limit of the type
    pub max_stack_size: u32,

    /// Display bucket, taken from the type definition
    pub bucket: BucketDefinition,
    /// Bucket the remote system currently files the item under
    pub current_bucket: BucketDefinition,
    /// Raw remote location code
    pub location: i32,

    pub transfer_status: TransferStatus,
    pub can_equip: bool,
    pub equippable: bool,
    pub non_transferrable: bool,

    // Presentation only
    pub name: String,
    pub description: String,
    pub icon: String,
    pub type_name: String,
    pub damage_type: u32,
    pub primary_stat: Option<PrimaryStat>,
}

impl Item {
    #[inline]
    pub fn is_equipped(&self) -> bool {
        self.transfer_status.is_equipped()
    }

    #[inline]
    pub fn is_instanced(&self) -> bool {
        !self.id.is_synthetic()
    }

    /// How many more units fit onto this stack.
    #[inline]
    pub fn spare_capacity(&self) -> u32 {
        self.max_stack_size.saturating_sub(self.quantity)
    }

    /// Get display text for inventory listing
    pub fn display_text(&self) -> String {
        if self.quantity > 1 {
            format!("{} (x{})", self.name, self.quantity)
        } else {
            self.name.clone()
        }
    }
}
