pub mod classifier;
pub mod normalizer;
mod profile;
pub mod reconciler;
mod transfer;

pub use profile::{ProfileService, RefreshSummary};
pub use reconciler::{Reconciled, Reconciler};
pub use transfer::{EquipOutcome, TransferService, effective_destination, plan_equip, plan_transfer};
