use crate::api::{RemoteApi, fetch_viable_profile};
use crate::error::{AppResult, DomainError};
use crate::models::profile::Membership;
use crate::models::types::PlatformType;
use crate::services::reconciler::Reconciler;
use crate::state::store::{Mutation, Store};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub items: usize,
    pub characters: usize,
    pub revision: u64,
}

/// Full profile refresh: fetch, reconcile, then replace the store contents
/// in one batch.
pub struct ProfileService {
    api: Arc<dyn RemoteApi>,
    store: Arc<Store>,
    reconciler: Arc<Reconciler>,
}

impl ProfileService {
    pub fn new(api: Arc<dyn RemoteApi>, store: Arc<Store>, reconciler: Arc<Reconciler>) -> Self {
        Self { api, store, reconciler }
    }

    /// Memberships of the current user, fetched once and then kept.
    pub async fn memberships(&self) -> AppResult<Vec<Membership>> {
        let known = self.store.memberships();
        if !known.is_empty() {
            return Ok(known);
        }
        let memberships = self.api.get_memberships().await?;
        tracing::debug!(count = memberships.len(), "memberships loaded");
        self.store.commit(Mutation::SetMemberships(memberships.clone()));
        Ok(memberships)
    }

    /// Fetch the profile for `platform`, or for whichever membership answers
    /// first when no platform is given. On failure the store is untouched.
    pub async fn fetch_profile(&self, platform: Option<PlatformType>) -> AppResult<RefreshSummary> {
        let memberships = self.memberships().await?;
        let candidates: Vec<Membership> = match platform {
            Some(p) => memberships.into_iter().filter(|m| m.membership_type == p).collect(),
            None => memberships,
        };
        if candidates.is_empty() {
            return Err(DomainError::NoActiveMembership);
        }

        let (answered, profile) = fetch_viable_profile(self.api.as_ref(), &candidates).await.inspect_err(|e| {
            tracing::warn!(error = %e, "profile fetch failed, keeping previous state");
        })?;

        let mut reconciled = self.reconciler.reconcile(&profile).await;
        if reconciled.membership.is_none() {
            // hidden profile component
            reconciled.membership = Some(answered);
        }
        if let (Some(asked), Some(got)) = (platform, reconciled.membership.as_ref()) {
            if asked != got.membership_type {
                tracing::warn!(%asked, got = %got.membership_type, "profile came back for another platform");
            }
        }

        let items = reconciled.inventory.items.len();
        let characters = reconciled.characters.len();
        self.store.commit(Mutation::FullRefresh(Box::new(reconciled)));

        Ok(RefreshSummary {
            items,
            characters,
            revision: self.store.revision(),
        })
    }
}
