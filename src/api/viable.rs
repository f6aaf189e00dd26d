use crate::api::{ApiError, ApiResult, PROFILE_COMPONENTS, RemoteApi};
use crate::models::profile::{Membership, ProfileResponse};
use futures::StreamExt;
use futures::stream::FuturesUnordered;

/// Request the profile of every membership at once and keep the first one
/// that comes back, along with the membership it belongs to. Only when all
/// of them fail is the fetch an error, and then every failure is reported.
pub async fn fetch_viable_profile(api: &dyn RemoteApi, memberships: &[Membership]) -> ApiResult<(Membership, ProfileResponse)> {
    let mut pending: FuturesUnordered<_> = memberships
        .iter()
        .map(|m| async move { (m, api.get_profile(m, &PROFILE_COMPONENTS).await) })
        .collect();

    let mut errors = Vec::new();
    while let Some((membership, res)) = pending.next().await {
        match res {
            Ok(profile) => {
                tracing::debug!(membership = %membership.membership_id, platform = %membership.membership_type, "viable profile");
                return Ok((membership.clone(), profile));
            }
            Err(e) => {
                tracing::debug!(membership = %membership.membership_id, error = %e, "profile request failed");
                errors.push(e);
            }
        }
    }
    Err(ApiError::NoViableProfile(errors))
}
