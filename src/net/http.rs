use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::Registry;
use crate::error::{AppResult, DomainError, InfraError};
use crate::models::bucket::BucketView;
use crate::models::character::{Character, VaultInfo};
use crate::models::item::Item;
use crate::models::profile::Membership;
use crate::models::types::{CharacterId, ItemId, Owner, PlatformType, StorageFilter};
use crate::services::{EquipOutcome, RefreshSummary};
use crate::state::store::Mutation;

/// Error body for the JSON surface.
struct HttpError(DomainError);

impl From<DomainError> for HttpError {
    fn from(e: DomainError) -> Self {
        HttpError(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::ItemNotFound(_) | DomainError::UnknownOwner(_) => StatusCode::NOT_FOUND,
            DomainError::ItemBusy(_) => StatusCode::CONFLICT,
            DomainError::Api(_) => StatusCode::BAD_GATEWAY,
            e if e.is_precondition() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type HttpResult<T> = Result<Json<T>, HttpError>;

#[derive(Serialize)]
struct Overview {
    membership: Option<Membership>,
    active_character: Option<CharacterId>,
    storage_filter: StorageFilter,
    characters: Vec<Character>,
    vault: Option<VaultInfo>,
    has_items: bool,
    revision: u64,
}

#[derive(Deserialize)]
struct FetchBody {
    #[serde(default)]
    platform: Option<PlatformType>,
}

#[derive(Deserialize)]
struct TransferBody {
    from: Owner,
    to: Owner,
    item_id: ItemId,
    quantity: u32,
}

#[derive(Deserialize)]
struct EquipBody {
    character_id: CharacterId,
    item_id: ItemId,
}

#[derive(Deserialize)]
struct ActiveBody {
    character_id: CharacterId,
}

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/overview", get(overview))
        .route("/characters", get(characters))
        .route("/buckets", get(buckets))
        .route("/items/active", get(active_items))
        .route("/items/inactive", get(inactive_items))
        .route("/items/{id}", get(item))
        .route("/active-character", put(set_active_character))
        .route("/storage-filter", put(set_storage_filter))
        .route("/actions/fetch-profile", post(fetch_profile))
        .route("/actions/transfer", post(transfer))
        .route("/actions/equip", post(equip))
        .with_state(registry)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

/// Run the HTTP server
pub async fn serve(addr: std::net::SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(InfraError::from)?;
    axum::serve(listener, router(registry)).await.map_err(InfraError::from)?;
    Ok(())
}

async fn overview(State(registry): State<Arc<Registry>>) -> Json<Overview> {
    let overview = registry.store.read(|s| Overview {
        membership: s.membership.clone(),
        active_character: s.active_character.clone(),
        storage_filter: s.storage_filter.clone(),
        characters: s.sorted_characters(),
        vault: s.vault.clone(),
        has_items: s.has_items(),
        revision: s.revision,
    });
    Json(overview)
}

async fn characters(State(registry): State<Arc<Registry>>) -> Json<Vec<Character>> {
    Json(registry.store.sorted_characters())
}

async fn buckets(State(registry): State<Arc<Registry>>) -> Json<Vec<BucketView>> {
    Json(registry.store.buckets())
}

async fn active_items(State(registry): State<Arc<Registry>>) -> Json<Vec<ItemId>> {
    Json(registry.store.active_item_ids())
}

async fn inactive_items(State(registry): State<Arc<Registry>>) -> Json<Vec<ItemId>> {
    Json(registry.store.inactive_item_ids())
}

async fn item(State(registry): State<Arc<Registry>>, Path(id): Path<ItemId>) -> HttpResult<Item> {
    let item = registry.store.item(&id).ok_or(DomainError::ItemNotFound(id))?;
    Ok(Json(item))
}

async fn set_active_character(
    State(registry): State<Arc<Registry>>,
    Json(body): Json<ActiveBody>,
) -> HttpResult<Option<CharacterId>> {
    if registry.store.character(&body.character_id).is_none() {
        return Err(DomainError::UnknownOwner(Owner::Character(body.character_id)).into());
    }
    registry.store.commit(Mutation::SetActiveCharacter(body.character_id));
    Ok(Json(registry.store.active_character()))
}

async fn set_storage_filter(
    State(registry): State<Arc<Registry>>,
    Json(filter): Json<StorageFilter>,
) -> HttpResult<StorageFilter> {
    if let StorageFilter::Character(id) = &filter {
        if registry.store.character(id).is_none() {
            return Err(DomainError::UnknownOwner(Owner::Character(id.clone())).into());
        }
    }
    registry.store.commit(Mutation::SetStorageFilter(filter));
    Ok(Json(registry.store.storage_filter()))
}

async fn fetch_profile(State(registry): State<Arc<Registry>>, Json(body): Json<FetchBody>) -> HttpResult<RefreshSummary> {
    let summary = registry.services.profile.fetch_profile(body.platform).await?;
    Ok(Json(summary))
}

async fn transfer(State(registry): State<Arc<Registry>>, Json(body): Json<TransferBody>) -> HttpResult<serde_json::Value> {
    registry
        .services
        .transfer
        .transfer(&body.from, &body.to, &body.item_id, body.quantity)
        .await?;
    Ok(Json(json!({ "transferred": body.quantity })))
}

async fn equip(State(registry): State<Arc<Registry>>, Json(body): Json<EquipBody>) -> HttpResult<EquipOutcome> {
    let outcome = registry.services.transfer.equip(&body.character_id, &body.item_id).await?;
    Ok(Json(outcome))
}
