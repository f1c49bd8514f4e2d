//! HTTP handlers for businesses, the marketplace browse and catalog management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::{Business, BusinessItem, BusinessListing, BusinessPhoto};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{CurrentActor, MaybeActor};
use crate::services::business::{
    BusinessService, CreateBusinessInput, CreateItemInput, UpdateBusinessInput, UpdateItemInput,
    UploadPhotoInput,
};
use crate::services::marketplace::{ListFilters, MarketplaceService};
use crate::AppState;

fn marketplace(state: &AppState) -> MarketplaceService {
    MarketplaceService::new(state.store.clone(), state.events.clone(), state.zones.clone())
}

/// Browse active businesses; signed-in callers may filter by distance
pub async fn list_businesses(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    Query(filters): Query<ListFilters>,
) -> AppResult<Json<Vec<BusinessListing>>> {
    let listings = marketplace(&state).list(actor.as_ref(), filters).await?;
    Ok(Json(listings))
}

/// Business profile; records a view
pub async fn get_business(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
) -> AppResult<Json<BusinessListing>> {
    let service = BusinessService::new(state.store.clone());
    let listing = service.get(business_id).await?;

    marketplace(&state)
        .track_view(business_id, Some(listing.business.category.clone()))
        .await;

    Ok(Json(listing))
}

pub async fn create_business(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<CreateBusinessInput>,
) -> AppResult<(StatusCode, Json<Business>)> {
    let service = BusinessService::new(state.store.clone());
    let business = service.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(business)))
}

pub async fn update_business(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(business_id): Path<Uuid>,
    Json(input): Json<UpdateBusinessInput>,
) -> AppResult<Json<Business>> {
    let service = BusinessService::new(state.store.clone());
    let business = service.update(&actor, business_id, input).await?;
    Ok(Json(business))
}

/// Soft delete
pub async fn deactivate_business(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(business_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = BusinessService::new(state.store.clone());
    service.deactivate(&actor, business_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin verification
pub async fn verify_business(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(business_id): Path<Uuid>,
) -> AppResult<Json<Business>> {
    let service = BusinessService::new(state.store.clone());
    let business = service.verify(&actor, business_id).await?;
    Ok(Json(business))
}

pub async fn add_item(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(business_id): Path<Uuid>,
    Json(input): Json<CreateItemInput>,
) -> AppResult<(StatusCode, Json<BusinessItem>)> {
    let service = BusinessService::new(state.store.clone());
    let item = service.add_item(&actor, business_id, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((business_id, item_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<BusinessItem>> {
    let service = BusinessService::new(state.store.clone());
    let item = service
        .update_item(&actor, business_id, item_id, input)
        .await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((business_id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let service = BusinessService::new(state.store.clone());
    service.delete_item(&actor, business_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_photo(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(business_id): Path<Uuid>,
    Json(input): Json<UploadPhotoInput>,
) -> AppResult<(StatusCode, Json<BusinessPhoto>)> {
    let service = BusinessService::new(state.store.clone());
    let photo = service.upload_photo(&actor, business_id, input).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((business_id, photo_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let service = BusinessService::new(state.store.clone());
    service.delete_photo(&actor, business_id, photo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
