//! HTTP handlers for promo highlights

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::Promo;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::promo::{CreatePromoInput, PromoQuery, PromoService, UpdatePromoInput};
use crate::AppState;

/// Public promo feed
pub async fn list_promos(
    State(state): State<AppState>,
    Query(query): Query<PromoQuery>,
) -> AppResult<Json<Vec<Promo>>> {
    let service = PromoService::new(state.store.clone());
    Ok(Json(service.list(query).await?))
}

pub async fn create_promo(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<CreatePromoInput>,
) -> AppResult<(StatusCode, Json<Promo>)> {
    let service = PromoService::new(state.store.clone());
    let promo = service.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(promo)))
}

pub async fn update_promo(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(promo_id): Path<Uuid>,
    Json(input): Json<UpdatePromoInput>,
) -> AppResult<Json<Promo>> {
    let service = PromoService::new(state.store.clone());
    let promo = service.update(&actor, promo_id, input).await?;
    Ok(Json(promo))
}

pub async fn delete_promo(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(promo_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PromoService::new(state.store.clone());
    service.delete(&actor, promo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
