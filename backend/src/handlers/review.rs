//! HTTP handlers for reviews

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::Review;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::review::{CreateReviewInput, ModerateReviewInput, ReviewService};
use crate::AppState;

pub async fn create_review(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<Uuid>,
    Json(input): Json<CreateReviewInput>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let service = ReviewService::new(state.store.clone());
    let review = service.create(&actor, order_id, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Visible reviews only (public)
pub async fn list_business_reviews(
    State(state): State<AppState>,
    Path(business_id): Path<Uuid>,
) -> AppResult<Json<Vec<Review>>> {
    let service = ReviewService::new(state.store.clone());
    let reviews = service.list_for_business(business_id).await?;
    Ok(Json(reviews))
}

pub async fn moderate_review(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(review_id): Path<Uuid>,
    Json(input): Json<ModerateReviewInput>,
) -> AppResult<Json<Review>> {
    let service = ReviewService::new(state.store.clone());
    let review = service
        .moderate(&actor, review_id, input.is_visible)
        .await?;
    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(review_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ReviewService::new(state.store.clone());
    service.delete(&actor, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
