//! Review gate: one review per completed order

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::models::Review;
use shared::types::Actor;
use shared::validation::validate_rating;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::policy;
use crate::store::{MarketStore, StoreError};

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn MarketStore>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewInput {
    pub rating: i32,
    pub comment: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModerateReviewInput {
    pub is_visible: bool,
}

impl ReviewService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Review a completed order as its buyer
    pub async fn create(
        &self,
        actor: &Actor,
        order_id: Uuid,
        input: CreateReviewInput,
    ) -> AppResult<Review> {
        validate_rating(input.rating).map_err(|msg| AppError::validation("rating", msg))?;

        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;
        let business = self
            .store
            .business(order.business_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        if !policy::can_view_order(actor, &order, &business) {
            return Err(AppError::not_found("Order"));
        }
        if actor.id() != order.buyer_id {
            return Err(AppError::forbidden("Only the buyer can review this order"));
        }
        if !order.status.is_terminal() {
            return Err(AppError::validation(
                "order",
                "Can only review completed orders",
            ));
        }

        let review = Review {
            id: Uuid::new_v4(),
            order_id: order.id,
            business_id: order.business_id,
            reviewer_id: actor.id(),
            rating: input.rating,
            comment: input.comment,
            photo_url: input.photo_url,
            is_visible: true,
            created_at: Utc::now(),
        };

        // The store re-checks completion and uniqueness inside the insert
        let review = self.store.insert_review(review).await.map_err(|e| match e {
            StoreError::Conflict(message) => AppError::conflict("review", message),
            StoreError::Precondition(message) => AppError::validation("order", message),
            other => other.into(),
        })?;

        tracing::info!(
            review_id = %review.id,
            order_id = %review.order_id,
            rating = review.rating,
            "Review created"
        );
        Ok(review)
    }

    /// Visible reviews for a business, newest first
    pub async fn list_for_business(&self, business_id: Uuid) -> AppResult<Vec<Review>> {
        Ok(self.store.visible_reviews_for_business(business_id).await?)
    }

    /// Show or hide a review (admin only)
    pub async fn moderate(&self, actor: &Actor, id: Uuid, visible: bool) -> AppResult<Review> {
        if !policy::can_administer(actor) {
            return Err(AppError::forbidden("Only administrators can moderate reviews"));
        }

        let review = self
            .store
            .set_review_visibility(id, visible)
            .await?
            .ok_or_else(|| AppError::not_found("Review"))?;

        tracing::info!(review_id = %id, visible, admin_id = %actor.id(), "Review moderated");
        Ok(review)
    }

    /// Remove a review permanently (admin only)
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        if !policy::can_administer(actor) {
            return Err(AppError::forbidden("Only administrators can delete reviews"));
        }

        if !self.store.delete_review(id).await? {
            return Err(AppError::not_found("Review"));
        }

        tracing::info!(review_id = %id, admin_id = %actor.id(), "Review deleted");
        Ok(())
    }
}
