//! Review gate tests
//!
//! Covers:
//! - Reviews only for completed orders, only by the buyer
//! - One review per order (Conflict on the second attempt)
//! - Rating range validation with no record left behind
//! - Moderation and deletion by administrators
//! - An order reopened while its review is being written gets no review

mod common;

use std::time::Duration;

use common::{admin, resident, Fixture};
use neighborhood_market_backend::error::AppError;
use neighborhood_market_backend::services::review::CreateReviewInput;
use neighborhood_market_backend::store::MarketStore;
use proptest::prelude::*;
use shared::models::OrderStatus;
use uuid::Uuid;

fn rating(stars: i32) -> CreateReviewInput {
    CreateReviewInput {
        rating: stars,
        comment: Some("Masarap!".to_string()),
        photo_url: None,
    }
}

#[tokio::test]
async fn test_buyer_reviews_completed_order() {
    let fx = Fixture::new();
    let (_, buyer, order) = fx.completed_order().await;

    let review = fx.reviews.create(&buyer, order.id, rating(5)).await.unwrap();
    assert_eq!(review.order_id, order.id);
    assert_eq!(review.business_id, order.business_id);
    assert_eq!(review.reviewer_id, buyer.id());
    assert!(review.is_visible);

    let listed = fx.reviews.list_for_business(order.business_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_second_review_is_conflict() {
    let fx = Fixture::new();
    let (_, buyer, order) = fx.completed_order().await;

    fx.reviews.create(&buyer, order.id, rating(4)).await.unwrap();
    let second = fx.reviews.create(&buyer, order.id, rating(2)).await;

    assert!(matches!(second, Err(AppError::Conflict { .. })));
    let listed = fx.reviews.list_for_business(order.business_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].rating, 4);
}

#[tokio::test]
async fn test_review_before_completion_is_rejected() {
    let fx = Fixture::new();
    let (owner, buyer, order) = fx.pending_order().await;

    for status in ["pending", "accepted", "ready_for_pickup", "delivered"] {
        fx.orders.update_status(&owner, order.id, status).await.unwrap();
        let result = fx.reviews.create(&buyer, order.id, rating(5)).await;
        assert!(
            matches!(result, Err(AppError::Validation { .. })),
            "status {} should not allow a review",
            status
        );
    }

    assert!(fx.store.review_for_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_only_buyer_may_review() {
    let fx = Fixture::new();
    let (owner, _, order) = fx.completed_order().await;

    let by_owner = fx.reviews.create(&owner, order.id, rating(5)).await;
    assert!(matches!(by_owner, Err(AppError::Authorization(_))));

    let by_stranger = fx.reviews.create(&resident(), order.id, rating(5)).await;
    assert!(matches!(by_stranger, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_review_for_missing_order_is_not_found() {
    let fx = Fixture::new();
    let result = fx.reviews.create(&resident(), Uuid::new_v4(), rating(3)).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_concurrent_reviews_yield_one_record() {
    let fx = Fixture::new();
    let (_, buyer, order) = fx.completed_order().await;

    let (a, b) = tokio::join!(
        fx.reviews.create(&buyer, order.id, rating(5)),
        fx.reviews.create(&buyer, order.id, rating(1)),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let listed = fx.reviews.list_for_business(order.business_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_order_reopened_during_review_gets_no_review() {
    let fx = Fixture::with_delayed_writes(Duration::from_millis(20));
    let (owner, buyer, order) = fx.completed_order().await;

    let (review, reopened) = tokio::join!(
        fx.reviews.create(&buyer, order.id, rating(5)),
        fx.orders.update_status(&owner, order.id, "pending"),
    );

    assert_eq!(reopened.unwrap().status, OrderStatus::Pending);
    match review {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "order"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(fx.store.review_for_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_moderation_hides_without_deleting() {
    let fx = Fixture::new();
    let (_, buyer, order) = fx.completed_order().await;
    let review = fx.reviews.create(&buyer, order.id, rating(1)).await.unwrap();

    let hidden = fx.reviews.moderate(&admin(), review.id, false).await.unwrap();
    assert!(!hidden.is_visible);
    assert!(fx
        .reviews
        .list_for_business(order.business_id)
        .await
        .unwrap()
        .is_empty());
    assert!(fx.store.review(review.id).await.unwrap().is_some());

    fx.reviews.moderate(&admin(), review.id, true).await.unwrap();
    assert_eq!(
        fx.reviews.list_for_business(order.business_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_moderation_and_delete_require_admin() {
    let fx = Fixture::new();
    let (_, buyer, order) = fx.completed_order().await;
    let review = fx.reviews.create(&buyer, order.id, rating(3)).await.unwrap();

    assert!(matches!(
        fx.reviews.moderate(&buyer, review.id, false).await,
        Err(AppError::Authorization(_))
    ));
    assert!(matches!(
        fx.reviews.delete(&buyer, review.id).await,
        Err(AppError::Authorization(_))
    ));

    fx.reviews.delete(&admin(), review.id).await.unwrap();
    assert!(fx.store.review(review.id).await.unwrap().is_none());
    assert!(matches!(
        fx.reviews.delete(&admin(), review.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_visible_reviews_newest_first() {
    let fx = Fixture::new();
    let owner = resident();
    let buyer = resident();
    let business = fx.register(&owner, "Sari-sari", "Retail", None).await;
    let item = fx
        .add_item(&owner, business.id, "Softdrinks", common::price(2000))
        .await;

    let mut review_ids = Vec::new();
    for _ in 0..3 {
        let order = fx.place_order(&buyer, business.id, item.id, 1).await;
        fx.orders
            .update_status(&owner, order.id, "completed")
            .await
            .unwrap();
        let review = fx.reviews.create(&buyer, order.id, rating(4)).await.unwrap();
        review_ids.push(review.id);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let listed: Vec<_> = fx
        .reviews
        .list_for_business(business.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    review_ids.reverse();
    assert_eq!(listed, review_ids);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn out_of_range_rating() -> impl Strategy<Value = i32> {
    prop_oneof![i32::MIN..1, 6..=i32::MAX]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Ratings outside 1..=5 are rejected and nothing is stored
    #[test]
    fn test_out_of_range_rating_creates_nothing(stars in out_of_range_rating()) {
        tokio_test::block_on(async {
            let fx = Fixture::new();
            let (_, buyer, order) = fx.completed_order().await;

            let result = fx.reviews.create(&buyer, order.id, rating(stars)).await;
            assert!(matches!(result, Err(AppError::Validation { .. })));
            assert!(fx.store.review_for_order(order.id).await.unwrap().is_none());
        });
    }

    /// Every rating in range is accepted on a completed order
    #[test]
    fn test_in_range_rating_is_accepted(stars in 1..=5i32) {
        tokio_test::block_on(async {
            let fx = Fixture::new();
            let (_, buyer, order) = fx.completed_order().await;

            let review = fx.reviews.create(&buyer, order.id, rating(stars)).await.unwrap();
            assert_eq!(review.rating, stars);
        });
    }
}
