//! Business catalog tests
//!
//! Covers:
//! - Registration, partial updates and soft deactivation
//! - Owner-only item and photo management
//! - At most one primary photo per business
//! - Admin verification, last write wins
//! - Verification, updates and deactivation racing on one business
//! - Blank names and categories, out-of-range prices

mod common;

use std::time::Duration;

use common::{admin, price, resident, Fixture};
use neighborhood_market_backend::error::AppError;
use neighborhood_market_backend::services::business::{
    CreateBusinessInput, CreateItemInput, UpdateBusinessInput, UpdateItemInput,
};
use neighborhood_market_backend::store::MarketStore;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::validation::MAX_PRICE;
use uuid::Uuid;

// ============================================================================
// Businesses
// ============================================================================

#[tokio::test]
async fn test_creator_becomes_unverified_owner() {
    let fx = Fixture::new();
    let owner = resident();

    let business = fx.register(&owner, "Aling Nena's", "Food", Some("Purok 3")).await;
    assert_eq!(business.owner_id, owner.id());
    assert!(!business.is_verified());
    assert!(business.is_active);
    assert_eq!(business.location_zone.as_deref(), Some("Purok 3"));
}

#[tokio::test]
async fn test_blank_name_is_validation() {
    let fx = Fixture::new();
    let result = fx
        .businesses
        .create(
            &resident(),
            CreateBusinessInput {
                name: String::new(),
                category: "Food".to_string(),
                operating_hours: None,
                location_zone: None,
                description: None,
            },
        )
        .await;

    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "name"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_whitespace_name_or_category_is_validation() {
    let fx = Fixture::new();
    let cases = [("   ", "Food", "name"), ("Bakery", " \t ", "category")];

    for (name, category, field) in cases {
        let result = fx
            .businesses
            .create(
                &resident(),
                CreateBusinessInput {
                    name: name.to_string(),
                    category: category.to_string(),
                    operating_hours: None,
                    location_zone: None,
                    description: None,
                },
            )
            .await;

        match result {
            Err(AppError::Validation { field: got, .. }) => assert_eq!(got, field),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
    assert!(fx.store.businesses(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_whitespace_update_keeps_stored_text() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    for input in [
        UpdateBusinessInput {
            name: Some("   ".to_string()),
            ..Default::default()
        },
        UpdateBusinessInput {
            category: Some("  ".to_string()),
            ..Default::default()
        },
    ] {
        let result = fx.businesses.update(&owner, business.id, input).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    let stored = fx.store.business(business.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Bakery");
    assert_eq!(stored.category, "Food");
}

#[tokio::test]
async fn test_names_are_stored_trimmed() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "  Bakery  ", " Food ", None).await;
    assert_eq!(business.name, "Bakery");
    assert_eq!(business.category, "Food");
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx
        .register_described(&owner, "Bakery", "Food", Some("Zone 2"), Some("Fresh bread"))
        .await;

    let updated = fx
        .businesses
        .update(
            &owner,
            business.id,
            UpdateBusinessInput {
                name: Some("Bakery ni Juan".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Bakery ni Juan");
    assert_eq!(updated.category, "Food");
    assert_eq!(updated.description.as_deref(), Some("Fresh bread"));
    assert_eq!(updated.location_zone.as_deref(), Some("Zone 2"));
}

#[tokio::test]
async fn test_update_by_other_resident_is_forbidden() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    let result = fx
        .businesses
        .update(
            &resident(),
            business.id,
            UpdateBusinessInput {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Authorization(_))));
    assert_eq!(fx.businesses.get(business.id).await.unwrap().business.name, "Bakery");
}

#[tokio::test]
async fn test_deactivation_is_soft() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    fx.businesses.deactivate(&owner, business.id).await.unwrap();

    assert!(matches!(
        fx.businesses.get(business.id).await,
        Err(AppError::NotFound(_))
    ));
    let stored = fx.store.business(business.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
}

#[tokio::test]
async fn test_owner_can_reactivate() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;
    fx.businesses.deactivate(&owner, business.id).await.unwrap();

    // hidden from everyone else
    let stranger = fx
        .businesses
        .update(
            &resident(),
            business.id,
            UpdateBusinessInput {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(stranger, Err(AppError::NotFound(_))));

    fx.businesses
        .update(
            &owner,
            business.id,
            UpdateBusinessInput {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(fx.businesses.get(business.id).await.is_ok());
}

#[tokio::test]
async fn test_deactivate_by_non_owner_is_forbidden() {
    let fx = Fixture::new();
    let business = fx.register(&resident(), "Bakery", "Food", None).await;

    let result = fx.businesses.deactivate(&resident(), business.id).await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
}

// ============================================================================
// Verification
// ============================================================================

#[tokio::test]
async fn test_verify_requires_admin() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    let result = fx.businesses.verify(&owner, business.id).await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
}

#[tokio::test]
async fn test_reverify_is_last_write_wins() {
    let fx = Fixture::new();
    let business = fx.register(&resident(), "Bakery", "Food", None).await;
    let first_admin = admin();
    let second_admin = admin();

    let first = fx.businesses.verify(&first_admin, business.id).await.unwrap();
    let second = fx.businesses.verify(&second_admin, business.id).await.unwrap();

    let first_v = first.verification.unwrap();
    let second_v = second.verification.unwrap();
    assert_eq!(first_v.verified_by, first_admin.id());
    assert_eq!(second_v.verified_by, second_admin.id());
    assert!(second_v.verified_at >= first_v.verified_at);
}

#[tokio::test]
async fn test_verify_inactive_business_is_not_found() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;
    fx.businesses.deactivate(&owner, business.id).await.unwrap();

    let result = fx.businesses.verify(&admin(), business.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_verify_racing_deactivate_leaves_business_inactive() {
    let fx = Fixture::with_delayed_writes(Duration::from_millis(20));
    let owner = resident();
    let verifier = admin();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    let (verified, deactivated) = tokio::join!(
        fx.businesses.verify(&verifier, business.id),
        fx.businesses.deactivate(&owner, business.id),
    );
    deactivated.unwrap();

    let stored = fx.store.business(business.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    match verified {
        Ok(_) => {
            let verification = stored.verification.expect("verification kept");
            assert_eq!(verification.verified_by, verifier.id());
        }
        Err(AppError::NotFound(_)) => assert!(!stored.is_verified()),
        Err(other) => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_update_racing_verify_keeps_both_writes() {
    let fx = Fixture::with_delayed_writes(Duration::from_millis(20));
    let owner = resident();
    let verifier = admin();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    let (updated, verified) = tokio::join!(
        fx.businesses.update(
            &owner,
            business.id,
            UpdateBusinessInput {
                name: Some("Bakery ni Juan".to_string()),
                ..Default::default()
            },
        ),
        fx.businesses.verify(&verifier, business.id),
    );
    updated.unwrap();
    verified.unwrap();

    let stored = fx.store.business(business.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Bakery ni Juan");
    assert!(stored.is_active);
    assert_eq!(
        stored.verification.map(|v| v.verified_by),
        Some(verifier.id())
    );
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_item_edit_by_other_owner_is_forbidden() {
    let fx = Fixture::new();
    let owner = resident();
    let other_owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;
    fx.register(&other_owner, "Tailor", "Services", None).await;
    let item = fx.add_item(&owner, business.id, "Ensaymada", price(3500)).await;

    let result = fx
        .businesses
        .update_item(
            &other_owner,
            business.id,
            item.id,
            UpdateItemInput {
                price: Some(price(100)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Authorization(_))));
    assert_eq!(fx.store.item(item.id).await.unwrap().unwrap().price, price(3500));
}

#[tokio::test]
async fn test_item_under_wrong_business_is_not_found() {
    let fx = Fixture::new();
    let owner = resident();
    let bakery = fx.register(&owner, "Bakery", "Food", None).await;
    let tailor = fx.register(&owner, "Tailor", "Services", None).await;
    let item = fx.add_item(&owner, bakery.id, "Ensaymada", price(3500)).await;

    let result = fx.businesses.delete_item(&owner, tailor.id, item.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_negative_price_is_validation() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    let result = fx
        .businesses
        .add_item(
            &owner,
            business.id,
            CreateItemInput {
                name: "Pandesal".to_string(),
                description: None,
                price: price(-100),
                image_url: None,
                is_available: true,
            },
        )
        .await;

    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "price"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_price_beyond_storage_is_validation() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    for bad in [Decimal::MAX, MAX_PRICE + price(1), Decimal::new(12345, 3)] {
        let result = fx
            .businesses
            .add_item(
                &owner,
                business.id,
                CreateItemInput {
                    name: "Pandesal".to_string(),
                    description: None,
                    price: bad,
                    image_url: None,
                    is_available: true,
                },
            )
            .await;

        match result {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "price"),
            other => panic!("expected validation error for {}, got {:?}", bad, other),
        }
    }

    let top = fx.add_item(&owner, business.id, "Lechon", MAX_PRICE).await;
    assert_eq!(top.price, MAX_PRICE);
}

#[tokio::test]
async fn test_whitespace_item_name_is_validation() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    let result = fx
        .businesses
        .add_item(
            &owner,
            business.id,
            CreateItemInput {
                name: "   ".to_string(),
                description: None,
                price: price(300),
                image_url: None,
                is_available: true,
            },
        )
        .await;

    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "name"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(fx.store.items_for_business(business.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_item_on_missing_business_is_not_found() {
    let fx = Fixture::new();
    let result = fx
        .businesses
        .add_item(
            &resident(),
            Uuid::new_v4(),
            CreateItemInput {
                name: "Pandesal".to_string(),
                description: None,
                price: price(300),
                image_url: None,
                is_available: true,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_item_delete_removes_from_listing() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;
    let keep = fx.add_item(&owner, business.id, "Pandesal", price(300)).await;
    let removed = fx.add_item(&owner, business.id, "Monay", price(500)).await;

    fx.businesses
        .delete_item(&owner, business.id, removed.id)
        .await
        .unwrap();

    let listing = fx.businesses.get(business.id).await.unwrap();
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].id, keep.id);
}

// ============================================================================
// Photos
// ============================================================================

#[tokio::test]
async fn test_new_primary_photo_demotes_previous() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    let first = fx.upload_photo(&owner, business.id, "a.jpg", true).await;
    let second = fx.upload_photo(&owner, business.id, "b.jpg", true).await;

    let listing = fx.businesses.get(business.id).await.unwrap();
    let primaries: Vec<_> = listing.photos.iter().filter(|p| p.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id, second.id);
    assert_eq!(listing.primary_photo().map(|p| p.id), Some(second.id));
    assert!(listing.photos.iter().any(|p| p.id == first.id && !p.is_primary));
}

#[tokio::test]
async fn test_photo_upload_by_non_owner_is_forbidden() {
    let fx = Fixture::new();
    let business = fx.register(&resident(), "Bakery", "Food", None).await;

    let result = fx
        .businesses
        .upload_photo(
            &resident(),
            business.id,
            neighborhood_market_backend::services::business::UploadPhotoInput {
                image_url: "x.jpg".to_string(),
                is_primary: true,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Authorization(_))));
}

#[tokio::test]
async fn test_photo_delete() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;
    let photo = fx.upload_photo(&owner, business.id, "a.jpg", false).await;

    fx.businesses
        .delete_photo(&owner, business.id, photo.id)
        .await
        .unwrap();
    assert!(matches!(
        fx.businesses.delete_photo(&owner, business.id, photo.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_concurrent_primary_uploads_leave_one_primary() {
    let fx = Fixture::new();
    let owner = resident();
    let business = fx.register(&owner, "Bakery", "Food", None).await;

    tokio::join!(
        fx.upload_photo(&owner, business.id, "a.jpg", true),
        fx.upload_photo(&owner, business.id, "b.jpg", true),
        fx.upload_photo(&owner, business.id, "c.jpg", true),
    );

    let photos = fx.store.photos_for_business(business.id).await.unwrap();
    assert_eq!(photos.len(), 3);
    assert_eq!(photos.iter().filter(|p| p.is_primary).count(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Whatever the upload sequence, at most one primary photo exists, and
    /// after a primary upload exactly that photo is primary
    #[test]
    fn test_primary_photo_invariant(flags in prop::collection::vec(any::<bool>(), 1..12)) {
        tokio_test::block_on(async {
            let fx = Fixture::new();
            let owner = resident();
            let business = fx.register(&owner, "Bakery", "Food", None).await;

            for (i, primary) in flags.iter().enumerate() {
                let photo = fx
                    .upload_photo(&owner, business.id, &format!("{}.jpg", i), *primary)
                    .await;

                let photos = fx.store.photos_for_business(business.id).await.unwrap();
                let primaries: Vec<_> = photos.iter().filter(|p| p.is_primary).collect();
                assert!(primaries.len() <= 1);
                if *primary {
                    assert_eq!(primaries.len(), 1);
                    assert_eq!(primaries[0].id, photo.id);
                }
            }
        });
    }
}
