//! Business catalog service: businesses, their items and photos

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{Business, BusinessItem, BusinessListing, BusinessPhoto};
use shared::types::Actor;
use shared::validation::{validate_not_blank, validate_price};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::policy;
use crate::store::{BusinessPatch, MarketStore};

/// Business service for registration, catalog and photo management
#[derive(Clone)]
pub struct BusinessService {
    store: Arc<dyn MarketStore>,
}

/// Input for registering a business
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBusinessInput {
    #[validate(length(min = 1, max = 200, message = "Business name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    pub operating_hours: Option<String>,
    pub location_zone: Option<String>,
    pub description: Option<String>,
}

/// Partial update; only supplied fields change
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBusinessInput {
    #[validate(length(min = 1, max = 200, message = "Business name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category cannot be empty"))]
    pub category: Option<String>,
    pub operating_hours: Option<String>,
    pub location_zone: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for adding a catalog item
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemInput {
    #[validate(length(min = 1, max = 200, message = "Item name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateItemInput {
    #[validate(length(min = 1, max = 200, message = "Item name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

/// Input for attaching a photo
#[derive(Debug, Deserialize, Validate)]
pub struct UploadPhotoInput {
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    #[serde(default)]
    pub is_primary: bool,
}

fn check_price(price: Decimal) -> AppResult<()> {
    validate_price(price).map_err(|msg| AppError::validation("price", msg))
}

/// Trimmed value of a required text field
fn required_text(field: &str, value: &str) -> AppResult<String> {
    validate_not_blank(value).map_err(|msg| AppError::validation(field, msg))?;
    Ok(value.trim().to_string())
}

impl BusinessService {
    /// Create a new BusinessService instance
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Resolve an active business
    pub async fn active_business(&self, id: Uuid) -> AppResult<Business> {
        self.store
            .business(id)
            .await?
            .filter(|b| b.is_active)
            .ok_or_else(|| AppError::not_found("Business"))
    }

    /// Resolve an active business the actor owns.
    ///
    /// Ownership is not sensitive: a business that exists but belongs to
    /// someone else is reported as forbidden.
    async fn owned_business(&self, actor: &Actor, id: Uuid, action: &str) -> AppResult<Business> {
        let business = self.active_business(id).await?;
        if !policy::can_mutate_business(actor, &business) {
            return Err(AppError::forbidden(format!(
                "Not authorized to {} this business",
                action
            )));
        }
        Ok(business)
    }

    /// Attach items and photos to a business
    pub async fn listing(&self, business: Business) -> AppResult<BusinessListing> {
        let items = self.store.items_for_business(business.id).await?;
        let photos = self.store.photos_for_business(business.id).await?;
        Ok(BusinessListing::new(business, items, photos))
    }

    /// Register a business owned by the actor
    pub async fn create(&self, actor: &Actor, input: CreateBusinessInput) -> AppResult<Business> {
        input.validate()?;
        let name = required_text("name", &input.name)?;
        let category = required_text("category", &input.category)?;

        let now = Utc::now();
        let business = Business {
            id: Uuid::new_v4(),
            owner_id: actor.id(),
            name,
            category,
            operating_hours: input.operating_hours,
            location_zone: input.location_zone.filter(|z| !z.trim().is_empty()),
            description: input.description,
            verification: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let business = self.store.insert_business(business).await?;
        tracing::info!(business_id = %business.id, owner_id = %business.owner_id, "Business registered");
        Ok(business)
    }

    /// Get an active business with its catalog
    pub async fn get(&self, id: Uuid) -> AppResult<BusinessListing> {
        let business = self.active_business(id).await?;
        self.listing(business).await
    }

    /// Apply a partial update.
    ///
    /// The owner may also reach a deactivated business here, to reactivate
    /// it; anyone else sees it as missing. Only the supplied columns are
    /// written, so a concurrent verification is never overwritten.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateBusinessInput,
    ) -> AppResult<Business> {
        input.validate()?;
        let patch = BusinessPatch {
            name: input
                .name
                .as_deref()
                .map(|name| required_text("name", name))
                .transpose()?,
            category: input
                .category
                .as_deref()
                .map(|category| required_text("category", category))
                .transpose()?,
            operating_hours: input.operating_hours,
            location_zone: input
                .location_zone
                .map(|zone| Some(zone).filter(|z| !z.trim().is_empty())),
            description: input.description,
            is_active: input.is_active,
        };

        let business = self
            .store
            .business(id)
            .await?
            .filter(|b| b.is_active || policy::can_mutate_business(actor, b))
            .ok_or_else(|| AppError::not_found("Business"))?;

        if !policy::can_mutate_business(actor, &business) {
            return Err(AppError::forbidden("Not authorized to update this business"));
        }

        let business = self
            .store
            .patch_business(id, actor.id(), patch, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Business"))?;
        tracing::info!(business_id = %business.id, "Business updated");
        Ok(business)
    }

    /// Mark a business verified. Re-verifying replaces the verifier and timestamp.
    pub async fn verify(&self, actor: &Actor, id: Uuid) -> AppResult<Business> {
        if !policy::can_administer(actor) {
            return Err(AppError::forbidden("Only administrators can verify businesses"));
        }

        let business = self
            .store
            .verify_business(id, actor.id(), Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Business"))?;
        tracing::info!(business_id = %business.id, admin_id = %actor.id(), "Business verified");
        Ok(business)
    }

    /// Soft delete: the record stays for order and review history
    pub async fn deactivate(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        self.owned_business(actor, id, "delete").await?;

        self.store
            .deactivate_business(id, actor.id(), Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Business"))?;
        tracing::info!(business_id = %id, "Business deactivated");
        Ok(())
    }

    pub async fn add_item(
        &self,
        actor: &Actor,
        business_id: Uuid,
        input: CreateItemInput,
    ) -> AppResult<BusinessItem> {
        input.validate()?;
        let name = required_text("name", &input.name)?;
        check_price(input.price)?;
        self.owned_business(actor, business_id, "add items to")
            .await?;

        let item = BusinessItem {
            id: Uuid::new_v4(),
            business_id,
            name,
            description: input.description,
            price: input.price,
            image_url: input.image_url,
            is_available: input.is_available,
            created_at: Utc::now(),
        };

        let item = self.store.insert_item(item).await?;
        tracing::info!(business_id = %business_id, item_id = %item.id, "Item added");
        Ok(item)
    }

    /// Resolve an item under its parent; an item of another business is missing
    async fn owned_item(&self, business_id: Uuid, item_id: Uuid) -> AppResult<BusinessItem> {
        self.store
            .item(item_id)
            .await?
            .filter(|item| item.business_id == business_id)
            .ok_or_else(|| AppError::not_found("Item"))
    }

    pub async fn update_item(
        &self,
        actor: &Actor,
        business_id: Uuid,
        item_id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<BusinessItem> {
        input.validate()?;
        let name = input
            .name
            .as_deref()
            .map(|name| required_text("name", name))
            .transpose()?;
        if let Some(price) = input.price {
            check_price(price)?;
        }
        self.owned_business(actor, business_id, "update items for")
            .await?;

        let mut item = self.owned_item(business_id, item_id).await?;
        if let Some(name) = name {
            item.name = name;
        }
        if let Some(description) = input.description {
            item.description = Some(description);
        }
        if let Some(price) = input.price {
            item.price = price;
        }
        if let Some(image_url) = input.image_url {
            item.image_url = Some(image_url);
        }
        if let Some(available) = input.is_available {
            item.is_available = available;
        }

        let item = self.store.save_item(item).await?;
        tracing::info!(business_id = %business_id, item_id = %item.id, "Item updated");
        Ok(item)
    }

    pub async fn delete_item(&self, actor: &Actor, business_id: Uuid, item_id: Uuid) -> AppResult<()> {
        self.owned_business(actor, business_id, "delete items for")
            .await?;
        self.owned_item(business_id, item_id).await?;

        if !self.store.delete_item(item_id).await? {
            return Err(AppError::not_found("Item"));
        }
        tracing::info!(business_id = %business_id, item_id = %item_id, "Item deleted");
        Ok(())
    }

    /// Attach a photo. A primary upload demotes every other photo in the same write.
    pub async fn upload_photo(
        &self,
        actor: &Actor,
        business_id: Uuid,
        input: UploadPhotoInput,
    ) -> AppResult<BusinessPhoto> {
        input.validate()?;
        self.owned_business(actor, business_id, "upload photos for")
            .await?;

        let photo = BusinessPhoto {
            id: Uuid::new_v4(),
            business_id,
            image_url: input.image_url,
            is_primary: input.is_primary,
            uploaded_at: Utc::now(),
        };

        let photo = self.store.insert_photo(photo).await?;
        tracing::info!(
            business_id = %business_id,
            photo_id = %photo.id,
            primary = photo.is_primary,
            "Photo uploaded"
        );
        Ok(photo)
    }

    pub async fn delete_photo(&self, actor: &Actor, business_id: Uuid, photo_id: Uuid) -> AppResult<()> {
        self.owned_business(actor, business_id, "delete photos for")
            .await?;
        self.store
            .photo(photo_id)
            .await?
            .filter(|photo| photo.business_id == business_id)
            .ok_or_else(|| AppError::not_found("Photo"))?;

        if !self.store.delete_photo(photo_id).await? {
            return Err(AppError::not_found("Photo"));
        }
        tracing::info!(business_id = %business_id, photo_id = %photo_id, "Photo deleted");
        Ok(())
    }
}
