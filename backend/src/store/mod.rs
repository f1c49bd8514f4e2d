//! Record store for the marketplace
//!
//! Every trait method is one transaction: all of its writes commit or none
//! do. Invariants that depend on a read followed by a write (one primary
//! photo per business, one review per order) are enforced inside the store
//! method so concurrent requests race on the store's isolation, not on
//! application locks.

use chrono::{DateTime, Utc};
use shared::models::{
    AnalyticsEvent, Business, BusinessItem, BusinessPhoto, Order, OrderMessage, OrderStatus, Promo,
    Review,
};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A conditional write found its precondition no longer holds
    #[error("{0}")]
    Precondition(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Owner edits to a business; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub operating_hours: Option<String>,
    /// `Some(None)` clears the zone
    pub location_zone: Option<Option<String>>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl BusinessPatch {
    pub fn apply_to(self, business: &mut Business, at: DateTime<Utc>) {
        if let Some(name) = self.name {
            business.name = name;
        }
        if let Some(category) = self.category {
            business.category = category;
        }
        if let Some(hours) = self.operating_hours {
            business.operating_hours = Some(hours);
        }
        if let Some(zone) = self.location_zone {
            business.location_zone = zone;
        }
        if let Some(description) = self.description {
            business.description = Some(description);
        }
        if let Some(active) = self.is_active {
            business.is_active = active;
        }
        business.updated_at = at;
    }
}

/// Transactional access to marketplace records
#[axum::async_trait]
pub trait MarketStore: Send + Sync {
    /// Connectivity check for health endpoints
    async fn ping(&self) -> StoreResult<()>;

    // Businesses

    async fn insert_business(&self, business: Business) -> StoreResult<Business>;
    /// Fetch regardless of the active flag
    async fn business(&self, id: Uuid) -> StoreResult<Option<Business>>;
    /// Patch the supplied columns of a business owned by `owner_id`,
    /// active or not. `None` when no such business exists.
    async fn patch_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: BusinessPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>>;
    /// Record the verifier on an active business; `None` when it is missing or inactive
    async fn verify_business(
        &self,
        id: Uuid,
        admin_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>>;
    /// Clear the active flag of an active business owned by `owner_id`
    async fn deactivate_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>>;
    async fn businesses(&self, active_only: bool) -> StoreResult<Vec<Business>>;

    // Items

    async fn insert_item(&self, item: BusinessItem) -> StoreResult<BusinessItem>;
    async fn item(&self, id: Uuid) -> StoreResult<Option<BusinessItem>>;
    async fn save_item(&self, item: BusinessItem) -> StoreResult<BusinessItem>;
    async fn delete_item(&self, id: Uuid) -> StoreResult<bool>;
    async fn items_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessItem>>;
    async fn items_for_businesses(&self, business_ids: &[Uuid]) -> StoreResult<Vec<BusinessItem>>;

    // Photos

    /// Insert a photo. When it is primary, every sibling loses the flag in
    /// the same transaction.
    async fn insert_photo(&self, photo: BusinessPhoto) -> StoreResult<BusinessPhoto>;
    async fn photo(&self, id: Uuid) -> StoreResult<Option<BusinessPhoto>>;
    async fn delete_photo(&self, id: Uuid) -> StoreResult<bool>;
    async fn photos_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessPhoto>>;
    async fn photos_for_businesses(
        &self,
        business_ids: &[Uuid],
    ) -> StoreResult<Vec<BusinessPhoto>>;

    // Orders

    async fn insert_order(&self, order: Order) -> StoreResult<Order>;
    async fn order(&self, id: Uuid) -> StoreResult<Option<Order>>;
    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Order>>;
    /// All orders, newest first
    async fn orders(&self) -> StoreResult<Vec<Order>>;
    /// Orders where `user_id` is the buyer or owns the business, newest first
    async fn orders_for_participant(&self, user_id: Uuid) -> StoreResult<Vec<Order>>;

    // Order chat

    async fn insert_message(&self, message: OrderMessage) -> StoreResult<OrderMessage>;
    /// Oldest first
    async fn messages_for_order(&self, order_id: Uuid) -> StoreResult<Vec<OrderMessage>>;

    // Reviews

    /// Insert a review while its order is completed. Fails with
    /// [`StoreError::Precondition`] when the order is not completed at write
    /// time and with [`StoreError::Conflict`] when it already has a review.
    async fn insert_review(&self, review: Review) -> StoreResult<Review>;
    async fn review(&self, id: Uuid) -> StoreResult<Option<Review>>;
    async fn review_for_order(&self, order_id: Uuid) -> StoreResult<Option<Review>>;
    async fn set_review_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Review>>;
    async fn delete_review(&self, id: Uuid) -> StoreResult<bool>;
    /// Visible reviews only, newest first
    async fn visible_reviews_for_business(&self, business_id: Uuid) -> StoreResult<Vec<Review>>;

    // Promos

    async fn insert_promo(&self, promo: Promo) -> StoreResult<Promo>;
    async fn promo(&self, id: Uuid) -> StoreResult<Option<Promo>>;
    async fn save_promo(&self, promo: Promo) -> StoreResult<Promo>;
    async fn delete_promo(&self, id: Uuid) -> StoreResult<bool>;
    async fn promos(&self) -> StoreResult<Vec<Promo>>;

    // Analytics

    async fn events(&self) -> StoreResult<Vec<AnalyticsEvent>>;
}

/// Write side of analytics.
///
/// Kept apart from [`MarketStore`] because telemetry writes are best-effort:
/// callers log and drop failures instead of failing the request.
#[axum::async_trait]
pub trait EventSink: Send + Sync {
    async fn record(&self, event: AnalyticsEvent) -> StoreResult<()>;
}
