//! Shared fixtures for service-level tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use neighborhood_market_backend::config::AnalyticsConfig;
use neighborhood_market_backend::services::business::{
    CreateBusinessInput, CreateItemInput, UploadPhotoInput,
};
use neighborhood_market_backend::services::order::{CreateOrderInput, OrderLineInput};
use neighborhood_market_backend::services::{
    AnalyticsService, BusinessService, MarketplaceService, OrderService, PromoService,
    ReviewService,
};
use neighborhood_market_backend::store::{
    BusinessPatch, EventSink, MarketStore, MemoryStore, StoreError, StoreResult,
};
use rust_decimal::Decimal;
use shared::models::{
    AnalyticsEvent, Business, BusinessItem, BusinessPhoto, EventKind, Order, OrderMessage,
    OrderStatus, Promo, Review,
};
use shared::types::Actor;
use shared::zone::ZoneDistances;
use uuid::Uuid;

/// Event sink that always fails
pub struct FailingSink;

#[axum::async_trait]
impl EventSink for FailingSink {
    async fn record(&self, _event: AnalyticsEvent) -> StoreResult<()> {
        Err(StoreError::Unavailable("analytics offline".to_string()))
    }
}

/// Store that sleeps before each conditional write, so two requests both
/// finish their reads before either one writes
pub struct DelayedWrites {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

impl DelayedWrites {
    pub fn new(inner: Arc<MemoryStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }

    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

#[axum::async_trait]
impl MarketStore for DelayedWrites {
    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    async fn insert_business(&self, business: Business) -> StoreResult<Business> {
        self.inner.insert_business(business).await
    }

    async fn business(&self, id: Uuid) -> StoreResult<Option<Business>> {
        self.inner.business(id).await
    }

    async fn patch_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: BusinessPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        self.pause().await;
        self.inner.patch_business(id, owner_id, patch, at).await
    }

    async fn verify_business(
        &self,
        id: Uuid,
        admin_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        self.pause().await;
        self.inner.verify_business(id, admin_id, at).await
    }

    async fn deactivate_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        self.pause().await;
        self.inner.deactivate_business(id, owner_id, at).await
    }

    async fn businesses(&self, active_only: bool) -> StoreResult<Vec<Business>> {
        self.inner.businesses(active_only).await
    }

    async fn insert_item(&self, item: BusinessItem) -> StoreResult<BusinessItem> {
        self.inner.insert_item(item).await
    }

    async fn item(&self, id: Uuid) -> StoreResult<Option<BusinessItem>> {
        self.inner.item(id).await
    }

    async fn save_item(&self, item: BusinessItem) -> StoreResult<BusinessItem> {
        self.inner.save_item(item).await
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_item(id).await
    }

    async fn items_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessItem>> {
        self.inner.items_for_business(business_id).await
    }

    async fn items_for_businesses(&self, business_ids: &[Uuid]) -> StoreResult<Vec<BusinessItem>> {
        self.inner.items_for_businesses(business_ids).await
    }

    async fn insert_photo(&self, photo: BusinessPhoto) -> StoreResult<BusinessPhoto> {
        self.inner.insert_photo(photo).await
    }

    async fn photo(&self, id: Uuid) -> StoreResult<Option<BusinessPhoto>> {
        self.inner.photo(id).await
    }

    async fn delete_photo(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_photo(id).await
    }

    async fn photos_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessPhoto>> {
        self.inner.photos_for_business(business_id).await
    }

    async fn photos_for_businesses(
        &self,
        business_ids: &[Uuid],
    ) -> StoreResult<Vec<BusinessPhoto>> {
        self.inner.photos_for_businesses(business_ids).await
    }

    async fn insert_order(&self, order: Order) -> StoreResult<Order> {
        self.inner.insert_order(order).await
    }

    async fn order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        self.inner.order(id).await
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Order>> {
        self.inner.update_order_status(id, status, at).await
    }

    async fn orders(&self) -> StoreResult<Vec<Order>> {
        self.inner.orders().await
    }

    async fn orders_for_participant(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        self.inner.orders_for_participant(user_id).await
    }

    async fn insert_message(&self, message: OrderMessage) -> StoreResult<OrderMessage> {
        self.inner.insert_message(message).await
    }

    async fn messages_for_order(&self, order_id: Uuid) -> StoreResult<Vec<OrderMessage>> {
        self.inner.messages_for_order(order_id).await
    }

    async fn insert_review(&self, review: Review) -> StoreResult<Review> {
        self.pause().await;
        self.inner.insert_review(review).await
    }

    async fn review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        self.inner.review(id).await
    }

    async fn review_for_order(&self, order_id: Uuid) -> StoreResult<Option<Review>> {
        self.inner.review_for_order(order_id).await
    }

    async fn set_review_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Review>> {
        self.inner.set_review_visibility(id, visible).await
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_review(id).await
    }

    async fn visible_reviews_for_business(&self, business_id: Uuid) -> StoreResult<Vec<Review>> {
        self.inner.visible_reviews_for_business(business_id).await
    }

    async fn insert_promo(&self, promo: Promo) -> StoreResult<Promo> {
        self.inner.insert_promo(promo).await
    }

    async fn promo(&self, id: Uuid) -> StoreResult<Option<Promo>> {
        self.inner.promo(id).await
    }

    async fn save_promo(&self, promo: Promo) -> StoreResult<Promo> {
        self.inner.save_promo(promo).await
    }

    async fn delete_promo(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.delete_promo(id).await
    }

    async fn promos(&self) -> StoreResult<Vec<Promo>> {
        self.inner.promos().await
    }

    async fn events(&self) -> StoreResult<Vec<AnalyticsEvent>> {
        self.inner.events().await
    }
}

pub fn resident() -> Actor {
    Actor::resident(Uuid::new_v4())
}

pub fn admin() -> Actor {
    Actor::admin(Uuid::new_v4())
}

pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Services wired over one in-memory store
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub businesses: BusinessService,
    pub orders: OrderService,
    pub reviews: ReviewService,
    pub marketplace: MarketplaceService,
    pub promos: PromoService,
    pub analytics: AnalyticsService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store.clone(), store, ZoneDistances::default(), None)
    }

    pub fn with_zones(zones: ZoneDistances) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store.clone(), store, zones, None)
    }

    /// Analytics writes go to `events` instead of the store
    pub fn with_sink(events: Arc<dyn EventSink>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build(store.clone(), store, ZoneDistances::default(), Some(events))
    }

    /// Services see a store whose conditional writes wait `delay` first
    pub fn with_delayed_writes(delay: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let market = Arc::new(DelayedWrites::new(store.clone(), delay));
        Self::build(market, store, ZoneDistances::default(), None)
    }

    fn build(
        market: Arc<dyn MarketStore>,
        store: Arc<MemoryStore>,
        zones: ZoneDistances,
        events: Option<Arc<dyn EventSink>>,
    ) -> Self {
        let events: Arc<dyn EventSink> = match events {
            Some(events) => events,
            None => store.clone(),
        };

        Self {
            businesses: BusinessService::new(market.clone()),
            orders: OrderService::new(market.clone(), events.clone()),
            reviews: ReviewService::new(market.clone()),
            marketplace: MarketplaceService::new(market.clone(), events, Arc::new(zones)),
            promos: PromoService::new(market.clone()),
            analytics: AnalyticsService::new(market, AnalyticsConfig::default()),
            store,
        }
    }

    pub async fn register(
        &self,
        owner: &Actor,
        name: &str,
        category: &str,
        zone: Option<&str>,
    ) -> Business {
        self.register_described(owner, name, category, zone, None)
            .await
    }

    pub async fn register_described(
        &self,
        owner: &Actor,
        name: &str,
        category: &str,
        zone: Option<&str>,
        description: Option<&str>,
    ) -> Business {
        self.businesses
            .create(
                owner,
                CreateBusinessInput {
                    name: name.to_string(),
                    category: category.to_string(),
                    operating_hours: Some("8am-6pm".to_string()),
                    location_zone: zone.map(str::to_string),
                    description: description.map(str::to_string),
                },
            )
            .await
            .expect("register business")
    }

    pub async fn add_item(
        &self,
        owner: &Actor,
        business_id: Uuid,
        name: &str,
        price: Decimal,
    ) -> BusinessItem {
        self.businesses
            .add_item(
                owner,
                business_id,
                CreateItemInput {
                    name: name.to_string(),
                    description: None,
                    price,
                    image_url: None,
                    is_available: true,
                },
            )
            .await
            .expect("add item")
    }

    pub async fn upload_photo(
        &self,
        owner: &Actor,
        business_id: Uuid,
        url: &str,
        is_primary: bool,
    ) -> BusinessPhoto {
        self.businesses
            .upload_photo(
                owner,
                business_id,
                UploadPhotoInput {
                    image_url: url.to_string(),
                    is_primary,
                },
            )
            .await
            .expect("upload photo")
    }

    pub async fn place_order(
        &self,
        buyer: &Actor,
        business_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Order {
        self.orders
            .create(
                buyer,
                CreateOrderInput {
                    business_id,
                    items: vec![OrderLineInput { item_id, quantity }],
                    notes: None,
                },
            )
            .await
            .expect("place order")
    }

    /// A business with one item and a pending order from a separate buyer
    pub async fn pending_order(&self) -> (Actor, Actor, Order) {
        let owner = resident();
        let buyer = resident();
        let business = self.register(&owner, "Tita's Kitchen", "Food", Some("Zone 1")).await;
        let item = self
            .add_item(&owner, business.id, "Pancit", price(12000))
            .await;
        let order = self.place_order(&buyer, business.id, item.id, 2).await;
        (owner, buyer, order)
    }

    /// Same as [`Fixture::pending_order`] but already completed
    pub async fn completed_order(&self) -> (Actor, Actor, Order) {
        let (owner, buyer, order) = self.pending_order().await;
        let order = self
            .orders
            .update_status(&owner, order.id, "completed")
            .await
            .expect("complete order");
        (owner, buyer, order)
    }

    pub async fn events_of(&self, kind: EventKind) -> Vec<AnalyticsEvent> {
        self.store
            .events()
            .await
            .expect("events")
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }
}
