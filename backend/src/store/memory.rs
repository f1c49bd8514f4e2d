//! In-process record store
//!
//! All tables live behind one `RwLock`. Writers hold the lock for the whole
//! read-then-write body of a method, which makes every method serializable.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::models::{
    AnalyticsEvent, Business, BusinessItem, BusinessPhoto, Order, OrderMessage, OrderStatus, Promo,
    Review,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BusinessPatch, EventSink, MarketStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    businesses: HashMap<Uuid, Business>,
    items: Vec<BusinessItem>,
    photos: Vec<BusinessPhoto>,
    orders: HashMap<Uuid, Order>,
    messages: Vec<OrderMessage>,
    reviews: Vec<Review>,
    promos: HashMap<Uuid, Promo>,
    events: Vec<AnalyticsEvent>,
}

/// Record store kept in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[axum::async_trait]
impl MarketStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_business(&self, business: Business) -> StoreResult<Business> {
        let mut tables = self.tables.write().await;
        if tables.businesses.contains_key(&business.id) {
            return Err(StoreError::Conflict("Business already exists".to_string()));
        }
        tables.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn business(&self, id: Uuid) -> StoreResult<Option<Business>> {
        Ok(self.tables.read().await.businesses.get(&id).cloned())
    }

    async fn patch_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: BusinessPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .businesses
            .get_mut(&id)
            .filter(|b| b.owner_id == owner_id)
            .map(|business| {
                patch.apply_to(business, at);
                business.clone()
            }))
    }

    async fn verify_business(
        &self,
        id: Uuid,
        admin_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .businesses
            .get_mut(&id)
            .filter(|b| b.is_active)
            .map(|business| {
                business.verify(admin_id, at);
                business.clone()
            }))
    }

    async fn deactivate_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .businesses
            .get_mut(&id)
            .filter(|b| b.is_active && b.owner_id == owner_id)
            .map(|business| {
                business.is_active = false;
                business.updated_at = at;
                business.clone()
            }))
    }

    async fn businesses(&self, active_only: bool) -> StoreResult<Vec<Business>> {
        let tables = self.tables.read().await;
        let mut businesses: Vec<Business> = tables
            .businesses
            .values()
            .filter(|b| !active_only || b.is_active)
            .cloned()
            .collect();
        businesses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(businesses)
    }

    async fn insert_item(&self, item: BusinessItem) -> StoreResult<BusinessItem> {
        self.tables.write().await.items.push(item.clone());
        Ok(item)
    }

    async fn item(&self, id: Uuid) -> StoreResult<Option<BusinessItem>> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn save_item(&self, item: BusinessItem) -> StoreResult<BusinessItem> {
        let mut tables = self.tables.write().await;
        match tables.items.iter().position(|i| i.id == item.id) {
            Some(pos) => tables.items[pos] = item.clone(),
            None => tables.items.push(item.clone()),
        }
        Ok(item)
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.items.len();
        tables.items.retain(|i| i.id != id);
        Ok(tables.items.len() != before)
    }

    async fn items_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| i.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn items_for_businesses(&self, business_ids: &[Uuid]) -> StoreResult<Vec<BusinessItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| business_ids.contains(&i.business_id))
            .cloned()
            .collect())
    }

    async fn insert_photo(&self, photo: BusinessPhoto) -> StoreResult<BusinessPhoto> {
        let mut tables = self.tables.write().await;
        if photo.is_primary {
            for sibling in tables
                .photos
                .iter_mut()
                .filter(|p| p.business_id == photo.business_id)
            {
                sibling.is_primary = false;
            }
        }
        tables.photos.push(photo.clone());
        Ok(photo)
    }

    async fn photo(&self, id: Uuid) -> StoreResult<Option<BusinessPhoto>> {
        let tables = self.tables.read().await;
        Ok(tables.photos.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_photo(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.photos.len();
        tables.photos.retain(|p| p.id != id);
        Ok(tables.photos.len() != before)
    }

    async fn photos_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessPhoto>> {
        let tables = self.tables.read().await;
        Ok(tables
            .photos
            .iter()
            .filter(|p| p.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn photos_for_businesses(
        &self,
        business_ids: &[Uuid],
    ) -> StoreResult<Vec<BusinessPhoto>> {
        let tables = self.tables.read().await;
        Ok(tables
            .photos
            .iter()
            .filter(|p| business_ids.contains(&p.business_id))
            .cloned()
            .collect())
    }

    async fn insert_order(&self, order: Order) -> StoreResult<Order> {
        let mut tables = self.tables.write().await;
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Order>> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.get_mut(&id).map(|order| {
            order.status = status;
            order.updated_at = at;
            order.clone()
        }))
    }

    async fn orders(&self) -> StoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.orders.values().cloned().collect()))
    }

    async fn orders_for_participant(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        let orders = tables
            .orders
            .values()
            .filter(|o| {
                o.buyer_id == user_id
                    || tables
                        .businesses
                        .get(&o.business_id)
                        .is_some_and(|b| b.owner_id == user_id)
            })
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn insert_message(&self, message: OrderMessage) -> StoreResult<OrderMessage> {
        self.tables.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn messages_for_order(&self, order_id: Uuid) -> StoreResult<Vec<OrderMessage>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<OrderMessage> = tables
            .messages
            .iter()
            .filter(|m| m.order_id == order_id)
            .cloned()
            .collect();
        // stable: equal timestamps keep insertion order
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn insert_review(&self, review: Review) -> StoreResult<Review> {
        let mut tables = self.tables.write().await;
        let completed = tables
            .orders
            .get(&review.order_id)
            .is_some_and(|o| o.status.is_terminal());
        if !completed {
            return Err(StoreError::Precondition(
                "Can only review completed orders".to_string(),
            ));
        }
        if tables.reviews.iter().any(|r| r.order_id == review.order_id) {
            return Err(StoreError::Conflict(
                "Review already exists for this order".to_string(),
            ));
        }
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn review_for_order(&self, order_id: Uuid) -> StoreResult<Option<Review>> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.iter().find(|r| r.order_id == order_id).cloned())
    }

    async fn set_review_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Review>> {
        let mut tables = self.tables.write().await;
        Ok(tables.reviews.iter_mut().find(|r| r.id == id).map(|review| {
            review.is_visible = visible;
            review.clone()
        }))
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.reviews.len();
        tables.reviews.retain(|r| r.id != id);
        Ok(tables.reviews.len() != before)
    }

    async fn visible_reviews_for_business(&self, business_id: Uuid) -> StoreResult<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.business_id == business_id && r.is_visible)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn insert_promo(&self, promo: Promo) -> StoreResult<Promo> {
        self.tables.write().await.promos.insert(promo.id, promo.clone());
        Ok(promo)
    }

    async fn promo(&self, id: Uuid) -> StoreResult<Option<Promo>> {
        Ok(self.tables.read().await.promos.get(&id).cloned())
    }

    async fn save_promo(&self, promo: Promo) -> StoreResult<Promo> {
        self.tables.write().await.promos.insert(promo.id, promo.clone());
        Ok(promo)
    }

    async fn delete_promo(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.promos.remove(&id).is_some())
    }

    async fn promos(&self) -> StoreResult<Vec<Promo>> {
        Ok(self.tables.read().await.promos.values().cloned().collect())
    }

    async fn events(&self) -> StoreResult<Vec<AnalyticsEvent>> {
        Ok(self.tables.read().await.events.clone())
    }
}

#[axum::async_trait]
impl EventSink for MemoryStore {
    async fn record(&self, event: AnalyticsEvent) -> StoreResult<()> {
        self.tables.write().await.events.push(event);
        Ok(())
    }
}
