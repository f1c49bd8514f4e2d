//! PostgreSQL record store

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{
    AnalyticsEvent, Business, BusinessItem, BusinessPhoto, EventKind, Order, OrderLineItem,
    OrderMessage, OrderStatus, Promo, PromoType, Review, Verification,
};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use super::{BusinessPatch, EventSink, MarketStore, StoreError, StoreResult};
use crate::config::DatabaseConfig;

/// Record store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool for `url`
    pub async fn connect(url: &str, config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {}", e)))
    }
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> StoreError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(message.to_string()),
        _ => StoreError::Database(err),
    }
}

#[derive(sqlx::FromRow)]
struct BusinessRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    category: String,
    operating_hours: Option<String>,
    location_zone: Option<String>,
    description: Option<String>,
    verified_by: Option<Uuid>,
    verified_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BusinessRow> for Business {
    fn from(row: BusinessRow) -> Self {
        let verification = match (row.verified_by, row.verified_at) {
            (Some(verified_by), Some(verified_at)) => Some(Verification {
                verified_by,
                verified_at,
            }),
            _ => None,
        };
        Business {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            category: row.category,
            operating_hours: row.operating_hours,
            location_zone: row.location_zone,
            description: row.description,
            verification,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    business_id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for BusinessItem {
    fn from(row: ItemRow) -> Self {
        BusinessItem {
            id: row.id,
            business_id: row.business_id,
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            is_available: row.is_available,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PhotoRow {
    id: Uuid,
    business_id: Uuid,
    image_url: String,
    is_primary: bool,
    uploaded_at: DateTime<Utc>,
}

impl From<PhotoRow> for BusinessPhoto {
    fn from(row: PhotoRow) -> Self {
        BusinessPhoto {
            id: row.id,
            business_id: row.business_id,
            image_url: row.image_url,
            is_primary: row.is_primary,
            uploaded_at: row.uploaded_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    business_id: Uuid,
    buyer_id: Uuid,
    items: Json<Vec<OrderLineItem>>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("order status '{}'", row.status)))?;
        Ok(Order {
            id: row.id,
            business_id: row.business_id,
            buyer_id: row.buyer_id,
            items: row.items.0,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn orders_from_rows(rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    order_id: Uuid,
    sender_id: Uuid,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for OrderMessage {
    fn from(row: MessageRow) -> Self {
        OrderMessage {
            id: row.id,
            order_id: row.order_id,
            sender_id: row.sender_id,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    order_id: Uuid,
    business_id: Uuid,
    reviewer_id: Uuid,
    rating: i32,
    comment: Option<String>,
    photo_url: Option<String>,
    is_visible: bool,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            order_id: row.order_id,
            business_id: row.business_id,
            reviewer_id: row.reviewer_id,
            rating: row.rating,
            comment: row.comment,
            photo_url: row.photo_url,
            is_visible: row.is_visible,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PromoRow {
    id: Uuid,
    business_id: Option<Uuid>,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    promo_type: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<PromoRow> for Promo {
    type Error = StoreError;

    fn try_from(row: PromoRow) -> Result<Self, Self::Error> {
        let promo_type = PromoType::from_str(&row.promo_type)
            .ok_or_else(|| StoreError::Corrupt(format!("promo type '{}'", row.promo_type)))?;
        Ok(Promo {
            id: row.id,
            business_id: row.business_id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            promo_type,
            start_date: row.start_date,
            end_date: row.end_date,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    kind: String,
    business_id: Option<Uuid>,
    category: Option<String>,
    search_term: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for AnalyticsEvent {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let kind = EventKind::from_str(&row.kind)
            .ok_or_else(|| StoreError::Corrupt(format!("event kind '{}'", row.kind)))?;
        Ok(AnalyticsEvent {
            id: row.id,
            kind,
            business_id: row.business_id,
            category: row.category,
            search_term: row.search_term,
            created_at: row.created_at,
        })
    }
}

#[axum::async_trait]
impl MarketStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_business(&self, business: Business) -> StoreResult<Business> {
        let (verified_by, verified_at) = match &business.verification {
            Some(v) => (Some(v.verified_by), Some(v.verified_at)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            INSERT INTO businesses (id, owner_id, name, category, operating_hours, location_zone,
                                    description, verified_by, verified_at, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, owner_id, name, category, operating_hours, location_zone, description,
                      verified_by, verified_at, is_active, created_at, updated_at
            "#,
        )
        .bind(business.id)
        .bind(business.owner_id)
        .bind(&business.name)
        .bind(&business.category)
        .bind(&business.operating_hours)
        .bind(&business.location_zone)
        .bind(&business.description)
        .bind(verified_by)
        .bind(verified_at)
        .bind(business.is_active)
        .bind(business.created_at)
        .bind(business.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Business already exists"))?;

        Ok(row.into())
    }

    async fn business(&self, id: Uuid) -> StoreResult<Option<Business>> {
        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT id, owner_id, name, category, operating_hours, location_zone, description,
                   verified_by, verified_at, is_active, created_at, updated_at
            FROM businesses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Business::from))
    }

    async fn patch_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: BusinessPatch,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        let (zone_set, zone) = match patch.location_zone {
            Some(zone) => (true, zone),
            None => (false, None),
        };

        // untouched columns keep whatever a concurrent writer stored
        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            UPDATE businesses
            SET name = COALESCE($3, name),
                category = COALESCE($4, category),
                operating_hours = COALESCE($5, operating_hours),
                location_zone = CASE WHEN $6 THEN $7 ELSE location_zone END,
                description = COALESCE($8, description),
                is_active = COALESCE($9, is_active),
                updated_at = $10
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, category, operating_hours, location_zone, description,
                      verified_by, verified_at, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(patch.name)
        .bind(patch.category)
        .bind(patch.operating_hours)
        .bind(zone_set)
        .bind(zone)
        .bind(patch.description)
        .bind(patch.is_active)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Business::from))
    }

    async fn verify_business(
        &self,
        id: Uuid,
        admin_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            UPDATE businesses
            SET verified_by = $2, verified_at = $3, updated_at = $3
            WHERE id = $1 AND is_active
            RETURNING id, owner_id, name, category, operating_hours, location_zone, description,
                      verified_by, verified_at, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Business::from))
    }

    async fn deactivate_business(
        &self,
        id: Uuid,
        owner_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Business>> {
        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            UPDATE businesses
            SET is_active = FALSE, updated_at = $3
            WHERE id = $1 AND owner_id = $2 AND is_active
            RETURNING id, owner_id, name, category, operating_hours, location_zone, description,
                      verified_by, verified_at, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Business::from))
    }

    async fn businesses(&self, active_only: bool) -> StoreResult<Vec<Business>> {
        let rows = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT id, owner_id, name, category, operating_hours, location_zone, description,
                   verified_by, verified_at, is_active, created_at, updated_at
            FROM businesses
            WHERE is_active OR NOT $1
            ORDER BY created_at, name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Business::from).collect())
    }

    async fn insert_item(&self, item: BusinessItem) -> StoreResult<BusinessItem> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO business_items (id, business_id, name, description, price, image_url,
                                        is_available, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, business_id, name, description, price, image_url, is_available, created_at
            "#,
        )
        .bind(item.id)
        .bind(item.business_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(item.is_available)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn item(&self, id: Uuid) -> StoreResult<Option<BusinessItem>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, business_id, name, description, price, image_url, is_available, created_at
            FROM business_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BusinessItem::from))
    }

    async fn save_item(&self, item: BusinessItem) -> StoreResult<BusinessItem> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE business_items
            SET name = $2, description = $3, price = $4, image_url = $5, is_available = $6
            WHERE id = $1
            RETURNING id, business_id, name, description, price, image_url, is_available, created_at
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(item.is_available)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM business_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn items_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, business_id, name, description, price, image_url, is_available, created_at
            FROM business_items
            WHERE business_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BusinessItem::from).collect())
    }

    async fn items_for_businesses(&self, business_ids: &[Uuid]) -> StoreResult<Vec<BusinessItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, business_id, name, description, price, image_url, is_available, created_at
            FROM business_items
            WHERE business_id = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(business_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BusinessItem::from).collect())
    }

    async fn insert_photo(&self, photo: BusinessPhoto) -> StoreResult<BusinessPhoto> {
        let mut tx = self.pool.begin().await?;

        // Serialize photo writes per business
        sqlx::query("SELECT id FROM businesses WHERE id = $1 FOR UPDATE")
            .bind(photo.business_id)
            .execute(&mut *tx)
            .await?;

        if photo.is_primary {
            sqlx::query(
                "UPDATE business_photos SET is_primary = FALSE WHERE business_id = $1 AND is_primary",
            )
            .bind(photo.business_id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            INSERT INTO business_photos (id, business_id, image_url, is_primary, uploaded_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, business_id, image_url, is_primary, uploaded_at
            "#,
        )
        .bind(photo.id)
        .bind(photo.business_id)
        .bind(&photo.image_url)
        .bind(photo.is_primary)
        .bind(photo.uploaded_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "Business already has a primary photo"))?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn photo(&self, id: Uuid) -> StoreResult<Option<BusinessPhoto>> {
        let row = sqlx::query_as::<_, PhotoRow>(
            "SELECT id, business_id, image_url, is_primary, uploaded_at FROM business_photos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BusinessPhoto::from))
    }

    async fn delete_photo(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM business_photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn photos_for_business(&self, business_id: Uuid) -> StoreResult<Vec<BusinessPhoto>> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, business_id, image_url, is_primary, uploaded_at
            FROM business_photos
            WHERE business_id = $1
            ORDER BY uploaded_at
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BusinessPhoto::from).collect())
    }

    async fn photos_for_businesses(
        &self,
        business_ids: &[Uuid],
    ) -> StoreResult<Vec<BusinessPhoto>> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, business_id, image_url, is_primary, uploaded_at
            FROM business_photos
            WHERE business_id = ANY($1)
            ORDER BY uploaded_at
            "#,
        )
        .bind(business_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BusinessPhoto::from).collect())
    }

    async fn insert_order(&self, order: Order) -> StoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, business_id, buyer_id, items, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, business_id, buyer_id, items, status, notes, created_at, updated_at
            "#,
        )
        .bind(order.id)
        .bind(order.business_id)
        .bind(order.buyer_id)
        .bind(Json(&order.items))
        .bind(order.status.as_str())
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, business_id, buyer_id, items, status, notes, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, business_id, buyer_id, items, status, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn orders(&self) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, business_id, buyer_id, items, status, notes, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        orders_from_rows(rows)
    }

    async fn orders_for_participant(&self, user_id: Uuid) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.business_id, o.buyer_id, o.items, o.status, o.notes,
                   o.created_at, o.updated_at
            FROM orders o
            JOIN businesses b ON b.id = o.business_id
            WHERE o.buyer_id = $1 OR b.owner_id = $1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        orders_from_rows(rows)
    }

    async fn insert_message(&self, message: OrderMessage) -> StoreResult<OrderMessage> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO order_messages (id, order_id, sender_id, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, order_id, sender_id, message, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.order_id)
        .bind(message.sender_id)
        .bind(&message.message)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn messages_for_order(&self, order_id: Uuid) -> StoreResult<Vec<OrderMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, order_id, sender_id, message, created_at
            FROM order_messages
            WHERE order_id = $1
            ORDER BY created_at, seq
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderMessage::from).collect())
    }

    async fn insert_review(&self, review: Review) -> StoreResult<Review> {
        // the status check and the insert are one statement; FOR SHARE holds
        // the order row until commit
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (id, order_id, business_id, reviewer_id, rating, comment,
                                 photo_url, is_visible, created_at)
            SELECT $1::uuid, o.id, o.business_id, $3::uuid, $4::int4, $5::text, $6::text,
                   $7::bool, $8::timestamptz
            FROM orders o
            WHERE o.id = $2 AND o.status = 'completed'
            FOR SHARE
            RETURNING id, order_id, business_id, reviewer_id, rating, comment, photo_url,
                      is_visible, created_at
            "#,
        )
        .bind(review.id)
        .bind(review.order_id)
        .bind(review.reviewer_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(&review.photo_url)
        .bind(review.is_visible)
        .bind(review.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Review already exists for this order"))?;

        row.map(Review::from).ok_or_else(|| {
            StoreError::Precondition("Can only review completed orders".to_string())
        })
    }

    async fn review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, order_id, business_id, reviewer_id, rating, comment, photo_url,
                   is_visible, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    async fn review_for_order(&self, order_id: Uuid) -> StoreResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, order_id, business_id, reviewer_id, rating, comment, photo_url,
                   is_visible, created_at
            FROM reviews
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    async fn set_review_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            UPDATE reviews
            SET is_visible = $2
            WHERE id = $1
            RETURNING id, order_id, business_id, reviewer_id, rating, comment, photo_url,
                      is_visible, created_at
            "#,
        )
        .bind(id)
        .bind(visible)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    async fn delete_review(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn visible_reviews_for_business(&self, business_id: Uuid) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, order_id, business_id, reviewer_id, rating, comment, photo_url,
                   is_visible, created_at
            FROM reviews
            WHERE business_id = $1 AND is_visible
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn insert_promo(&self, promo: Promo) -> StoreResult<Promo> {
        let row = sqlx::query_as::<_, PromoRow>(
            r#"
            INSERT INTO promos (id, business_id, title, description, image_url, promo_type,
                                start_date, end_date, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, business_id, title, description, image_url, promo_type,
                      start_date, end_date, created_by, created_at
            "#,
        )
        .bind(promo.id)
        .bind(promo.business_id)
        .bind(&promo.title)
        .bind(&promo.description)
        .bind(&promo.image_url)
        .bind(promo.promo_type.as_str())
        .bind(promo.start_date)
        .bind(promo.end_date)
        .bind(promo.created_by)
        .bind(promo.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn promo(&self, id: Uuid) -> StoreResult<Option<Promo>> {
        let row = sqlx::query_as::<_, PromoRow>(
            r#"
            SELECT id, business_id, title, description, image_url, promo_type,
                   start_date, end_date, created_by, created_at
            FROM promos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Promo::try_from).transpose()
    }

    async fn save_promo(&self, promo: Promo) -> StoreResult<Promo> {
        let row = sqlx::query_as::<_, PromoRow>(
            r#"
            UPDATE promos
            SET title = $2, description = $3, image_url = $4, promo_type = $5,
                start_date = $6, end_date = $7
            WHERE id = $1
            RETURNING id, business_id, title, description, image_url, promo_type,
                      start_date, end_date, created_by, created_at
            "#,
        )
        .bind(promo.id)
        .bind(&promo.title)
        .bind(&promo.description)
        .bind(&promo.image_url)
        .bind(promo.promo_type.as_str())
        .bind(promo.start_date)
        .bind(promo.end_date)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_promo(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM promos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn promos(&self) -> StoreResult<Vec<Promo>> {
        let rows = sqlx::query_as::<_, PromoRow>(
            r#"
            SELECT id, business_id, title, description, image_url, promo_type,
                   start_date, end_date, created_by, created_at
            FROM promos
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Promo::try_from).collect()
    }

    async fn events(&self) -> StoreResult<Vec<AnalyticsEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, kind, business_id, category, search_term, created_at
            FROM analytics_events
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AnalyticsEvent::try_from).collect()
    }
}

#[axum::async_trait]
impl EventSink for PgStore {
    async fn record(&self, event: AnalyticsEvent) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, kind, business_id, category, search_term, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id)
        .bind(event.kind.as_str())
        .bind(event.business_id)
        .bind(&event.category)
        .bind(&event.search_term)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
