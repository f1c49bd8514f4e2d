//! Order workflow: placement, status transitions and order chat
//!
//! An order the actor may not see is reported exactly like a missing one,
//! so non-participants cannot discover which order ids exist.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::models::{
    AnalyticsEvent, Business, Order, OrderLineItem, OrderMessage, OrderStatus, OrderWithMessages,
};
use shared::types::Actor;
use shared::validation::validate_quantity;
use uuid::Uuid;
use validator::Validate;

use super::analytics::record_best_effort;
use crate::error::{AppError, AppResult};
use crate::policy;
use crate::store::{EventSink, MarketStore};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn MarketStore>,
    events: Arc<dyn EventSink>,
}

/// One requested line; the price comes from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderInput {
    pub business_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "An order needs between 1 and 100 items"))]
    pub items: Vec<OrderLineInput>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageInput {
    #[validate(length(min = 1, max = 2000, message = "Message cannot be empty"))]
    pub message: String,
}

impl OrderService {
    pub fn new(store: Arc<dyn MarketStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// Resolve an order together with its business, if the actor may see it
    async fn visible_order(&self, actor: &Actor, id: Uuid) -> AppResult<(Order, Business)> {
        let order = self
            .store
            .order(id)
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
        Ok((order, business))
    }

    /// Place an order against an active business, snapshotting catalog prices
    pub async fn create(&self, actor: &Actor, input: CreateOrderInput) -> AppResult<Order> {
        input.validate()?;
        for line in &input.items {
            validate_quantity(line.quantity).map_err(|msg| AppError::validation("quantity", msg))?;
        }

        let business = self
            .store
            .business(input.business_id)
            .await?
            .filter(|b| b.is_active)
            .ok_or_else(|| AppError::not_found("Business"))?;

        let mut items = Vec::with_capacity(input.items.len());
        for line in input.items {
            let item = self
                .store
                .item(line.item_id)
                .await?
                .filter(|item| item.business_id == business.id)
                .ok_or_else(|| {
                    AppError::validation(
                        "items",
                        format!("Item {} is not offered by this business", line.item_id),
                    )
                })?;

            items.push(OrderLineItem {
                item_id: item.id,
                quantity: line.quantity,
                unit_price: item.price,
            });
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            business_id: business.id,
            buyer_id: actor.id(),
            items,
            status: OrderStatus::Pending,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        let total = order
            .total()
            .ok_or_else(|| AppError::validation("items", "Order total is too large"))?;

        let order = self.store.insert_order(order).await?;
        tracing::info!(
            order_id = %order.id,
            business_id = %order.business_id,
            buyer_id = %order.buyer_id,
            total = %total,
            "Order created"
        );

        record_best_effort(
            self.events.as_ref(),
            AnalyticsEvent::order_created(business.id, business.category),
        )
        .await;

        Ok(order)
    }

    /// Get an order with its chat history
    pub async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<OrderWithMessages> {
        let (order, _) = self.visible_order(actor, id).await?;
        let messages = self.store.messages_for_order(order.id).await?;
        Ok(OrderWithMessages::new(order, messages))
    }

    /// Orders the actor takes part in, newest first. Admins see every order.
    pub async fn list(&self, actor: &Actor) -> AppResult<Vec<Order>> {
        let orders = if policy::can_administer(actor) {
            self.store.orders().await?
        } else {
            self.store.orders_for_participant(actor.id()).await?
        };
        Ok(orders)
    }

    /// Move an order to any status in the workflow; adjacency is not enforced
    pub async fn update_status(&self, actor: &Actor, id: Uuid, status: &str) -> AppResult<Order> {
        let status = OrderStatus::from_str(status).ok_or_else(|| {
            AppError::validation(
                "status",
                format!("Invalid status. Must be one of: {}", OrderStatus::allowed_values()),
            )
        })?;

        let (order, business) = self.visible_order(actor, id).await?;
        if !policy::can_update_order_status(actor, &order, &business) {
            return Err(AppError::forbidden("Not authorized to update this order"));
        }

        let updated = self
            .store
            .update_order_status(order.id, status, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        tracing::info!(
            order_id = %updated.id,
            from = %order.status,
            to = %updated.status,
            actor_id = %actor.id(),
            "Order status changed"
        );
        Ok(updated)
    }

    /// Post to the order chat. Only the buyer and the business owner write here.
    pub async fn send_message(
        &self,
        actor: &Actor,
        id: Uuid,
        input: SendMessageInput,
    ) -> AppResult<OrderMessage> {
        input.validate()?;
        if input.message.trim().is_empty() {
            return Err(AppError::validation("message", "Message cannot be empty"));
        }

        let (order, business) = self.visible_order(actor, id).await?;
        if !policy::can_message_order(actor, &order, &business) {
            return Err(AppError::forbidden(
                "Not authorized to send messages for this order",
            ));
        }

        let message = OrderMessage {
            id: Uuid::new_v4(),
            order_id: order.id,
            sender_id: actor.id(),
            message: input.message,
            created_at: Utc::now(),
        };

        let message = self.store.insert_message(message).await?;
        tracing::debug!(order_id = %order.id, message_id = %message.id, "Order message sent");
        Ok(message)
    }

    /// Chat history, oldest first. Admins may read it for oversight.
    pub async fn list_messages(&self, actor: &Actor, id: Uuid) -> AppResult<Vec<OrderMessage>> {
        let (order, _) = self.visible_order(actor, id).await?;
        Ok(self.store.messages_for_order(order.id).await?)
    }
}
