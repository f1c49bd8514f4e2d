//! HTTP handlers for orders and order chat

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{Order, OrderMessage, OrderWithMessages};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::order::{CreateOrderInput, OrderService, SendMessageInput, UpdateStatusInput};
use crate::AppState;

fn service(state: &AppState) -> OrderService {
    OrderService::new(state.store.clone(), state.events.clone())
}

pub async fn create_order(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = service(&state).create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Orders for the caller; everything for admins
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<Order>>> {
    let orders = service(&state).list(&actor).await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithMessages>> {
    let order = service(&state).get(&actor, order_id).await?;
    Ok(Json(order))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<Order>> {
    let order = service(&state)
        .update_status(&actor, order_id, &input.status)
        .await?;
    Ok(Json(order))
}

pub async fn send_message(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<Uuid>,
    Json(input): Json<SendMessageInput>,
) -> AppResult<(StatusCode, Json<OrderMessage>)> {
    let message = service(&state).send_message(&actor, order_id, input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn list_messages(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<OrderMessage>>> {
    let messages = service(&state).list_messages(&actor, order_id).await?;
    Ok(Json(messages))
}
