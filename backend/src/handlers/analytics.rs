//! HTTP handlers for the admin analytics dashboard

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentActor;
use crate::services::analytics::{AnalyticsService, Dashboard};
use crate::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Dashboard>> {
    let service = AnalyticsService::new(state.store.clone(), state.config.analytics.clone());
    let dashboard = service.dashboard(&actor).await?;
    Ok(Json(dashboard))
}
