//! Promo highlights curated by administrators

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::models::{Promo, PromoType};
use shared::types::Actor;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::policy;
use crate::store::MarketStore;

#[derive(Clone)]
pub struct PromoService {
    store: Arc<dyn MarketStore>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePromoInput {
    pub business_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub promo_type: PromoType,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePromoInput {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub promo_type: Option<PromoType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Query for listing promos
#[derive(Debug, Clone, Deserialize)]
pub struct PromoQuery {
    pub promo_type: Option<PromoType>,
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

impl Default for PromoQuery {
    fn default() -> Self {
        Self {
            promo_type: None,
            active_only: true,
        }
    }
}

fn check_window(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> AppResult<()> {
    match end {
        Some(end) if end < start => Err(AppError::validation(
            "end_date",
            "End date cannot be before start date",
        )),
        _ => Ok(()),
    }
}

impl PromoService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    fn require_admin(actor: &Actor) -> AppResult<()> {
        if !policy::can_administer(actor) {
            return Err(AppError::forbidden("Only administrators can manage promos"));
        }
        Ok(())
    }

    pub async fn create(&self, actor: &Actor, input: CreatePromoInput) -> AppResult<Promo> {
        Self::require_admin(actor)?;
        input.validate()?;
        check_window(input.start_date, input.end_date)?;

        if let Some(business_id) = input.business_id {
            self.store
                .business(business_id)
                .await?
                .ok_or_else(|| AppError::not_found("Business"))?;
        }

        let promo = Promo {
            id: Uuid::new_v4(),
            business_id: input.business_id,
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            promo_type: input.promo_type,
            start_date: input.start_date,
            end_date: input.end_date,
            created_by: actor.id(),
            created_at: Utc::now(),
        };

        let promo = self.store.insert_promo(promo).await?;
        tracing::info!(promo_id = %promo.id, promo_type = promo.promo_type.as_str(), "Promo created");
        Ok(promo)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdatePromoInput,
    ) -> AppResult<Promo> {
        Self::require_admin(actor)?;
        input.validate()?;

        let mut promo = self
            .store
            .promo(id)
            .await?
            .ok_or_else(|| AppError::not_found("Promo"))?;

        if let Some(title) = input.title {
            promo.title = title;
        }
        if let Some(description) = input.description {
            promo.description = Some(description);
        }
        if let Some(image_url) = input.image_url {
            promo.image_url = Some(image_url);
        }
        if let Some(promo_type) = input.promo_type {
            promo.promo_type = promo_type;
        }
        if let Some(start) = input.start_date {
            promo.start_date = start;
        }
        if let Some(end) = input.end_date {
            promo.end_date = Some(end);
        }
        check_window(promo.start_date, promo.end_date)?;

        let promo = self.store.save_promo(promo).await?;
        tracing::info!(promo_id = %promo.id, "Promo updated");
        Ok(promo)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        Self::require_admin(actor)?;

        if !self.store.delete_promo(id).await? {
            return Err(AppError::not_found("Promo"));
        }
        tracing::info!(promo_id = %id, "Promo deleted");
        Ok(())
    }

    /// Promos of an optional type, latest start first.
    /// With `active_only`, keeps promos running right now.
    pub async fn list(&self, query: PromoQuery) -> AppResult<Vec<Promo>> {
        let now = Utc::now();
        let mut promos: Vec<Promo> = self
            .store
            .promos()
            .await?
            .into_iter()
            .filter(|p| query.promo_type.map_or(true, |t| p.promo_type == t))
            .filter(|p| !query.active_only || p.is_running_at(now))
            .collect();

        promos.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(promos)
    }
}
