//! Marketplace listing: filtered browse over active businesses

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use shared::models::{AnalyticsEvent, BusinessItem, BusinessListing, BusinessPhoto};
use shared::types::Actor;
use shared::validation::parse_distance_radius;
use shared::zone::ZoneDistances;
use uuid::Uuid;

use super::analytics::record_best_effort;
use crate::error::{AppError, AppResult};
use crate::store::{EventSink, MarketStore};

/// Browse filters. Empty strings count as absent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListFilters {
    pub category: Option<String>,
    pub verified: Option<bool>,
    /// Radius such as `"200m"`; applied only when the requester has a zone
    pub distance: Option<String>,
    pub search: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct MarketplaceService {
    store: Arc<dyn MarketStore>,
    events: Arc<dyn EventSink>,
    zones: Arc<ZoneDistances>,
}

impl MarketplaceService {
    pub fn new(
        store: Arc<dyn MarketStore>,
        events: Arc<dyn EventSink>,
        zones: Arc<ZoneDistances>,
    ) -> Self {
        Self {
            store,
            events,
            zones,
        }
    }

    /// List active businesses with items and photos attached.
    ///
    /// Filters apply in order: category, verification, text search, then
    /// zone distance from the requester. A business whose distance cannot be
    /// determined is dropped by the distance filter.
    pub async fn list(
        &self,
        requester: Option<&Actor>,
        filters: ListFilters,
    ) -> AppResult<Vec<BusinessListing>> {
        let radius = non_empty(&filters.distance)
            .map(parse_distance_radius)
            .transpose()
            .map_err(|msg| AppError::validation("distance", msg))?;
        let category = non_empty(&filters.category);
        let search = non_empty(&filters.search);

        let mut businesses = self.store.businesses(true).await?;

        if let Some(category) = category {
            businesses.retain(|b| b.category == category);
        }

        if let Some(verified) = filters.verified {
            businesses.retain(|b| b.is_verified() == verified);
        }

        if let Some(term) = search {
            let needle = term.to_lowercase();
            businesses.retain(|b| b.matches_search(&needle));

            record_best_effort(
                self.events.as_ref(),
                AnalyticsEvent::search(term, category.map(str::to_string)),
            )
            .await;
        }

        let requester_zone = requester.and_then(Actor::zone);
        if let (Some(radius), Some(zone)) = (radius, requester_zone) {
            businesses.retain(|b| {
                self.zones
                    .within(Some(zone), b.location_zone.as_deref(), radius)
            });
        }

        tracing::debug!(
            results = businesses.len(),
            category = ?category,
            search = ?search,
            radius = ?radius,
            "Marketplace listing"
        );

        if businesses.is_empty() {
            return Ok(Vec::new());
        }

        // one batched read per child table, grouped by parent
        let ids: Vec<Uuid> = businesses.iter().map(|b| b.id).collect();
        let mut items: HashMap<Uuid, Vec<BusinessItem>> = HashMap::new();
        for item in self.store.items_for_businesses(&ids).await? {
            items.entry(item.business_id).or_default().push(item);
        }
        let mut photos: HashMap<Uuid, Vec<BusinessPhoto>> = HashMap::new();
        for photo in self.store.photos_for_businesses(&ids).await? {
            photos.entry(photo.business_id).or_default().push(photo);
        }

        Ok(businesses
            .into_iter()
            .map(|business| {
                let items = items.remove(&business.id).unwrap_or_default();
                let photos = photos.remove(&business.id).unwrap_or_default();
                BusinessListing::new(business, items, photos)
            })
            .collect())
    }

    /// Record a profile view; any id is accepted
    pub async fn track_view(&self, business_id: Uuid, category: Option<String>) {
        record_best_effort(
            self.events.as_ref(),
            AnalyticsEvent::business_view(business_id, category),
        )
        .await;
    }
}
