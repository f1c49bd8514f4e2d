//! Analytics: best-effort event recording and the admin dashboard
//!
//! The dashboard is computed from full snapshots of the store. Aggregation
//! lives in plain functions so it can be tested without a store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;
use shared::models::{AnalyticsEvent, Business, EventKind, Order};
use shared::types::Actor;

use crate::config::AnalyticsConfig;
use crate::error::{AppError, AppResult};
use crate::policy;
use crate::store::{EventSink, MarketStore};

/// Record an event without letting a telemetry failure reach the caller
pub async fn record_best_effort(events: &dyn EventSink, event: AnalyticsEvent) {
    let kind = event.kind.as_str();
    if let Err(e) = events.record(event).await {
        tracing::warn!(kind, error = %e, "Dropped analytics event");
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub count: usize,
    /// Share of all registered businesses, rounded to two decimals
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchStat {
    pub search_term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HourBucket {
    pub hour: u32,
    pub count: usize,
}

/// Dashboard snapshot
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_businesses: usize,
    pub active_businesses: usize,
    pub verified_businesses: usize,
    pub category_stats: Vec<CategoryStat>,
    pub top_searches: Vec<SearchStat>,
    pub total_orders: usize,
    pub orders_by_status: BTreeMap<String, usize>,
    pub orders_by_hour: Vec<HourBucket>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Active businesses per category, largest first
pub fn category_stats(businesses: &[Business]) -> Vec<CategoryStat> {
    let total = businesses.len();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for business in businesses.iter().filter(|b| b.is_active) {
        *counts.entry(business.category.as_str()).or_default() += 1;
    }

    let mut stats: Vec<CategoryStat> = counts
        .into_iter()
        .map(|(category, count)| CategoryStat {
            category: category.to_string(),
            count,
            percentage: if total == 0 {
                0.0
            } else {
                round2(count as f64 / total as f64 * 100.0)
            },
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    stats
}

/// Most frequent search terms, ties broken alphabetically
pub fn top_searches(events: &[AnalyticsEvent], limit: usize) -> Vec<SearchStat> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for event in events.iter().filter(|e| e.kind == EventKind::Search) {
        if let Some(term) = event.search_term.as_deref() {
            *counts.entry(term).or_default() += 1;
        }
    }

    let mut stats: Vec<SearchStat> = counts
        .into_iter()
        .map(|(term, count)| SearchStat {
            search_term: term.to_string(),
            count,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.search_term.cmp(&b.search_term))
    });
    stats.truncate(limit);
    stats
}

/// Counts per status; statuses with no orders are omitted
pub fn orders_by_status(orders: &[Order]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for order in orders {
        *counts.entry(order.status.as_str().to_string()).or_default() += 1;
    }
    counts
}

/// Orders per UTC hour of day since `since`; all 24 buckets are present
pub fn orders_by_hour(orders: &[Order], since: DateTime<Utc>) -> Vec<HourBucket> {
    let mut counts = [0usize; 24];
    for order in orders.iter().filter(|o| o.created_at >= since) {
        counts[order.created_at.hour() as usize] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourBucket {
            hour: hour as u32,
            count,
        })
        .collect()
}

/// Analytics service for the admin dashboard
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn MarketStore>,
    config: AnalyticsConfig,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn MarketStore>, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    /// Build the dashboard snapshot (admin only)
    pub async fn dashboard(&self, actor: &Actor) -> AppResult<Dashboard> {
        if !policy::can_administer(actor) {
            return Err(AppError::forbidden("Only administrators can view analytics"));
        }

        let businesses = self.store.businesses(false).await?;
        let orders = self.store.orders().await?;
        let events = self.store.events().await?;
        let since = Utc::now() - Duration::days(self.config.histogram_window_days);

        tracing::debug!(
            businesses = businesses.len(),
            orders = orders.len(),
            events = events.len(),
            "Building dashboard"
        );

        Ok(Dashboard {
            total_businesses: businesses.len(),
            active_businesses: businesses.iter().filter(|b| b.is_active).count(),
            verified_businesses: businesses.iter().filter(|b| b.is_verified()).count(),
            category_stats: category_stats(&businesses),
            top_searches: top_searches(&events, self.config.top_search_limit),
            total_orders: orders.len(),
            orders_by_status: orders_by_status(&orders),
            orders_by_hour: orders_by_hour(&orders, since),
        })
    }
}
