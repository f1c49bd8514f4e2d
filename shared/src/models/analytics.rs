//! Analytics event models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of telemetry fact recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BusinessView,
    Search,
    OrderCreated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BusinessView => "business_view",
            EventKind::Search => "search",
            EventKind::OrderCreated => "order_created",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "business_view" => Some(EventKind::BusinessView),
            "search" => Some(EventKind::Search),
            "order_created" => Some(EventKind::OrderCreated),
            _ => None,
        }
    }
}

/// Append-only analytics fact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub business_id: Option<Uuid>,
    pub category: Option<String>,
    pub search_term: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            business_id: None,
            category: None,
            search_term: None,
            created_at: Utc::now(),
        }
    }

    pub fn business_view(business_id: Uuid, category: Option<String>) -> Self {
        Self {
            business_id: Some(business_id),
            category,
            ..Self::new(EventKind::BusinessView)
        }
    }

    /// One per search query, not per match
    pub fn search(term: impl Into<String>, category: Option<String>) -> Self {
        Self {
            search_term: Some(term.into()),
            category,
            ..Self::new(EventKind::Search)
        }
    }

    pub fn order_created(business_id: Uuid, category: impl Into<String>) -> Self {
        Self {
            business_id: Some(business_id),
            category: Some(category.into()),
            ..Self::new(EventKind::OrderCreated)
        }
    }
}
