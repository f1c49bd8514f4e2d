//! Promo highlight models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of promo highlights curated by administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoType {
    BusinessOfWeek,
    NewlyRegistered,
    Verified,
    BarangayEndorsed,
}

impl PromoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromoType::BusinessOfWeek => "business_of_week",
            PromoType::NewlyRegistered => "newly_registered",
            PromoType::Verified => "verified",
            PromoType::BarangayEndorsed => "barangay_endorsed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "business_of_week" => Some(PromoType::BusinessOfWeek),
            "newly_registered" => Some(PromoType::NewlyRegistered),
            "verified" => Some(PromoType::Verified),
            "barangay_endorsed" => Some(PromoType::BarangayEndorsed),
            _ => None,
        }
    }
}

/// A promo highlight, optionally tied to one business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Promo {
    pub id: Uuid,
    pub business_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub promo_type: PromoType,
    pub start_date: DateTime<Utc>,
    /// `None` runs indefinitely
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Promo {
    pub fn is_running_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && self.end_date.map_or(true, |end| now <= end)
    }
}
