//! Business, catalog item and photo models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who verified a business, and when.
///
/// Held as one value so the flag, the verifier and the timestamp can never
/// disagree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verification {
    pub verified_by: Uuid,
    pub verified_at: DateTime<Utc>,
}

/// A home-based business registered by a resident
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Free-form tag such as "Food", "Repairs" or "Crafts"
    pub category: String,
    pub operating_hours: Option<String>,
    /// Coarse zone (purok, block); never a street address
    pub location_zone: Option<String>,
    pub description: Option<String>,
    pub verification: Option<Verification>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    pub fn is_verified(&self) -> bool {
        self.verification.is_some()
    }

    /// Mark verified by `admin_id`. Re-verifying overwrites the previous verifier.
    pub fn verify(&mut self, admin_id: Uuid, at: DateTime<Utc>) {
        self.verification = Some(Verification {
            verified_by: admin_id,
            verified_at: at,
        });
        self.updated_at = at;
    }

    /// Case-insensitive substring match over name and description.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// A product or service offered by a business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessItem {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// A photo attached to a business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessPhoto {
    pub id: Uuid,
    pub business_id: Uuid,
    pub image_url: String,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Business with its catalog and photos attached
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BusinessListing {
    #[serde(flatten)]
    pub business: Business,
    pub is_verified: bool,
    pub items: Vec<BusinessItem>,
    pub photos: Vec<BusinessPhoto>,
}

impl BusinessListing {
    pub fn new(business: Business, items: Vec<BusinessItem>, photos: Vec<BusinessPhoto>) -> Self {
        Self {
            is_verified: business.is_verified(),
            business,
            items,
            photos,
        }
    }

    pub fn primary_photo(&self) -> Option<&BusinessPhoto> {
        self.photos.iter().find(|p| p.is_primary)
    }
}
