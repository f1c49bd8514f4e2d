//! Review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A buyer's review of a completed order.
///
/// `business_id` is copied from the order when the review is written and is
/// not re-resolved afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub id: Uuid,
    pub order_id: Uuid,
    pub business_id: Uuid,
    pub reviewer_id: Uuid,
    /// 1 to 5 stars
    pub rating: i32,
    pub comment: Option<String>,
    pub photo_url: Option<String>,
    /// Admins hide abusive reviews instead of deleting them
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}
