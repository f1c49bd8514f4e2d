//! Zone distance resolution
//!
//! Businesses and residents only disclose a coarse zone, never an address.
//! Distances between zones are approximate: identical zones are 0 m apart,
//! known pairs come from a symmetric table, and any other pair falls back to
//! a fixed "same general area" estimate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Estimate used when two different zones have no table entry
pub const DEFAULT_ZONE_DISTANCE_M: f64 = 350.0;

/// One symmetric entry in the zone distance table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZonePair {
    pub from: String,
    pub to: String,
    pub meters: f64,
}

/// Approximate distance lookup between named zones
#[derive(Debug, Clone)]
pub struct ZoneDistances {
    table: HashMap<(String, String), f64>,
    default_m: f64,
}

impl Default for ZoneDistances {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE_DISTANCE_M)
    }
}

impl ZoneDistances {
    pub fn new(default_m: f64) -> Self {
        Self {
            table: HashMap::new(),
            default_m,
        }
    }

    /// Build from a default estimate and a list of overrides
    pub fn from_pairs(default_m: f64, pairs: &[ZonePair]) -> Self {
        let mut distances = Self::new(default_m);
        for pair in pairs {
            distances.insert(&pair.from, &pair.to, pair.meters);
        }
        distances
    }

    pub fn with_pair(mut self, a: &str, b: &str, meters: f64) -> Self {
        self.insert(a, b, meters);
        self
    }

    pub fn insert(&mut self, a: &str, b: &str, meters: f64) {
        self.table.insert((a.to_string(), b.to_string()), meters);
    }

    /// Distance in meters, or `None` when either side has no zone.
    pub fn distance(&self, a: Option<&str>, b: Option<&str>) -> Option<f64> {
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a, b),
            _ => return None,
        };

        if a == b {
            return Some(0.0);
        }

        self.lookup(a, b)
            .or_else(|| self.lookup(b, a))
            .or(Some(self.default_m))
    }

    /// True only when the distance is known and at most `radius_m`.
    /// An unknown distance is never within range.
    pub fn within(&self, a: Option<&str>, b: Option<&str>, radius_m: f64) -> bool {
        matches!(self.distance(a, b), Some(d) if d <= radius_m)
    }

    fn lookup(&self, a: &str, b: &str) -> Option<f64> {
        self.table.get(&(a.to_string(), b.to_string())).copied()
    }
}
