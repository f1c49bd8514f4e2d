//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by an authenticated identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Resident,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Resident => "resident",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "resident" => Some(Role::Resident),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The authenticated identity behind a request.
///
/// Credential checks happen before a request reaches the core; what arrives
/// here is already trusted. Each variant carries the identity and the coarse
/// zone the person registered with. Only [`Actor::Admin`] grants the
/// moderation capability; ownership and participation are decided by
/// comparing ids against the resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Actor {
    Resident { id: Uuid, zone: Option<String> },
    Admin { id: Uuid, zone: Option<String> },
}

impl Actor {
    pub fn new(id: Uuid, role: Role, zone: Option<String>) -> Self {
        match role {
            Role::Resident => Actor::Resident { id, zone },
            Role::Admin => Actor::Admin { id, zone },
        }
    }

    pub fn resident(id: Uuid) -> Self {
        Actor::Resident { id, zone: None }
    }

    pub fn admin(id: Uuid) -> Self {
        Actor::Admin { id, zone: None }
    }

    /// Same identity, registered in `zone`
    pub fn in_zone(self, zone: impl Into<String>) -> Self {
        let zone = Some(zone.into());
        match self {
            Actor::Resident { id, .. } => Actor::Resident { id, zone },
            Actor::Admin { id, .. } => Actor::Admin { id, zone },
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Actor::Resident { id, .. } | Actor::Admin { id, .. } => *id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Resident { .. } => Role::Resident,
            Actor::Admin { .. } => Role::Admin,
        }
    }

    pub fn zone(&self) -> Option<&str> {
        match self {
            Actor::Resident { zone, .. } | Actor::Admin { zone, .. } => zone.as_deref(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin { .. })
    }
}
