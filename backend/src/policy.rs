//! Access decisions
//!
//! Pure predicates over an [`Actor`] and the records it wants to touch.
//! Services call these after resolving the records and before writing
//! anything, so a denial never leaves a partial mutation behind.

use shared::models::{Business, Order};
use shared::types::Actor;

/// Field edits, items and photos belong to the owner alone
pub fn can_mutate_business(actor: &Actor, business: &Business) -> bool {
    actor.id() == business.owner_id
}

/// Verification, moderation, promos and the dashboard
pub fn can_administer(actor: &Actor) -> bool {
    actor.is_admin()
}

fn is_participant(actor: &Actor, order: &Order, business: &Business) -> bool {
    actor.id() == order.buyer_id || actor.id() == business.owner_id
}

pub fn can_view_order(actor: &Actor, order: &Order, business: &Business) -> bool {
    is_participant(actor, order, business) || can_administer(actor)
}

/// Any party that can see the order may move it to another status
pub fn can_update_order_status(actor: &Actor, order: &Order, business: &Business) -> bool {
    can_view_order(actor, order, business)
}

/// Order chat is between buyer and owner; admins only read it
pub fn can_message_order(actor: &Actor, order: &Order, business: &Business) -> bool {
    is_participant(actor, order, business)
}
