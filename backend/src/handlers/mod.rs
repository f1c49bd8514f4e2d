//! HTTP handlers

pub mod analytics;
pub mod business;
pub mod health;
pub mod order;
pub mod promo;
pub mod review;

pub use analytics::*;
pub use business::*;
pub use health::*;
pub use order::*;
pub use promo::*;
pub use review::*;
