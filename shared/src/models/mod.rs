//! Domain models for the Neighborhood Market platform

mod analytics;
mod business;
mod order;
mod promo;
mod review;

pub use analytics::*;
pub use business::*;
pub use order::*;
pub use promo::*;
pub use review::*;
