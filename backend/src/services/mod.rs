//! Business logic services for the Neighborhood Market platform

pub mod analytics;
pub mod business;
pub mod marketplace;
pub mod order;
pub mod promo;
pub mod review;

pub use analytics::AnalyticsService;
pub use business::BusinessService;
pub use marketplace::MarketplaceService;
pub use order::OrderService;
pub use promo::PromoService;
pub use review::ReviewService;
