// Listing discovery and stay pricing for the campsite catalog

pub mod booking;
pub mod listing;
pub mod pricing;
pub mod search;

// Re-export key types for convenience
pub use booking::{quote, BookingError, Quote, ReservationRequest};
pub use listing::{Catalog, CatalogError, Coordinates, Host, Listing, SAMPLE_CATALOG_PATH};
pub use pricing::{
    nights_between, price, price_at, price_with, PriceBreakdown, PricingConfig, PricingError,
};
pub use search::{search, PriceRange, Query, QueryError, SortKey};
