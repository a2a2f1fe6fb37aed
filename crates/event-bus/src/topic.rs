//! Topic names, one per downstream domain.

pub const PRODUCTS: &str = "products";
pub const RECOMMENDATIONS: &str = "recommendations";
pub const REVIEWS: &str = "reviews";

/// Every topic the composite layer writes to.
pub const ALL: [&str; 3] = [PRODUCTS, RECOMMENDATIONS, REVIEWS];
