use serde::{Deserialize, Serialize};

pub const ITEM_DELETED: &str = "Item deleted successfully";

// -------------------------
// Request DTOs
// -------------------------

/// `GET /items/price_range/?min_price=&max_price=`
#[derive(Debug, Deserialize)]
pub struct PriceRangeQuery {
    pub min_price: f64,
    pub max_price: f64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}
