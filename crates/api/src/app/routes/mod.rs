use axum::{
    routing::{get, post},
    Router,
};

pub mod items;
pub mod system;

/// Router for the item collection.
///
/// Collection and range paths are served with and without the trailing slash.
pub fn router() -> Router {
    Router::new()
        .route("/items/", post(items::create_item).get(items::list_items))
        .route("/items", post(items::create_item).get(items::list_items))
        .route("/items/price_range/", get(items::items_in_price_range))
        .route("/items/price_range", get(items::items_in_price_range))
        .route(
            "/items/:id",
            get(items::get_item).patch(items::update_item).delete(items::delete_item),
        )
}
