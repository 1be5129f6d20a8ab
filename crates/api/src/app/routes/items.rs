use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockroom_inventory::{ItemUpdate, NewItem};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewItem>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection(rej),
    };

    match services.items().insert(body).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.items().find_all().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.items().find_by_id(&id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ItemUpdate>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection(rej),
    };

    match services.items().update_by_id(&id, &body).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.items().delete_by_id(&id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(dto::StatusResponse {
                status: dto::ITEM_DELETED,
            }),
        )
            .into_response(),
        Ok(false) => errors::not_found(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn items_in_price_range(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::PriceRangeQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(range) = match query {
        Ok(q) => q,
        Err(rej) => return errors::query_rejection(rej),
    };

    match services
        .items()
        .find_by_price_range(range.min_price, range.max_price)
        .await
    {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
