use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::RepositoryError;

pub const ITEM_NOT_FOUND: &str = "Item not found";

pub fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    match err {
        RepositoryError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
        }
        RepositoryError::Domain(DomainError::InvalidId(msg)) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        RepositoryError::Domain(DomainError::NotFound) => not_found(),
        RepositoryError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            format!("An error occurred: {e}"),
        ),
    }
}

pub fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", ITEM_NOT_FOUND)
}

/// Malformed or mistyped JSON body.
pub fn json_rejection(rej: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", rej.body_text())
}

/// Missing or mistyped query parameters.
pub fn query_rejection(rej: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", rej.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_infra::StoreError;

    #[test]
    fn maps_each_error_kind_to_its_status() {
        let cases = [
            (RepositoryError::from(DomainError::validation("bad")), StatusCode::UNPROCESSABLE_ENTITY),
            (RepositoryError::from(DomainError::invalid_id("bad")), StatusCode::BAD_REQUEST),
            (RepositoryError::from(DomainError::not_found()), StatusCode::NOT_FOUND),
            (
                RepositoryError::from(StoreError::Backend("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(repository_error_to_response(err).status(), status);
        }
    }

    #[tokio::test]
    async fn store_error_body_embeds_store_message() {
        let res = repository_error_to_response(RepositoryError::from(StoreError::Backend("disk full".to_string())));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"error": "store_error", "message": "An error occurred: disk full"})
        );
    }
}
