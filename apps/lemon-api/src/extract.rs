//! Request body extraction.
//!
//! `ApiJson<T>` behaves like `axum::Json<T>` but rejects malformed bodies
//! with the same `{ code, message }` shape every other error uses:
//!
//! ```json
//! { "code": "VALIDATION_ERROR", "message": "Failed to deserialize the JSON body ..." }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// JSON body extractor with `ApiError` rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(status = %rejection.status(), "Rejected request body");
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct CartBody {
        menuitem: String,
        quantity: i64,
    }

    fn post(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/api/cart/menu-items");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn reject(request: Request) -> ApiError {
        match ApiJson::<CartBody>::from_request(request, &()).await {
            Ok(ApiJson(body)) => panic!("unexpectedly accepted {:?}", body),
            Err(err) => err,
        }
    }

    #[tokio::test]
    async fn test_accepts_well_formed_body() {
        let request = post(Some("application/json"), r#"{"menuitem":"m1","quantity":2}"#);
        let ApiJson(body) = ApiJson::<CartBody>::from_request(request, &()).await.unwrap();
        assert_eq!(body.menuitem, "m1");
        assert_eq!(body.quantity, 2);
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let err = reject(post(Some("application/json"), r#"{"menuitem":"m1"}"#)).await;
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("quantity"), "{}", err.message);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_syntax_error_and_missing_content_type() {
        let err = reject(post(Some("application/json"), "{not json")).await;
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = reject(post(None, r#"{"menuitem":"m1","quantity":2}"#)).await;
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
