//! Body and query extractors that reject with the API's JSON error shape.
//!
//! Drop-in replacements for `axum::Json` and `axum::extract::Query`: a body or query string
//! that does not deserialize becomes a 400 `{"error": ...}` instead of axum's plain-text
//! 415/422.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    response::{IntoResponse, Response},
};

use crate::common::AppError;

#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Invalid query: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Input {
        video_idea: String,
    }

    async fn echo(Json(input): Json<Input>) -> Json<String> {
        Json(input.video_idea)
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = Router::new()
            .route("/", post(echo))
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let (status, body) = send(json_request(r#"{"videoIdea":"Ten tips"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Ten tips");
    }

    #[tokio::test]
    async fn test_missing_field_is_a_json_400() {
        let (status, body) = send(json_request("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Invalid request body: "));
        assert!(message.contains("videoIdea"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_a_json_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("not json"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body: "));
    }
}
