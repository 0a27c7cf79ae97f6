//! Request extractors that reject with the standard error envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use fitback_core::error::CoreError;

use crate::error::AppError;

/// JSON body extractor.
///
/// Same as [`axum::Json`] but a malformed or mistyped body becomes a 400
/// `{ error, code }` response instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                AppError::Core(CoreError::Validation(format!(
                    "Invalid request body: {}",
                    rejection.body_text()
                )))
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        count: i64,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<AppJson<Payload>, AppError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        AppJson::<Payload>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn wrong_type_is_a_validation_error() {
        let err = extract(Some("application/json"), r#"{"count":"3"}"#).await.unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Validation(_))));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_a_bad_request() {
        let err = extract(None, r#"{"count":3}"#).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn well_formed_body_extracts() {
        assert!(extract(Some("application/json"), r#"{"count":3}"#).await.is_ok());
    }
}
