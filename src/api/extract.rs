//! Request body extraction
//!
//! Wallet clients send either JSON or form-encoded bodies. Any body that
//! cannot be decoded is rejected with "Body not completed".

use axum::body::Bytes;
use axum::extract::{Form, FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON or `application/x-www-form-urlencoded` body
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

fn body_not_completed() -> AppError {
    AppError::InvalidRequest("Body not completed".to_string())
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                tracing::debug!("Form body rejected: {}", e);
                body_not_completed()
            })?;
            return Ok(Payload(value));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Body could not be read: {}", e);
            body_not_completed()
        })?;

        serde_json::from_slice(&bytes).map(Payload).map_err(|e| {
            tracing::debug!("JSON body rejected: {}", e);
            body_not_completed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        reference_id: Option<String>,
        amount: Option<rust_decimal::Decimal>,
    }

    async fn extract(content_type: &str, body: &'static str) -> Result<Params, AppError> {
        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        Payload::<Params>::from_request(request, &()).await.map(|Payload(p)| p)
    }

    #[tokio::test]
    async fn test_json_body() {
        let params = extract("application/json", r#"{"reference_id":"R1","amount":"10.5"}"#)
            .await
            .unwrap();
        assert_eq!(params.reference_id.as_deref(), Some("R1"));
        assert_eq!(params.amount, Some(rust_decimal_macros::dec!(10.5)));
    }

    #[tokio::test]
    async fn test_form_body() {
        let params = extract("application/x-www-form-urlencoded", "reference_id=R1&amount=1000")
            .await
            .unwrap();
        assert_eq!(params.reference_id.as_deref(), Some("R1"));
        assert_eq!(params.amount, Some(rust_decimal_macros::dec!(1000)));
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        for body in ["", "{", r#"{"amount":"ten"}"#] {
            let result = extract("application/json", body).await;
            assert!(
                matches!(&result, Err(AppError::InvalidRequest(msg)) if msg == "Body not completed"),
                "body {:?} gave {:?}",
                body,
                result
            );
        }
    }
}
