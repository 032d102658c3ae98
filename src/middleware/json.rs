use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::domain::Validate;
use crate::error::ApiError;

/// JSON body extractor that rejects malformed bodies and failed
/// [`Validate`] checks with a 400 in the API error envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header, http::StatusCode};
    use serde::Deserialize;

    use crate::domain::Validator;

    #[derive(Debug, Deserialize)]
    struct Payload {
        nome: String,
    }

    impl Validate for Payload {
        fn validate(&self) -> Result<(), ApiError> {
            Validator::new().required_text("nome", &self.nome, 10).finish()
        }
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_payload() {
        let ValidatedJson(p) = ValidatedJson::<Payload>::from_request(request(r#"{"nome":"Ana"}"#), &())
            .await
            .unwrap();
        assert_eq!(p.nome, "Ana");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let err = ValidatedJson::<Payload>::from_request(request("{nome"), &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_JSON");
    }

    #[tokio::test]
    async fn failed_validation_is_bad_request() {
        let err = ValidatedJson::<Payload>::from_request(request(r#"{"nome":""}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
