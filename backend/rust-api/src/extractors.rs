use axum::{
    extract::{FromRequest, Request},
    Json,
};
use validator::Validate;

use crate::handlers::error::ApiError;

/// JSON body extractor that also runs `validator` rules, rejecting with the
/// same JSON error shape as every other API error.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::warn!("Failed to parse JSON request body: {}", rejection);
            ApiError::bad_request(format!("Failed to parse JSON request body: {}", rejection))
        })?;

        value.validate().map_err(|errors| {
            tracing::debug!("Request validation failed: {}", errors);
            ApiError::bad_request(errors.to_string())
        })?;

        Ok(ValidatedJson(value))
    }
}
