/// Request extraction helpers
///
/// Body rejections and schema violations both surface through the
/// `Validation` taxonomy entry (HTTP 400) rather than axum's default 422.
use crate::error::ApiError;
use async_trait::async_trait;
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use validator::Validate;

/// JSON extractor that converts body rejections into validation errors
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

/// Run declarative schema validation on a request body
pub fn validate(input: &impl Validate) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(serde::Deserialize, Validate)]
    struct Probe {
        #[validate(email)]
        email: String,
    }

    #[test]
    fn schema_violations_become_validation_errors() {
        let probe = Probe {
            email: "not-an-email".to_string(),
        };
        assert!(matches!(
            validate(&probe),
            Err(ApiError::Validation(_))
        ));

        let ok = Probe {
            email: "a@f.com".to_string(),
        };
        assert!(validate(&ok).is_ok());
    }
}
