use std::io;
use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use newsdash_core::{Envelope, EnvelopeError, EnvelopeMeta, ValidationError};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Request-level failures, rendered as an envelope with an `errors` entry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no record with news_id '{news_id}'")]
    RecordNotFound { news_id: String, dataset: String },

    #[error("response envelope rejected: {0}")]
    InvalidEnvelope(#[from] ValidationError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::RecordNotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidEnvelope(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::RecordNotFound { .. } => "record_not_found",
            Self::InvalidEnvelope(_) => "invalid_envelope",
        }
    }

    fn dataset(&self) -> &str {
        match self {
            Self::RecordNotFound { dataset, .. } => dataset,
            Self::InvalidEnvelope(_) => "",
        }
    }

    fn body(&self) -> Result<Envelope<Value>, ValidationError> {
        let meta = EnvelopeMeta::for_request(self.dataset(), 0)?;
        let error = EnvelopeError::new(self.code(), self.to_string())?;
        Envelope::with_errors(meta, Value::Null, vec![error])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.body() {
            Ok(body) => (self.status(), Json(body)).into_response(),
            Err(err) => {
                error!(error = %err, original = %self, "could not build error envelope");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn missing_record_renders_validated_error_envelope() {
        let response = ApiError::RecordNotFound {
            news_id: String::from("42"),
            dataset: String::from("gold.csv"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json(response).await;
        assert_eq!(body["meta"]["source"], "gold.csv");
        assert_eq!(body["meta"]["schema_version"], "v1.0.0");
        assert_eq!(body["errors"][0]["code"], "record_not_found");
        assert_eq!(body["errors"][0]["message"], "no record with news_id '42'");
    }

    #[tokio::test]
    async fn envelope_failure_is_internal_error() {
        let response = ApiError::from(ValidationError::InvalidRequestId).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(response).await;
        assert_eq!(body["errors"][0]["code"], "invalid_envelope");
    }
}
