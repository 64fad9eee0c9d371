use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::ModelError;
use crate::record::SchemaError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feature extraction failed: {0}")]
    FeatureExtraction(String),

    #[error("Model prediction failed: {0}")]
    ModelInference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short label used for the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ConfigSource(_) | AppError::Config(_) => "config",
            AppError::Serialization(_) => "serialization",
            AppError::Io(_) => "io",
            AppError::FeatureExtraction(_) => "feature_extraction",
            AppError::ModelInference(_) => "model_inference",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::FeatureExtraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::InvalidInput(_) | AppError::FeatureExtraction(_) | AppError::ModelInference(_) => {
                tracing::warn!("Request failed: {}", self);
                self.to_string()
            }
            _ => {
                tracing::error!("Internal server error: {}", self);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        AppError::FeatureExtraction(err.to_string())
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::ModelInference(err.to_string())
    }
}

pub fn validation_error(msg: &str) -> AppError {
    AppError::InvalidInput(msg.to_string())
}
