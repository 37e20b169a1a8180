//! Error handler for bartr.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("storage request failed: {0}")]
    Storage(#[from] SQLxError),

    #[error("storage did not answer within {0} ms")]
    Timeout(u64),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("missing or invalid 'X-User-Id' header")]
    Unauthorized,
}

impl ServerError {
    /// Build a single-field [`ServerError::Validation`].
    pub fn invalid_field(field: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new(field).with_message(message.into()));
        Self::Validation(errors)
    }

    /// Whether the error comes from the store rather than the caller.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Timeout(_) | Self::Internal { .. })
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => response.errors(validation_errors),

            ServerError::Axum(_) => response.title("Request body could not be parsed."),

            ServerError::Conflict(_) => response
                .title("Request conflicts with existing data.")
                .status(StatusCode::CONFLICT),

            ServerError::NotFound(_) => response
                .title("Resource not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::Forbidden(_) => response
                .title("You are not allowed to access this resource.")
                .status(StatusCode::FORBIDDEN),

            ServerError::Unauthorized => response
                .title("Missing or invalid 'X-User-Id' header.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::Timeout(ms) => {
                tracing::warn!(timeout_ms = ms, "storage deadline exceeded");

                ResponseError::default().status(StatusCode::SERVICE_UNAVAILABLE)
            },

            ServerError::Storage(err) => {
                tracing::error!(error = %err, "storage request failed");

                ResponseError::default()
            },

            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");

                ResponseError::default()
            },
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
