//! Unified error handling with Sentry integration.
//!
//! Every failure leaves the API as a JSON body of the form
//! `{"error": <reason>, "message": <text>}`, plus `fields` for missing
//! fields and `existing_customer_id` for duplicate emails. Server errors are
//! captured to Sentry before responding.
//!
//! In development the router adds [`expose_error_detail`], which appends the
//! full error chain as `detail`.

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use farmaup_core::{CustomerId, Field};

use crate::services::CustomerError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Customer operation failed.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Request body is not valid JSON for the endpoint.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// No route matches the request.
    #[error("Route not found: {0}")]
    RouteNotFound(String),
}

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_customer_id: Option<CustomerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Body with only a reason and message.
    #[must_use]
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            fields: None,
            existing_customer_id: None,
            detail: None,
        }
    }
}

/// Full error text stashed on the response for [`expose_error_detail`].
#[derive(Debug, Clone)]
struct ErrorReport {
    body: ErrorBody,
    detail: String,
}

/// Build a JSON error response that development mode can enrich.
pub(crate) fn error_response(status: StatusCode, body: ErrorBody, detail: String) -> Response {
    let report = ErrorReport {
        body: body.clone(),
        detail,
    };
    let mut response = (status, Json(body)).into_response();
    response.extensions_mut().insert(report);
    response
}

impl AppError {
    /// Machine-stable reason code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Customer(err) => err.reason(),
            Self::InvalidBody(_) => "invalid_body",
            Self::RouteNotFound(_) => "route_not_found",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Customer(err) => match err {
                CustomerError::MissingFields(_)
                | CustomerError::InvalidEmail(_)
                | CustomerError::InvalidPhone(_)
                | CustomerError::InvalidId(_) => StatusCode::BAD_REQUEST,
                CustomerError::NotFound(_) => StatusCode::NOT_FOUND,
                CustomerError::DuplicateEmail { .. } => StatusCode::CONFLICT,
                CustomerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Customer(err) => {
                let mut body = ErrorBody::new(err.reason(), customer_message(err));
                match err {
                    CustomerError::MissingFields(fields) => body.fields = Some(fields.clone()),
                    CustomerError::DuplicateEmail { existing_id } => {
                        body.existing_customer_id = Some(*existing_id);
                    }
                    _ => {}
                }
                body
            }
            Self::InvalidBody(_) => {
                ErrorBody::new(self.reason(), "Request body must be a JSON object")
            }
            Self::RouteNotFound(path) => {
                ErrorBody::new(self.reason(), format!("No route for {path}"))
            }
        }
    }
}

fn customer_message(err: &CustomerError) -> String {
    match err {
        CustomerError::MissingFields(_) => err.to_string(),
        CustomerError::InvalidEmail(_) => "Invalid email".to_string(),
        CustomerError::InvalidPhone(_) => "Invalid phone, expected 10 or 11 digits".to_string(),
        CustomerError::InvalidId(_) => "Invalid id".to_string(),
        CustomerError::NotFound(_) => "Customer not found".to_string(),
        CustomerError::DuplicateEmail { .. } => "Email already registered".to_string(),
        CustomerError::Storage(_) => "Internal server error".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let detail = error_chain(&self);
        error_response(status, self.body(), detail)
    }
}

/// Display of an error followed by each of its sources.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Middleware that adds `detail` to JSON error bodies.
///
/// Only layered onto the router in development mode.
pub async fn expose_error_detail(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let mut body = report.body;
    body.detail = Some(report.detail);

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    let rebuilt = Json(body).into_response();
    let (rebuilt_parts, rebuilt_body) = rebuilt.into_parts();
    parts.headers.extend(rebuilt_parts.headers);
    Response::from_parts(parts, rebuilt_body)
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmaup_core::{EmailError, IdError};

    use super::*;
    use crate::db::RepositoryError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(CustomerError::MissingFields(vec![Field::City]).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CustomerError::InvalidEmail(EmailError::InvalidShape).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CustomerError::InvalidId(IdError::NotPositive).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CustomerError::NotFound(CustomerId::new(3)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                CustomerError::DuplicateEmail {
                    existing_id: CustomerId::new(1)
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(
                CustomerError::Storage(RepositoryError::DataCorruption("bad".into())).into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::InvalidBody("eof".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RouteNotFound("/nope".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_body_carries_fields_and_existing_id() {
        let body = AppError::from(CustomerError::MissingFields(vec![Field::Name, Field::Phone]))
            .body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "missing_fields");
        assert_eq!(json["fields"], serde_json::json!(["name", "phone"]));
        assert!(json.get("detail").is_none());

        let body = AppError::from(CustomerError::DuplicateEmail {
            existing_id: CustomerId::new(7),
        })
        .body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["existing_customer_id"], 7);
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_storage_message_is_generic() {
        let err = AppError::from(CustomerError::Storage(RepositoryError::DataCorruption(
            "row 3 has a broken email".into(),
        )));
        let body = err.body();
        assert_eq!(body.message, "Internal server error");
        assert!(error_chain(&err).contains("row 3 has a broken email"));
    }
}
