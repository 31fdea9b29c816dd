//! API types for the GrubDash HTTP API.
//!
//! Every request and response body is wrapped in a `{"data": ...}` envelope.
//! Failures are reported with a flat JSON error body carrying the HTTP status
//! and a human-readable message naming the constraint that failed.

use crate::ResourceError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The `{"data": ...}` envelope used by every request and response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
	pub data: T,
}

impl<T> DataEnvelope<T> {
	pub fn new(data: T) -> Self {
		Self { data }
	}
}

impl DataEnvelope<Map<String, Value>> {
	/// Extracts the `data` object from an arbitrary request body.
	///
	/// A body that is not an object, or whose `data` member is missing or not
	/// an object, yields an empty payload so that the first presence check
	/// reports which field is missing.
	pub fn from_body(body: Value) -> Self {
		match body {
			Value::Object(mut root) => match root.remove("data") {
				Some(Value::Object(data)) => Self { data },
				_ => Self { data: Map::new() },
			},
			_ => Self { data: Map::new() },
		}
	}
}

/// API error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// HTTP status code
	pub status: u16,
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum APIError {
	/// Malformed, missing or out-of-range field (400)
	BadRequest { message: String },
	/// Unknown resource id or path (404)
	NotFound { message: String },
	/// Known path, unsupported method (405)
	MethodNotAllowed { message: String },
	/// Request body larger than the configured limit (413)
	PayloadTooLarge { message: String },
	/// Internal server error (500)
	InternalServerError { message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::NotFound { .. } => 404,
			APIError::MethodNotAllowed { .. } => 405,
			APIError::PayloadTooLarge { .. } => 413,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Stable error code used in the `error` member of the body.
	pub fn error_code(&self) -> &'static str {
		match self {
			APIError::BadRequest { .. } => "VALIDATION_ERROR",
			APIError::NotFound { .. } => "NOT_FOUND",
			APIError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
			APIError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
			APIError::InternalServerError { .. } => "INTERNAL_ERROR",
		}
	}

	pub fn message(&self) -> &str {
		match self {
			APIError::BadRequest { message }
			| APIError::NotFound { message }
			| APIError::MethodNotAllowed { message }
			| APIError::PayloadTooLarge { message }
			| APIError::InternalServerError { message } => message,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		ErrorResponse {
			status: self.status_code(),
			error: self.error_code().to_string(),
			message: self.message().to_string(),
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message } => write!(f, "Not Found: {}", message),
			APIError::MethodNotAllowed { message } => write!(f, "Method Not Allowed: {}", message),
			APIError::PayloadTooLarge { message } => write!(f, "Payload Too Large: {}", message),
			APIError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl From<ResourceError> for APIError {
	fn from(err: ResourceError) -> Self {
		match err {
			ResourceError::NotFound(message) => APIError::NotFound { message },
			ResourceError::Validation(message) => APIError::BadRequest { message },
			ResourceError::Internal(message) => APIError::InternalServerError { message },
		}
	}
}

impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status =
			StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
