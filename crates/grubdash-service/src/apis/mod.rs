//! HTTP handlers for the GrubDash resources.

pub mod dishes;
pub mod orders;

use axum::{body::Bytes, extract::rejection::BytesRejection, http::StatusCode};
use grubdash_types::{APIError, DataEnvelope};
use serde_json::{Map, Value};

/// Extracts the `data` object of a request body.
///
/// Bodies that are not valid JSON are treated like an empty payload so the
/// validation chain reports the first missing field. A body that could not be
/// read at all, such as one over the configured size limit, is reported as a
/// JSON error instead of axum's plain text rejection.
pub(crate) fn payload(
	body: Result<Bytes, BytesRejection>,
) -> Result<Map<String, Value>, APIError> {
	let body = body.map_err(|rejection| {
		let message = rejection.body_text();
		if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
			APIError::PayloadTooLarge { message }
		} else {
			APIError::BadRequest { message }
		}
	})?;
	let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
	Ok(DataEnvelope::from_body(value).data)
}
