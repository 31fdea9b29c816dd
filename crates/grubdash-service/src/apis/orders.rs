//! Handlers for `/orders` and `/orders/{orderId}`.

use crate::apis::payload;
use crate::server::AppState;
use axum::{
	body::Bytes,
	extract::{Path, State, rejection::BytesRejection},
	http::StatusCode,
	response::{IntoResponse, Json},
};
use grubdash_types::{APIError, DataEnvelope};

/// Handles GET /orders.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, APIError> {
	let orders = state.grubdash.orders().list().await?;
	Ok(Json(DataEnvelope::new(orders)))
}

/// Handles GET /orders/{orderId}.
pub async fn read(
	Path(order_id): Path<String>,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, APIError> {
	let order = state.grubdash.orders().read(&order_id).await?;
	Ok(Json(DataEnvelope::new(order)))
}

/// Handles POST /orders.
pub async fn create(
	State(state): State<AppState>,
	body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, APIError> {
	let order = state.grubdash.orders().create(payload(body)?).await?;
	Ok((StatusCode::CREATED, Json(DataEnvelope::new(order))))
}

/// Handles PUT /orders/{orderId}.
pub async fn update(
	Path(order_id): Path<String>,
	State(state): State<AppState>,
	body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, APIError> {
	let order = state
		.grubdash
		.orders()
		.update(&order_id, payload(body)?)
		.await?;
	Ok(Json(DataEnvelope::new(order)))
}

/// Handles DELETE /orders/{orderId}.
pub async fn delete(
	Path(order_id): Path<String>,
	State(state): State<AppState>,
) -> Result<StatusCode, APIError> {
	state.grubdash.orders().delete(&order_id).await?;
	Ok(StatusCode::NO_CONTENT)
}
