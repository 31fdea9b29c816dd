//! Handlers for `/dishes` and `/dishes/{dishId}`.

use crate::apis::payload;
use crate::server::AppState;
use axum::{
	body::Bytes,
	extract::{Path, State, rejection::BytesRejection},
	http::StatusCode,
	response::{IntoResponse, Json},
};
use grubdash_types::{APIError, DataEnvelope};

/// Handles GET /dishes.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, APIError> {
	let dishes = state.grubdash.dishes().list().await?;
	Ok(Json(DataEnvelope::new(dishes)))
}

/// Handles GET /dishes/{dishId}.
pub async fn read(
	Path(dish_id): Path<String>,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, APIError> {
	let dish = state.grubdash.dishes().read(&dish_id).await?;
	Ok(Json(DataEnvelope::new(dish)))
}

/// Handles POST /dishes.
pub async fn create(
	State(state): State<AppState>,
	body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, APIError> {
	let dish = state.grubdash.dishes().create(payload(body)?).await?;
	Ok((StatusCode::CREATED, Json(DataEnvelope::new(dish))))
}

/// Handles PUT /dishes/{dishId}.
pub async fn update(
	Path(dish_id): Path<String>,
	State(state): State<AppState>,
	body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, APIError> {
	let dish = state
		.grubdash
		.dishes()
		.update(&dish_id, payload(body)?)
		.await?;
	Ok(Json(DataEnvelope::new(dish)))
}
