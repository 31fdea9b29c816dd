//! Seed data loading.
//!
//! Seed files are JSON arrays of dishes or orders, stored with their ids
//! before the server accepts requests.

use grubdash_config::SeedConfig;
use grubdash_types::{Dish, Order, ResourceError};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::GrubDash;

/// Errors that can occur while loading seed data.
#[derive(Debug, Error)]
pub enum SeedError {
	#[error("Cannot read seed file {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("Invalid seed file {path}: {message}")]
	Parse { path: PathBuf, message: String },
	#[error("Seed rejected: {0}")]
	Rejected(#[from] ResourceError),
}

/// Reads a JSON array of records from disk.
pub async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SeedError> {
	let content = tokio::fs::read(path).await.map_err(|source| SeedError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	serde_json::from_slice(&content).map_err(|e| SeedError::Parse {
		path: path.to_path_buf(),
		message: e.to_string(),
	})
}

fn check_dishes(path: &Path, dishes: &[Dish]) -> Result<(), SeedError> {
	match dishes.iter().find(|dish| dish.price == 0) {
		Some(dish) => Err(SeedError::Parse {
			path: path.to_path_buf(),
			message: format!("dish {} has a price of 0", dish.id),
		}),
		None => Ok(()),
	}
}

fn check_orders(path: &Path, orders: &[Order]) -> Result<(), SeedError> {
	for order in orders {
		if order.dishes.is_empty() {
			return Err(SeedError::Parse {
				path: path.to_path_buf(),
				message: format!("order {} has no dishes", order.id),
			});
		}
		if let Some(index) = order.dishes.iter().position(|item| item.quantity == 0) {
			return Err(SeedError::Parse {
				path: path.to_path_buf(),
				message: format!("order {} dish {} has a quantity of 0", order.id, index),
			});
		}
	}
	Ok(())
}

/// Loads the configured seed files into the engine's stores.
///
/// Returns the number of dishes and orders stored.
pub async fn load(engine: &GrubDash, seed: &SeedConfig) -> Result<(usize, usize), SeedError> {
	let mut dishes = 0;
	if let Some(path) = &seed.dishes {
		let records: Vec<Dish> = read_records(path).await?;
		check_dishes(path, &records)?;
		dishes = engine.dishes().seed(records).await?;
	}

	let mut orders = 0;
	if let Some(path) = &seed.orders {
		let records: Vec<Order> = read_records(path).await?;
		check_orders(path, &records)?;
		orders = engine.orders().seed(records).await?;
	}

	tracing::info!(dishes, orders, "Loaded seed data");
	Ok((dishes, orders))
}
