//! Builder for constructing a [`GrubDash`] instance from configuration.
//!
//! Resolves the configured storage backend for each resource and loads the
//! seed files, if any.

use crate::seed::{self, SeedError};
use crate::{DishService, GrubDash, OrderService};
use grubdash_config::{Config, StorageConfig};
use grubdash_storage::{get_all_implementations, StorageError, StorageInterface, StorageService};
use grubdash_types::Record;
use thiserror::Error;

/// Errors that can occur while building an instance.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Seed error: {0}")]
	Seed(#[from] SeedError),
}

/// Builder for a GrubDash instance.
pub struct GrubDashBuilder {
	config: Config,
}

impl GrubDashBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Creates both stores and loads the seed data.
	pub async fn build(self) -> Result<GrubDash, BuilderError> {
		let dishes = DishService::new(StorageService::new(create_backend(&self.config.storage)?));
		let orders = OrderService::new(StorageService::new(create_backend(&self.config.storage)?));
		let engine = GrubDash::new(dishes, orders);

		if let Some(seed_config) = &self.config.seed {
			seed::load(&engine, seed_config).await?;
		}

		tracing::info!(storage = %self.config.storage.primary, "Built GrubDash services");
		Ok(engine)
	}
}

/// Instantiates the primary storage backend for one record type.
fn create_backend<T: Record>(
	storage: &StorageConfig,
) -> Result<Box<dyn StorageInterface<T>>, BuilderError> {
	let factory = get_all_implementations::<T>()
		.into_iter()
		.find(|(name, _)| *name == storage.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			BuilderError::Config(format!(
				"Unknown storage implementation '{}'",
				storage.primary
			))
		})?;

	let implementation_config = storage.implementations.get(&storage.primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary storage '{}' not found in implementations",
			storage.primary
		))
	})?;

	Ok(factory(implementation_config)?)
}
