//! Storage module for the GrubDash ordering service.
//!
//! This module provides the record store abstraction shared by the dish and
//! order resources. A store keeps records in insertion order and hands out
//! unique identifiers for new records. Backends implement [`StorageInterface`];
//! [`StorageService`] layers id generation and seeding on top of them.

use async_trait::async_trait;
use grubdash_types::{Record, ResourceError};
use thiserror::Error;
use uuid::Uuid;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
	/// Error that occurs when a requested record is not found.
	#[error("Not found: {0}")]
	NotFound(String),
	/// Error that occurs when a record id is already taken.
	#[error("Duplicate id: {0}")]
	DuplicateId(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl From<StorageError> for ResourceError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound(id) => ResourceError::NotFound(format!("Record not found: {}", id)),
			other => ResourceError::Internal(other.to_string()),
		}
	}
}

/// Trait defining the low-level interface for record stores.
///
/// Implementations keep records in insertion order. Every call is atomic
/// with respect to other calls on the same store.
#[async_trait]
pub trait StorageInterface<T: Record>: Send + Sync {
	/// Returns every record in insertion order.
	async fn list(&self) -> Result<Vec<T>, StorageError>;

	/// Retrieves the record with the given id.
	async fn get(&self, id: &str) -> Result<T, StorageError>;

	/// Appends a record. Fails if its id is already present.
	async fn insert(&self, record: T) -> Result<(), StorageError>;

	/// Replaces the stored record that has the same id, keeping its position.
	async fn replace(&self, record: T) -> Result<(), StorageError>;

	/// Removes and returns the record with the given id.
	async fn remove(&self, id: &str) -> Result<T, StorageError>;

	/// Checks if a record with the given id exists.
	async fn exists(&self, id: &str) -> Result<bool, StorageError>;
}

/// Type alias for storage factory functions.
pub type StorageFactory<T> = fn(&toml::Value) -> Result<Box<dyn StorageInterface<T>>, StorageError>;

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations<T: Record>() -> Vec<(&'static str, StorageFactory<T>)> {
	use implementations::memory;

	vec![(memory::NAME, memory::create_storage::<T> as StorageFactory<T>)]
}

/// Generates a fresh opaque record id.
pub fn next_id() -> String {
	Uuid::new_v4().simple().to_string()
}

/// High-level record store used by the resource services.
///
/// The StorageService wraps a backend and assigns ids that are unique within
/// the store for the lifetime of the process.
pub struct StorageService<T: Record> {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface<T>>,
}

impl<T: Record> StorageService<T> {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface<T>>) -> Self {
		Self { backend }
	}

	/// Returns every record in insertion order.
	pub async fn list(&self) -> Result<Vec<T>, StorageError> {
		self.backend.list().await
	}

	/// Looks up a record, returning `None` when the id is unknown.
	pub async fn find(&self, id: &str) -> Result<Option<T>, StorageError> {
		match self.backend.get(id).await {
			Ok(record) => Ok(Some(record)),
			Err(StorageError::NotFound(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Creates a record with a newly generated id and appends it.
	///
	/// `build` receives the id and returns the record to store.
	pub async fn create<F>(&self, build: F) -> Result<T, StorageError>
	where
		F: FnOnce(String) -> T,
	{
		let mut id = next_id();
		while self.exists(&id).await? {
			id = next_id();
		}

		let record = build(id);
		self.backend.insert(record.clone()).await?;
		tracing::debug!(id = %record.id(), "Stored new record");
		Ok(record)
	}

	/// Stores records that already carry their ids, e.g. seed data.
	pub async fn seed(&self, records: Vec<T>) -> Result<usize, StorageError> {
		let count = records.len();
		for record in records {
			self.backend.insert(record).await?;
		}
		Ok(count)
	}

	/// Replaces an existing record in place.
	pub async fn update(&self, record: T) -> Result<T, StorageError> {
		self.backend.replace(record.clone()).await?;
		Ok(record)
	}

	/// Removes a record from the store.
	pub async fn remove(&self, id: &str) -> Result<T, StorageError> {
		self.backend.remove(id).await
	}

	/// Checks if a record exists.
	pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(id).await
	}
}
