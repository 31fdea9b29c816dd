//! In-memory storage backend implementation.
//!
//! Records live in an insertion-ordered vector for the lifetime of the
//! process. Nothing is persisted across restarts.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use grubdash_types::Record;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name under which this backend is registered.
pub const NAME: &str = "memory";

/// In-memory storage implementation.
pub struct MemoryStorage<T> {
	/// The ordered record list protected by a read-write lock.
	records: Arc<RwLock<Vec<T>>>,
}

impl<T> MemoryStorage<T> {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			records: Arc::new(RwLock::new(Vec::new())),
		}
	}
}

impl<T> Default for MemoryStorage<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl<T: Record> StorageInterface<T> for MemoryStorage<T> {
	async fn list(&self) -> Result<Vec<T>, StorageError> {
		let records = self.records.read().await;
		Ok(records.clone())
	}

	async fn get(&self, id: &str) -> Result<T, StorageError> {
		let records = self.records.read().await;
		records
			.iter()
			.find(|record| record.id() == id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(id.to_string()))
	}

	async fn insert(&self, record: T) -> Result<(), StorageError> {
		let mut records = self.records.write().await;
		if records.iter().any(|existing| existing.id() == record.id()) {
			return Err(StorageError::DuplicateId(record.id().to_string()));
		}
		records.push(record);
		Ok(())
	}

	async fn replace(&self, record: T) -> Result<(), StorageError> {
		let mut records = self.records.write().await;
		let slot = records
			.iter_mut()
			.find(|existing| existing.id() == record.id())
			.ok_or_else(|| StorageError::NotFound(record.id().to_string()))?;
		*slot = record;
		Ok(())
	}

	async fn remove(&self, id: &str) -> Result<T, StorageError> {
		let mut records = self.records.write().await;
		let index = records
			.iter()
			.position(|record| record.id() == id)
			.ok_or_else(|| StorageError::NotFound(id.to_string()))?;
		Ok(records.remove(index))
	}

	async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		let records = self.records.read().await;
		Ok(records.iter().any(|record| record.id() == id))
	}
}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage<T: Record>(
	config: &toml::Value,
) -> Result<Box<dyn StorageInterface<T>>, StorageError> {
	if !config.is_table() {
		return Err(StorageError::Configuration(format!(
			"memory storage expects a table, got {}",
			config.type_str()
		)));
	}
	Ok(Box::new(MemoryStorage::new()))
}
