//! Core services for the GrubDash ordering service.
//!
//! This crate owns the two resources of the service, dishes and orders.
//! Each resource is a service holding its record store plus the ordered
//! validation chains that run in front of every operation. [`GrubDash`]
//! bundles both services and is what the HTTP layer shares between requests.

use grubdash_storage::{implementations::memory::MemoryStorage, StorageService};
use std::sync::Arc;

pub mod builder;
pub mod dishes;
pub mod orders;
pub mod seed;

pub use builder::{BuilderError, GrubDashBuilder};
pub use dishes::DishService;
pub use orders::OrderService;

/// The dish and order services of one running instance.
#[derive(Clone)]
pub struct GrubDash {
	dishes: Arc<DishService>,
	orders: Arc<OrderService>,
}

impl GrubDash {
	pub fn new(dishes: DishService, orders: OrderService) -> Self {
		Self {
			dishes: Arc::new(dishes),
			orders: Arc::new(orders),
		}
	}

	/// Creates an instance with empty in-memory stores.
	pub fn in_memory() -> Self {
		Self::new(
			DishService::new(StorageService::new(Box::new(MemoryStorage::new()))),
			OrderService::new(StorageService::new(Box::new(MemoryStorage::new()))),
		)
	}

	pub fn dishes(&self) -> &DishService {
		&self.dishes
	}

	pub fn orders(&self) -> &OrderService {
		&self.orders
	}
}
