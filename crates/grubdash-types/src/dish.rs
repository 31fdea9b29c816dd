//! Menu item records.

use crate::Record;
use serde::{Deserialize, Serialize};

/// A menu item offered by the restaurant.
///
/// `price` is kept in whole currency units and is always greater than zero
/// once the record has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
	/// Identifier assigned by the store on creation.
	pub id: String,
	/// Display name shown on the menu.
	pub name: String,
	/// Short description of the dish.
	pub description: String,
	/// Price in whole currency units, always greater than zero.
	pub price: u64,
	/// Location of the dish's picture.
	pub image_url: String,
}

impl Record for Dish {
	fn id(&self) -> &str {
		&self.id
	}
}
