//! Customer order records.
//!
//! An order references one or more dishes with a quantity each, the delivery
//! address, a contact number and the delivery status.

use crate::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Delivery status of an order.
///
/// Orders created through the API keep whatever status the client supplied,
/// so a value outside the four recognised states is preserved verbatim in
/// [`OrderStatus::Unrecognized`]. Updates only ever store recognised states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
	Pending,
	Preparing,
	OutForDelivery,
	Delivered,
	#[serde(untagged)]
	Unrecognized(Value),
}

impl OrderStatus {
	/// The recognised status names, in lifecycle order.
	pub const RECOGNIZED: [&'static str; 4] = ["pending", "preparing", "out-for-delivery", "delivered"];

	/// Interprets a raw JSON value as a status, keeping unknown values as-is.
	pub fn from_value(value: &Value) -> Self {
		match value.as_str() {
			Some("pending") => OrderStatus::Pending,
			Some("preparing") => OrderStatus::Preparing,
			Some("out-for-delivery") => OrderStatus::OutForDelivery,
			Some("delivered") => OrderStatus::Delivered,
			_ => OrderStatus::Unrecognized(value.clone()),
		}
	}

	/// Returns true for the four enumerated delivery states.
	pub fn is_recognized(&self) -> bool {
		!matches!(self, OrderStatus::Unrecognized(_))
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "pending"),
			OrderStatus::Preparing => write!(f, "preparing"),
			OrderStatus::OutForDelivery => write!(f, "out-for-delivery"),
			OrderStatus::Delivered => write!(f, "delivered"),
			OrderStatus::Unrecognized(value) => write!(f, "{}", value),
		}
	}
}

/// A line item of an order.
///
/// Only `quantity` is interpreted; every other field the client sent with
/// the line item (dish id, name, price, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDish {
	/// Number of portions, always greater than zero.
	pub quantity: u64,
	/// Remaining line item fields as sent by the client.
	#[serde(flatten)]
	pub details: Map<String, Value>,
}

impl OrderDish {
	/// Returns the referenced dish id when the line item carries one.
	pub fn dish_id(&self) -> Option<&str> {
		self.details
			.get("dishId")
			.or_else(|| self.details.get("id"))
			.and_then(Value::as_str)
	}
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Identifier assigned by the store on creation.
	pub id: String,
	/// Delivery address.
	#[serde(rename = "deliverTo")]
	pub deliver_to: String,
	/// Customer contact number.
	#[serde(rename = "mobileNumber")]
	pub mobile_number: String,
	/// Delivery status. Absent when the order was created without one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<OrderStatus>,
	/// Ordered dishes, never empty.
	pub dishes: Vec<OrderDish>,
}

impl Order {
	/// Returns true when the stored status is `pending`.
	pub fn is_pending(&self) -> bool {
		matches!(self.status, Some(OrderStatus::Pending))
	}
}

impl Record for Order {
	fn id(&self) -> &str {
		&self.id
	}
}
