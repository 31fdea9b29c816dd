//! Order resource.
//!
//! Orders can be listed, read, created, updated and deleted. Creation keeps
//! the caller's status as-is. Updates must name one of the four recognised
//! statuses and may not set `delivered`. Only pending orders can be deleted.

use grubdash_storage::StorageService;
use grubdash_types::{
	as_positive_integer, display_id, is_present, require_field, require_text, text_field, Order,
	OrderDish, OrderStatus, Payload, ResourceError, Rule, ValidationChain,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const EMPTY_DISHES_MESSAGE: &str = "Order must include at least one dish";
const STATUS_MESSAGE: &str =
	"Order must have a status of pending, preparing, out-for-delivery, delivered";
const DELIVERED_MESSAGE: &str = "A delivered order cannot be changed";
const NOT_PENDING_MESSAGE: &str = "An order cannot be deleted unless it is pending";

/// An order request as seen by the validation chain.
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
	/// The `{orderId}` route parameter, when the route has one.
	pub route_id: Option<String>,
	/// The `data` object of the request body.
	pub data: Map<String, Value>,
	/// The stored order matching `route_id`, if any.
	pub existing: Option<Order>,
}

impl Payload for OrderRequest {
	fn data(&self) -> &Map<String, Value> {
		&self.data
	}
}

fn order_exists() -> Rule<OrderRequest> {
	Rule::new("orderExists", |req: &OrderRequest| {
		if req.existing.is_some() {
			Ok(())
		} else {
			Err(ResourceError::NotFound(format!(
				"Order id not found: {}",
				req.route_id.as_deref().unwrap_or_default()
			)))
		}
	})
}

fn quantity_error(index: usize) -> ResourceError {
	ResourceError::Validation(format!(
		"Dish {} must have a quantity that is an integer greater than 0",
		index
	))
}

/// Parses the `dishes` member into line items.
///
/// Fails on a missing or empty array, then on the first item whose quantity
/// is not a positive integer.
fn parse_dishes(data: &Map<String, Value>) -> Result<Vec<OrderDish>, ResourceError> {
	let items = match data.get("dishes") {
		Some(Value::Array(items)) if !items.is_empty() => items,
		_ => return Err(ResourceError::Validation(EMPTY_DISHES_MESSAGE.to_string())),
	};

	items
		.iter()
		.enumerate()
		.map(|(index, item)| {
			let Value::Object(fields) = item else {
				return Err(quantity_error(index));
			};
			let quantity = fields
				.get("quantity")
				.and_then(as_positive_integer)
				.ok_or_else(|| quantity_error(index))?;
			let mut details = fields.clone();
			details.remove("quantity");
			Ok(OrderDish { quantity, details })
		})
		.collect()
}

fn dishes_are_valid() -> Rule<OrderRequest> {
	Rule::new("dishesPropertyIsValid", |req: &OrderRequest| {
		parse_dishes(&req.data).map(|_| ())
	})
}

fn id_matches_route() -> Rule<OrderRequest> {
	Rule::new("idPropertyIsValid", |req: &OrderRequest| {
		let route_id = req.route_id.as_deref().unwrap_or_default();
		match req.data.get("id") {
			Some(id) if is_present(Some(id)) && id.as_str() != Some(route_id) => {
				Err(ResourceError::Validation(format!(
					"Order id does not match route id. Order: {}, Route: {}",
					display_id(id),
					route_id
				)))
			},
			_ => Ok(()),
		}
	})
}

fn requested_status(data: &Map<String, Value>) -> Option<OrderStatus> {
	data.get("status")
		.filter(|value| !value.is_null())
		.map(OrderStatus::from_value)
}

fn status_is_valid() -> Rule<OrderRequest> {
	Rule::new("statusPropertyIsValid", |req: &OrderRequest| {
		match requested_status(&req.data) {
			Some(status) if status.is_recognized() => Ok(()),
			_ => Err(ResourceError::Validation(STATUS_MESSAGE.to_string())),
		}
	})
}

fn status_is_not_delivered() -> Rule<OrderRequest> {
	Rule::new("statusIsDelivered", |req: &OrderRequest| {
		match requested_status(&req.data) {
			Some(OrderStatus::Delivered) => {
				Err(ResourceError::Validation(DELIVERED_MESSAGE.to_string()))
			},
			_ => Ok(()),
		}
	})
}

fn stored_status_is_pending() -> Rule<OrderRequest> {
	Rule::new("statusIsPending", |req: &OrderRequest| {
		match &req.existing {
			Some(order) if order.is_pending() => Ok(()),
			_ => Err(ResourceError::Validation(NOT_PENDING_MESSAGE.to_string())),
		}
	})
}

fn with_field_checks(chain: ValidationChain<OrderRequest>) -> ValidationChain<OrderRequest> {
	chain
		.then(require_field("deliverTo"))
		.then(require_field("mobileNumber"))
		.then(require_field("dishes"))
}

fn with_text_checks(chain: ValidationChain<OrderRequest>) -> ValidationChain<OrderRequest> {
	chain
		.then(require_text("Order", "deliverTo"))
		.then(require_text("Order", "mobileNumber"))
}

/// Service owning the order store and the order validation chains.
pub struct OrderService {
	storage: StorageService<Order>,
	read_chain: ValidationChain<OrderRequest>,
	create_chain: ValidationChain<OrderRequest>,
	update_chain: ValidationChain<OrderRequest>,
	delete_chain: ValidationChain<OrderRequest>,
}

impl OrderService {
	pub fn new(storage: StorageService<Order>) -> Self {
		Self {
			storage,
			read_chain: ValidationChain::new().then(order_exists()),
			create_chain: with_text_checks(
				with_field_checks(ValidationChain::new()).then(dishes_are_valid()),
			),
			update_chain: with_text_checks(
				with_field_checks(ValidationChain::new().then(order_exists()))
					.then(id_matches_route())
					.then(dishes_are_valid())
					.then(status_is_valid())
					.then(status_is_not_delivered()),
			),
			delete_chain: ValidationChain::new()
				.then(order_exists())
				.then(stored_status_is_pending()),
		}
	}

	/// Stores orders that already carry ids.
	pub async fn seed(&self, orders: Vec<Order>) -> Result<usize, ResourceError> {
		Ok(self.storage.seed(orders).await?)
	}

	/// Returns every order in insertion order.
	pub async fn list(&self) -> Result<Vec<Order>, ResourceError> {
		Ok(self.storage.list().await?)
	}

	/// Returns the order with the given id.
	pub async fn read(&self, order_id: &str) -> Result<Order, ResourceError> {
		let request = self.lookup(order_id, Map::new()).await?;
		self.run(&self.read_chain, &request)?;
		request.existing.ok_or_else(|| not_found(order_id))
	}

	/// Validates a payload and appends a new order with a generated id.
	///
	/// The status is stored exactly as supplied and may be absent.
	pub async fn create(&self, data: Map<String, Value>) -> Result<Order, ResourceError> {
		let request = OrderRequest {
			data,
			..Default::default()
		};
		self.run(&self.create_chain, &request)?;

		let deliver_to = text_field(&request.data, "deliverTo")?;
		let mobile_number = text_field(&request.data, "mobileNumber")?;
		let dishes = parse_dishes(&request.data)?;
		let status = requested_status(&request.data);

		let order = self
			.storage
			.create(|id| Order {
				id,
				deliver_to,
				mobile_number,
				status,
				dishes,
			})
			.await?;

		let dish_ids: Vec<&str> = order.dishes.iter().filter_map(OrderDish::dish_id).collect();
		info!(
			order_id = %order.id,
			dishes = ?dish_ids,
			"Created order"
		);
		Ok(order)
	}

	/// Validates a payload and replaces the order's fields, keeping its id.
	pub async fn update(
		&self,
		order_id: &str,
		data: Map<String, Value>,
	) -> Result<Order, ResourceError> {
		let request = self.lookup(order_id, data).await?;
		self.run(&self.update_chain, &request)?;

		let mut order = request.existing.clone().ok_or_else(|| not_found(order_id))?;
		order.deliver_to = text_field(&request.data, "deliverTo")?;
		order.mobile_number = text_field(&request.data, "mobileNumber")?;
		order.status = requested_status(&request.data);
		order.dishes = parse_dishes(&request.data)?;

		let order = self.storage.update(order).await?;
		info!(
			order_id = %order.id,
			status = ?order.status,
			"Updated order"
		);
		Ok(order)
	}

	/// Removes a pending order.
	pub async fn delete(&self, order_id: &str) -> Result<(), ResourceError> {
		let request = self.lookup(order_id, Map::new()).await?;
		self.run(&self.delete_chain, &request)?;

		self.storage.remove(order_id).await?;
		info!(order_id, "Deleted order");
		Ok(())
	}

	async fn lookup(
		&self,
		order_id: &str,
		data: Map<String, Value>,
	) -> Result<OrderRequest, ResourceError> {
		debug!(order_id, "Looking up order");
		Ok(OrderRequest {
			route_id: Some(order_id.to_string()),
			data,
			existing: self.storage.find(order_id).await?,
		})
	}

	fn run(
		&self,
		chain: &ValidationChain<OrderRequest>,
		request: &OrderRequest,
	) -> Result<(), ResourceError> {
		chain.validate(request).inspect_err(|e| {
			warn!(order_id = ?request.route_id, "Order request rejected: {}", e);
		})
	}
}

fn not_found(order_id: &str) -> ResourceError {
	ResourceError::NotFound(format!("Order id not found: {}", order_id))
}

#[cfg(test)]
mod tests {
	use super::*;
	use grubdash_storage::implementations::memory::MemoryStorage;
	use serde_json::json;

	fn service() -> OrderService {
		OrderService::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	fn payload(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => Map::new(),
		}
	}

	fn main_street(status: &str) -> Map<String, Value> {
		payload(json!({
			"deliverTo": "123 Main",
			"mobileNumber": "555-1234",
			"dishes": [{"dishId": "1", "quantity": 2}],
			"status": status
		}))
	}

	fn validation(message: &str) -> ResourceError {
		ResourceError::Validation(message.to_string())
	}

	#[tokio::test]
	async fn test_create_stores_order() {
		let orders = service();
		let order = orders.create(main_street("pending")).await.unwrap();

		assert!(!order.id.is_empty());
		assert_eq!(order.deliver_to, "123 Main");
		assert_eq!(order.mobile_number, "555-1234");
		assert_eq!(order.status, Some(OrderStatus::Pending));
		assert_eq!(order.dishes.len(), 1);
		assert_eq!(order.dishes[0].quantity, 2);
		assert_eq!(order.dishes[0].dish_id(), Some("1"));
		assert_eq!(orders.list().await.unwrap(), vec![order]);
	}

	#[tokio::test]
	async fn test_create_keeps_status_verbatim() {
		let orders = service();

		let order = orders.create(main_street("teleported")).await.unwrap();
		assert_eq!(
			order.status,
			Some(OrderStatus::Unrecognized(json!("teleported")))
		);

		let mut data = main_street("pending");
		data.remove("status");
		let order = orders.create(data).await.unwrap();
		assert_eq!(order.status, None);
	}

	#[tokio::test]
	async fn test_create_requires_fields_in_order() {
		let orders = service();
		assert_eq!(
			orders.create(Map::new()).await.unwrap_err(),
			validation("Must include a deliverTo")
		);

		let mut data = main_street("pending");
		data.remove("mobileNumber");
		data.remove("dishes");
		assert_eq!(
			orders.create(data).await.unwrap_err(),
			validation("Must include a mobileNumber")
		);

		let mut data = main_street("pending");
		data.remove("dishes");
		assert_eq!(
			orders.create(data).await.unwrap_err(),
			validation("Must include a dishes")
		);
	}

	#[tokio::test]
	async fn test_create_rejects_empty_or_non_array_dishes() {
		let orders = service();
		for dishes in [json!([]), json!("tacos"), json!({"quantity": 1})] {
			let mut data = main_street("pending");
			data.insert("dishes".into(), dishes);
			assert_eq!(
				orders.create(data).await.unwrap_err(),
				validation(EMPTY_DISHES_MESSAGE)
			);
		}
		assert!(orders.list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_create_names_first_bad_quantity() {
		let orders = service();
		for bad in [json!(0), json!(-2), json!(1.5), json!("2"), json!(null)] {
			let mut data = main_street("pending");
			data.insert(
				"dishes".into(),
				json!([{"dishId": "1", "quantity": 1}, {"dishId": "2", "quantity": bad}]),
			);
			assert_eq!(
				orders.create(data).await.unwrap_err(),
				validation("Dish 1 must have a quantity that is an integer greater than 0")
			);
		}

		let mut data = main_street("pending");
		data.insert("dishes".into(), json!([{"dishId": "1"}]));
		assert_eq!(
			orders.create(data).await.unwrap_err(),
			validation("Dish 0 must have a quantity that is an integer greater than 0")
		);

		assert!(orders.list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_quantity_beyond_u64_is_rejected() {
		let orders = service();
		for literal in ["18446744073709551616.0", "100000000000000000000"] {
			let quantity: Value = serde_json::from_str(literal).unwrap();
			let mut data = main_street("pending");
			data.insert("dishes".into(), json!([{"dishId": "1", "quantity": quantity}]));
			assert_eq!(
				orders.create(data).await.unwrap_err(),
				validation("Dish 0 must have a quantity that is an integer greater than 0")
			);
		}
		assert!(orders.list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_read_unknown_order_is_not_found() {
		let orders = service();
		assert_eq!(
			orders.read("nope").await.unwrap_err(),
			ResourceError::NotFound("Order id not found: nope".into())
		);
	}

	#[tokio::test]
	async fn test_update_replaces_fields() {
		let orders = service();
		let order = orders.create(main_street("pending")).await.unwrap();

		let data = payload(json!({
			"id": order.id.clone(),
			"deliverTo": "9 Elm",
			"mobileNumber": "555-0000",
			"status": "out-for-delivery",
			"dishes": [{"dishId": "2", "name": "Taco", "quantity": 5}]
		}));

		let updated = orders.update(&order.id, data).await.unwrap();
		assert_eq!(updated.id, order.id);
		assert_eq!(updated.deliver_to, "9 Elm");
		assert_eq!(updated.status, Some(OrderStatus::OutForDelivery));
		assert_eq!(updated.dishes[0].quantity, 5);
		assert_eq!(updated.dishes[0].details["name"], json!("Taco"));
		assert_eq!(orders.read(&order.id).await.unwrap(), updated);
	}

	#[tokio::test]
	async fn test_update_to_delivered_is_rejected() {
		let orders = service();
		let order = orders.create(main_street("pending")).await.unwrap();

		let err = orders
			.update(&order.id, main_street("delivered"))
			.await
			.unwrap_err();
		assert_eq!(err, validation(DELIVERED_MESSAGE));
		assert_eq!(orders.read(&order.id).await.unwrap(), order);
	}

	#[tokio::test]
	async fn test_update_rejects_unknown_status() {
		let orders = service();
		let order = orders.create(main_street("pending")).await.unwrap();

		for status in [json!("lost"), json!(""), json!(null)] {
			let mut data = main_street("pending");
			data.insert("status".into(), status);
			assert_eq!(
				orders.update(&order.id, data).await.unwrap_err(),
				validation(STATUS_MESSAGE)
			);
			assert_eq!(orders.read(&order.id).await.unwrap(), order);
		}
	}

	#[tokio::test]
	async fn test_update_check_order() {
		let orders = service();
		assert_eq!(
			orders.update("ghost", Map::new()).await.unwrap_err(),
			not_found("ghost")
		);

		let order = orders.create(main_street("pending")).await.unwrap();

		// id mismatch is reported before invalid dishes
		let mut data = main_street("delivered");
		data.insert("id".into(), json!("other"));
		data.insert("dishes".into(), json!([]));
		assert_eq!(
			orders.update(&order.id, data).await.unwrap_err(),
			validation(&format!(
				"Order id does not match route id. Order: other, Route: {}",
				order.id
			))
		);
		assert_eq!(orders.read(&order.id).await.unwrap(), order);

		// invalid dishes are reported before an invalid status
		let mut data = main_street("lost");
		data.insert("dishes".into(), json!([{"quantity": 0}]));
		assert_eq!(
			orders.update(&order.id, data).await.unwrap_err(),
			validation("Dish 0 must have a quantity that is an integer greater than 0")
		);
		assert_eq!(orders.read(&order.id).await.unwrap(), order);
	}

	#[tokio::test]
	async fn test_update_with_bad_quantity_leaves_order_unchanged() {
		let orders = service();
		let order = orders.create(main_street("pending")).await.unwrap();

		let mut data = main_street("preparing");
		data.insert("deliverTo".into(), json!("Elsewhere"));
		data.insert(
			"dishes".into(),
			json!([{"dishId": "1", "quantity": 3}, {"dishId": "2", "quantity": 0}]),
		);
		assert_eq!(
			orders.update(&order.id, data).await.unwrap_err(),
			validation("Dish 1 must have a quantity that is an integer greater than 0")
		);
		assert_eq!(orders.read(&order.id).await.unwrap(), order);
	}

	#[tokio::test]
	async fn test_delete_pending_order() {
		let orders = service();
		let order = orders.create(main_street("pending")).await.unwrap();

		orders.delete(&order.id).await.unwrap();
		assert_eq!(orders.read(&order.id).await.unwrap_err(), not_found(&order.id));
		assert!(orders.list().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_delete_requires_pending_status() {
		let orders = service();
		let preparing = orders.create(main_street("preparing")).await.unwrap();
		let unknown = orders.create(main_street("lost")).await.unwrap();

		for order in [&preparing, &unknown] {
			assert_eq!(
				orders.delete(&order.id).await.unwrap_err(),
				validation(NOT_PENDING_MESSAGE)
			);
		}
		assert_eq!(orders.list().await.unwrap(), vec![preparing, unknown]);
	}

	#[tokio::test]
	async fn test_delete_unknown_order() {
		let orders = service();
		assert_eq!(orders.delete("ghost").await.unwrap_err(), not_found("ghost"));
	}

	#[test]
	fn test_update_chain_order() {
		let orders = service();
		assert_eq!(
			&orders.update_chain.rule_names()[..8],
			&[
				"orderExists",
				"deliverTo",
				"mobileNumber",
				"dishes",
				"idPropertyIsValid",
				"dishesPropertyIsValid",
				"statusPropertyIsValid",
				"statusIsDelivered"
			]
		);
		assert_eq!(
			orders.delete_chain.rule_names(),
			vec!["orderExists", "statusIsPending"]
		);
	}
}
