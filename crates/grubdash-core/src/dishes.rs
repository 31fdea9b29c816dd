//! Dish resource.
//!
//! Dishes can be listed, read, created and updated. They are never deleted.
//! Each operation runs its validation chain before touching the store:
//!
//! - create: name, description, price, image_url present; price valid
//! - update: dish exists; the same presence checks; price valid; payload id
//!   matches the route id

use grubdash_storage::StorageService;
use grubdash_types::{
	as_positive_integer, display_id, is_present, require_field, require_text, text_field, Dish,
	Payload, ResourceError, Rule, ValidationChain,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const PRICE_MESSAGE: &str = "Dish must have a price that is an integer greater than 0";

/// A dish request as seen by the validation chain.
#[derive(Debug, Clone, Default)]
pub struct DishRequest {
	/// The `{dishId}` route parameter, when the route has one.
	pub route_id: Option<String>,
	/// The `data` object of the request body.
	pub data: Map<String, Value>,
	/// The stored dish matching `route_id`, if any.
	pub existing: Option<Dish>,
}

impl Payload for DishRequest {
	fn data(&self) -> &Map<String, Value> {
		&self.data
	}
}

fn dish_exists() -> Rule<DishRequest> {
	Rule::new("dishExists", |req: &DishRequest| {
		if req.existing.is_some() {
			Ok(())
		} else {
			Err(ResourceError::NotFound(format!(
				"Dish id not found: {}",
				req.route_id.as_deref().unwrap_or_default()
			)))
		}
	})
}

fn price_is_valid() -> Rule<DishRequest> {
	Rule::new("pricePropertyIsValid", |req: &DishRequest| {
		match req.data.get("price").and_then(as_positive_integer) {
			Some(_) => Ok(()),
			None => Err(ResourceError::Validation(PRICE_MESSAGE.to_string())),
		}
	})
}

fn id_matches_route() -> Rule<DishRequest> {
	Rule::new("idPropertyIsValid", |req: &DishRequest| {
		let route_id = req.route_id.as_deref().unwrap_or_default();
		match req.data.get("id") {
			Some(id) if is_present(Some(id)) && id.as_str() != Some(route_id) => {
				Err(ResourceError::Validation(format!(
					"Dish id does not match route id. Dish: {}, Route: {}",
					display_id(id),
					route_id
				)))
			},
			_ => Ok(()),
		}
	})
}

fn with_field_checks(chain: ValidationChain<DishRequest>) -> ValidationChain<DishRequest> {
	chain
		.then(require_field("name"))
		.then(require_field("description"))
		.then(require_field("price"))
		.then(require_field("image_url"))
		.then(price_is_valid())
}

fn with_text_checks(chain: ValidationChain<DishRequest>) -> ValidationChain<DishRequest> {
	chain
		.then(require_text("Dish", "name"))
		.then(require_text("Dish", "description"))
		.then(require_text("Dish", "image_url"))
}

/// Validated dish fields taken from a payload.
struct DishFields {
	name: String,
	description: String,
	price: u64,
	image_url: String,
}

impl DishFields {
	fn from_payload(data: &Map<String, Value>) -> Result<Self, ResourceError> {
		Ok(Self {
			name: text_field(data, "name")?,
			description: text_field(data, "description")?,
			price: data
				.get("price")
				.and_then(as_positive_integer)
				.ok_or_else(|| ResourceError::Validation(PRICE_MESSAGE.to_string()))?,
			image_url: text_field(data, "image_url")?,
		})
	}
}

/// Service owning the dish store and the dish validation chains.
pub struct DishService {
	storage: StorageService<Dish>,
	read_chain: ValidationChain<DishRequest>,
	create_chain: ValidationChain<DishRequest>,
	update_chain: ValidationChain<DishRequest>,
}

impl DishService {
	pub fn new(storage: StorageService<Dish>) -> Self {
		Self {
			storage,
			read_chain: ValidationChain::new().then(dish_exists()),
			create_chain: with_text_checks(with_field_checks(ValidationChain::new())),
			update_chain: with_text_checks(
				with_field_checks(ValidationChain::new().then(dish_exists()))
					.then(id_matches_route()),
			),
		}
	}

	/// Stores dishes that already carry ids.
	pub async fn seed(&self, dishes: Vec<Dish>) -> Result<usize, ResourceError> {
		Ok(self.storage.seed(dishes).await?)
	}

	/// Returns every dish in insertion order.
	pub async fn list(&self) -> Result<Vec<Dish>, ResourceError> {
		Ok(self.storage.list().await?)
	}

	/// Returns the dish with the given id.
	pub async fn read(&self, dish_id: &str) -> Result<Dish, ResourceError> {
		let request = self.lookup(dish_id, Map::new()).await?;
		self.run(&self.read_chain, &request)?;
		request
			.existing
			.ok_or_else(|| ResourceError::NotFound(format!("Dish id not found: {}", dish_id)))
	}

	/// Validates a payload and appends a new dish with a generated id.
	pub async fn create(&self, data: Map<String, Value>) -> Result<Dish, ResourceError> {
		let request = DishRequest {
			data,
			..Default::default()
		};
		self.run(&self.create_chain, &request)?;

		let fields = DishFields::from_payload(&request.data)?;
		let dish = self
			.storage
			.create(|id| Dish {
				id,
				name: fields.name,
				description: fields.description,
				price: fields.price,
				image_url: fields.image_url,
			})
			.await?;

		info!(dish_id = %dish.id, name = %dish.name, "Created dish");
		Ok(dish)
	}

	/// Validates a payload and replaces the dish's fields, keeping its id.
	pub async fn update(
		&self,
		dish_id: &str,
		data: Map<String, Value>,
	) -> Result<Dish, ResourceError> {
		let request = self.lookup(dish_id, data).await?;
		self.run(&self.update_chain, &request)?;

		let fields = DishFields::from_payload(&request.data)?;
		let mut dish = request
			.existing
			.ok_or_else(|| ResourceError::NotFound(format!("Dish id not found: {}", dish_id)))?;
		dish.name = fields.name;
		dish.description = fields.description;
		dish.price = fields.price;
		dish.image_url = fields.image_url;

		let dish = self.storage.update(dish).await?;
		info!(dish_id = %dish.id, "Updated dish");
		Ok(dish)
	}

	async fn lookup(
		&self,
		dish_id: &str,
		data: Map<String, Value>,
	) -> Result<DishRequest, ResourceError> {
		debug!(dish_id, "Looking up dish");
		Ok(DishRequest {
			route_id: Some(dish_id.to_string()),
			data,
			existing: self.storage.find(dish_id).await?,
		})
	}

	fn run(
		&self,
		chain: &ValidationChain<DishRequest>,
		request: &DishRequest,
	) -> Result<(), ResourceError> {
		chain.validate(request).inspect_err(|e| {
			warn!(dish_id = ?request.route_id, "Dish request rejected: {}", e);
		})
	}
}
