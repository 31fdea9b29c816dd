//! HTTP server for the GrubDash API.
//!
//! Routes requests to the dish and order handlers. Unknown paths answer 404
//! and unsupported methods on known paths answer 405, both with the standard
//! JSON error body.

use crate::apis;
use axum::{
	extract::DefaultBodyLimit,
	http::{HeaderValue, Method, Uri},
	routing::get,
	Router,
};
use grubdash_config::ApiConfig;
use grubdash_core::GrubDash;
use grubdash_types::APIError;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Dish and order services.
	pub grubdash: GrubDash,
}

/// Builds the CORS layer: permissive unless origins are configured.
fn cors_layer(api_config: &ApiConfig) -> Result<CorsLayer, Box<dyn std::error::Error>> {
	let Some(cors) = &api_config.cors else {
		return Ok(CorsLayer::permissive());
	};

	let origins = cors
		.allowed_origins
		.iter()
		.map(|origin| HeaderValue::from_str(origin))
		.collect::<Result<Vec<_>, _>>()?;

	Ok(CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods(Any)
		.allow_headers(Any))
}

/// Builds the application router.
pub fn router(
	state: AppState,
	api_config: &ApiConfig,
) -> Result<Router, Box<dyn std::error::Error>> {
	let app = Router::new()
		.route(
			"/dishes",
			get(apis::dishes::list)
				.post(apis::dishes::create)
				.fallback(method_not_allowed),
		)
		.route(
			"/dishes/{dishId}",
			get(apis::dishes::read)
				.put(apis::dishes::update)
				.fallback(method_not_allowed),
		)
		.route(
			"/orders",
			get(apis::orders::list)
				.post(apis::orders::create)
				.fallback(method_not_allowed),
		)
		.route(
			"/orders/{orderId}",
			get(apis::orders::read)
				.put(apis::orders::update)
				.delete(apis::orders::delete)
				.fallback(method_not_allowed),
		)
		.fallback(not_found)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors_layer(api_config)?)
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(state);

	Ok(app)
}

/// Starts the HTTP server and serves until the process is stopped.
pub async fn start_server(
	api_config: ApiConfig,
	grubdash: GrubDash,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { grubdash }, &api_config)?;

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("GrubDash API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

async fn method_not_allowed(method: Method, uri: Uri) -> APIError {
	tracing::warn!("Rejected {} {}", method, uri.path());
	APIError::MethodNotAllowed {
		message: format!("{} not allowed for {}", method, uri.path()),
	}
}

async fn not_found(uri: Uri) -> APIError {
	APIError::NotFound {
		message: format!("Path not found: {}", uri.path()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::{to_bytes, Body},
		http::{Request, StatusCode},
	};
	use serde_json::{json, Value};
	use tower::ServiceExt;

	fn app(grubdash: &GrubDash, api_config: &ApiConfig) -> Router {
		router(
			AppState {
				grubdash: grubdash.clone(),
			},
			api_config,
		)
		.unwrap()
	}

	async fn send(
		grubdash: &GrubDash,
		method: &str,
		uri: &str,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		send_with(grubdash, &ApiConfig::default(), method, uri, body).await
	}

	async fn send_with(
		grubdash: &GrubDash,
		api_config: &ApiConfig,
		method: &str,
		uri: &str,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let request = Request::builder()
			.method(method)
			.uri(uri)
			.header("content-type", "application/json")
			.body(match body {
				Some(value) => Body::from(value.to_string()),
				None => Body::empty(),
			})
			.unwrap();

		let response = app(grubdash, api_config).oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let value = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, value)
	}

	fn taco() -> Value {
		json!({"data": {"name": "Taco", "description": "Spicy", "price": 3, "image_url": "x"}})
	}

	fn order(status: &str) -> Value {
		json!({"data": {
			"deliverTo": "123 Main",
			"mobileNumber": "555-1234",
			"dishes": [{"dishId": "1", "quantity": 2}],
			"status": status
		}})
	}

	#[tokio::test]
	async fn test_create_dish_returns_201() {
		let grubdash = GrubDash::in_memory();
		let (status, body) = send(&grubdash, "POST", "/dishes", Some(taco())).await;

		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(body["data"]["price"], json!(3));
		assert!(body["data"]["id"].is_string());

		let (status, body) = send(&grubdash, "GET", "/dishes", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["data"].as_array().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_create_dish_invalid_price() {
		let grubdash = GrubDash::in_memory();
		let mut body = taco();
		body["data"]["price"] = json!(-3);

		let (status, error) = send(&grubdash, "POST", "/dishes", Some(body)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(error["status"], json!(400));
		assert_eq!(
			error["message"],
			json!("Dish must have a price that is an integer greater than 0")
		);

		let (_, list) = send(&grubdash, "GET", "/dishes", None).await;
		assert_eq!(list["data"], json!([]));
	}

	#[tokio::test]
	async fn test_malformed_body_reports_missing_field() {
		let grubdash = GrubDash::in_memory();
		let request = Request::builder()
			.method("POST")
			.uri("/dishes")
			.body(Body::from("not json"))
			.unwrap();
		let response = app(&grubdash, &ApiConfig::default()).oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let error: Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(error["message"], json!("Must include a name"));
	}

	#[tokio::test]
	async fn test_read_unknown_dish_returns_404_without_data() {
		let grubdash = GrubDash::in_memory();
		let (status, body) = send(&grubdash, "GET", "/dishes/unknown", None).await;

		assert_eq!(status, StatusCode::NOT_FOUND);
		assert!(body.get("data").is_none());
		assert_eq!(body["error"], json!("NOT_FOUND"));
		assert_eq!(body["message"], json!("Dish id not found: unknown"));
	}

	#[tokio::test]
	async fn test_update_dish_id_mismatch() {
		let grubdash = GrubDash::in_memory();
		let (_, created) = send(&grubdash, "POST", "/dishes", Some(taco())).await;
		let id = created["data"]["id"].as_str().unwrap().to_string();

		let mut body = taco();
		body["data"]["id"] = json!("different");
		body["data"]["name"] = json!("Changed");
		let (status, error) = send(&grubdash, "PUT", &format!("/dishes/{}", id), Some(body)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(
			error["message"],
			json!(format!(
				"Dish id does not match route id. Dish: different, Route: {}",
				id
			))
		);

		let (_, stored) = send(&grubdash, "GET", &format!("/dishes/{}", id), None).await;
		assert_eq!(stored["data"]["name"], json!("Taco"));
	}

	#[tokio::test]
	async fn test_update_dish_returns_200() {
		let grubdash = GrubDash::in_memory();
		let (_, created) = send(&grubdash, "POST", "/dishes", Some(taco())).await;
		let id = created["data"]["id"].as_str().unwrap().to_string();

		let mut body = taco();
		body["data"]["price"] = json!(12);
		let (status, updated) = send(&grubdash, "PUT", &format!("/dishes/{}", id), Some(body)).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(updated["data"]["price"], json!(12));
		assert_eq!(updated["data"]["id"], json!(id));
	}

	#[tokio::test]
	async fn test_order_lifecycle() {
		let grubdash = GrubDash::in_memory();
		let (status, created) = send(&grubdash, "POST", "/orders", Some(order("pending"))).await;
		assert_eq!(status, StatusCode::CREATED);
		let id = created["data"]["id"].as_str().unwrap().to_string();
		let path = format!("/orders/{}", id);

		let (status, error) = send(&grubdash, "PUT", &path, Some(order("delivered"))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(error["message"], json!("A delivered order cannot be changed"));

		let (status, updated) = send(&grubdash, "PUT", &path, Some(order("preparing"))).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(updated["data"]["status"], json!("preparing"));

		let (status, _) = send(&grubdash, "DELETE", &path, None).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		let (_, list) = send(&grubdash, "GET", "/orders", None).await;
		assert_eq!(list["data"][0]["id"], json!(id));

		send(&grubdash, "PUT", &path, Some(order("pending"))).await;
		let (status, body) = send(&grubdash, "DELETE", &path, None).await;
		assert_eq!(status, StatusCode::NO_CONTENT);
		assert_eq!(body, Value::Null);

		let (status, _) = send(&grubdash, "GET", &path, None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn test_create_order_without_dishes() {
		let grubdash = GrubDash::in_memory();
		let mut body = order("pending");
		body["data"]["dishes"] = json!([]);

		let (status, error) = send(&grubdash, "POST", "/orders", Some(body)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(error["message"], json!("Order must include at least one dish"));
	}

	#[tokio::test]
	async fn test_create_order_bad_quantity_names_index() {
		let grubdash = GrubDash::in_memory();
		let mut body = order("pending");
		body["data"]["dishes"] = json!([{"dishId": "1", "quantity": 1}, {"dishId": "2", "quantity": "2"}]);

		let (status, error) = send(&grubdash, "POST", "/orders", Some(body)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(
			error["message"],
			json!("Dish 1 must have a quantity that is an integer greater than 0")
		);
	}

	#[tokio::test]
	async fn test_delete_unknown_order_returns_404() {
		let grubdash = GrubDash::in_memory();
		let (status, error) = send(&grubdash, "DELETE", "/orders/missing", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(error["message"], json!("Order id not found: missing"));
	}

	#[tokio::test]
	async fn test_unsupported_method_returns_405() {
		let grubdash = GrubDash::in_memory();
		let (status, error) = send(&grubdash, "DELETE", "/dishes/abc", None).await;
		assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
		assert_eq!(error["message"], json!("DELETE not allowed for /dishes/abc"));

		let (status, _) = send(&grubdash, "PUT", "/orders", None).await;
		assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
	}

	#[tokio::test]
	async fn test_unknown_path_returns_404() {
		let grubdash = GrubDash::in_memory();
		let (status, error) = send(&grubdash, "GET", "/menu", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(error["message"], json!("Path not found: /menu"));
	}

	#[tokio::test]
	async fn test_oversized_body_returns_json_413() {
		let grubdash = GrubDash::in_memory();
		let api_config = ApiConfig {
			max_request_size: 64,
			..ApiConfig::default()
		};
		let mut body = taco();
		body["data"]["name"] = json!("n".repeat(200));

		let (status, error) =
			send_with(&grubdash, &api_config, "POST", "/dishes", Some(body)).await;
		assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
		assert_eq!(error["status"], json!(413));
		assert_eq!(error["error"], json!("PAYLOAD_TOO_LARGE"));
		assert!(error["message"].is_string());

		let (status, error) = send_with(
			&grubdash,
			&api_config,
			"PUT",
			"/orders/1",
			Some(order("pending")),
		)
		.await;
		assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
		assert_eq!(error["error"], json!("PAYLOAD_TOO_LARGE"));

		let (_, body) = send(&grubdash, "GET", "/dishes", None).await;
		assert!(body["data"].as_array().unwrap().is_empty());
	}

	#[test]
	fn test_cors_layer_rejects_invalid_origin() {
		let api_config = ApiConfig {
			cors: Some(grubdash_config::CorsConfig {
				allowed_origins: vec!["bad\norigin".to_string()],
			}),
			..ApiConfig::default()
		};
		assert!(cors_layer(&api_config).is_err());
	}
}
