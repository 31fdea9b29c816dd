//! Common types module for the GrubDash ordering service.
//!
//! This module defines the records, request envelopes and error types shared
//! by every GrubDash crate, so that the store, the resource services and the
//! HTTP layer agree on a single representation.

/// API types for HTTP endpoints and request/response envelopes.
pub mod api;
/// Menu item records.
pub mod dish;
/// Customer order records and the order status enumeration.
pub mod order;
/// Ordered validation chains run in front of every resource handler.
pub mod validation;

pub use api::*;
pub use dish::*;
pub use order::*;
pub use validation::*;

/// A record that can be kept in a GrubDash store.
///
/// Every record carries an opaque string identifier that is unique within
/// its store and never changes after creation.
pub trait Record: Clone + Send + Sync + 'static {
	/// Returns the record identifier.
	fn id(&self) -> &str;
}
