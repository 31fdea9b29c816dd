//! Request validation chains for the GrubDash resources.
//!
//! Every resource operation runs an ordered list of rules before its handler.
//! The chain stops at the first rule that fails, so the order in which rules
//! are registered decides which error a client sees when a request violates
//! several constraints at once.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by validation rules and resource handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
	/// No record with the requested id exists.
	#[error("{0}")]
	NotFound(String),
	/// A field is missing, has the wrong type or is out of range.
	#[error("{0}")]
	Validation(String),
	/// The backing store failed.
	#[error("{0}")]
	Internal(String),
}

/// Type alias for rule functions.
///
/// A rule inspects the request context and either lets it through or
/// returns the error that ends the request.
pub type RuleFn<C> = Box<dyn Fn(&C) -> Result<(), ResourceError> + Send + Sync>;

/// A named validation rule.
pub struct Rule<C> {
	pub name: &'static str,
	check: RuleFn<C>,
}

impl<C> std::fmt::Debug for Rule<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Rule").field("name", &self.name).finish()
	}
}

impl<C> Rule<C> {
	pub fn new<F>(name: &'static str, check: F) -> Self
	where
		F: Fn(&C) -> Result<(), ResourceError> + Send + Sync + 'static,
	{
		Self {
			name,
			check: Box::new(check),
		}
	}

	pub fn check(&self, ctx: &C) -> Result<(), ResourceError> {
		(self.check)(ctx)
	}
}

/// An ordered sequence of rules executed until the first failure.
#[derive(Debug)]
pub struct ValidationChain<C> {
	rules: Vec<Rule<C>>,
}

impl<C> Default for ValidationChain<C> {
	fn default() -> Self {
		Self { rules: Vec::new() }
	}
}

impl<C> ValidationChain<C> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a rule to the end of the chain.
	pub fn then(mut self, rule: Rule<C>) -> Self {
		self.rules.push(rule);
		self
	}

	/// Runs every rule in order and returns the first failure.
	pub fn validate(&self, ctx: &C) -> Result<(), ResourceError> {
		for rule in &self.rules {
			rule.check(ctx)?;
		}
		Ok(())
	}

	/// Names of the registered rules, in execution order.
	pub fn rule_names(&self) -> Vec<&'static str> {
		self.rules.iter().map(|rule| rule.name).collect()
	}
}

/// Access to the `data` object of a request body.
pub trait Payload {
	fn data(&self) -> &Map<String, Value>;
}

/// Returns true when a JSON value counts as present.
///
/// Absent members, `null`, `false`, zero and the empty string all count as
/// missing. Arrays and objects are present even when empty.
pub fn is_present(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => false,
		Some(Value::Bool(flag)) => *flag,
		Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
		Some(Value::String(text)) => !text.is_empty(),
		Some(Value::Array(_)) | Some(Value::Object(_)) => true,
	}
}

/// Exclusive upper bound for integral floats. 2^64 is exact as an `f64`.
const FLOAT_INTEGER_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Interprets a JSON value as an integer greater than zero.
///
/// Integral floats such as `3.0` are accepted; strings, fractions and
/// non-positive numbers are not. Values that do not fit in a `u64`
/// (above 18446744073709551615) are rejected rather than clamped.
pub fn as_positive_integer(value: &Value) -> Option<u64> {
	let Value::Number(number) = value else {
		return None;
	};
	if let Some(n) = number.as_u64() {
		return (n > 0).then_some(n);
	}
	let n = number.as_f64()?;
	if n > 0.0 && n.fract() == 0.0 && n < FLOAT_INTEGER_LIMIT {
		Some(n as u64)
	} else {
		None
	}
}

/// Builds the rule that requires a payload field to be present.
pub fn require_field<C: Payload>(field: &'static str) -> Rule<C> {
	Rule::new(field, move |ctx: &C| {
		if is_present(ctx.data().get(field)) {
			Ok(())
		} else {
			Err(ResourceError::Validation(format!("Must include a {}", field)))
		}
	})
}

/// Builds the rule that requires a present payload field to be a string.
///
/// `resource` names the record kind in the message, e.g. `Dish`.
pub fn require_text<C: Payload>(resource: &'static str, field: &'static str) -> Rule<C> {
	Rule::new(field, move |ctx: &C| match ctx.data().get(field) {
		Some(Value::String(_)) | None => Ok(()),
		Some(_) => Err(ResourceError::Validation(format!(
			"{} must have a {} that is a string",
			resource, field
		))),
	})
}

/// Reads a string member that earlier rules have already checked.
pub fn text_field(data: &Map<String, Value>, field: &str) -> Result<String, ResourceError> {
	data.get(field)
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| ResourceError::Validation(format!("Must include a {}", field)))
}

/// Renders a payload id for error messages without JSON quoting.
pub fn display_id(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
