//! Validation backend abstraction
//!
//! Forms do not depend on a concrete validation engine. Any backend that can
//! clone itself, carry a display label, and report structured per-field
//! failures plugs in through the [`Schema`] trait. The built-in backends in
//! [`crate::rules`] implement it; so can adapters over external engines.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One failing sub-validation: the field path it belongs to and a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
	pub path: String,
	pub message: String,
}

impl FieldFailure {
	/// Create a failure for `path` with the given message.
	///
	/// # Examples
	///
	/// ```
	/// use reactive_forms::FieldFailure;
	///
	/// let failure = FieldFailure::new("age", "age must be a number");
	/// assert_eq!(failure.path, "age");
	/// ```
	pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			message: message.into(),
		}
	}
}

/// Error surface of a schema backend.
///
/// `Invalid` is the expected shape: a structured list of per-field failures.
/// `Engine` covers everything else a backend may throw (I/O of a remote
/// lookup, a poisoned lock, a panic turned into an error) and is handled
/// differently by [`crate::Form::validate`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
	#[error("validation failed for {} field(s)", .0.len())]
	Invalid(Vec<FieldFailure>),
	#[error("schema engine failure: {0}")]
	Engine(String),
}

impl SchemaError {
	/// Shorthand for a single-failure `Invalid` error.
	pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Invalid(vec![FieldFailure::new(path, message)])
	}
}

/// A cloneable, labelable validator for one field.
///
/// Implementations must collect every failure for the value instead of
/// stopping at the first one. When a label is attached, message generation
/// should use it in place of the raw field path.
#[async_trait]
pub trait Schema: Send + Sync {
	/// Clone into a new boxed schema.
	fn boxed_clone(&self) -> Box<dyn Schema>;

	/// Attach a display label used by message generation.
	fn set_label(&mut self, label: &str);

	/// The attached display label, if any.
	fn label(&self) -> Option<&str>;

	/// Validate `value` at field path `path`, collecting every failure.
	async fn validate(&self, path: &str, value: &Value) -> Result<(), SchemaError>;
}

impl Clone for Box<dyn Schema> {
	fn clone(&self) -> Self {
		self.boxed_clone()
	}
}

/// The composite validator: one labeled schema clone per field key.
///
/// Built once at form construction and immutable afterwards. `validate`
/// runs every member against the corresponding value (missing keys validate
/// as `Null`) and aggregates all failures rather than aborting early.
pub struct ObjectSchema {
	members: HashMap<String, Box<dyn Schema>>,
}

impl ObjectSchema {
	/// Create an empty composite.
	pub fn new() -> Self {
		Self {
			members: HashMap::new(),
		}
	}

	/// Create a composite from keyed member schemas.
	pub fn shape(members: impl IntoIterator<Item = (String, Box<dyn Schema>)>) -> Self {
		Self {
			members: members.into_iter().collect(),
		}
	}

	/// Add or replace the member schema for `key`.
	pub fn insert(&mut self, key: impl Into<String>, schema: Box<dyn Schema>) {
		self.members.insert(key.into(), schema);
	}

	/// The member schema for `key`, if present.
	pub fn member(&self, key: &str) -> Option<&dyn Schema> {
		self.members.get(key).map(|s| s.as_ref())
	}

	/// Whether `key` has a member schema.
	pub fn contains_key(&self, key: &str) -> bool {
		self.members.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	/// Validate every member against `values`, never stopping at the first
	/// failing field.
	///
	/// Structured failures are aggregated into one `SchemaError::Invalid`.
	/// An `Engine` error from any member aborts the run and is returned
	/// as-is, since its results would not be trustworthy anyway.
	pub async fn validate(&self, values: &HashMap<String, Value>) -> Result<(), SchemaError> {
		let mut failures = Vec::new();
		for (key, schema) in &self.members {
			let value = values.get(key).cloned().unwrap_or(Value::Null);
			match schema.validate(key, &value).await {
				Ok(()) => {}
				Err(SchemaError::Invalid(mut errs)) => failures.append(&mut errs),
				Err(err @ SchemaError::Engine(_)) => return Err(err),
			}
		}

		if failures.is_empty() {
			Ok(())
		} else {
			Err(SchemaError::Invalid(failures))
		}
	}
}

impl Default for ObjectSchema {
	fn default() -> Self {
		Self::new()
	}
}

impl Clone for ObjectSchema {
	fn clone(&self) -> Self {
		Self {
			members: self.members.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rules::{NumberRules, StringRules};
	use serde_json::json;

	#[tokio::test]
	async fn test_object_schema_collects_all_failures() {
		let mut schema = ObjectSchema::new();
		schema.insert("name", Box::new(StringRules::new().required()));
		schema.insert("age", Box::new(NumberRules::new().min(18.0)));

		let mut values = HashMap::new();
		values.insert("name".to_string(), json!(""));
		values.insert("age".to_string(), json!(3));

		let err = schema.validate(&values).await.unwrap_err();
		match err {
			SchemaError::Invalid(failures) => {
				assert_eq!(failures.len(), 2);
				assert!(failures.iter().any(|f| f.path == "name"));
				assert!(failures.iter().any(|f| f.path == "age"));
			}
			other => panic!("Expected Invalid, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_object_schema_missing_key_validates_as_null() {
		let mut schema = ObjectSchema::new();
		schema.insert("name", Box::new(StringRules::new().required()));

		let err = schema.validate(&HashMap::new()).await.unwrap_err();
		match err {
			SchemaError::Invalid(failures) => {
				assert_eq!(failures.len(), 1);
				assert_eq!(failures[0].path, "name");
			}
			other => panic!("Expected Invalid, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_object_schema_all_valid() {
		let mut schema = ObjectSchema::new();
		schema.insert("name", Box::new(StringRules::new().required()));

		let mut values = HashMap::new();
		values.insert("name".to_string(), json!("Ada"));

		assert!(schema.validate(&values).await.is_ok());
	}

	#[test]
	fn test_boxed_schema_clone_is_independent() {
		let original: Box<dyn Schema> = Box::new(StringRules::new().required());
		let mut copy = original.clone();
		copy.set_label("Display Name");

		assert_eq!(original.label(), None);
		assert_eq!(copy.label(), Some("Display Name"));
	}

	#[test]
	fn test_schema_error_invalid_shorthand() {
		let err = SchemaError::invalid("email", "email must be a valid email");
		match err {
			SchemaError::Invalid(failures) => {
				assert_eq!(failures.len(), 1);
				assert_eq!(failures[0].message, "email must be a valid email");
			}
			other => panic!("Expected Invalid, got {other:?}"),
		}
	}
}
