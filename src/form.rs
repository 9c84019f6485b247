//! Form builder
//!
//! [`FormConfig`] collects per-field configuration (initial value, schema,
//! optional display label) and builds a [`Form`]: observable value state, an
//! observable error map, and validate/reset operations.

use crate::reactive::{ReactiveCell, ReactiveMap};
use crate::schema::{ObjectSchema, Schema, SchemaError};
use regex::{NoExpand, Regex};
use serde_json::Value;
use std::collections::HashMap;

/// Field key to error message, fully replaced on each successful
/// [`Form::validate`] run.
pub type ErrorMap = HashMap<String, String>;

/// Configuration for one field: initial value, validator schema, and an
/// optional display label substituted into error messages.
pub struct FieldConfig {
	initial: Value,
	schema: Box<dyn Schema>,
	label: Option<String>,
}

impl FieldConfig {
	/// A field with no display label; messages use the raw field key.
	///
	/// # Examples
	///
	/// ```
	/// use reactive_forms::{FieldConfig, StringRules};
	/// use serde_json::json;
	///
	/// let field = FieldConfig::new(json!(""), StringRules::new().required());
	/// assert!(field.label().is_none());
	/// ```
	pub fn new(initial: Value, schema: impl Schema + 'static) -> Self {
		Self {
			initial,
			schema: Box::new(schema),
			label: None,
		}
	}

	/// Attach a display label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn initial(&self) -> &Value {
		&self.initial
	}

	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}
}

/// Builder collecting keyed [`FieldConfig`] entries.
///
/// Keys are unique; configuring the same key twice keeps the last entry.
/// Insertion order carries no meaning.
///
/// # Examples
///
/// ```
/// use reactive_forms::{FormConfig, NumberRules, StringRules};
/// use serde_json::json;
///
/// let form = FormConfig::new()
/// 	.field("name", json!(""), StringRules::new().required())
/// 	.labeled_field("age", json!(0), NumberRules::new().min(18.0), "Age")
/// 	.build();
///
/// assert_eq!(form.field_label("age"), "Age");
/// assert_eq!(form.field_label("name"), "name");
/// ```
#[derive(Default)]
pub struct FormConfig {
	fields: HashMap<String, FieldConfig>,
}

impl FormConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a field without a display label.
	pub fn field(
		mut self,
		key: impl Into<String>,
		initial: Value,
		schema: impl Schema + 'static,
	) -> Self {
		self.fields.insert(key.into(), FieldConfig::new(initial, schema));
		self
	}

	/// Add a field with a display label used in error messages.
	pub fn labeled_field(
		mut self,
		key: impl Into<String>,
		initial: Value,
		schema: impl Schema + 'static,
		label: impl Into<String>,
	) -> Self {
		self.fields
			.insert(key.into(), FieldConfig::new(initial, schema).with_label(label));
		self
	}

	/// Add a prebuilt [`FieldConfig`] entry.
	pub fn insert(&mut self, key: impl Into<String>, field: FieldConfig) {
		self.fields.insert(key.into(), field);
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Build the form: copy initial values into fresh observable state,
	/// resolve the label map, and assemble the composite validator from
	/// labeled clones of each field schema.
	pub fn build(self) -> Form {
		let mut initial = HashMap::with_capacity(self.fields.len());
		let mut labels = HashMap::with_capacity(self.fields.len());
		let mut members: HashMap<String, Box<dyn Schema>> =
			HashMap::with_capacity(self.fields.len());

		for (key, field) in self.fields {
			let mut member = field.schema.boxed_clone();
			if let Some(label) = &field.label {
				member.set_label(label);
			}
			labels.insert(key.clone(), field.label.unwrap_or_else(|| key.clone()));
			members.insert(key.clone(), member);
			initial.insert(key, field.initial);
		}

		Form {
			values: ReactiveMap::from_values(initial.clone()),
			errors: ReactiveCell::new(ErrorMap::new()),
			schema: ObjectSchema::shape(members),
			initial,
			labels,
		}
	}
}

/// Build a [`Form`] from a [`FormConfig`]. Equivalent to
/// [`FormConfig::build`]; each call produces an independent instance.
pub fn use_form(config: FormConfig) -> Form {
	config.build()
}

/// A reactive form instance: observable values, an observable error map, and
/// validate/reset operations over an immutable composite validator.
pub struct Form {
	values: ReactiveMap,
	errors: ReactiveCell<ErrorMap>,
	schema: ObjectSchema,
	initial: HashMap<String, Value>,
	labels: HashMap<String, String>,
}

impl Form {
	/// Handle to the observable value map. Clones share state, so UI
	/// bindings can hold their own handle.
	pub fn values(&self) -> ReactiveMap {
		self.values.clone()
	}

	/// Handle to the observable error cell.
	pub fn errors(&self) -> ReactiveCell<ErrorMap> {
		self.errors.clone()
	}

	/// Current error map, cloned. Empty when the last validation passed or
	/// nothing was validated yet.
	pub fn error_map(&self) -> ErrorMap {
		self.errors.get()
	}

	/// Current value for `key`, cloned.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.values.get(key)
	}

	/// Set the value for a configured key, notifying watchers.
	///
	/// Returns `false` without mutating anything when `key` was never
	/// configured, keeping the value map closed over the configured fields.
	pub fn set(&self, key: &str, value: Value) -> bool {
		if !self.labels.contains_key(key) {
			return false;
		}
		self.values.set(key, value);
		true
	}

	/// The display label for `key`, or `key` itself when none was
	/// configured. Labels never change after construction.
	///
	/// # Examples
	///
	/// ```
	/// use reactive_forms::{FormConfig, StringRules};
	/// use serde_json::json;
	///
	/// let form = FormConfig::new()
	/// 	.labeled_field("email", json!(""), StringRules::new().email(), "Email address")
	/// 	.build();
	///
	/// assert_eq!(form.field_label("email"), "Email address");
	/// assert_eq!(form.field_label("unknown"), "unknown");
	/// ```
	pub fn field_label<'a>(&'a self, key: &'a str) -> &'a str {
		self.labels.get(key).map(String::as_str).unwrap_or(key)
	}

	/// The full key-to-label map (keys without a configured label map to
	/// themselves).
	pub fn field_labels(&self) -> &HashMap<String, String> {
		&self.labels
	}

	/// Validate the current values against the composite validator.
	///
	/// Never returns an error; the outcome is the boolean plus the error
	/// map. On success the error map is replaced with an empty one. On
	/// structured failure it is replaced wholesale with one message per
	/// failing field path, each message rewritten so whole-word,
	/// case-insensitive occurrences of the raw path become the display
	/// label; when a path fails several constraints the last message wins.
	/// Failures for paths that were never configured are dropped, so error
	/// keys stay a subset of value keys.
	///
	/// When the backend fails outside the validation contract
	/// ([`SchemaError::Engine`]), the error is logged and `false` is
	/// returned, but the error map keeps its previous (possibly stale)
	/// contents.
	///
	/// Overlapping calls on the same instance are not sequenced; the last
	/// writer wins on the error map.
	pub async fn validate(&self) -> bool {
		let snapshot = self.values.snapshot();
		tracing::debug!(fields = snapshot.len(), "validating form snapshot");
		match self.schema.validate(&snapshot).await {
			Ok(()) => {
				self.errors.set(ErrorMap::new());
				true
			}
			Err(SchemaError::Invalid(failures)) => {
				let mut next = ErrorMap::new();
				for failure in failures {
					if !self.labels.contains_key(&failure.path) {
						continue;
					}
					let label = self.field_label(&failure.path);
					let message = substitute_label(&failure.message, &failure.path, label);
					next.insert(failure.path, message);
				}
				self.errors.set(next);
				false
			}
			Err(SchemaError::Engine(message)) => {
				tracing::error!(error = %message, "schema engine failed outside the validation contract");
				false
			}
		}
	}

	/// Restore every field to a copy of its initial value and clear the
	/// error map. Synchronous.
	///
	/// Initial values are deep-copied, so in-place mutation of the live
	/// state between construction and `reset` cannot corrupt them.
	pub fn reset(&self) {
		self.values.assign(self.initial.clone());
		self.errors.set(ErrorMap::new());
	}
}

/// Replace whole-word, case-insensitive occurrences of `path` in `message`
/// with `label`. Falls back to the untouched message when the substitution
/// pattern cannot be built.
fn substitute_label(message: &str, path: &str, label: &str) -> String {
	if path == label {
		return message.to_string();
	}
	match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(path))) {
		Ok(pattern) => pattern.replace_all(message, NoExpand(label)).into_owned(),
		Err(_) => message.to_string(),
	}
}
