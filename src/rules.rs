//! Built-in schema backends
//!
//! Builder-style rule sets for strings, numbers, and booleans. Each rule set
//! implements [`Schema`] with collect-all semantics: every failing constraint
//! produces its own [`FieldFailure`] so callers see the complete picture in
//! one pass.
//!
//! Messages name the field by its attached label when one is set, falling
//! back to the raw field path.

use crate::schema::{FieldFailure, Schema, SchemaError};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// Pragmatic email shape: one `@`, non-empty local part, dotted domain.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^@\s]+@[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?)+$")
		.expect("EMAIL_REGEX: invalid regex pattern")
});

fn outcome(failures: Vec<FieldFailure>) -> Result<(), SchemaError> {
	if failures.is_empty() {
		Ok(())
	} else {
		Err(SchemaError::Invalid(failures))
	}
}

/// Constraints for string values.
///
/// # Examples
///
/// ```
/// use reactive_forms::StringRules;
///
/// let rules = StringRules::new().required().min(3).max(20);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringRules {
	label: Option<String>,
	required: bool,
	min: Option<usize>,
	max: Option<usize>,
	email: bool,
	pattern: Option<Regex>,
	one_of: Vec<String>,
}

impl StringRules {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reject `Null` and empty strings.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Minimum length in characters.
	pub fn min(mut self, min: usize) -> Self {
		self.min = Some(min);
		self
	}

	/// Maximum length in characters.
	pub fn max(mut self, max: usize) -> Self {
		self.max = Some(max);
		self
	}

	/// Require a well-formed email address.
	pub fn email(mut self) -> Self {
		self.email = true;
		self
	}

	/// Require the value to match `pattern`.
	pub fn matches(mut self, pattern: Regex) -> Self {
		self.pattern = Some(pattern);
		self
	}

	/// Require the value to be one of the given options.
	pub fn one_of(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.one_of = values.into_iter().map(Into::into).collect();
		self
	}
}

#[async_trait]
impl Schema for StringRules {
	fn boxed_clone(&self) -> Box<dyn Schema> {
		Box::new(self.clone())
	}

	fn set_label(&mut self, label: &str) {
		self.label = Some(label.to_string());
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	async fn validate(&self, path: &str, value: &Value) -> Result<(), SchemaError> {
		let name = self.label.as_deref().unwrap_or(path);
		let mut failures = Vec::new();

		let text = match value {
			Value::Null => {
				if self.required {
					failures.push(FieldFailure::new(path, format!("{name} is a required field")));
				}
				return outcome(failures);
			}
			Value::String(s) => s.as_str(),
			_ => {
				failures.push(FieldFailure::new(path, format!("{name} must be a string")));
				return outcome(failures);
			}
		};

		if self.required && text.is_empty() {
			failures.push(FieldFailure::new(path, format!("{name} is a required field")));
			return outcome(failures);
		}

		let length = text.chars().count();
		if let Some(min) = self.min
			&& length < min
		{
			failures.push(FieldFailure::new(
				path,
				format!("{name} must be at least {min} characters"),
			));
		}
		if let Some(max) = self.max
			&& length > max
		{
			failures.push(FieldFailure::new(
				path,
				format!("{name} must be at most {max} characters"),
			));
		}
		if self.email && !EMAIL_REGEX.is_match(text) {
			failures.push(FieldFailure::new(path, format!("{name} must be a valid email")));
		}
		if let Some(pattern) = &self.pattern
			&& !pattern.is_match(text)
		{
			failures.push(FieldFailure::new(
				path,
				format!("{name} must match the following: \"{pattern}\""),
			));
		}
		if !self.one_of.is_empty() && !self.one_of.iter().any(|v| v == text) {
			failures.push(FieldFailure::new(
				path,
				format!(
					"{name} must be one of the following values: {}",
					self.one_of.join(", ")
				),
			));
		}

		outcome(failures)
	}
}

/// Constraints for numeric values.
///
/// # Examples
///
/// ```
/// use reactive_forms::NumberRules;
///
/// let rules = NumberRules::new().required().min(18.0).max(120.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NumberRules {
	label: Option<String>,
	required: bool,
	min: Option<f64>,
	max: Option<f64>,
	integer: bool,
	positive: bool,
}

impl NumberRules {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reject `Null`.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Inclusive lower bound.
	pub fn min(mut self, min: f64) -> Self {
		self.min = Some(min);
		self
	}

	/// Inclusive upper bound.
	pub fn max(mut self, max: f64) -> Self {
		self.max = Some(max);
		self
	}

	/// Require a whole number.
	pub fn integer(mut self) -> Self {
		self.integer = true;
		self
	}

	/// Require a value strictly greater than zero.
	pub fn positive(mut self) -> Self {
		self.positive = true;
		self
	}
}

#[async_trait]
impl Schema for NumberRules {
	fn boxed_clone(&self) -> Box<dyn Schema> {
		Box::new(self.clone())
	}

	fn set_label(&mut self, label: &str) {
		self.label = Some(label.to_string());
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	async fn validate(&self, path: &str, value: &Value) -> Result<(), SchemaError> {
		let name = self.label.as_deref().unwrap_or(path);
		let mut failures = Vec::new();

		let num = match value {
			Value::Null => {
				if self.required {
					failures.push(FieldFailure::new(path, format!("{name} is a required field")));
				}
				return outcome(failures);
			}
			Value::Number(n) => match n.as_f64() {
				Some(f) if f.is_finite() => f,
				_ => {
					failures.push(FieldFailure::new(
						path,
						format!("{name} must be a finite number"),
					));
					return outcome(failures);
				}
			},
			_ => {
				failures.push(FieldFailure::new(path, format!("{name} must be a number")));
				return outcome(failures);
			}
		};

		if let Some(min) = self.min
			&& num < min
		{
			failures.push(FieldFailure::new(
				path,
				format!("{name} must be greater than or equal to {min}"),
			));
		}
		if let Some(max) = self.max
			&& num > max
		{
			failures.push(FieldFailure::new(
				path,
				format!("{name} must be less than or equal to {max}"),
			));
		}
		if self.integer && num.fract() != 0.0 {
			failures.push(FieldFailure::new(path, format!("{name} must be an integer")));
		}
		if self.positive && num <= 0.0 {
			failures.push(FieldFailure::new(
				path,
				format!("{name} must be a positive number"),
			));
		}

		outcome(failures)
	}
}

/// Constraints for boolean values.
///
/// # Examples
///
/// ```
/// use reactive_forms::BoolRules;
///
/// let rules = BoolRules::new().required().is_true();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoolRules {
	label: Option<String>,
	required: bool,
	is_true: bool,
}

impl BoolRules {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reject `Null`.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Require the value to be `true`, e.g. for consent checkboxes.
	pub fn is_true(mut self) -> Self {
		self.is_true = true;
		self
	}
}

#[async_trait]
impl Schema for BoolRules {
	fn boxed_clone(&self) -> Box<dyn Schema> {
		Box::new(self.clone())
	}

	fn set_label(&mut self, label: &str) {
		self.label = Some(label.to_string());
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	async fn validate(&self, path: &str, value: &Value) -> Result<(), SchemaError> {
		let name = self.label.as_deref().unwrap_or(path);
		let mut failures = Vec::new();

		let flag = match value {
			Value::Null => {
				if self.required {
					failures.push(FieldFailure::new(path, format!("{name} is a required field")));
				}
				return outcome(failures);
			}
			Value::Bool(b) => *b,
			_ => {
				failures.push(FieldFailure::new(path, format!("{name} must be a boolean")));
				return outcome(failures);
			}
		};

		if self.is_true && !flag {
			failures.push(FieldFailure::new(path, format!("{name} must be true")));
		}

		outcome(failures)
	}
}
