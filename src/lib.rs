//! Reactive form state bound to pluggable schema validation
//!
//! This crate provides a small form-state helper:
//! - a per-field configuration of initial value, validator schema, and
//!   optional display label ([`FormConfig`])
//! - observable value and error containers UI bindings can watch
//!   ([`ReactiveMap`], [`ReactiveCell`])
//! - collect-all async validation that maps backend failures onto field
//!   keys, substituting display labels into messages ([`Form::validate`])
//! - reset back to the configured initial values ([`Form::reset`])
//!
//! The validation backend is pluggable through the [`Schema`] trait; the
//! [`rules`] module ships string/number/boolean rule sets implementing it.
//!
//! # Examples
//!
//! ```
//! use reactive_forms::{FormConfig, NumberRules, StringRules};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let form = FormConfig::new()
//! 	.field("name", json!(""), StringRules::new().required())
//! 	.labeled_field("age", json!(0), NumberRules::new().min(18.0), "Age")
//! 	.build();
//!
//! assert!(!form.validate().await);
//! assert_eq!(
//! 	form.error_map().get("age").map(String::as_str),
//! 	Some("Age must be greater than or equal to 18")
//! );
//!
//! form.set("name", json!("Ada"));
//! form.set("age", json!(36));
//! assert!(form.validate().await);
//! assert!(form.error_map().is_empty());
//! # });
//! ```

pub mod form;
pub mod reactive;
pub mod rules;
pub mod schema;

pub use form::{use_form, ErrorMap, FieldConfig, Form, FormConfig};
pub use reactive::{ReactiveCell, ReactiveMap, WatcherId};
pub use rules::{BoolRules, NumberRules, StringRules};
pub use schema::{FieldFailure, ObjectSchema, Schema, SchemaError};
