//! # Formwork
//!
//! Form objects for persistence-backed model layers.
//!
//! A form object aggregates one or more records behind a flat, validation
//! friendly attribute surface. It owns the input handling of one use case:
//! it assigns incoming attributes and validates them together with the
//! validations of nested records, then persists everything inside a single
//! transaction scope while running lifecycle hooks.
//!
//! This crate provides:
//! - [`FormSchema`] / [`SchemaBuilder`]: an immutable attribute registry
//!   built once per form type
//! - [`Form`]: the lifecycle trait with `assign`, `valid`, `update` and the
//!   hook surface
//! - [`FormRecord`] / [`SaveRecord`]: capabilities required of nested
//!   records
//! - [`Attributes`] / [`Errors`]: ordered attribute and error collections
//! - [`validate`]: small rule helpers for `validate` hooks
//!
//! # Examples
//!
//! A form with two local attributes and a validation rule:
//!
//! ```
//! use formwork::{attrs, Errors, Form, FormSchema, SchemaBuilder};
//! use once_cell::sync::Lazy;
//! use serde_json::Value;
//!
//! #[derive(Debug, Default)]
//! struct SignupForm {
//!     name: String,
//!     email: String,
//!     errors: Errors,
//! }
//!
//! static SCHEMA: Lazy<FormSchema<SignupForm>> = Lazy::new(|| {
//!     SchemaBuilder::new()
//!         .attribute(
//!             "name",
//!             |form: &SignupForm| Value::from(form.name.clone()),
//!             |form, value| form.name = value.as_str().unwrap_or_default().to_string(),
//!         )
//!         .attribute(
//!             "email",
//!             |form| Value::from(form.email.clone()),
//!             |form, value| form.email = value.as_str().unwrap_or_default().to_string(),
//!         )
//!         .build()
//! });
//!
//! impl Form for SignupForm {
//!     fn schema() -> &'static FormSchema<Self> {
//!         &SCHEMA
//!     }
//!
//!     fn errors(&self) -> &Errors {
//!         &self.errors
//!     }
//!
//!     fn errors_mut(&mut self) -> &mut Errors {
//!         &mut self.errors
//!     }
//!
//!     fn validate(&mut self) {
//!         if self.name.trim().is_empty() {
//!             self.errors.add("name", "can't be blank");
//!         }
//!     }
//! }
//!
//! # fn main() -> Result<(), formwork::FormError> {
//! let mut form = SignupForm::default();
//!
//! let updated = form.update(attrs! { "name" => "Ana", "email" => "ana@example.com" })?;
//! assert!(updated);
//! assert_eq!(form.name, "Ana");
//!
//! let rejected = form.update(attrs! { "name" => "" })?;
//! assert!(!rejected);
//! assert!(form.errors().contains("name"));
//! # Ok(())
//! # }
//! ```
//!
//! Nested records, delegation and saves are covered in the [`form`] and
//! [`schema`] module docs.

pub mod attributes;
pub mod errors;
pub mod form;
mod macros;
pub mod schema;
pub mod validate;

#[doc(inline)]
pub use attributes::Attributes;
#[doc(inline)]
pub use errors::Errors;
#[doc(inline)]
pub use form::{Form, FormError, FormRecord, SaveError, SaveRecord};
#[doc(inline)]
pub use schema::{AttributeError, DelegateDef, FormSchema, ModelDef, SchemaBuilder};
