//! Form lifecycle traits and errors.
//!
//! This module provides:
//! - **`Form`**: the lifecycle trait with assignment, validation, `update`
//!   and the hook surface
//! - **`FormRecord` / `SaveRecord`**: capabilities required of nested
//!   records
//! - **`FormError` / `SaveError`**: lifecycle error types
//!
//! # Examples
//!
//! A form aggregating one record, delegating its `name` attribute and
//! persisting it on update:
//!
//! ```
//! use formwork::{
//!     attrs, AttributeError, Errors, Form, FormRecord, FormSchema, ModelDef, SaveError,
//!     SaveRecord, SchemaBuilder,
//! };
//! use once_cell::sync::Lazy;
//! use serde_json::Value;
//!
//! #[derive(Debug, Default)]
//! struct UserRecord {
//!     id: Option<i64>,
//!     name: String,
//!     errors: Errors,
//! }
//!
//! impl FormRecord for UserRecord {
//!     fn get_attribute(&self, name: &str) -> Result<Value, AttributeError> {
//!         match name {
//!             "name" => Ok(Value::from(self.name.clone())),
//!             _ => Err(AttributeError::UnknownAttribute(name.to_string())),
//!         }
//!     }
//!
//!     fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
//!         match name {
//!             "name" => {
//!                 self.name = value.as_str().unwrap_or_default().to_string();
//!                 Ok(())
//!             }
//!             _ => Err(AttributeError::UnknownAttribute(name.to_string())),
//!         }
//!     }
//!
//!     fn valid(&mut self) -> bool {
//!         self.errors.clear();
//!         if self.name.trim().is_empty() {
//!             self.errors.add("name", "can't be blank");
//!         }
//!         self.errors.is_empty()
//!     }
//!
//!     fn errors(&self) -> &Errors {
//!         &self.errors
//!     }
//!
//!     fn persisted(&self) -> bool {
//!         self.id.is_some()
//!     }
//! }
//!
//! impl SaveRecord for UserRecord {
//!     fn save(&mut self) -> Result<(), SaveError> {
//!         self.id = Some(1);
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct ProfileForm {
//!     user: Option<UserRecord>,
//!     errors: Errors,
//! }
//!
//! fn user(form: &ProfileForm) -> Option<&UserRecord> {
//!     form.user.as_ref()
//! }
//!
//! fn user_mut(form: &mut ProfileForm) -> Option<&mut UserRecord> {
//!     form.user.as_mut()
//! }
//!
//! static SCHEMA: Lazy<FormSchema<ProfileForm>> = Lazy::new(|| {
//!     SchemaBuilder::new()
//!         .main_model(
//!             ModelDef::new("user", user, user_mut)
//!                 .attributes(&["name"])
//!                 .save(),
//!         )
//!         .build()
//! });
//!
//! impl Form for ProfileForm {
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
//! }
//!
//! # fn main() -> Result<(), formwork::FormError> {
//! let mut form = ProfileForm {
//!     user: Some(UserRecord::default()),
//!     ..Default::default()
//! };
//!
//! let updated = form.update(attrs! { "name" => "Ana" })?;
//! assert!(updated);
//! assert_eq!(form.user.as_ref().unwrap().name, "Ana");
//! assert!(form.persisted());
//! # Ok(())
//! # }
//! ```

// Core traits
pub mod traits;
#[doc(inline)]
pub use traits::{Form, FormRecord, SaveRecord};

// Error types
pub mod error;
#[doc(inline)]
pub use error::{FormError, SaveError};
