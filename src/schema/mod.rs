//! Attribute registries for form types.
//!
//! A `FormSchema` is the immutable registry behind one form type: an ordered
//! table of attribute accessors plus the nested record bindings declared for
//! the type. Schemas are built once, usually inside a
//! `once_cell::sync::Lazy` static, and every lifecycle operation reads them
//! through [`Form::schema`](crate::Form::schema).
//!
//! # Architecture
//!
//! - **`FormSchema`**: ordered accessor table and record bindings, immutable
//!   after `build()`
//! - **`SchemaBuilder`**: fluent construction at type definition time,
//!   including registry inheritance for embedded parent forms
//! - **`ModelDef` / `DelegateDef`**: nested record declarations with
//!   delegated attributes, prefixes and `allow_nil`
//! - **`AttributeError`**: failures raised by registry access
//!
//! # Examples
//!
//! ```
//! use formwork::FormSchema;
//! use serde_json::Value;
//!
//! struct Draft {
//!     title: String,
//! }
//!
//! let schema: FormSchema<Draft> = FormSchema::builder()
//!     .attribute(
//!         "title",
//!         |draft: &Draft| Value::from(draft.title.clone()),
//!         |draft, value| draft.title = value.as_str().unwrap_or_default().to_string(),
//!     )
//!     .build();
//!
//! let mut draft = Draft {
//!     title: String::new(),
//! };
//! schema.write(&mut draft, "title", Value::from("Hello")).unwrap();
//!
//! assert_eq!(draft.title, "Hello");
//! assert_eq!(schema.attribute_names(), vec!["title"]);
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::attributes::Attributes;
use crate::errors::Errors;
use crate::form::error::SaveError;

// Fluent construction
pub mod builder;
#[doc(inline)]
pub use builder::{DelegateDef, ModelDef, SchemaBuilder};

// Error types
pub mod error;
#[doc(inline)]
pub use error::AttributeError;

/// Stored read accessor for one attribute
pub(crate) type GetFn<F> = Arc<dyn Fn(&F) -> Result<Value, AttributeError> + Send + Sync>;
/// Stored write accessor for one attribute
pub(crate) type SetFn<F> = Arc<dyn Fn(&mut F, Value) -> Result<(), AttributeError> + Send + Sync>;
/// Runs a nested record's validation and returns its errors
pub(crate) type ValidateFn<F> = Arc<dyn Fn(&mut F) -> Errors + Send + Sync>;
/// Persists a nested record
pub(crate) type SaveFn<F> = Arc<dyn Fn(&mut F) -> Result<(), SaveError> + Send + Sync>;
/// Reads a nested record's persistence flag, `None` when the slot is empty
pub(crate) type PersistedFn<F> = Arc<dyn Fn(&F) -> Option<bool> + Send + Sync>;
/// Reads a nested record's URL parameter, outer `None` when the slot is empty
pub(crate) type ToParamFn<F> = Arc<dyn Fn(&F) -> Option<Option<String>> + Send + Sync>;

/// One registry entry: a visible name plus its accessor pair.
///
/// Entries without a write accessor are read only: they answer reads but
/// stay out of `attribute_names()` and mass assignment.
pub(crate) struct AttributeEntry<F> {
    name: String,
    get: GetFn<F>,
    set: Option<SetFn<F>>,
}

impl<F> AttributeEntry<F> {
    pub(crate) fn new(name: String, get: GetFn<F>, set: Option<SetFn<F>>) -> Self {
        Self { name, get, set }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    pub(crate) fn read(&self, form: &F) -> Result<Value, AttributeError> {
        (self.get)(form)
    }

    pub(crate) fn write(&self, form: &mut F, value: Value) -> Result<(), AttributeError> {
        match &self.set {
            Some(set) => set(form, value),
            None => Err(AttributeError::ReadOnly(self.name.clone())),
        }
    }
}

/// One nested record binding: validation, optional save and the conversion
/// answers a main model provides.
pub(crate) struct ModelBinding<F> {
    name: String,
    validate: ValidateFn<F>,
    save: Option<SaveFn<F>>,
    persisted: PersistedFn<F>,
    to_param: ToParamFn<F>,
}

impl<F> ModelBinding<F> {
    pub(crate) fn new(
        name: String,
        validate: ValidateFn<F>,
        save: Option<SaveFn<F>>,
        persisted: PersistedFn<F>,
        to_param: ToParamFn<F>,
    ) -> Self {
        Self {
            name,
            validate,
            save,
            persisted,
            to_param,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn saves(&self) -> bool {
        self.save.is_some()
    }

    /// Run the record's validation and return its errors.
    ///
    /// Returns an empty collection when the slot is empty or the record is
    /// valid.
    pub(crate) fn run_validation(&self, form: &mut F) -> Errors {
        (self.validate)(form)
    }

    pub(crate) fn run_save(&self, form: &mut F) -> Result<(), SaveError> {
        match &self.save {
            Some(save) => save(form),
            None => Ok(()),
        }
    }

    pub(crate) fn record_persisted(&self, form: &F) -> Option<bool> {
        (self.persisted)(form)
    }

    pub(crate) fn record_to_param(&self, form: &F) -> Option<Option<String>> {
        (self.to_param)(form)
    }
}

/// Immutable attribute registry for one form type.
///
/// Holds the ordered accessor table and nested record bindings declared
/// through a [`SchemaBuilder`]. Declaration order is preserved everywhere:
/// `attribute_names()`, snapshots and nested saves all follow it.
pub struct FormSchema<F> {
    attributes: Vec<AttributeEntry<F>>,
    models: Vec<ModelBinding<F>>,
    main_model: Option<usize>,
}

impl<F> FormSchema<F> {
    pub(crate) fn from_parts(
        attributes: Vec<AttributeEntry<F>>,
        models: Vec<ModelBinding<F>>,
        main_model: Option<usize>,
    ) -> Self {
        Self {
            attributes,
            models,
            main_model,
        }
    }

    /// Start building a schema
    #[must_use]
    pub fn builder() -> SchemaBuilder<F> {
        SchemaBuilder::default()
    }

    /// Start building a schema seeded from an embedded parent form.
    ///
    /// See [`SchemaBuilder::inherit`].
    #[must_use]
    pub fn inherit<P: 'static>(
        parent: &FormSchema<P>,
        project: fn(&F) -> &P,
        project_mut: fn(&mut F) -> &mut P,
    ) -> SchemaBuilder<F>
    where
        F: 'static,
    {
        SchemaBuilder::inherit(parent, project, project_mut)
    }

    /// Writable attribute names in declaration order.
    ///
    /// Read only entries answer [`read`](Self::read) but are not listed
    /// here and never take part in mass assignment.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|entry| entry.is_writable())
            .map(|entry| entry.name())
            .collect()
    }

    /// Nested record names in declaration order
    #[must_use]
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|binding| binding.name()).collect()
    }

    /// Whether the name is registered, read only entries included
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|entry| entry.name == name)
    }

    /// Read one attribute through its accessor
    pub fn read(&self, form: &F, name: &str) -> Result<Value, AttributeError> {
        match self.attributes.iter().find(|entry| entry.name == name) {
            Some(entry) => entry.read(form),
            None => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    /// Write one attribute through its accessor.
    ///
    /// Unknown names and read only entries are errors here; mass assignment
    /// through [`apply`](Self::apply) skips them instead.
    pub fn write(&self, form: &mut F, name: &str, value: Value) -> Result<(), AttributeError> {
        match self.attributes.iter().find(|entry| entry.name == name) {
            Some(entry) => entry.write(form, value),
            None => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    /// Mass assign a map of attributes.
    ///
    /// Only registered writable names are touched. Unknown and read only
    /// names are dropped without error, delegation failures abort the whole
    /// assignment.
    pub fn apply(&self, form: &mut F, attributes: Attributes) -> Result<(), AttributeError> {
        for (name, value) in attributes {
            match self.attributes.iter().find(|entry| entry.name == name) {
                Some(entry) if entry.is_writable() => entry.write(form, value)?,
                Some(_) => {}
                None => log::trace!("ignoring unknown attribute: {}", name),
            }
        }
        Ok(())
    }

    /// Snapshot every writable attribute in declaration order
    pub fn snapshot(&self, form: &F) -> Result<Attributes, AttributeError> {
        let mut attributes = Attributes::new();
        for entry in self.attributes.iter().filter(|entry| entry.is_writable()) {
            attributes.set(entry.name.clone(), entry.read(form)?);
        }
        Ok(attributes)
    }

    pub(crate) fn entries(&self) -> &[AttributeEntry<F>] {
        &self.attributes
    }

    pub(crate) fn model_bindings(&self) -> &[ModelBinding<F>] {
        &self.models
    }

    pub(crate) fn save_bindings(&self) -> impl Iterator<Item = &ModelBinding<F>> {
        self.models.iter().filter(|binding| binding.saves())
    }

    pub(crate) fn main_binding(&self) -> Option<&ModelBinding<F>> {
        self.main_model.and_then(|index| self.models.get(index))
    }

    pub(crate) fn main_model_index(&self) -> Option<usize> {
        self.main_model
    }
}

impl<F> fmt::Debug for FormSchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSchema")
            .field("attributes", &self.attribute_names())
            .field("models", &self.model_names())
            .finish()
    }
}
