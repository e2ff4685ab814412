//! Fluent schema construction.
//!
//! `SchemaBuilder` assembles the accessor table and record bindings of a
//! [`FormSchema`]. Nested records are declared through [`ModelDef`] (bound
//! records that validate and optionally save) or [`DelegateDef`] (attribute
//! delegation without a binding).

use std::sync::Arc;

use serde_json::Value;

use super::error::AttributeError;
use super::{
    AttributeEntry, FormSchema, GetFn, ModelBinding, PersistedFn, SaveFn, SetFn, ToParamFn,
    ValidateFn,
};
use crate::errors::Errors;
use crate::form::error::SaveError;
use crate::form::traits::{FormRecord, SaveRecord};

/// Builds the immutable [`FormSchema`] for one form type.
///
/// Declaration order is kept: attributes appear in `attribute_names()` and
/// snapshots in the order they were declared, and nested records save in
/// the order they were bound.
pub struct SchemaBuilder<F> {
    attributes: Vec<AttributeEntry<F>>,
    models: Vec<ModelBinding<F>>,
    main_model: Option<usize>,
}

impl<F> SchemaBuilder<F> {
    /// Start an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
            models: Vec::new(),
            main_model: None,
        }
    }

    /// Finish and return the immutable schema
    #[must_use]
    pub fn build(self) -> FormSchema<F> {
        FormSchema::from_parts(self.attributes, self.models, self.main_model)
    }
}

impl<F> Default for SchemaBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: 'static> SchemaBuilder<F> {
    /// Start a builder seeded with every entry of an embedded parent form.
    ///
    /// The parent's attributes and record bindings are re-bound through the
    /// projection functions and land ahead of any declaration made on the
    /// returned builder, so the child registry reads as parent first, own
    /// names after. The parent schema itself is never touched.
    #[must_use]
    pub fn inherit<P: 'static>(
        parent: &FormSchema<P>,
        project: fn(&F) -> &P,
        project_mut: fn(&mut F) -> &mut P,
    ) -> Self {
        let mut builder = Self::new();
        for entry in parent.entries() {
            let get = entry.get.clone();
            let get_fn: GetFn<F> = Arc::new(move |form: &F| get(project(form)));
            let set_fn = entry.set.clone().map(|set| {
                let set_fn: SetFn<F> =
                    Arc::new(move |form: &mut F, value: Value| set(project_mut(form), value));
                set_fn
            });
            builder
                .attributes
                .push(AttributeEntry::new(entry.name().to_string(), get_fn, set_fn));
        }
        for binding in parent.model_bindings() {
            let validate = binding.validate.clone();
            let validate_fn: ValidateFn<F> =
                Arc::new(move |form: &mut F| validate(project_mut(form)));
            let save_fn = binding.save.clone().map(|save| {
                let save_fn: SaveFn<F> = Arc::new(move |form: &mut F| save(project_mut(form)));
                save_fn
            });
            let persisted = binding.persisted.clone();
            let persisted_fn: PersistedFn<F> = Arc::new(move |form: &F| persisted(project(form)));
            let to_param = binding.to_param.clone();
            let to_param_fn: ToParamFn<F> = Arc::new(move |form: &F| to_param(project(form)));
            builder.models.push(ModelBinding::new(
                binding.name().to_string(),
                validate_fn,
                save_fn,
                persisted_fn,
                to_param_fn,
            ));
        }
        builder.main_model = parent.main_model_index();
        builder
    }

    /// Register a local attribute backed by the form's own field
    #[must_use]
    pub fn attribute(mut self, name: &str, get: fn(&F) -> Value, set: fn(&mut F, Value)) -> Self {
        let get_fn: GetFn<F> = Arc::new(move |form: &F| Ok(get(form)));
        let set_fn: SetFn<F> = Arc::new(move |form: &mut F, value: Value| {
            set(form, value);
            Ok(())
        });
        self.attributes
            .push(AttributeEntry::new(name.to_string(), get_fn, Some(set_fn)));
        self
    }

    /// Bind a nested record.
    ///
    /// The record's validation always runs as part of the form's own and
    /// its failing messages are copied onto the form under their original
    /// attribute names.
    #[must_use]
    pub fn model<R: FormRecord + 'static>(mut self, def: ModelDef<F, R>) -> Self {
        self.push_model(def);
        self
    }

    /// Bind a nested record and make it the form's main model.
    ///
    /// `persisted`, `new_record` and `to_param` then answer with the
    /// record's own values.
    #[must_use]
    pub fn main_model<R: FormRecord + 'static>(mut self, def: ModelDef<F, R>) -> Self {
        self.push_model(def);
        self.main_model = Some(self.models.len() - 1);
        self
    }

    /// Register delegated attributes without binding the record.
    ///
    /// No nested validation runs and the record cannot be save marked.
    #[must_use]
    pub fn delegate<R: FormRecord + 'static>(mut self, def: DelegateDef<F, R>) -> Self {
        let DelegateDef {
            name,
            get,
            get_mut,
            attributes,
            prefix,
            allow_nil,
        } = def;
        for attribute in &attributes {
            let visible = prefix.apply(&name, attribute);
            self.attributes.push(delegated_entry(
                &name, attribute, visible, get, get_mut, allow_nil, true,
            ));
        }
        self
    }

    fn push_model<R: FormRecord + 'static>(&mut self, def: ModelDef<F, R>) {
        let ModelDef {
            name,
            get,
            get_mut,
            attributes,
            read,
            prefix,
            allow_nil,
            save,
        } = def;
        for attribute in &attributes {
            let visible = prefix.apply(&name, attribute);
            self.attributes.push(delegated_entry(
                &name, attribute, visible, get, get_mut, allow_nil, true,
            ));
        }
        for attribute in &read {
            let visible = prefix.apply(&name, attribute);
            self.attributes.push(delegated_entry(
                &name, attribute, visible, get, get_mut, allow_nil, false,
            ));
        }
        let validate: ValidateFn<F> = Arc::new(move |form: &mut F| match get_mut(form) {
            Some(record) => {
                if record.valid() {
                    Errors::new()
                } else {
                    record.errors().clone()
                }
            }
            None => Errors::new(),
        });
        let persisted: PersistedFn<F> =
            Arc::new(move |form: &F| get(form).map(|record| record.persisted()));
        let to_param: ToParamFn<F> =
            Arc::new(move |form: &F| get(form).map(|record| record.to_param()));
        self.models
            .push(ModelBinding::new(name, validate, save, persisted, to_param));
    }
}

/// Visible name strategy for delegated attributes
#[derive(Debug, Clone, PartialEq, Eq)]
enum Prefix {
    None,
    ModelName,
    Literal(String),
}

impl Prefix {
    fn apply(&self, model: &str, attribute: &str) -> String {
        match self {
            Prefix::None => attribute.to_string(),
            Prefix::ModelName => format!("{}_{}", model, attribute),
            Prefix::Literal(prefix) => format!("{}_{}", prefix, attribute),
        }
    }
}

fn delegated_entry<F: 'static, R: FormRecord + 'static>(
    model: &str,
    attribute: &str,
    visible: String,
    get: fn(&F) -> Option<&R>,
    get_mut: fn(&mut F) -> Option<&mut R>,
    allow_nil: bool,
    writable: bool,
) -> AttributeEntry<F> {
    let read_model = model.to_string();
    let read_attribute = attribute.to_string();
    let get_fn: GetFn<F> = Arc::new(move |form: &F| match get(form) {
        Some(record) => record.get_attribute(&read_attribute),
        None if allow_nil => Ok(Value::Null),
        None => Err(AttributeError::MissingModel {
            model: read_model.clone(),
            attribute: read_attribute.clone(),
        }),
    });
    let set_fn = if writable {
        let write_model = model.to_string();
        let write_attribute = attribute.to_string();
        let set_fn: SetFn<F> = Arc::new(move |form: &mut F, value: Value| match get_mut(form) {
            Some(record) => record.set_attribute(&write_attribute, value),
            None if allow_nil => Ok(()),
            None => Err(AttributeError::MissingModel {
                model: write_model.clone(),
                attribute: write_attribute.clone(),
            }),
        });
        Some(set_fn)
    } else {
        None
    };
    AttributeEntry::new(visible, get_fn, set_fn)
}

/// Declaration of a bound nested record.
///
/// Configured fluently and handed to [`SchemaBuilder::model`] or
/// [`SchemaBuilder::main_model`]:
///
/// ```
/// use formwork::{FormRecord, ModelDef, SchemaBuilder};
/// # use formwork::{AttributeError, Errors};
/// # use serde_json::Value;
/// # #[derive(Default)]
/// # struct UserRecord { errors: Errors }
/// # impl FormRecord for UserRecord {
/// #     fn get_attribute(&self, name: &str) -> Result<Value, AttributeError> {
/// #         Err(AttributeError::UnknownAttribute(name.to_string()))
/// #     }
/// #     fn set_attribute(&mut self, name: &str, _: Value) -> Result<(), AttributeError> {
/// #         Err(AttributeError::UnknownAttribute(name.to_string()))
/// #     }
/// #     fn valid(&mut self) -> bool { true }
/// #     fn errors(&self) -> &Errors { &self.errors }
/// # }
/// struct CheckoutForm {
///     user: Option<UserRecord>,
/// }
///
/// fn user(form: &CheckoutForm) -> Option<&UserRecord> {
///     form.user.as_ref()
/// }
///
/// fn user_mut(form: &mut CheckoutForm) -> Option<&mut UserRecord> {
///     form.user.as_mut()
/// }
///
/// let schema = SchemaBuilder::new()
///     .model(ModelDef::new("user", user, user_mut).prefix_with_name())
///     .build();
/// assert_eq!(schema.model_names(), vec!["user"]);
/// ```
pub struct ModelDef<F, R> {
    name: String,
    get: fn(&F) -> Option<&R>,
    get_mut: fn(&mut F) -> Option<&mut R>,
    attributes: Vec<String>,
    read: Vec<String>,
    prefix: Prefix,
    allow_nil: bool,
    save: Option<SaveFn<F>>,
}

impl<F, R: FormRecord> ModelDef<F, R> {
    /// Declare a nested record reachable through the given accessors
    #[must_use]
    pub fn new(
        name: &str,
        get: fn(&F) -> Option<&R>,
        get_mut: fn(&mut F) -> Option<&mut R>,
    ) -> Self {
        Self {
            name: name.to_string(),
            get,
            get_mut,
            attributes: Vec::new(),
            read: Vec::new(),
            prefix: Prefix::None,
            allow_nil: false,
            save: None,
        }
    }

    /// Delegate readable and writable attributes to the record
    #[must_use]
    pub fn attributes(mut self, names: &[&str]) -> Self {
        self.attributes
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// Delegate read only attributes to the record.
    ///
    /// Read only names answer reads but stay out of `attribute_names()`
    /// and mass assignment.
    #[must_use]
    pub fn read(mut self, names: &[&str]) -> Self {
        self.read.extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// Prefix the visible names with a literal, `"billing"` makes `name`
    /// visible as `billing_name`
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Prefix::Literal(prefix.to_string());
        self
    }

    /// Prefix the visible names with the record name itself
    #[must_use]
    pub fn prefix_with_name(mut self) -> Self {
        self.prefix = Prefix::ModelName;
        self
    }

    /// Let delegation through an empty slot read `null` and drop writes
    /// instead of failing
    #[must_use]
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }
}

impl<F: 'static, R: SaveRecord + 'static> ModelDef<F, R> {
    /// Mark the record for persistence during `update`.
    ///
    /// Only available when the record implements [`SaveRecord`]. A save
    /// marked slot that is empty at update time fails the update.
    #[must_use]
    pub fn save(mut self) -> Self {
        let get_mut = self.get_mut;
        let save_fn: SaveFn<F> = Arc::new(move |form: &mut F| match get_mut(form) {
            Some(record) => record.save(),
            None => Err(SaveError::MissingRecord),
        });
        self.save = Some(save_fn);
        self
    }
}

/// Declaration of delegated attributes without a record binding.
///
/// The target record does not validate with the form and cannot be save
/// marked; only its attributes become reachable.
pub struct DelegateDef<F, R> {
    name: String,
    get: fn(&F) -> Option<&R>,
    get_mut: fn(&mut F) -> Option<&mut R>,
    attributes: Vec<String>,
    prefix: Prefix,
    allow_nil: bool,
}

impl<F, R: FormRecord> DelegateDef<F, R> {
    /// Declare delegation to a record reachable through the given accessors
    #[must_use]
    pub fn new(
        name: &str,
        get: fn(&F) -> Option<&R>,
        get_mut: fn(&mut F) -> Option<&mut R>,
    ) -> Self {
        Self {
            name: name.to_string(),
            get,
            get_mut,
            attributes: Vec::new(),
            prefix: Prefix::None,
            allow_nil: false,
        }
    }

    /// Delegate readable and writable attributes to the record
    #[must_use]
    pub fn attributes(mut self, names: &[&str]) -> Self {
        self.attributes
            .extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// Prefix the visible names with a literal
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Prefix::Literal(prefix.to_string());
        self
    }

    /// Prefix the visible names with the record name itself
    #[must_use]
    pub fn prefix_with_name(mut self) -> Self {
        self.prefix = Prefix::ModelName;
        self
    }

    /// Let delegation through an empty slot read `null` and drop writes
    /// instead of failing
    #[must_use]
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }
}
