//! Core form traits.
//!
//! `Form` drives the lifecycle of a form object: mass assignment through
//! the type's [`FormSchema`], validation that folds in the errors of bound
//! records, and an `update` operation that persists save marked records
//! inside a transaction scope while running lifecycle hooks.
//!
//! `FormRecord` and `SaveRecord` are the capabilities a nested record has
//! to offer before a schema can bind it.

use serde_json::Value;

use crate::attributes::Attributes;
use crate::errors::Errors;
use crate::form::error::{FormError, SaveError};
use crate::schema::error::AttributeError;
use crate::schema::FormSchema;

/// Capabilities required of a record bound to a form.
///
/// Attribute access is by unprefixed name; any prefix declared on the form
/// side is stripped before the record is reached. `persisted` and
/// `to_param` only matter for records used as a form's main model and
/// default to the unpersisted answers.
pub trait FormRecord {
    /// Read one attribute by name
    fn get_attribute(&self, name: &str) -> Result<Value, AttributeError>;

    /// Write one attribute by name
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError>;

    /// Run the record's validation, rebuilding its error collection
    fn valid(&mut self) -> bool;

    /// Errors recorded by the last `valid` run
    fn errors(&self) -> &Errors;

    /// Whether the record is persisted
    fn persisted(&self) -> bool {
        false
    }

    /// URL parameter of the record
    fn to_param(&self) -> Option<String> {
        None
    }
}

/// A record that can persist itself.
///
/// Required for [`ModelDef::save`](crate::ModelDef::save); the schema
/// refuses save marking at compile time without it.
pub trait SaveRecord: FormRecord {
    /// Persist the record
    fn save(&mut self) -> Result<(), SaveError>;
}

/// Lifecycle of a form object.
///
/// Implementors supply the schema static and the error collection; every
/// operation and hook below comes with a default body. The lifecycle of
/// [`update`](Self::update) is:
///
/// 1. assign the incoming attributes, unless the map is empty
/// 2. validate, returning `Ok(false)` on failure with no further work
/// 3. `before_update`
/// 4. inside [`transaction`](Self::transaction): save marked records in
///    declaration order, then [`perform`](Self::perform)
/// 5. `after_update`, then `Ok(true)`
///
/// Assignment hooks wrap every `assign` call. Since an empty update skips
/// the assign step entirely, assignment hooks do not run for it; a
/// construction time [`init`](Self::init) always assigns, so there they
/// run even with an empty map.
pub trait Form: Sized + 'static {
    /// The schema built for this type, usually a `Lazy` static
    fn schema() -> &'static FormSchema<Self>;

    /// Errors recorded by the last `valid` run
    fn errors(&self) -> &Errors;

    /// Mutable access to the error collection
    fn errors_mut(&mut self) -> &mut Errors;

    /// Validation hook, add messages through [`errors_mut`](Self::errors_mut)
    fn validate(&mut self) {}

    /// Domain work that runs inside the transaction scope after the nested
    /// saves
    fn perform(&mut self) -> Result<(), FormError> {
        Ok(())
    }

    /// Hook that runs before every assignment
    fn before_assignment(&mut self) -> Result<(), FormError> {
        Ok(())
    }

    /// Hook that runs after every successful assignment
    fn after_assignment(&mut self) -> Result<(), FormError> {
        Ok(())
    }

    /// Hook that runs before the transaction scope of a valid update
    fn before_update(&mut self) -> Result<(), FormError> {
        Ok(())
    }

    /// Hook that runs after the transaction scope completed
    fn after_update(&mut self) -> Result<(), FormError> {
        Ok(())
    }

    /// Transaction scope around nested saves and [`perform`](Self::perform).
    ///
    /// The default executes the body directly and gives no transactional
    /// guarantee. Forms whose records persist through a backend override
    /// this with the backend's primitive; failures must propagate unchanged
    /// on every path.
    fn transaction(
        &mut self,
        body: &mut dyn FnMut(&mut Self) -> Result<(), FormError>,
    ) -> Result<(), FormError> {
        body(self)
    }

    /// Whether the form is persisted.
    ///
    /// Delegates to the main model when one is declared, `false` otherwise.
    /// Forms without a main model always count as unpersisted, which keeps
    /// form bindings on the create path.
    fn persisted(&self) -> bool {
        match Self::schema().main_binding() {
            Some(binding) => binding.record_persisted(self).unwrap_or(false),
            None => false,
        }
    }

    /// Opposite of [`persisted`](Self::persisted)
    fn new_record(&self) -> bool {
        !self.persisted()
    }

    /// URL parameter, delegated to the main model when one is declared
    fn to_param(&self) -> Option<String> {
        Self::schema()
            .main_binding()
            .and_then(|binding| binding.record_to_param(self))
            .flatten()
    }

    /// Construction time assignment.
    ///
    /// Runs a full `assign`, so assignment hooks fire even when the map is
    /// empty.
    fn init(mut self, attributes: Attributes) -> Result<Self, FormError> {
        self.assign(attributes)?;
        Ok(self)
    }

    /// Mass assign registered attributes, wrapped in assignment hooks.
    ///
    /// Unknown names are dropped silently. Delegation failures abort the
    /// assignment and the after hook does not run.
    fn assign(&mut self, attributes: Attributes) -> Result<(), FormError> {
        self.before_assignment()?;
        Self::schema().apply(self, attributes)?;
        self.after_assignment()?;
        Ok(())
    }

    /// Alias for [`assign`](Self::assign)
    fn assign_attributes(&mut self, attributes: Attributes) -> Result<(), FormError> {
        self.assign(attributes)
    }

    /// Snapshot of every registered writable attribute in declaration order
    fn attributes(&self) -> Result<Attributes, AttributeError> {
        Self::schema().snapshot(self)
    }

    /// Registered writable attribute names in declaration order
    fn attribute_names() -> Vec<&'static str> {
        Self::schema().attribute_names()
    }

    /// Read one attribute by registered name
    fn get(&self, name: &str) -> Result<Value, AttributeError> {
        Self::schema().read(self, name)
    }

    /// Write one attribute by registered name
    fn set(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        Self::schema().write(self, name, value)
    }

    /// Run validation: own rules first, then every bound record.
    ///
    /// The collection is rebuilt on every call, so repeated runs settle on
    /// the same messages. A bound record that fails contributes its errors
    /// under their original attribute names; empty slots are skipped.
    fn valid(&mut self) -> bool {
        self.errors_mut().clear();
        self.validate();
        for binding in Self::schema().model_bindings() {
            let nested = binding.run_validation(self);
            if !nested.is_empty() {
                self.errors_mut().merge(&nested);
            }
        }
        self.errors().is_empty()
    }

    /// Assign, validate and persist.
    ///
    /// Returns `Ok(false)` when validation rejects the input; hooks beyond
    /// assignment do not run and nothing is persisted in that case.
    /// Assignment, hook and persistence failures surface as errors.
    fn update(&mut self, attributes: Attributes) -> Result<bool, FormError> {
        if !attributes.is_empty() {
            self.assign(attributes)?;
        }
        if !self.valid() {
            log::debug!(
                "update rejected by validation: {}",
                self.errors().attribute_names().join(", ")
            );
            return Ok(false);
        }
        self.before_update()?;
        self.transaction(&mut |form| {
            for binding in Self::schema().save_bindings() {
                log::debug!("saving {}", binding.name());
                binding.run_save(form).map_err(|source| FormError::Save {
                    model: binding.name().to_string(),
                    source,
                })?;
            }
            form.perform()
        })?;
        self.after_update()?;
        Ok(true)
    }

    /// [`update`](Self::update) that treats a validation rejection as an
    /// error.
    ///
    /// Returns the form on success. On rejection the error carries a clone
    /// of the collection and its message names the failing attributes.
    fn update_strict(&mut self, attributes: Attributes) -> Result<&mut Self, FormError> {
        if self.update(attributes)? {
            Ok(self)
        } else {
            Err(FormError::Invalid(self.errors().clone()))
        }
    }
}
