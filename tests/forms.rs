//! End-to-end lifecycle tests: delegation, nested validation, saves and
//! hook ordering.

use std::cell::RefCell;
use std::rc::Rc;

use formwork::{
    attrs, validate, AttributeError, Attributes, DelegateDef, Errors, Form, FormError, FormRecord,
    FormSchema, ModelDef, SaveError, SaveRecord, SchemaBuilder,
};
use once_cell::sync::Lazy;
use serde_json::Value;

#[derive(Debug, Default, Clone)]
struct UserRecord {
    id: Option<i64>,
    name: String,
    email: String,
    saved: bool,
    save_calls: usize,
    fail_save: bool,
    errors: Errors,
}

impl FormRecord for UserRecord {
    fn get_attribute(&self, name: &str) -> Result<Value, AttributeError> {
        match name {
            "id" => Ok(self.id.map(Value::from).unwrap_or(Value::Null)),
            "name" => Ok(Value::from(self.name.clone())),
            "email" => Ok(Value::from(self.email.clone())),
            _ => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "name" => {
                self.name = value.as_str().unwrap_or_default().to_string();
                Ok(())
            }
            "email" => {
                self.email = value.as_str().unwrap_or_default().to_string();
                Ok(())
            }
            _ => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    fn valid(&mut self) -> bool {
        self.errors.clear();
        if self.name.trim().is_empty() {
            self.errors.add("name", "can't be blank");
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            self.errors.add("email", "is invalid");
        }
        self.errors.is_empty()
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn persisted(&self) -> bool {
        self.id.is_some()
    }

    fn to_param(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

impl SaveRecord for UserRecord {
    fn save(&mut self) -> Result<(), SaveError> {
        self.save_calls += 1;
        if self.fail_save {
            return Err(SaveError::Failed("connection lost".to_string()));
        }
        self.saved = true;
        if self.id.is_none() {
            self.id = Some(1);
        }
        Ok(())
    }
}

fn valid_user() -> UserRecord {
    UserRecord {
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        ..Default::default()
    }
}

#[derive(Debug, Default)]
struct ProfileForm {
    user: Option<UserRecord>,
    bio: String,
    errors: Errors,
}

fn profile_user(form: &ProfileForm) -> Option<&UserRecord> {
    form.user.as_ref()
}

fn profile_user_mut(form: &mut ProfileForm) -> Option<&mut UserRecord> {
    form.user.as_mut()
}

static PROFILE_SCHEMA: Lazy<FormSchema<ProfileForm>> = Lazy::new(|| {
    SchemaBuilder::new()
        .attribute(
            "bio",
            |form: &ProfileForm| Value::from(form.bio.clone()),
            |form, value| form.bio = value.as_str().unwrap_or_default().to_string(),
        )
        .main_model(
            ModelDef::new("user", profile_user, profile_user_mut)
                .attributes(&["name", "email"])
                .read(&["id"])
                .save(),
        )
        .build()
});

impl Form for ProfileForm {
    fn schema() -> &'static FormSchema<Self> {
        &PROFILE_SCHEMA
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    fn validate(&mut self) {
        if let Err(message) = validate::max_length(&Value::from(self.bio.as_str()), 200) {
            self.errors.add("bio", message);
        }
    }
}

fn profile_form() -> ProfileForm {
    ProfileForm {
        user: Some(valid_user()),
        ..Default::default()
    }
}

#[test]
fn test_update_delegates_assignment_and_saves_models() {
    let mut form = profile_form();
    let updated = form
        .update(attrs! { "name" => "Maria", "bio" => "Writes Rust" })
        .unwrap();

    assert!(updated);
    assert_eq!(form.bio, "Writes Rust");

    let user = form.user.as_ref().unwrap();
    assert_eq!(user.name, "Maria");
    assert!(user.saved);
    assert_eq!(user.save_calls, 1);
}

#[test]
fn test_update_returns_false_and_copies_nested_errors() {
    let mut form = profile_form();
    let updated = form
        .update(attrs! { "name" => "", "email" => "nope" })
        .unwrap();

    assert!(!updated);
    assert_eq!(form.errors().get("name"), ["can't be blank"]);
    assert_eq!(form.errors().get("email"), ["is invalid"]);
}

#[test]
fn test_rejected_update_skips_persistence() {
    let mut form = profile_form();
    form.update(attrs! { "name" => "" }).unwrap();

    let user = form.user.as_ref().unwrap();
    assert!(!user.saved);
    assert_eq!(user.save_calls, 0);
}

#[test]
fn test_nested_error_copy_is_idempotent() {
    let mut form = profile_form();
    form.update(attrs! { "name" => "" }).unwrap();
    assert!(!form.valid());
    assert!(!form.valid());

    assert_eq!(form.errors().get("name").len(), 1);
}

#[test]
fn test_failed_update_recovers_after_fixing_the_attribute() {
    let mut form = ProfileForm {
        user: Some(UserRecord::default()),
        ..Default::default()
    };

    let first = form.update(attrs! { "bio" => "hi" }).unwrap();
    assert!(!first);
    assert!(form.errors().contains("name"));
    assert_eq!(form.user.as_ref().unwrap().save_calls, 0);

    let second = form.update(attrs! { "name" => "Ada" }).unwrap();
    assert!(second);
    assert!(form.errors().is_empty());
    assert_eq!(form.user.as_ref().unwrap().save_calls, 1);
}

#[test]
fn test_update_strict_returns_form_on_success() {
    let mut form = profile_form();
    form.update_strict(attrs! { "name" => "Maria" }).unwrap();

    assert_eq!(form.user.as_ref().unwrap().name, "Maria");
}

#[test]
fn test_update_strict_carries_the_error_collection() {
    let mut form = profile_form();
    let err = form.update_strict(attrs! { "name" => "" }).unwrap_err();

    assert_eq!(err.to_string(), "Form validation failed for: name");
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.get("name"), ["can't be blank"]);
}

#[test]
fn test_save_failure_surfaces_with_model_name() {
    let mut form = profile_form();
    form.user.as_mut().unwrap().fail_save = true;

    let err = form.update(attrs! { "name" => "Maria" }).unwrap_err();
    match err {
        FormError::Save { ref model, .. } => assert_eq!(model, "user"),
        ref other => panic!("expected save error, got {}", other),
    }
    assert!(err.to_string().contains("connection lost"));
}

#[test]
fn test_save_marked_empty_slot_fails_update() {
    let mut form = ProfileForm::default();
    let err = form.update(attrs! { "bio" => "hi" }).unwrap_err();

    assert_eq!(err.to_string(), "Failed to save user: record is not set");
}

#[test]
fn test_assignment_through_empty_slot_fails() {
    let mut form = ProfileForm::default();
    let err = form.update(attrs! { "name" => "Maria" }).unwrap_err();

    match err {
        FormError::Attribute(AttributeError::MissingModel { model, attribute }) => {
            assert_eq!(model, "user");
            assert_eq!(attribute, "name");
        }
        other => panic!("expected missing model error, got {}", other),
    }
}

#[test]
fn test_read_only_delegates_are_readable_but_not_assignable() {
    let mut form = profile_form();
    form.user.as_mut().unwrap().id = Some(7);

    assert_eq!(form.get("id").unwrap(), Value::from(7));
    assert!(!ProfileForm::attribute_names().contains(&"id"));

    form.update(attrs! { "id" => 99, "name" => "Maria" }).unwrap();
    assert_eq!(form.user.as_ref().unwrap().id, Some(7));

    let err = form.set("id", Value::from(99)).unwrap_err();
    assert_eq!(err, AttributeError::ReadOnly("id".to_string()));
}

#[test]
fn test_snapshot_covers_local_and_delegated_attributes() {
    let mut form = profile_form();
    form.update(attrs! { "bio" => "Writes Rust" }).unwrap();

    let snapshot = form.attributes().unwrap();
    assert_eq!(snapshot.names(), vec!["bio", "name", "email"]);
    assert_eq!(snapshot.get("name"), Some(&Value::from("Ana")));
    assert_eq!(snapshot.get("bio"), Some(&Value::from("Writes Rust")));
}

#[test]
fn test_main_model_conversions_follow_the_record() {
    let mut form = profile_form();
    assert!(!form.persisted());
    assert!(form.new_record());
    assert_eq!(form.to_param(), None);

    form.update(Attributes::new()).unwrap();

    assert!(form.persisted());
    assert!(!form.new_record());
    assert_eq!(form.to_param(), Some("1".to_string()));
}

#[test]
fn test_unknown_attributes_are_ignored() {
    let mut form = profile_form();
    let updated = form
        .update(attrs! { "name" => "Maria", "admin" => true })
        .unwrap();

    assert!(updated);
    assert!(form.errors().is_empty());
}

#[derive(Debug, Default)]
struct ProductRecord {
    title: String,
    errors: Errors,
}

impl FormRecord for ProductRecord {
    fn get_attribute(&self, name: &str) -> Result<Value, AttributeError> {
        match name {
            "title" => Ok(Value::from(self.title.clone())),
            _ => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "title" => match value.as_str() {
                Some(title) => {
                    self.title = title.to_string();
                    Ok(())
                }
                None => Err(AttributeError::InvalidValue {
                    attribute: "title".to_string(),
                    message: "expected a string".to_string(),
                }),
            },
            _ => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    fn valid(&mut self) -> bool {
        true
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }
}

#[derive(Debug, Default)]
struct SupplierRecord {
    name: String,
    errors: Errors,
}

impl FormRecord for SupplierRecord {
    fn get_attribute(&self, name: &str) -> Result<Value, AttributeError> {
        match name {
            "name" => Ok(Value::from(self.name.clone())),
            _ => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "name" => {
                self.name = value.as_str().unwrap_or_default().to_string();
                Ok(())
            }
            _ => Err(AttributeError::UnknownAttribute(name.to_string())),
        }
    }

    fn valid(&mut self) -> bool {
        true
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }
}

#[derive(Debug, Default)]
struct BillingForm {
    product: Option<ProductRecord>,
    supplier: Option<SupplierRecord>,
    errors: Errors,
}

fn billing_product(form: &BillingForm) -> Option<&ProductRecord> {
    form.product.as_ref()
}

fn billing_product_mut(form: &mut BillingForm) -> Option<&mut ProductRecord> {
    form.product.as_mut()
}

fn billing_supplier(form: &BillingForm) -> Option<&SupplierRecord> {
    form.supplier.as_ref()
}

fn billing_supplier_mut(form: &mut BillingForm) -> Option<&mut SupplierRecord> {
    form.supplier.as_mut()
}

static BILLING_SCHEMA: Lazy<FormSchema<BillingForm>> = Lazy::new(|| {
    SchemaBuilder::new()
        .model(
            ModelDef::new("product", billing_product, billing_product_mut)
                .attributes(&["title"])
                .prefix_with_name(),
        )
        .delegate(
            DelegateDef::new("supplier", billing_supplier, billing_supplier_mut)
                .attributes(&["name"])
                .prefix("vendor"),
        )
        .build()
});

impl Form for BillingForm {
    fn schema() -> &'static FormSchema<Self> {
        &BILLING_SCHEMA
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }
}

#[test]
fn test_prefixed_delegation_uses_visible_names() {
    let mut form = BillingForm {
        product: Some(ProductRecord::default()),
        supplier: Some(SupplierRecord::default()),
        errors: Errors::new(),
    };

    assert_eq!(
        BillingForm::attribute_names(),
        vec!["product_title", "vendor_name"]
    );
    assert_eq!(BillingForm::schema().model_names(), vec!["product"]);

    let updated = form
        .update(attrs! { "product_title" => "Keyboard", "vendor_name" => "Acme" })
        .unwrap();
    assert!(updated);
    assert_eq!(form.product.as_ref().unwrap().title, "Keyboard");
    assert_eq!(form.supplier.as_ref().unwrap().name, "Acme");
}

#[test]
fn test_record_rejected_value_aborts_assignment() {
    let mut form = BillingForm {
        product: Some(ProductRecord::default()),
        supplier: Some(SupplierRecord::default()),
        errors: Errors::new(),
    };

    let err = form.update(attrs! { "product_title" => 7 }).unwrap_err();
    match err {
        FormError::Attribute(AttributeError::InvalidValue { attribute, .. }) => {
            assert_eq!(attribute, "title");
        }
        other => panic!("expected invalid value error, got {}", other),
    }
}

#[derive(Debug, Default)]
struct GuestForm {
    user: Option<UserRecord>,
    errors: Errors,
}

fn guest_user(form: &GuestForm) -> Option<&UserRecord> {
    form.user.as_ref()
}

fn guest_user_mut(form: &mut GuestForm) -> Option<&mut UserRecord> {
    form.user.as_mut()
}

static GUEST_SCHEMA: Lazy<FormSchema<GuestForm>> = Lazy::new(|| {
    SchemaBuilder::new()
        .model(
            ModelDef::new("user", guest_user, guest_user_mut)
                .attributes(&["name"])
                .allow_nil(),
        )
        .build()
});

impl Form for GuestForm {
    fn schema() -> &'static FormSchema<Self> {
        &GUEST_SCHEMA
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }
}

#[test]
fn test_allow_nil_slot_reads_null_and_drops_writes() {
    let mut form = GuestForm::default();

    let updated = form.update(attrs! { "name" => "Ana" }).unwrap();
    assert!(updated);
    assert!(form.user.is_none());

    let snapshot = form.attributes().unwrap();
    assert_eq!(snapshot.get("name"), Some(&Value::Null));
}

#[derive(Debug, Default)]
struct AuditedForm {
    user: Option<UserRecord>,
    calls: Vec<String>,
    errors: Errors,
}

fn audited_user(form: &AuditedForm) -> Option<&UserRecord> {
    form.user.as_ref()
}

fn audited_user_mut(form: &mut AuditedForm) -> Option<&mut UserRecord> {
    form.user.as_mut()
}

static AUDITED_SCHEMA: Lazy<FormSchema<AuditedForm>> = Lazy::new(|| {
    SchemaBuilder::new()
        .main_model(
            ModelDef::new("user", audited_user, audited_user_mut)
                .attributes(&["name"])
                .save(),
        )
        .build()
});

impl Form for AuditedForm {
    fn schema() -> &'static FormSchema<Self> {
        &AUDITED_SCHEMA
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    fn before_assignment(&mut self) -> Result<(), FormError> {
        self.calls.push("before_assignment".to_string());
        Ok(())
    }

    fn after_assignment(&mut self) -> Result<(), FormError> {
        self.calls.push("after_assignment".to_string());
        Ok(())
    }

    fn before_update(&mut self) -> Result<(), FormError> {
        self.calls.push("before_update".to_string());
        Ok(())
    }

    fn after_update(&mut self) -> Result<(), FormError> {
        self.calls.push("after_update".to_string());
        Ok(())
    }

    fn perform(&mut self) -> Result<(), FormError> {
        let saved = self.user.as_ref().map(|user| user.saved).unwrap_or(false);
        self.calls.push(format!("perform saved={}", saved));
        Ok(())
    }

    fn transaction(
        &mut self,
        body: &mut dyn FnMut(&mut Self) -> Result<(), FormError>,
    ) -> Result<(), FormError> {
        self.calls.push("transaction begin".to_string());
        let result = body(self);
        if result.is_ok() {
            self.calls.push("transaction commit".to_string());
        } else {
            self.calls.push("transaction rollback".to_string());
        }
        result
    }
}

fn audited_form() -> AuditedForm {
    AuditedForm {
        user: Some(valid_user()),
        ..Default::default()
    }
}

#[test]
fn test_hook_order_on_successful_update() {
    let mut form = audited_form();
    form.update(attrs! { "name" => "Maria" }).unwrap();

    assert_eq!(
        form.calls,
        vec![
            "before_assignment",
            "after_assignment",
            "before_update",
            "transaction begin",
            "perform saved=true",
            "transaction commit",
            "after_update",
        ]
    );
}

#[test]
fn test_hook_order_stops_at_failed_save() {
    let mut form = audited_form();
    form.user.as_mut().unwrap().fail_save = true;

    let err = form.update(attrs! { "name" => "Maria" }).unwrap_err();
    assert!(matches!(err, FormError::Save { .. }));
    assert_eq!(
        form.calls,
        vec![
            "before_assignment",
            "after_assignment",
            "before_update",
            "transaction begin",
            "transaction rollback",
        ]
    );
}

#[test]
fn test_validation_failure_runs_no_update_hooks() {
    let mut form = audited_form();
    let updated = form.update(attrs! { "name" => "" }).unwrap();

    assert!(!updated);
    assert_eq!(form.calls, vec!["before_assignment", "after_assignment"]);
}

#[test]
fn test_failed_assignment_skips_the_after_hook() {
    let mut form = AuditedForm::default();

    let err = form.update(attrs! { "name" => "Maria" }).unwrap_err();

    assert!(matches!(
        err,
        FormError::Attribute(AttributeError::MissingModel { .. })
    ));
    assert_eq!(form.calls, vec!["before_assignment"]);
}

#[test]
fn test_empty_update_skips_assignment_hooks_but_still_saves() {
    let mut form = audited_form();
    let updated = form.update(Attributes::new()).unwrap();

    assert!(updated);
    assert_eq!(
        form.calls,
        vec![
            "before_update",
            "transaction begin",
            "perform saved=true",
            "transaction commit",
            "after_update",
        ]
    );
}

#[test]
fn test_init_runs_assignment_hooks_with_empty_input() {
    let form = AuditedForm::default().init(Attributes::new()).unwrap();
    assert_eq!(form.calls, vec!["before_assignment", "after_assignment"]);
}

#[derive(Debug)]
struct JournaledRecord {
    label: &'static str,
    journal: Rc<RefCell<Vec<&'static str>>>,
    errors: Errors,
}

impl FormRecord for JournaledRecord {
    fn get_attribute(&self, name: &str) -> Result<Value, AttributeError> {
        Err(AttributeError::UnknownAttribute(name.to_string()))
    }

    fn set_attribute(&mut self, name: &str, _value: Value) -> Result<(), AttributeError> {
        Err(AttributeError::UnknownAttribute(name.to_string()))
    }

    fn valid(&mut self) -> bool {
        true
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }
}

impl SaveRecord for JournaledRecord {
    fn save(&mut self) -> Result<(), SaveError> {
        self.journal.borrow_mut().push(self.label);
        Ok(())
    }
}

#[derive(Debug)]
struct CheckoutForm {
    order: Option<JournaledRecord>,
    receipt: Option<JournaledRecord>,
    errors: Errors,
}

fn checkout_order(form: &CheckoutForm) -> Option<&JournaledRecord> {
    form.order.as_ref()
}

fn checkout_order_mut(form: &mut CheckoutForm) -> Option<&mut JournaledRecord> {
    form.order.as_mut()
}

fn checkout_receipt(form: &CheckoutForm) -> Option<&JournaledRecord> {
    form.receipt.as_ref()
}

fn checkout_receipt_mut(form: &mut CheckoutForm) -> Option<&mut JournaledRecord> {
    form.receipt.as_mut()
}

static CHECKOUT_SCHEMA: Lazy<FormSchema<CheckoutForm>> = Lazy::new(|| {
    SchemaBuilder::new()
        .model(ModelDef::new("order", checkout_order, checkout_order_mut).save())
        .model(ModelDef::new("receipt", checkout_receipt, checkout_receipt_mut).save())
        .build()
});

impl Form for CheckoutForm {
    fn schema() -> &'static FormSchema<Self> {
        &CHECKOUT_SCHEMA
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }
}

#[test]
fn test_save_marked_models_save_in_declaration_order() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    let mut form = CheckoutForm {
        order: Some(JournaledRecord {
            label: "order",
            journal: Rc::clone(&journal),
            errors: Errors::new(),
        }),
        receipt: Some(JournaledRecord {
            label: "receipt",
            journal: Rc::clone(&journal),
            errors: Errors::new(),
        }),
        errors: Errors::new(),
    };

    let updated = form.update(Attributes::new()).unwrap();

    assert!(updated);
    assert_eq!(*journal.borrow(), ["order", "receipt"]);
}

#[derive(Debug, Default)]
struct ExtendedForm {
    base: ProfileForm,
    tagline: String,
    errors: Errors,
}

fn extended_base(form: &ExtendedForm) -> &ProfileForm {
    &form.base
}

fn extended_base_mut(form: &mut ExtendedForm) -> &mut ProfileForm {
    &mut form.base
}

static EXTENDED_SCHEMA: Lazy<FormSchema<ExtendedForm>> = Lazy::new(|| {
    FormSchema::inherit(ProfileForm::schema(), extended_base, extended_base_mut)
        .attribute(
            "tagline",
            |form| Value::from(form.tagline.clone()),
            |form, value| form.tagline = value.as_str().unwrap_or_default().to_string(),
        )
        .build()
});

impl Form for ExtendedForm {
    fn schema() -> &'static FormSchema<Self> {
        &EXTENDED_SCHEMA
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }
}

#[test]
fn test_inherited_form_extends_registry_and_projects_writes() {
    assert_eq!(
        ExtendedForm::attribute_names(),
        vec!["bio", "name", "email", "tagline"]
    );

    let mut form = ExtendedForm {
        base: profile_form(),
        ..Default::default()
    };
    let updated = form
        .update(attrs! { "name" => "Maria", "tagline" => "hello" })
        .unwrap();

    assert!(updated);
    assert_eq!(form.tagline, "hello");
    let user = form.base.user.as_ref().unwrap();
    assert_eq!(user.name, "Maria");
    assert!(user.saved);
    assert!(form.persisted());
}

#[test]
fn test_inherited_form_leaves_parent_registry_alone() {
    let _ = ExtendedForm::attribute_names();
    assert_eq!(ProfileForm::attribute_names(), vec!["bio", "name", "email"]);
}

#[test]
fn test_nested_errors_appear_through_inherited_binding() {
    let mut form = ExtendedForm {
        base: profile_form(),
        ..Default::default()
    };
    let updated = form.update(attrs! { "name" => "" }).unwrap();

    assert!(!updated);
    assert_eq!(form.errors().get("name"), ["can't be blank"]);
}
