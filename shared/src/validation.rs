//! Validation utilities for Sommelier Analytics
//!
//! Holds the field rules shared by the entity schemas and the form-input
//! types, the [`FieldErrors`] model every validation entry point reports
//! through, and the coercion helpers that turn raw form text into typed
//! values before the range checks run.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

// ============================================================================
// Field Errors
// ============================================================================

/// Field-level validation failures keyed by field path (`price`,
/// `wines[2].vintage`, ...). Every message for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message recorded for a field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|messages| messages.first()).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge another set of errors, skipping fields that already failed
    pub fn merge_missing(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            if !self.0.contains_key(&field) {
                self.0.insert(field, messages);
            }
        }
    }

    /// `Ok(value)` when nothing was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        collect_errors("", &errors, &mut out);
        out
    }
}

fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    out.add(path.clone(), describe(error));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "range" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => format!("Must be between {} and {}", min, max),
            (Some(min), None) => format!("Must be at least {}", min),
            (None, Some(max)) => format!("Must be at most {}", max),
            (None, None) => "Value out of range".to_string(),
        },
        "length" => match error.params.get("max") {
            Some(max) => format!("Must be at most {} characters", max),
            None => "Invalid length".to_string(),
        },
        "email" => "Invalid email address".to_string(),
        code => format!("Invalid value ({})", code),
    }
}

/// Run a value's schema and collect every field error
pub fn check<T: Validate>(value: &T) -> Result<(), FieldErrors> {
    value.validate().map_err(FieldErrors::from)
}

// ============================================================================
// Field Rules
// ============================================================================

pub const MIN_VINTAGE: i32 = 1900;
pub const MAX_VINTAGE: i32 = 2030;
pub const MIN_SENSORY_SCORE: i32 = 1;
pub const MAX_SENSORY_SCORE: i32 = 5;
pub const DEFAULT_BOTTLE_SIZE: &str = "750ml";

/// Largest amount a money column holds (`NUMERIC(10, 2)`)
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_99, 2)
}

const AMOUNT_TOO_LARGE: &str = "Amount must be at most 99999999.99";

/// Validate that a money amount is strictly positive and fits a money column
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than 0");
    }
    if amount > max_amount() {
        return Err(AMOUNT_TOO_LARGE);
    }
    Ok(())
}

/// Validate that a money amount is zero or positive and fits a money column
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    if amount > max_amount() {
        return Err(AMOUNT_TOO_LARGE);
    }
    Ok(())
}

/// Validate alcohol by volume (0-20%)
pub fn validate_alcohol_percent(alcohol: Decimal) -> Result<(), &'static str> {
    if alcohol < Decimal::ZERO || alcohol > Decimal::from(20) {
        return Err("Alcohol content must be between 0 and 20");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err("Invalid email format");
    }
    Ok(())
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Field-specific message for the lower bound, the shared one for the cap
fn amount_error(
    code: &'static str,
    below_minimum: &'static str,
) -> impl FnOnce(&'static str) -> ValidationError {
    move |msg| {
        if msg == AMOUNT_TOO_LARGE {
            field_error(code, AMOUNT_TOO_LARGE)
        } else {
            field_error(code, below_minimum)
        }
    }
}

pub(crate) fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    validate_positive_amount(*price).map_err(amount_error("price", "Price must be greater than 0"))
}

pub(crate) fn validate_total_amount(total: &Decimal) -> Result<(), ValidationError> {
    validate_positive_amount(*total)
        .map_err(amount_error("total_amount", "Total amount must be greater than 0"))
}

pub(crate) fn validate_cost(cost: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative_amount(*cost).map_err(amount_error("cost", "Cost cannot be negative"))
}

pub(crate) fn validate_unit_cost(cost: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative_amount(*cost)
        .map_err(amount_error("unit_cost", "Unit cost cannot be negative"))
}

pub(crate) fn validate_alcohol_content(alcohol: &Decimal) -> Result<(), ValidationError> {
    validate_alcohol_percent(*alcohol).map_err(|msg| field_error("alcohol_content", msg))
}

pub(crate) fn validate_email_field(email: &str) -> Result<(), ValidationError> {
    validate_email(email).map_err(|_| field_error("email", "Valid email is required"))
}

// ============================================================================
// Form Coercion
// ============================================================================

/// Raw form input: field name to the text the user typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Trimmed field text; blank input counts as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Coerces form text field by field, collecting every failure
pub struct Coercer<'a> {
    fields: &'a FormFields,
    errors: FieldErrors,
}

impl<'a> Coercer<'a> {
    pub fn new(fields: &'a FormFields) -> Self {
        Self {
            fields,
            errors: FieldErrors::new(),
        }
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.text(name).map(str::to_string)
    }

    /// Text that must be present; records `message` when blank
    pub fn required_text(&mut self, name: &str, message: &str) -> String {
        match self.fields.text(name) {
            Some(value) => value.to_string(),
            None => {
                self.errors.add(name, message);
                String::new()
            }
        }
    }

    pub fn decimal(&mut self, name: &str) -> Option<Decimal> {
        let raw = self.fields.text(name)?;
        match Decimal::from_str(raw) {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(name, "Expected a number");
                None
            }
        }
    }

    pub fn required_decimal(&mut self, name: &str, message: &str) -> Decimal {
        if self.fields.text(name).is_none() {
            self.errors.add(name, message);
            return Decimal::ZERO;
        }
        self.decimal(name).unwrap_or(Decimal::ZERO)
    }

    /// Whole number; `"3.0"` is accepted, `"3.5"` is not
    pub fn integer(&mut self, name: &str) -> Option<i32> {
        let raw = self.fields.text(name)?;
        let Ok(value) = Decimal::from_str(raw) else {
            self.errors.add(name, "Expected a number");
            return None;
        };
        match value.fract().is_zero().then(|| value.to_i32()).flatten() {
            Some(whole) => Some(whole),
            None => {
                self.errors.add(name, "Expected a whole number");
                None
            }
        }
    }

    pub fn required_integer(&mut self, name: &str, message: &str) -> i32 {
        if self.fields.text(name).is_none() {
            self.errors.add(name, message);
            return 0;
        }
        self.integer(name).unwrap_or(0)
    }

    pub fn date(&mut self, name: &str, message: &str) -> Option<NaiveDate> {
        let Some(raw) = self.fields.text(name) else {
            self.errors.add(name, message);
            return None;
        };
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.errors.add(name, "Expected a date (YYYY-MM-DD)");
                None
            }
        }
    }

    pub fn uuid(&mut self, name: &str, message: &str) -> Option<Uuid> {
        match self.fields.text(name).map(Uuid::parse_str) {
            Some(Ok(id)) => Some(id),
            _ => {
                self.errors.add(name, message);
                None
            }
        }
    }

    /// Optional value parsed with `FromStr`, e.g. an enum
    pub fn parsed<T: FromStr>(&mut self, name: &str, message: &str) -> Option<T> {
        let raw = self.fields.text(name)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.add(name, message);
                None
            }
        }
    }

    /// Run the schema on the coerced value. Fields that already failed
    /// coercion keep only their coercion message.
    pub fn finish<T: Validate>(self, value: T) -> Result<T, FieldErrors> {
        let mut errors = self.errors;
        if let Err(schema_errors) = check(&value) {
            errors.merge_missing(schema_errors);
        }
        errors.into_result(value)
    }
}
