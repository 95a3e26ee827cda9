//! Restaurant (tenant) models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::{check, validate_email_field, Coercer, FieldErrors, FormFields};

fn validate_restaurant_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut error = ValidationError::new("name");
        error.message = Some("Restaurant name is required".into());
        return Err(error);
    }
    Ok(())
}

/// A restaurant account. Every wine and sale is scoped to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Restaurant {
    pub id: Uuid,
    #[validate(custom = "validate_restaurant_name")]
    pub name: String,
    #[validate(custom = "validate_email_field")]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub is_active: bool,
    pub subscription_tier: String,
}

/// Restaurant sign-up form, the body of `POST /restaurants/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RestaurantFormData {
    #[validate(custom = "validate_restaurant_name")]
    pub name: String,
    #[validate(custom = "validate_email_field")]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl RestaurantFormData {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
        }
    }

    pub fn from_fields(fields: &FormFields) -> Result<Self, FieldErrors> {
        let mut c = Coercer::new(fields);
        let form = Self {
            name: c.required_text("name", "Restaurant name is required"),
            email: c.required_text("email", "Valid email is required"),
            phone: c.text("phone"),
            address: c.text("address"),
            city: c.text("city"),
            state: c.text("state"),
            zip_code: c.text("zip_code"),
        };
        c.finish(form)
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        check(self)
    }
}
