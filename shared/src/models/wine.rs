//! Wine inventory models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::pricing::{markup_percent, profit_margin_percent};
use crate::types::Pagination;
use crate::validation::{
    check, validate_alcohol_content, validate_cost, validate_price, Coercer, FieldErrors,
    FormFields, DEFAULT_BOTTLE_SIZE,
};

/// Wine style
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WineType {
    Red,
    White,
    Rose,
    Sparkling,
    Dessert,
    Fortified,
}

impl WineType {
    pub const ALL: [WineType; 6] = [
        WineType::Red,
        WineType::White,
        WineType::Rose,
        WineType::Sparkling,
        WineType::Dessert,
        WineType::Fortified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "red",
            WineType::White => "white",
            WineType::Rose => "rose",
            WineType::Sparkling => "sparkling",
            WineType::Dessert => "dessert",
            WineType::Fortified => "fortified",
        }
    }
}

impl fmt::Display for WineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WineType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WineType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or("Invalid wine type")
    }
}

/// Perceived weight of the wine on the palate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WineBody {
    Light,
    Medium,
    Full,
}

impl WineBody {
    pub const ALL: [WineBody; 3] = [WineBody::Light, WineBody::Medium, WineBody::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            WineBody::Light => "light",
            WineBody::Medium => "medium",
            WineBody::Full => "full",
        }
    }
}

impl fmt::Display for WineBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WineBody {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WineBody::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or("Invalid body")
    }
}

fn default_bottle_size() -> String {
    DEFAULT_BOTTLE_SIZE.to_string()
}

fn validate_wine_name(name: &str) -> Result<(), ValidationError> {
    let message = if name.trim().is_empty() {
        "Wine name is required"
    } else if name.chars().count() > 255 {
        "Wine name must be at most 255 characters"
    } else {
        return Ok(());
    };
    let mut error = ValidationError::new("name");
    error.message = Some(message.into());
    Err(error)
}

/// A wine on a restaurant's list, as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Wine {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    #[validate(custom = "validate_wine_name")]
    pub name: String,
    #[validate(length(max = 255, message = "Producer must be at most 255 characters"))]
    pub producer: Option<String>,
    #[validate(range(min = 1900, max = 2030, message = "Vintage must be between 1900 and 2030"))]
    pub vintage: Option<i32>,
    #[validate(length(max = 100, message = "Varietal must be at most 100 characters"))]
    pub varietal: Option<String>,
    #[validate(length(max = 255, message = "Region must be at most 255 characters"))]
    pub region: Option<String>,
    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,
    pub wine_type: Option<WineType>,
    pub body: Option<WineBody>,
    /// 1 = bone dry, 5 = sweet
    #[validate(range(min = 1, max = 5, message = "Sweetness must be between 1 and 5"))]
    pub sweetness: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Acidity must be between 1 and 5"))]
    pub acidity: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Tannin must be between 1 and 5"))]
    pub tannin: Option<i32>,
    /// Percent ABV
    #[validate(custom = "validate_alcohol_content")]
    pub alcohol_content: Option<Decimal>,
    /// Menu price per bottle
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    /// What the restaurant pays per bottle
    #[validate(custom = "validate_cost")]
    pub cost: Option<Decimal>,
    #[validate(range(min = 0, message = "Inventory count cannot be negative"))]
    pub inventory_count: i32,
    pub tasting_notes: Option<String>,
    #[serde(default = "default_bottle_size")]
    pub bottle_size: String,
    #[validate(length(max = 100, message = "SKU must be at most 100 characters"))]
    pub sku: Option<String>,
    #[validate(range(min = 0, message = "Times sold cannot be negative"))]
    pub times_sold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Server-computed, read-only
    pub profit_margin: Option<f64>,
    /// Server-computed, read-only
    pub markup: Option<f64>,
}

impl Wine {
    /// Price minus cost, when the cost is known
    pub fn profit_per_bottle(&self) -> Option<Decimal> {
        self.price.checked_sub(self.cost?)
    }

    /// Margin as a percentage of price, recomputed locally
    pub fn computed_profit_margin(&self) -> Option<Decimal> {
        profit_margin_percent(self.price, self.cost?)
    }

    /// Markup as a percentage of cost, recomputed locally
    pub fn computed_markup(&self) -> Option<Decimal> {
        markup_percent(self.price, self.cost?)
    }

    /// Value of the bottles on hand at menu price
    pub fn stock_value(&self) -> Option<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.inventory_count.max(0)))
    }
}

/// Paginated wine list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WineListResponse {
    #[validate]
    pub wines: Vec<Wine>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

/// Filters for the wine list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WineListParams {
    pub restaurant_id: Uuid,
    pub pagination: Option<Pagination>,
    pub search: Option<String>,
    pub wine_type: Option<WineType>,
}

impl WineListParams {
    pub fn new(restaurant_id: Uuid) -> Self {
        Self {
            restaurant_id,
            pagination: None,
            search: None,
            wine_type: None,
        }
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn wine_type(mut self, wine_type: WineType) -> Self {
        self.wine_type = Some(wine_type);
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.pagination = Some(Pagination::new(page, page_size));
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("restaurant_id", self.restaurant_id.to_string())];
        if let Some(pagination) = self.pagination {
            pairs.push(("page", pagination.page.to_string()));
            pairs.push(("page_size", pagination.page_size.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        if let Some(wine_type) = self.wine_type {
            pairs.push(("wine_type", wine_type.to_string()));
        }
        pairs
    }
}

/// Typed wine form, the body of a create request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WineFormData {
    #[validate(custom = "validate_wine_name")]
    pub name: String,
    #[validate(length(max = 255, message = "Producer must be at most 255 characters"))]
    pub producer: Option<String>,
    #[validate(range(min = 1900, max = 2030, message = "Vintage must be between 1900 and 2030"))]
    pub vintage: Option<i32>,
    #[validate(length(max = 100, message = "Varietal must be at most 100 characters"))]
    pub varietal: Option<String>,
    #[validate(length(max = 255, message = "Region must be at most 255 characters"))]
    pub region: Option<String>,
    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,
    pub wine_type: Option<WineType>,
    pub body: Option<WineBody>,
    #[validate(range(min = 1, max = 5, message = "Sweetness must be between 1 and 5"))]
    pub sweetness: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Acidity must be between 1 and 5"))]
    pub acidity: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Tannin must be between 1 and 5"))]
    pub tannin: Option<i32>,
    #[validate(custom = "validate_alcohol_content")]
    pub alcohol_content: Option<Decimal>,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(custom = "validate_cost")]
    pub cost: Option<Decimal>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Inventory count cannot be negative"))]
    pub inventory_count: i32,
    pub tasting_notes: Option<String>,
    #[serde(default = "default_bottle_size")]
    pub bottle_size: String,
    #[validate(length(max = 100, message = "SKU must be at most 100 characters"))]
    pub sku: Option<String>,
}

impl WineFormData {
    /// A form with only the required fields set
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            producer: None,
            vintage: None,
            varietal: None,
            region: None,
            country: None,
            wine_type: None,
            body: None,
            sweetness: None,
            acidity: None,
            tannin: None,
            alcohol_content: None,
            price,
            cost: None,
            inventory_count: 0,
            tasting_notes: None,
            bottle_size: default_bottle_size(),
            sku: None,
        }
    }

    /// Coerce raw form text into a validated form.
    ///
    /// Blank fields are treated as absent, `inventory_count` defaults to 0
    /// and `bottle_size` to 750ml. Every field error is reported at once.
    pub fn from_fields(fields: &FormFields) -> Result<Self, FieldErrors> {
        let mut c = Coercer::new(fields);
        let form = Self {
            name: c.required_text("name", "Wine name is required"),
            producer: c.text("producer"),
            vintage: c.integer("vintage"),
            varietal: c.text("varietal"),
            region: c.text("region"),
            country: c.text("country"),
            wine_type: c.parsed("wine_type", "Invalid wine type"),
            body: c.parsed("body", "Invalid body"),
            sweetness: c.integer("sweetness"),
            acidity: c.integer("acidity"),
            tannin: c.integer("tannin"),
            alcohol_content: c.decimal("alcohol_content"),
            price: c.required_decimal("price", "Price must be greater than 0"),
            cost: c.decimal("cost"),
            inventory_count: c.integer("inventory_count").unwrap_or(0),
            tasting_notes: c.text("tasting_notes"),
            bottle_size: c.text("bottle_size").unwrap_or_else(default_bottle_size),
            sku: c.text("sku"),
        };
        c.finish(form)
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        check(self)
    }
}

/// Body of `POST /wines/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineCreate {
    pub restaurant_id: Uuid,
    #[serde(flatten)]
    pub wine: WineFormData,
}

impl WineCreate {
    pub fn new(restaurant_id: Uuid, wine: WineFormData) -> Self {
        Self { restaurant_id, wine }
    }

    /// Form rules plus the create-only rule that cost stays below price
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = self.wine.check().err().unwrap_or_default();
        if let Some(cost) = self.wine.cost {
            if cost >= self.wine.price && !errors.contains("cost") {
                errors.add("cost", "Cost must be less than price");
            }
        }
        errors.into_result(())
    }
}

/// Body of `PUT /wines/{id}`: only the fields being changed are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct WineUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_wine_name")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Producer must be at most 255 characters"))]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1900, max = 2030, message = "Vintage must be between 1900 and 2030"))]
    pub vintage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Varietal must be at most 100 characters"))]
    pub varietal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Region must be at most 255 characters"))]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<WineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<WineBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Sweetness must be between 1 and 5"))]
    pub sweetness: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Acidity must be between 1 and 5"))]
    pub acidity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Tannin must be between 1 and 5"))]
    pub tannin: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_alcohol_content")]
    pub alcohol_content: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_cost")]
    pub cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Inventory count cannot be negative"))]
    pub inventory_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasting_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottle_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "SKU must be at most 100 characters"))]
    pub sku: Option<String>,
}

impl WineUpdate {
    pub fn is_empty(&self) -> bool {
        *self == WineUpdate::default()
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        check(self)
    }
}
