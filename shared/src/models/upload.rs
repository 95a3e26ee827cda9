//! Bulk CSV import rows and results

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::sale::SaleFormData;
use super::wine::{WineBody, WineFormData, WineType};

/// Column order the wine import expects
pub const WINE_CSV_HEADERS: [&str; 11] = [
    "name",
    "producer",
    "vintage",
    "varietal",
    "region",
    "country",
    "wine_type",
    "body",
    "price",
    "cost",
    "inventory_count",
];

/// Column order the sale import expects
pub const SALE_CSV_HEADERS: [&str; 7] = [
    "wine_name",
    "sale_date",
    "quantity",
    "unit_price",
    "unit_cost",
    "server_name",
    "table_number",
];

/// Outcome of `POST /wines/bulk-upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WineUploadResult {
    pub message: String,
    pub wines_created: u32,
    /// One message per rejected row, `null` when every row imported
    pub errors: Option<Vec<String>>,
}

impl WineUploadResult {
    pub fn rejected_rows(&self) -> usize {
        self.errors.as_ref().map_or(0, Vec::len)
    }
}

/// Outcome of `POST /sales/bulk-upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SaleUploadResult {
    pub message: String,
    pub sales_created: u32,
    pub errors: Option<Vec<String>>,
}

impl SaleUploadResult {
    pub fn rejected_rows(&self) -> usize {
        self.errors.as_ref().map_or(0, Vec::len)
    }
}

/// One line of a wine import file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineCsvRow {
    pub name: String,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    pub varietal: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub wine_type: Option<WineType>,
    pub body: Option<WineBody>,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub inventory_count: i32,
}

impl From<&WineFormData> for WineCsvRow {
    fn from(form: &WineFormData) -> Self {
        Self {
            name: form.name.clone(),
            producer: form.producer.clone(),
            vintage: form.vintage,
            varietal: form.varietal.clone(),
            region: form.region.clone(),
            country: form.country.clone(),
            wine_type: form.wine_type,
            body: form.body,
            price: form.price,
            cost: form.cost,
            inventory_count: form.inventory_count,
        }
    }
}

/// One line of a sale import file. Wines are matched by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleCsvRow {
    pub wine_name: String,
    pub sale_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub unit_cost: Option<Decimal>,
    pub server_name: Option<String>,
    pub table_number: Option<String>,
}

impl SaleCsvRow {
    pub fn from_form(wine_name: impl Into<String>, form: &SaleFormData) -> Self {
        Self {
            wine_name: wine_name.into(),
            sale_date: form.sale_date,
            quantity: form.quantity,
            unit_price: form.unit_price,
            unit_cost: form.unit_cost,
            server_name: form.server_name.clone(),
            table_number: form.table_number.clone(),
        }
    }

    /// Unit price times quantity, as the import records it
    pub fn total_amount(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}
