//! Sales transaction models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::{DateRange, Pagination};
use crate::validation::{
    check, validate_price, validate_total_amount, validate_unit_cost, Coercer, FieldErrors,
    FormFields,
};

/// A recorded bottle sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Sale {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub wine_id: Uuid,
    pub sale_date: NaiveDate,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom = "validate_price")]
    pub unit_price: Decimal,
    #[validate(custom = "validate_total_amount")]
    pub total_amount: Decimal,
    #[validate(custom = "validate_unit_cost")]
    pub unit_cost: Option<Decimal>,
    #[validate(length(max = 100, message = "Server name must be at most 100 characters"))]
    pub server_name: Option<String>,
    #[validate(length(max = 20, message = "Table number must be at most 20 characters"))]
    pub table_number: Option<String>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Server-computed, read-only
    pub profit: Option<Decimal>,
    /// Server-computed, read-only
    pub profit_margin: Option<f64>,
}

impl Sale {
    /// Quantity times (unit price - unit cost), when the cost was captured
    pub fn computed_profit(&self) -> Option<Decimal> {
        let per_bottle = self.unit_price.checked_sub(self.unit_cost?)?;
        per_bottle.checked_mul(Decimal::from(self.quantity))
    }
}

/// Paginated sales list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SaleListResponse {
    #[validate]
    pub sales: Vec<Sale>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    /// The sales endpoint does not send this; see [`SaleListResponse::page_count`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl SaleListResponse {
    /// Total pages, derived from `total` and `page_size` when not sent
    pub fn page_count(&self) -> u64 {
        self.total_pages
            .unwrap_or_else(|| Pagination::new(self.page, self.page_size).total_pages(self.total))
    }
}

/// Filters for the sales list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaleListParams {
    pub restaurant_id: Uuid,
    pub range: DateRange,
    pub wine_id: Option<Uuid>,
    pub pagination: Option<Pagination>,
}

impl SaleListParams {
    pub fn new(restaurant_id: Uuid) -> Self {
        Self {
            restaurant_id,
            range: DateRange::default(),
            wine_id: None,
            pagination: None,
        }
    }

    pub fn between(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.range = DateRange::new(start_date, end_date);
        self
    }

    pub fn for_wine(mut self, wine_id: Uuid) -> Self {
        self.wine_id = Some(wine_id);
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.pagination = Some(Pagination::new(page, page_size));
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("restaurant_id", self.restaurant_id.to_string())];
        pairs.extend(self.range.query_pairs());
        if let Some(wine_id) = self.wine_id {
            pairs.push(("wine_id", wine_id.to_string()));
        }
        if let Some(pagination) = self.pagination {
            pairs.push(("page", pagination.page.to_string()));
            pairs.push(("page_size", pagination.page_size.to_string()));
        }
        pairs
    }
}

/// Typed sale form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SaleFormData {
    pub wine_id: Uuid,
    pub sale_date: NaiveDate,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom = "validate_price")]
    pub unit_price: Decimal,
    #[validate(custom = "validate_unit_cost")]
    pub unit_cost: Option<Decimal>,
    #[validate(length(max = 100, message = "Server name must be at most 100 characters"))]
    pub server_name: Option<String>,
    #[validate(length(max = 20, message = "Table number must be at most 20 characters"))]
    pub table_number: Option<String>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl SaleFormData {
    pub fn new(wine_id: Uuid, sale_date: NaiveDate, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            wine_id,
            sale_date,
            quantity,
            unit_price,
            unit_cost: None,
            server_name: None,
            table_number: None,
            notes: None,
        }
    }

    /// Coerce raw form text into a validated sale form
    pub fn from_fields(fields: &FormFields) -> Result<Self, FieldErrors> {
        let mut c = Coercer::new(fields);
        let wine_id = c.uuid("wine_id", "Please select a wine");
        let sale_date = c.date("sale_date", "Sale date is required");
        let form = Self {
            wine_id: wine_id.unwrap_or_else(Uuid::nil),
            sale_date: sale_date.unwrap_or(NaiveDate::MIN),
            quantity: c.required_integer("quantity", "Quantity must be at least 1"),
            unit_price: c.required_decimal("unit_price", "Price must be greater than 0"),
            unit_cost: c.decimal("unit_cost"),
            server_name: c.text("server_name"),
            table_number: c.text("table_number"),
            notes: c.text("notes"),
        };
        c.finish(form)
    }

    /// Line total the server will record: unit price times quantity.
    /// `None` if the product does not fit a `Decimal`.
    pub fn total_amount(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        check(self)
    }
}

/// Body of `POST /sales/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleCreate {
    pub restaurant_id: Uuid,
    #[serde(flatten)]
    pub sale: SaleFormData,
}

impl SaleCreate {
    pub fn new(restaurant_id: Uuid, sale: SaleFormData) -> Self {
        Self { restaurant_id, sale }
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        self.sale.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_sale() -> Sale {
        Sale {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            wine_id: Uuid::new_v4(),
            sale_date: date(2024, 5, 17),
            quantity: 2,
            unit_price: Decimal::new(4500, 2),
            total_amount: Decimal::new(9000, 2),
            unit_cost: Some(Decimal::new(1500, 2)),
            server_name: Some("Ana".to_string()),
            table_number: Some("12".to_string()),
            notes: None,
            created_at: Utc::now(),
            profit: Some(Decimal::new(6000, 2)),
            profit_margin: Some(66.67),
        }
    }

    #[test]
    fn test_valid_sale_passes() {
        assert!(check(&sample_sale()).is_ok());
    }

    #[test]
    fn test_sale_rejects_bad_amounts() {
        let mut sale = sample_sale();
        sale.quantity = 0;
        sale.unit_price = Decimal::ZERO;
        sale.total_amount = Decimal::from(-1);
        sale.unit_cost = Some(Decimal::new(-1, 2));
        let errors = check(&sale).unwrap_err();
        assert_eq!(errors.first("quantity"), Some("Quantity must be at least 1"));
        assert_eq!(errors.first("unit_price"), Some("Price must be greater than 0"));
        assert_eq!(errors.first("total_amount"), Some("Total amount must be greater than 0"));
        assert_eq!(errors.first("unit_cost"), Some("Unit cost cannot be negative"));
    }

    #[test]
    fn test_sale_rejects_long_metadata() {
        let mut sale = sample_sale();
        sale.table_number = Some("T".repeat(21));
        sale.notes = Some("n".repeat(501));
        let errors = check(&sale).unwrap_err();
        assert!(errors.contains("table_number"));
        assert!(errors.contains("notes"));
        assert!(!errors.contains("server_name"));
    }

    #[test]
    fn test_sale_round_trip() {
        let sale = sample_sale();
        let json = serde_json::to_string(&sale).unwrap();
        assert!(json.contains("\"sale_date\":\"2024-05-17\""));
        let decoded: Sale = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, sale);
    }

    #[test]
    fn test_sale_accepts_numeric_amounts_on_decode() {
        let mut value = serde_json::to_value(sample_sale()).unwrap();
        value["unit_price"] = serde_json::json!(45.0);
        value["total_amount"] = serde_json::json!(90);
        let decoded: Sale = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.unit_price, Decimal::from(45));
        assert_eq!(decoded.total_amount, Decimal::from(90));
    }

    #[test]
    fn test_list_response_without_total_pages() {
        let body = serde_json::json!({
            "sales": [serde_json::to_value(sample_sale()).unwrap()],
            "total": 120,
            "page": 1,
            "page_size": 50
        });
        let list: SaleListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(list.total_pages, None);
        assert_eq!(list.page_count(), 3);
        assert!(check(&list).is_ok());
    }

    #[test]
    fn test_form_total_overflow_rejected() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let form = SaleFormData::new(Uuid::new_v4(), date(2024, 5, 17), 3, huge);
        let errors = form.check().unwrap_err();
        assert_eq!(errors.first("unit_price"), Some("Amount must be at most 99999999.99"));
        assert_eq!(form.total_amount(), None);
    }

    #[test]
    fn test_computed_profit() {
        assert_eq!(sample_sale().computed_profit(), Some(Decimal::from(60)));
        let mut sale = sample_sale();
        sale.unit_cost = None;
        assert_eq!(sale.computed_profit(), None);
    }

    #[test]
    fn test_form_from_fields() {
        let wine_id = Uuid::new_v4();
        let fields = FormFields::new()
            .with("wine_id", wine_id.to_string())
            .with("sale_date", "2024-05-17")
            .with("quantity", "2")
            .with("unit_price", "45.00")
            .with("server_name", "");
        let form = SaleFormData::from_fields(&fields).unwrap();
        assert_eq!(form.wine_id, wine_id);
        assert_eq!(form.quantity, 2);
        assert_eq!(form.server_name, None);
        assert_eq!(form.total_amount(), Some(Decimal::new(9000, 2)));
    }

    #[test]
    fn test_form_reports_missing_fields() {
        let fields = FormFields::new().with("quantity", "0").with("unit_price", "-3");
        let errors = SaleFormData::from_fields(&fields).unwrap_err();
        assert_eq!(errors.first("wine_id"), Some("Please select a wine"));
        assert_eq!(errors.first("sale_date"), Some("Sale date is required"));
        assert_eq!(errors.first("quantity"), Some("Quantity must be at least 1"));
        assert_eq!(errors.first("unit_price"), Some("Price must be greater than 0"));
    }

    #[test]
    fn test_form_rejects_fractional_quantity() {
        let fields = FormFields::new()
            .with("wine_id", Uuid::new_v4().to_string())
            .with("sale_date", "2024-05-17")
            .with("quantity", "1.5")
            .with("unit_price", "12");
        let errors = SaleFormData::from_fields(&fields).unwrap_err();
        assert_eq!(errors.first("quantity"), Some("Expected a whole number"));
    }

    #[test]
    fn test_create_body_omits_total() {
        let create = SaleCreate::new(
            Uuid::new_v4(),
            SaleFormData::new(Uuid::new_v4(), date(2024, 5, 17), 2, Decimal::from(45)),
        );
        let value = serde_json::to_value(&create).unwrap();
        assert!(value.get("total_amount").is_none());
        assert_eq!(value["quantity"], 2);
    }

    #[test]
    fn test_list_params_query_pairs() {
        let restaurant_id = Uuid::new_v4();
        let wine_id = Uuid::new_v4();
        let params = SaleListParams::new(restaurant_id)
            .between(date(2024, 1, 1), date(2024, 1, 31))
            .for_wine(wine_id);
        let pairs = params.query_pairs();
        assert_eq!(pairs[0], ("restaurant_id", restaurant_id.to_string()));
        assert!(pairs.contains(&("start_date", "2024-01-01".to_string())));
        assert!(pairs.contains(&("end_date", "2024-01-31".to_string())));
        assert!(pairs.contains(&("wine_id", wine_id.to_string())));
    }
}
