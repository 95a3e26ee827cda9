//! In-process mock of the Sommelier API for integration tests
//!
//! Serves the routes the tests exercise from in-memory state and counts
//! every request as `"METHOD /path"`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use shared::{
    DashboardSummary, Restaurant, Sale, SaleCreate, SaleCsvRow,
    SaleUploadResult, SalesTrend, SalesTrendResponse, TopBottomWines, Wine, WineCreate,
    WineListResponse, WineSalesMetric, WineUpdate,
};
use sommelier_client::telemetry::init_tracing;
use sommelier_client::{ClientConfig, SommelierClient};
use uuid::Uuid;

pub const SANCERRE: &str = "Sancerre";
pub const BAROLO: &str = "Barolo";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<MockState>,
}

struct MockState {
    restaurant_id: Uuid,
    wines: Mutex<Vec<Wine>>,
    sales: Mutex<Vec<Sale>>,
    hits: Mutex<HashMap<String, usize>>,
    corrupt: AtomicBool,
}

type Rejection = (StatusCode, Json<serde_json::Value>);

fn reject(status: StatusCode, detail: &str) -> Rejection {
    (status, Json(json!({ "detail": detail })))
}

fn wine(restaurant_id: Uuid, name: &str, price: Decimal, cost: Decimal, inventory: i32) -> Wine {
    let now = Utc::now();
    Wine {
        id: Uuid::new_v4(),
        restaurant_id,
        name: name.to_string(),
        producer: None,
        vintage: Some(2020),
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
        cost: Some(cost),
        inventory_count: inventory,
        tasting_notes: None,
        bottle_size: "750ml".to_string(),
        sku: None,
        times_sold: 0,
        created_at: now,
        updated_at: now,
        profit_margin: None,
        markup: None,
    }
}

fn record_sale(wines: &mut [Wine], restaurant_id: Uuid, wine_id: Uuid, row: &SaleCsvRow) -> Option<Sale> {
    let total_amount = row.total_amount()?;
    let wine = wines.iter_mut().find(|w| w.id == wine_id)?;
    wine.times_sold += row.quantity;
    if wine.inventory_count >= row.quantity {
        wine.inventory_count -= row.quantity;
    }
    Some(Sale {
        id: Uuid::new_v4(),
        restaurant_id,
        wine_id,
        sale_date: row.sale_date,
        quantity: row.quantity,
        unit_price: row.unit_price,
        total_amount,
        unit_cost: row.unit_cost,
        server_name: row.server_name.clone(),
        table_number: row.table_number.clone(),
        notes: None,
        created_at: Utc::now(),
        profit: None,
        profit_margin: None,
    })
}

impl MockBackend {
    /// Two wines and one sale of three Barolo bottles
    pub fn seeded() -> Self {
        let restaurant_id = Uuid::new_v4();
        let mut wines = vec![
            wine(restaurant_id, SANCERRE, money(4500), money(1800), 24),
            wine(restaurant_id, BAROLO, money(12000), money(5000), 12),
        ];
        let barolo = wines[1].id;
        let first = SaleCsvRow {
            wine_name: BAROLO.to_string(),
            sale_date: date(2024, 3, 1),
            quantity: 3,
            unit_price: money(12000),
            unit_cost: Some(money(5000)),
            server_name: None,
            table_number: None,
        };
        let sales: Vec<Sale> = record_sale(&mut wines, restaurant_id, barolo, &first)
            .into_iter()
            .collect();

        Self {
            inner: Arc::new(MockState {
                restaurant_id,
                wines: Mutex::new(wines),
                sales: Mutex::new(sales),
                hits: Mutex::new(HashMap::new()),
                corrupt: AtomicBool::new(false),
            }),
        }
    }

    pub fn restaurant_id(&self) -> Uuid {
        self.inner.restaurant_id
    }

    pub fn wine_id(&self, name: &str) -> Uuid {
        let wines = self.inner.wines.lock().unwrap();
        wines.iter().find(|w| w.name == name).unwrap().id
    }

    /// Requests seen for `"METHOD /path"`
    pub fn hits(&self, route: &str) -> usize {
        self.inner.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.inner.hits.lock().unwrap().values().sum()
    }

    /// Make the restaurant list break its schema
    pub fn corrupt_restaurants(&self) {
        self.inner.corrupt.store(true, Ordering::SeqCst);
    }

    /// Serve on an ephemeral port and return a client pointed at it
    pub async fn spawn(self) -> anyhow::Result<(MockBackend, SommelierClient)> {
        let _ = init_tracing(false);
        let app = self.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        let client = SommelierClient::new(&ClientConfig::new(format!("http://{addr}")))?;
        Ok((self, client))
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/v1/wines/", get(list_wines).post(create_wine))
            .route("/api/v1/wines/:id", get(get_wine).put(update_wine))
            .route("/api/v1/sales/", get(list_sales).post(create_sale))
            .route("/api/v1/sales/bulk-upload", post(upload_sales))
            .route("/api/v1/restaurants/", get(list_restaurants))
            .route("/api/v1/analytics/dashboard/:rid", get(dashboard))
            .route("/api/v1/analytics/sales-trends/:rid", get(sales_trends))
            .route("/api/v1/analytics/top-bottom-wines/:rid", get(top_bottom_wines))
            .layer(middleware::from_fn_with_state(self.clone(), count_hits))
            .with_state(self.clone())
    }
}

async fn count_hits(State(mock): State<MockBackend>, request: Request, next: Next) -> Response {
    let route = format!("{} {}", request.method(), request.uri().path());
    *mock.inner.hits.lock().unwrap().entry(route).or_default() += 1;
    next.run(request).await
}

async fn list_wines(State(mock): State<MockBackend>) -> Json<WineListResponse> {
    let wines = mock.inner.wines.lock().unwrap().clone();
    let total = wines.len() as u64;
    Json(WineListResponse {
        wines,
        total,
        page: 1,
        page_size: 50,
        total_pages: 1,
    })
}

async fn get_wine(State(mock): State<MockBackend>, Path(id): Path<Uuid>) -> Result<Json<Wine>, Rejection> {
    let wines = mock.inner.wines.lock().unwrap();
    wines
        .iter()
        .find(|w| w.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Wine not found"))
}

async fn create_wine(State(mock): State<MockBackend>, Json(body): Json<WineCreate>) -> (StatusCode, Json<Wine>) {
    let form = body.wine;
    let mut created = wine(
        body.restaurant_id,
        &form.name,
        form.price,
        form.cost.unwrap_or_default(),
        form.inventory_count,
    );
    created.cost = form.cost;
    mock.inner.wines.lock().unwrap().push(created.clone());
    (StatusCode::CREATED, Json(created))
}

async fn update_wine(
    State(mock): State<MockBackend>,
    Path(id): Path<Uuid>,
    Json(update): Json<WineUpdate>,
) -> Result<Json<Wine>, Rejection> {
    let mut wines = mock.inner.wines.lock().unwrap();
    let wine = wines
        .iter_mut()
        .find(|w| w.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Wine not found"))?;
    if let Some(name) = update.name {
        wine.name = name;
    }
    if let Some(price) = update.price {
        wine.price = price;
    }
    if let Some(inventory) = update.inventory_count {
        wine.inventory_count = inventory;
    }
    wine.updated_at = Utc::now();
    Ok(Json(wine.clone()))
}

/// The real sales list body has no `total_pages`
async fn list_sales(State(mock): State<MockBackend>) -> Json<serde_json::Value> {
    let sales = mock.inner.sales.lock().unwrap().clone();
    Json(json!({
        "total": sales.len(),
        "sales": sales,
        "page": 1,
        "page_size": 50,
    }))
}

async fn create_sale(
    State(mock): State<MockBackend>,
    Json(body): Json<SaleCreate>,
) -> Result<(StatusCode, Json<Sale>), Rejection> {
    let form = body.sale;
    let row = SaleCsvRow::from_form("", &form);
    let mut wines = mock.inner.wines.lock().unwrap();
    let sale = record_sale(&mut wines, body.restaurant_id, form.wine_id, &row)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Wine not found for this restaurant"))?;
    mock.inner.sales.lock().unwrap().push(sale.clone());
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn upload_sales(
    State(mock): State<MockBackend>,
    mut multipart: Multipart,
) -> Result<Json<SaleUploadResult>, Rejection> {
    let mut file = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            if !field.file_name().is_some_and(|name| name.ends_with(".csv")) {
                return Err(reject(StatusCode::BAD_REQUEST, "File must be a CSV"));
            }
            file = field.bytes().await.ok();
        }
    }
    let file = file.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "File is required"))?;

    let restaurant_id = mock.inner.restaurant_id;
    let mut wines = mock.inner.wines.lock().unwrap();
    let mut sales = mock.inner.sales.lock().unwrap();
    let mut errors = Vec::new();
    let mut created = 0;

    let mut reader = csv::Reader::from_reader(file.as_ref());
    for (index, row) in reader.deserialize::<SaleCsvRow>().enumerate() {
        let row_num = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                errors.push(format!("Row {row_num}: {e}"));
                continue;
            }
        };
        let wine_id = wines
            .iter()
            .find(|w| w.name.to_lowercase() == row.wine_name.to_lowercase())
            .map(|w| w.id);
        let Some(wine_id) = wine_id else {
            errors.push(format!("Row {row_num}: Wine '{}' not found in inventory", row.wine_name));
            continue;
        };
        if let Some(sale) = record_sale(&mut wines, restaurant_id, wine_id, &row) {
            sales.push(sale);
            created += 1;
        }
    }

    Ok(Json(SaleUploadResult {
        message: format!("Successfully uploaded {created} sales"),
        sales_created: created,
        errors: (!errors.is_empty()).then_some(errors),
    }))
}

async fn list_restaurants(State(mock): State<MockBackend>) -> Json<Vec<Restaurant>> {
    let email = if mock.inner.corrupt.load(Ordering::SeqCst) {
        "not-an-email"
    } else {
        "cellar@example.com"
    };
    Json(vec![Restaurant {
        id: mock.inner.restaurant_id,
        name: "Chez Nous".to_string(),
        email: email.to_string(),
        phone: None,
        address: None,
        city: None,
        state: None,
        zip_code: None,
        is_active: true,
        subscription_tier: "free".to_string(),
    }])
}

async fn dashboard(State(mock): State<MockBackend>, Path(_rid): Path<Uuid>) -> Json<DashboardSummary> {
    let wines = mock.inner.wines.lock().unwrap();
    let sales = mock.inner.sales.lock().unwrap();
    Json(DashboardSummary {
        total_wines: wines.len() as i64,
        total_bottles_in_stock: wines.iter().map(|w| i64::from(w.inventory_count)).sum(),
        total_sales_last_30_days: sales.iter().map(|s| i64::from(s.quantity)).sum(),
        revenue_last_30_days: sales.iter().map(|s| s.total_amount).sum(),
        profit_last_30_days: None,
        avg_profit_margin: None,
        top_wine_this_month: None,
        slowest_wine: None,
        wines_needing_reorder: 0,
        overstocked_wines: 0,
    })
}

async fn sales_trends(
    State(mock): State<MockBackend>,
    Path(_rid): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let sales = mock.inner.sales.lock().unwrap();
    let parse = |name: &str| query.get(name).and_then(|v| v.parse::<NaiveDate>().ok());
    let start = parse("start_date").unwrap_or(date(2024, 1, 1));
    let end = parse("end_date").unwrap_or(date(2024, 12, 31));

    let mut by_day: Vec<SalesTrend> = Vec::new();
    for sale in sales.iter().filter(|s| s.sale_date >= start && s.sale_date <= end) {
        match by_day.iter_mut().find(|t| t.date == sale.sale_date) {
            Some(day) => {
                day.total_sales += i64::from(sale.quantity);
                day.total_revenue += sale.total_amount;
            }
            None => by_day.push(SalesTrend {
                date: sale.sale_date,
                total_sales: i64::from(sale.quantity),
                total_revenue: sale.total_amount,
                total_profit: None,
                unique_wines_sold: 1,
            }),
        }
    }
    by_day.sort_by_key(|t| t.date);
    Json(SalesTrendResponse::summarize(start, end, by_day))
}

async fn top_bottom_wines(State(mock): State<MockBackend>, Path(_rid): Path<Uuid>) -> Json<TopBottomWines> {
    let wines = mock.inner.wines.lock().unwrap();
    let sales = mock.inner.sales.lock().unwrap();
    let metrics = wines
        .iter()
        .map(|wine| {
            let sold: Vec<&Sale> = sales.iter().filter(|s| s.wine_id == wine.id).collect();
            WineSalesMetric {
                wine_id: wine.id,
                wine_name: wine.name.clone(),
                producer: wine.producer.clone(),
                vintage: wine.vintage,
                total_bottles_sold: sold.iter().map(|s| i64::from(s.quantity)).sum(),
                total_revenue: sold.iter().map(|s| s.total_amount).sum(),
                total_profit: None,
                avg_price: wine.price,
                profit_margin: None,
                last_sale_date: sold.iter().map(|s| s.sale_date).max(),
                days_since_last_sale: None,
            }
        })
        .collect();
    Json(TopBottomWines::rank(metrics, 10))
}
