//! Typed HTTP client for the Sommelier REST API

use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    check, DashboardSummary, DateRange, FieldErrors, InventoryHealth, ProfitAnalysis, Restaurant,
    RestaurantFormData, Sale, SaleCreate, SaleListParams, SaleListResponse, SaleUploadResult,
    SalesTrendResponse, TopBottomParams, TopBottomWines, Wine, WineCreate, WineListParams,
    WineListResponse, WineUpdate, WineUploadResult,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, ErrorBody};
use crate::upload::UploadFile;

/// A response body with its own validation rules. Decoded bodies that
/// break them are rejected before reaching the caller.
pub trait Schema: DeserializeOwned {
    fn verify(&self) -> Result<(), FieldErrors>;
}

macro_rules! validated_schema {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Schema for $ty {
                fn verify(&self) -> Result<(), FieldErrors> {
                    check(self)
                }
            }
        )*
    };
}

validated_schema!(
    Wine,
    WineListResponse,
    WineUploadResult,
    Sale,
    SaleListResponse,
    SaleUploadResult,
    Restaurant,
    DashboardSummary,
    TopBottomWines,
    SalesTrendResponse,
    InventoryHealth,
    ProfitAnalysis,
);

impl<T: Schema> Schema for Vec<T> {
    fn verify(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (index, item) in self.iter().enumerate() {
            let Err(item_errors) = item.verify() else {
                continue;
            };
            for field in item_errors.fields() {
                for message in item_errors.get(field).unwrap_or_default() {
                    errors.add(format!("[{index}].{field}"), message.clone());
                }
            }
        }
        errors.into_result(())
    }
}

const NO_QUERY: &[(&str, &str)] = &[];

/// HTTP client for the `/api/v1` endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.api_base(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: Schema, Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> ClientResult<T> {
        let request = self.client.get(self.url(path)).query(query);
        self.send(path, request).await
    }

    async fn post<T: Schema, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(path, request).await
    }

    async fn put<T: Schema, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let request = self.client.put(self.url(path)).json(body);
        self.send(path, request).await
    }

    /// Deletes answer 204 with no body
    async fn delete(&self, path: &str) -> ClientResult<()> {
        debug!(path, "DELETE");
        let response = self.client.delete(self.url(path)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn upload<T: Schema>(&self, path: &str, restaurant_id: Uuid, file: UploadFile) -> ClientResult<T> {
        file.check()?;
        let form = Form::new().part("file", file.into_part()?);
        let request = self
            .client
            .post(self.url(path))
            .query(&[("restaurant_id", restaurant_id.to_string())])
            .multipart(form);
        self.send(path, request).await
    }

    async fn send<T: Schema>(&self, path: &str, request: RequestBuilder) -> ClientResult<T> {
        debug!(path, "request");
        let response = request.send().await?;
        Self::handle_response(path, response).await
    }

    /// Map a non-success status to `ClientError::Api`, keeping the
    /// server's `detail` when it sent one
    async fn check_status(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::message);
        warn!(status = status.as_u16(), detail = ?message, "request rejected");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn handle_response<T: Schema>(path: &str, response: Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        let body: T = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("{path}: {e}")))?;
        body.verify()
            .map_err(|errors| ClientError::InvalidResponse(format!("{path}: {errors}")))?;
        Ok(body)
    }

    // ========== Wines ==========

    pub async fn list_wines(&self, params: &WineListParams) -> ClientResult<WineListResponse> {
        self.get("/wines/", &params.query_pairs()).await
    }

    pub async fn get_wine(&self, wine_id: Uuid) -> ClientResult<Wine> {
        self.get(&format!("/wines/{wine_id}"), NO_QUERY).await
    }

    pub async fn create_wine(&self, wine: &WineCreate) -> ClientResult<Wine> {
        wine.check()?;
        self.post("/wines/", wine).await
    }

    pub async fn update_wine(&self, wine_id: Uuid, update: &WineUpdate) -> ClientResult<Wine> {
        update.check()?;
        self.put(&format!("/wines/{wine_id}"), update).await
    }

    pub async fn delete_wine(&self, wine_id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/wines/{wine_id}")).await
    }

    pub async fn upload_wines(&self, restaurant_id: Uuid, file: UploadFile) -> ClientResult<WineUploadResult> {
        self.upload("/wines/bulk-upload", restaurant_id, file).await
    }

    // ========== Sales ==========

    pub async fn list_sales(&self, params: &SaleListParams) -> ClientResult<SaleListResponse> {
        self.get("/sales/", &params.query_pairs()).await
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> ClientResult<Sale> {
        self.get(&format!("/sales/{sale_id}"), NO_QUERY).await
    }

    pub async fn create_sale(&self, sale: &SaleCreate) -> ClientResult<Sale> {
        sale.check()?;
        self.post("/sales/", sale).await
    }

    pub async fn delete_sale(&self, sale_id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/sales/{sale_id}")).await
    }

    pub async fn upload_sales(&self, restaurant_id: Uuid, file: UploadFile) -> ClientResult<SaleUploadResult> {
        self.upload("/sales/bulk-upload", restaurant_id, file).await
    }

    // ========== Restaurants ==========

    pub async fn list_restaurants(&self) -> ClientResult<Vec<Restaurant>> {
        self.get("/restaurants/", NO_QUERY).await
    }

    pub async fn get_restaurant(&self, restaurant_id: Uuid) -> ClientResult<Restaurant> {
        self.get(&format!("/restaurants/{restaurant_id}"), NO_QUERY).await
    }

    pub async fn create_restaurant(&self, restaurant: &RestaurantFormData) -> ClientResult<Restaurant> {
        restaurant.check()?;
        self.post("/restaurants/", restaurant).await
    }

    // ========== Analytics ==========

    pub async fn dashboard_summary(&self, restaurant_id: Uuid) -> ClientResult<DashboardSummary> {
        self.get(&format!("/analytics/dashboard/{restaurant_id}"), NO_QUERY)
            .await
    }

    pub async fn top_bottom_wines(
        &self,
        restaurant_id: Uuid,
        params: &TopBottomParams,
    ) -> ClientResult<TopBottomWines> {
        self.get(
            &format!("/analytics/top-bottom-wines/{restaurant_id}"),
            &params.query_pairs(),
        )
        .await
    }

    pub async fn sales_trends(&self, restaurant_id: Uuid, range: &DateRange) -> ClientResult<SalesTrendResponse> {
        self.get(
            &format!("/analytics/sales-trends/{restaurant_id}"),
            &range.query_pairs(),
        )
        .await
    }

    pub async fn inventory_health(&self, restaurant_id: Uuid) -> ClientResult<Vec<InventoryHealth>> {
        self.get(&format!("/analytics/inventory-health/{restaurant_id}"), NO_QUERY)
            .await
    }

    pub async fn profit_analysis(&self, restaurant_id: Uuid) -> ClientResult<Vec<ProfitAnalysis>> {
        self.get(&format!("/analytics/profit-analysis/{restaurant_id}"), NO_QUERY)
            .await
    }
}
