use shared::{
    DashboardSummary, DateRange, InventoryHealth, ProfitAnalysis, SalesTrendResponse,
    TopBottomParams, TopBottomWines,
};
use uuid::Uuid;

use super::keys::{
    dashboard_key, inventory_health_key, profit_analysis_key, sales_trends_key,
    top_bottom_wines_key,
};
use super::{SommelierClient, Target};
use crate::query::{fetcher, Query};

impl SommelierClient {
    pub fn dashboard_summary_target(&self, restaurant_id: Option<Uuid>) -> Target<DashboardSummary> {
        let restaurant_id = restaurant_id?;
        let api = self.api.clone();
        Some((
            dashboard_key(restaurant_id),
            fetcher(move || {
                let api = api.clone();
                async move { api.dashboard_summary(restaurant_id).await }
            }),
        ))
    }

    pub fn dashboard_summary(&self, restaurant_id: Option<Uuid>) -> Query<DashboardSummary> {
        self.query(self.dashboard_summary_target(restaurant_id))
    }

    pub fn top_bottom_wines_target(
        &self,
        restaurant_id: Option<Uuid>,
        params: TopBottomParams,
    ) -> Target<TopBottomWines> {
        let restaurant_id = restaurant_id?;
        let api = self.api.clone();
        Some((
            top_bottom_wines_key(restaurant_id, &params),
            fetcher(move || {
                let api = api.clone();
                async move { api.top_bottom_wines(restaurant_id, &params).await }
            }),
        ))
    }

    pub fn top_bottom_wines(
        &self,
        restaurant_id: Option<Uuid>,
        params: TopBottomParams,
    ) -> Query<TopBottomWines> {
        self.query(self.top_bottom_wines_target(restaurant_id, params))
    }

    pub fn sales_trends_target(
        &self,
        restaurant_id: Option<Uuid>,
        range: DateRange,
    ) -> Target<SalesTrendResponse> {
        let restaurant_id = restaurant_id?;
        let api = self.api.clone();
        Some((
            sales_trends_key(restaurant_id, &range),
            fetcher(move || {
                let api = api.clone();
                async move { api.sales_trends(restaurant_id, &range).await }
            }),
        ))
    }

    pub fn sales_trends(&self, restaurant_id: Option<Uuid>, range: DateRange) -> Query<SalesTrendResponse> {
        self.query(self.sales_trends_target(restaurant_id, range))
    }

    pub fn inventory_health_target(&self, restaurant_id: Option<Uuid>) -> Target<Vec<InventoryHealth>> {
        let restaurant_id = restaurant_id?;
        let api = self.api.clone();
        Some((
            inventory_health_key(restaurant_id),
            fetcher(move || {
                let api = api.clone();
                async move { api.inventory_health(restaurant_id).await }
            }),
        ))
    }

    pub fn inventory_health(&self, restaurant_id: Option<Uuid>) -> Query<Vec<InventoryHealth>> {
        self.query(self.inventory_health_target(restaurant_id))
    }

    pub fn profit_analysis_target(&self, restaurant_id: Option<Uuid>) -> Target<Vec<ProfitAnalysis>> {
        let restaurant_id = restaurant_id?;
        let api = self.api.clone();
        Some((
            profit_analysis_key(restaurant_id),
            fetcher(move || {
                let api = api.clone();
                async move { api.profit_analysis(restaurant_id).await }
            }),
        ))
    }

    pub fn profit_analysis(&self, restaurant_id: Option<Uuid>) -> Query<Vec<ProfitAnalysis>> {
        self.query(self.profit_analysis_target(restaurant_id))
    }
}
