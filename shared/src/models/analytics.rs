//! Analytics aggregates returned by the dashboard endpoints

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::pricing::{markup_percent, profit_margin_percent, recommended_price};
use super::wine::Wine;

/// Days of sales history used for velocity figures
pub const SALES_WINDOW_DAYS: u32 = 30;
/// Stock runway below which a reorder is recommended
pub const REORDER_RUNWAY_DAYS: i64 = 7;
/// Stock runway above which a wine counts as overstocked
pub const OVERSTOCK_RUNWAY_DAYS: i64 = 90;
/// Bottles on hand a wine needs before it can be overstocked
pub const OVERSTOCK_MIN_INVENTORY: i32 = 20;
/// Placeholder runway used when ordering wines that are not selling
const NO_RUNWAY_SORT_KEY: i64 = 999;

/// Sales performance of one wine over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WineSalesMetric {
    pub wine_id: Uuid,
    pub wine_name: String,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    #[validate(range(min = 0, message = "Bottles sold cannot be negative"))]
    pub total_bottles_sold: i64,
    pub total_revenue: Decimal,
    pub total_profit: Option<Decimal>,
    pub avg_price: Decimal,
    pub profit_margin: Option<f64>,
    pub last_sale_date: Option<NaiveDate>,
    pub days_since_last_sale: Option<i64>,
}

/// Best and worst sellers for a period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TopBottomWines {
    #[validate]
    pub top_sellers: Vec<WineSalesMetric>,
    #[validate]
    pub slow_movers: Vec<WineSalesMetric>,
}

impl TopBottomWines {
    /// Rank by bottles sold. Slow movers are only reported once there are
    /// more wines than fit in the top list.
    pub fn rank(mut metrics: Vec<WineSalesMetric>, limit: usize) -> Self {
        metrics.sort_by(|a, b| b.total_bottles_sold.cmp(&a.total_bottles_sold));
        let slow_movers = if metrics.len() > limit {
            metrics[metrics.len() - limit..].to_vec()
        } else {
            Vec::new()
        };
        metrics.truncate(limit);
        Self {
            top_sellers: metrics,
            slow_movers,
        }
    }
}

/// One day of sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SalesTrend {
    pub date: NaiveDate,
    #[validate(range(min = 0, message = "Total sales cannot be negative"))]
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub total_profit: Option<Decimal>,
    #[validate(range(min = 0, message = "Unique wines sold cannot be negative"))]
    pub unique_wines_sold: i64,
}

/// Daily sales series with period totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SalesTrendResponse {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[validate]
    pub trends: Vec<SalesTrend>,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub avg_daily_sales: f64,
}

impl SalesTrendResponse {
    /// Totals and the per-day average over the inclusive period
    pub fn summarize(period_start: NaiveDate, period_end: NaiveDate, trends: Vec<SalesTrend>) -> Self {
        let total_sales: i64 = trends.iter().map(|t| t.total_sales).sum();
        let total_revenue: Decimal = trends.iter().map(|t| t.total_revenue).sum();
        let days = (period_end - period_start).num_days() + 1;
        let avg_daily_sales = if days > 0 {
            total_sales as f64 / days as f64
        } else {
            0.0
        };
        Self {
            period_start,
            period_end,
            trends,
            total_sales,
            total_revenue,
            avg_daily_sales,
        }
    }
}

/// Stock runway projection for one wine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InventoryHealth {
    pub wine_id: Uuid,
    pub wine_name: String,
    pub current_inventory: i32,
    #[validate(range(min = 0.0, message = "Average daily sales cannot be negative"))]
    pub avg_daily_sales: f64,
    /// `None` when the wine is not selling
    pub days_until_stockout: Option<i64>,
    pub reorder_recommended: bool,
    pub overstocked: bool,
}

impl InventoryHealth {
    /// Project runway from bottles sold over the last [`SALES_WINDOW_DAYS`]
    pub fn assess(
        wine_id: Uuid,
        wine_name: impl Into<String>,
        current_inventory: i32,
        bottles_sold: i64,
    ) -> Self {
        let avg_daily_sales = bottles_sold.max(0) as f64 / f64::from(SALES_WINDOW_DAYS);
        let days_until_stockout = if avg_daily_sales > 0.0 {
            Some((f64::from(current_inventory) / avg_daily_sales).floor() as i64)
        } else {
            None
        };
        let reorder_recommended = matches!(days_until_stockout, Some(days) if days < REORDER_RUNWAY_DAYS);
        let overstocked = current_inventory > OVERSTOCK_MIN_INVENTORY
            && days_until_stockout.map_or(true, |days| days > OVERSTOCK_RUNWAY_DAYS);

        Self {
            wine_id,
            wine_name: wine_name.into(),
            current_inventory,
            avg_daily_sales: (avg_daily_sales * 100.0).round() / 100.0,
            days_until_stockout,
            reorder_recommended,
            overstocked,
        }
    }

    fn urgency(&self) -> (bool, i64) {
        (
            !self.reorder_recommended,
            self.days_until_stockout.unwrap_or(NO_RUNWAY_SORT_KEY),
        )
    }

    /// Reorders first, then shortest runway
    pub fn sort_by_urgency(items: &mut [InventoryHealth]) {
        items.sort_by_key(InventoryHealth::urgency);
    }
}

/// Margin and pricing recommendation for one wine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfitAnalysis {
    pub wine_id: Uuid,
    pub wine_name: String,
    pub cost: Decimal,
    pub price: Decimal,
    pub profit_per_bottle: Decimal,
    pub profit_margin: f64,
    pub markup_percentage: f64,
    pub total_profit_ytd: Decimal,
    pub recommended_price: Option<Decimal>,
}

impl ProfitAnalysis {
    /// Analysis for a wine with a known positive cost, `None` otherwise
    pub fn for_wine(wine: &Wine, total_profit_ytd: Decimal) -> Option<Self> {
        let cost = wine.cost?;
        let margin = profit_margin_percent(wine.price, cost)?;
        let markup = markup_percent(wine.price, cost)?;
        Some(Self {
            wine_id: wine.id,
            wine_name: wine.name.clone(),
            cost,
            price: wine.price,
            profit_per_bottle: wine.price - cost,
            profit_margin: margin.to_f64().unwrap_or_default(),
            markup_percentage: markup.to_f64().unwrap_or_default(),
            total_profit_ytd,
            recommended_price: recommended_price(wine.price, cost),
        })
    }

    /// Lowest margin first
    pub fn sort_by_margin(items: &mut [ProfitAnalysis]) {
        items.sort_by(|a, b| a.profit_margin.total_cmp(&b.profit_margin));
    }
}

/// Restaurant-wide rollup for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DashboardSummary {
    #[validate(range(min = 0))]
    pub total_wines: i64,
    #[validate(range(min = 0))]
    pub total_bottles_in_stock: i64,
    #[validate(range(min = 0))]
    pub total_sales_last_30_days: i64,
    pub revenue_last_30_days: Decimal,
    pub profit_last_30_days: Option<Decimal>,
    pub avg_profit_margin: Option<f64>,
    pub top_wine_this_month: Option<String>,
    pub slowest_wine: Option<String>,
    #[validate(range(min = 0))]
    pub wines_needing_reorder: i64,
    #[validate(range(min = 0))]
    pub overstocked_wines: i64,
}

impl DashboardSummary {
    /// Whether anything needs the owner's attention
    pub fn needs_attention(&self) -> bool {
        self.wines_needing_reorder > 0 || self.overstocked_wines > 0
    }
}
