//! Wire format tests for the analytics aggregates
//!
//! Property-based tests that every aggregate decodes back to the value it
//! was encoded from:
//! - Money keeps its scale
//! - Optional fields survive as `null`
//! - Nested metric lists keep their order

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{
    DashboardSummary, InventoryHealth, ProfitAnalysis, SalesTrend, SalesTrendResponse,
    TopBottomWines, WineSalesMetric,
};
use std::fmt::Debug;
use uuid::Uuid;

fn round_trip<T>(value: &T) -> T
where
    T: Serialize + DeserializeOwned,
{
    let json = serde_json::to_string(value).unwrap();
    serde_json::from_str(&json).unwrap()
}

fn assert_round_trip<T>(value: &T) -> Result<(), TestCaseError>
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
{
    prop_assert_eq!(&round_trip(value), value);
    Ok(())
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn money() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000, 0u32..=4).prop_map(|(units, scale)| Decimal::new(units, scale))
}

/// Percentages with two decimals, as the API reports them
fn percent() -> impl Strategy<Value = f64> {
    (-100_000i64..100_000).prop_map(|hundredths| hundredths as f64 / 100.0)
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (730_000i32..740_000).prop_map(|days| NaiveDate::from_num_days_from_ce_opt(days).unwrap())
}

fn id() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z' ]{1,24}"
}

fn metric() -> impl Strategy<Value = WineSalesMetric> {
    (
        id(),
        name(),
        prop::option::of(name()),
        prop::option::of(1900i32..=2030),
        0i64..10_000,
        money(),
        prop::option::of(money()),
        money(),
        prop::option::of(percent()),
        prop::option::of(date()),
        prop::option::of(0i64..400),
    )
        .prop_map(
            |(
                wine_id,
                wine_name,
                producer,
                vintage,
                total_bottles_sold,
                total_revenue,
                total_profit,
                avg_price,
                profit_margin,
                last_sale_date,
                days_since_last_sale,
            )| WineSalesMetric {
                wine_id,
                wine_name,
                producer,
                vintage,
                total_bottles_sold,
                total_revenue,
                total_profit,
                avg_price,
                profit_margin,
                last_sale_date,
                days_since_last_sale,
            },
        )
}

fn trend() -> impl Strategy<Value = SalesTrend> {
    (date(), 0i64..500, money(), prop::option::of(money()), 0i64..50).prop_map(
        |(date, total_sales, total_revenue, total_profit, unique_wines_sold)| SalesTrend {
            date,
            total_sales,
            total_revenue,
            total_profit,
            unique_wines_sold,
        },
    )
}

fn dashboard() -> impl Strategy<Value = DashboardSummary> {
    (
        0i64..1_000,
        0i64..100_000,
        0i64..10_000,
        money(),
        prop::option::of(money()),
        prop::option::of(percent()),
        prop::option::of(name()),
        prop::option::of(name()),
        0i64..100,
        0i64..100,
    )
        .prop_map(
            |(
                total_wines,
                total_bottles_in_stock,
                total_sales_last_30_days,
                revenue_last_30_days,
                profit_last_30_days,
                avg_profit_margin,
                top_wine_this_month,
                slowest_wine,
                wines_needing_reorder,
                overstocked_wines,
            )| DashboardSummary {
                total_wines,
                total_bottles_in_stock,
                total_sales_last_30_days,
                revenue_last_30_days,
                profit_last_30_days,
                avg_profit_margin,
                top_wine_this_month,
                slowest_wine,
                wines_needing_reorder,
                overstocked_wines,
            },
        )
}

fn profit_analysis() -> impl Strategy<Value = ProfitAnalysis> {
    (
        id(),
        name(),
        money(),
        money(),
        money(),
        percent(),
        percent(),
        money(),
        prop::option::of(money()),
    )
        .prop_map(
            |(
                wine_id,
                wine_name,
                cost,
                price,
                profit_per_bottle,
                profit_margin,
                markup_percentage,
                total_profit_ytd,
                recommended_price,
            )| ProfitAnalysis {
                wine_id,
                wine_name,
                cost,
                price,
                profit_per_bottle,
                profit_margin,
                markup_percentage,
                total_profit_ytd,
                recommended_price,
            },
        )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_money_keeps_scale() {
        let trend = SalesTrend {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_sales: 3,
            total_revenue: Decimal::new(13500, 2),
            total_profit: None,
            unique_wines_sold: 1,
        };
        let json = serde_json::to_string(&trend).unwrap();
        assert!(json.contains("\"total_revenue\":\"135.00\""));
        assert_eq!(round_trip(&trend).total_revenue.scale(), 2);
    }

    #[test]
    fn test_assessed_health_round_trips() {
        let health = InventoryHealth::assess(Uuid::new_v4(), "Barolo", 12, 45);
        assert_eq!(round_trip(&health), health);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_dashboard_round_trip(summary in dashboard()) {
            assert_round_trip(&summary)?;
        }

        #[test]
        fn prop_top_bottom_round_trip(
            top_sellers in prop::collection::vec(metric(), 0..6),
            slow_movers in prop::collection::vec(metric(), 0..6),
        ) {
            assert_round_trip(&TopBottomWines { top_sellers, slow_movers })?;
        }

        #[test]
        fn prop_sales_trends_round_trip(
            period_start in date(),
            period_end in date(),
            trends in prop::collection::vec(trend(), 0..10),
            avg_daily_sales in percent(),
        ) {
            let response = SalesTrendResponse {
                period_start,
                period_end,
                total_sales: trends.iter().map(|t| t.total_sales).sum(),
                total_revenue: trends.iter().map(|t| t.total_revenue).sum(),
                trends,
                avg_daily_sales,
            };
            assert_round_trip(&response)?;
        }

        #[test]
        fn prop_inventory_health_round_trip(
            wine_id in id(),
            wine_name in name(),
            inventory in 0i32..500,
            sold in 0i64..1_000,
        ) {
            assert_round_trip(&InventoryHealth::assess(wine_id, wine_name, inventory, sold))?;
        }

        #[test]
        fn prop_profit_analysis_round_trip(analysis in profit_analysis()) {
            assert_round_trip(&analysis)?;
        }
    }
}
