//! Cache keys for each read hook. The tenant id always comes first so a
//! key can be narrowed to one restaurant.

use shared::{DateRange, SaleListParams, TopBottomParams, WineListParams};
use uuid::Uuid;

use crate::cache::{QueryFamily, QueryKey};

fn without_tenant(pairs: Vec<(&'static str, String)>) -> impl Iterator<Item = (&'static str, String)> {
    pairs.into_iter().filter(|(name, _)| *name != "restaurant_id")
}

pub fn wines_key(params: &WineListParams) -> QueryKey {
    QueryKey::new(QueryFamily::Wines)
        .with(params.restaurant_id)
        .with_pairs(without_tenant(params.query_pairs()))
}

pub fn wine_key(wine_id: Uuid) -> QueryKey {
    QueryKey::new(QueryFamily::Wine).with(wine_id)
}

pub fn sales_key(params: &SaleListParams) -> QueryKey {
    QueryKey::new(QueryFamily::Sales)
        .with(params.restaurant_id)
        .with_pairs(without_tenant(params.query_pairs()))
}

pub fn sale_key(sale_id: Uuid) -> QueryKey {
    QueryKey::new(QueryFamily::Sale).with(sale_id)
}

pub fn dashboard_key(restaurant_id: Uuid) -> QueryKey {
    QueryKey::new(QueryFamily::Dashboard).with(restaurant_id)
}

pub fn top_bottom_wines_key(restaurant_id: Uuid, params: &TopBottomParams) -> QueryKey {
    QueryKey::new(QueryFamily::TopBottomWines)
        .with(restaurant_id)
        .with_pairs(params.query_pairs())
}

pub fn sales_trends_key(restaurant_id: Uuid, range: &DateRange) -> QueryKey {
    QueryKey::new(QueryFamily::SalesTrends)
        .with(restaurant_id)
        .with_pairs(range.query_pairs())
}

pub fn inventory_health_key(restaurant_id: Uuid) -> QueryKey {
    QueryKey::new(QueryFamily::InventoryHealth).with(restaurant_id)
}

pub fn profit_analysis_key(restaurant_id: Uuid) -> QueryKey {
    QueryKey::new(QueryFamily::ProfitAnalysis).with(restaurant_id)
}

pub fn restaurants_key() -> QueryKey {
    QueryKey::new(QueryFamily::Restaurants)
}

pub fn restaurant_key(restaurant_id: Uuid) -> QueryKey {
    QueryKey::new(QueryFamily::Restaurant).with(restaurant_id)
}
