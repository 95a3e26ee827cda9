//! Cache keys: an operation family plus its parameters

use std::fmt;

/// Read operation a cache entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryFamily {
    Wines,
    Wine,
    Sales,
    Sale,
    Dashboard,
    TopBottomWines,
    SalesTrends,
    InventoryHealth,
    ProfitAnalysis,
    Restaurants,
    Restaurant,
}

impl QueryFamily {
    pub const ALL: [QueryFamily; 11] = [
        QueryFamily::Wines,
        QueryFamily::Wine,
        QueryFamily::Sales,
        QueryFamily::Sale,
        QueryFamily::Dashboard,
        QueryFamily::TopBottomWines,
        QueryFamily::SalesTrends,
        QueryFamily::InventoryHealth,
        QueryFamily::ProfitAnalysis,
        QueryFamily::Restaurants,
        QueryFamily::Restaurant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryFamily::Wines => "wines",
            QueryFamily::Wine => "wine",
            QueryFamily::Sales => "sales",
            QueryFamily::Sale => "sale",
            QueryFamily::Dashboard => "dashboard",
            QueryFamily::TopBottomWines => "top-bottom-wines",
            QueryFamily::SalesTrends => "sales-trends",
            QueryFamily::InventoryHealth => "inventory-health",
            QueryFamily::ProfitAnalysis => "profit-analysis",
            QueryFamily::Restaurants => "restaurants",
            QueryFamily::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for QueryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one cached read result.
///
/// A key with fewer segments acts as a prefix: `wines` covers every wine
/// list, `wine/<id>` covers exactly that wine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    family: QueryFamily,
    segments: Vec<String>,
}

impl QueryKey {
    pub fn new(family: QueryFamily) -> Self {
        Self {
            family,
            segments: Vec::new(),
        }
    }

    /// Append one parameter segment
    pub fn with(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Append query-string pairs as `name=value` segments
    pub fn with_pairs<I, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: fmt::Display,
    {
        self.segments
            .extend(pairs.into_iter().map(|(name, value)| format!("{name}={value}")));
        self
    }

    pub fn family(&self) -> QueryFamily {
        self.family
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `prefix` covers this key
    pub fn matches(&self, prefix: &QueryKey) -> bool {
        self.family == prefix.family && self.segments.starts_with(&prefix.segments)
    }
}

impl From<QueryFamily> for QueryKey {
    fn from(family: QueryFamily) -> Self {
        QueryKey::new(family)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family.as_str())?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
