use serde::{Deserialize, Serialize};

/// Summary returned by `GET /analytics`. Shown as delivered; nothing here is recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_items: i64,
    pub total_value: f64,
    pub low_stock_items: i64,
    pub total_sales: f64,
    pub total_purchases: f64,
    #[serde(default)]
    pub monthly: Vec<MonthlyFigure>,
    #[serde(default)]
    pub top_categories: Vec<CategoryShare>,
}

impl AnalyticsSummary {
    pub fn profit(&self) -> f64 {
        self.total_sales - self.total_purchases
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFigure {
    pub month: String,
    pub sales: f64,
    pub purchases: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: i64,
}
