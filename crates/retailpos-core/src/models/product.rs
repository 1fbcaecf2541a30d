use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// A product as listed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct Product {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Variant-style products are stored without price or stock
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Product {
    pub fn category_display(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => "-",
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock.unwrap_or(0) > 0
    }
}
