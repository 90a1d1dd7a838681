//! Product entity and recommendation-API wire mapping.
//!
//! The service returns a JSON array of camelCase product objects
//! (`priceKRW`, `imageUrl`, `mainFeatures`, …). [`ApiProduct`] mirrors that
//! wire shape exactly; [`Product`] is the domain entity the rest of the crate
//! passes around, immutable once fetched.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Product  (domain)
// ---------------------------------------------------------------------------

/// A recommended product, as the interaction core sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Image URL, passed through for the UI layer.
    pub image: String,
    /// Price in KRW.
    pub price: f64,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub main_features: Vec<String>,
    pub tags: Vec<String>,
    pub delivery_days: Option<u32>,
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// ApiProduct  (wire)
// ---------------------------------------------------------------------------

/// One product object exactly as the recommendation endpoint serialises it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProduct {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub main_features: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    // camelCase would give "priceKrw"; the API capitalises the currency code.
    #[serde(rename = "priceKRW")]
    pub price_krw: f64,
    #[serde(default)]
    pub delivery_days: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    pub image_url: String,
}

impl From<ApiProduct> for Product {
    fn from(api: ApiProduct) -> Self {
        Self {
            id: api.id,
            name: api.title,
            image: api.image_url,
            price: api.price_krw,
            description: api.description,
            brand: api.brand,
            main_features: api.main_features,
            tags: api.tags,
            delivery_days: api.delivery_days,
            category: api.category,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
