//! Typed trade-in catalog and the narrow decode from the upstream document.
//!
//! The upstream document looks like
//!
//! ```json
//! { "phone": { "brands": [ { "name": "Apple", "models": [
//!     { "name": "iPhone 15 Pro Max", "variants": [
//!         { "capacity": "256GB", "price": 800, "model_code": "APL-15PM-256", "image": "..." }
//!     ] } ] } ] } }
//! ```
//!
//! Only those fields are read. Other categories and unknown keys are ignored.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Capacity label used when the upstream variant has none.
const DEFAULT_CAPACITY: &str = "Standard";

/// Snapshot of the phone category of the trade-in catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeInCatalog {
    brands: Vec<Brand>,
}

/// A brand and its models, in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brand {
    /// Canonical brand name.
    pub name: String,
    /// Models offered for trade-in.
    pub models: Vec<Model>,
}

/// A device model. Always has at least one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    /// Canonical model name.
    pub name: String,
    /// Capacity variants, in upstream order.
    pub variants: Vec<Variant>,
}

/// A priced capacity variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    /// Storage capacity label, e.g. "256GB".
    pub capacity: String,
    /// Base trade-in price in whole currency units.
    pub price: f64,
    /// Provider model code used by the verification gateway.
    pub model_code: String,
    /// Product image URL.
    pub image: Option<String>,
}

impl Variant {
    /// Create a variant without an image.
    #[must_use]
    pub fn new(capacity: impl Into<String>, price: f64, model_code: impl Into<String>) -> Self {
        Self {
            capacity: capacity.into(),
            price,
            model_code: model_code.into(),
            image: None,
        }
    }
}

impl Model {
    /// Create a model from its variants.
    #[must_use]
    pub fn new(name: impl Into<String>, variants: Vec<Variant>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }
}

impl Brand {
    /// Create a brand from its models.
    #[must_use]
    pub fn new(name: impl Into<String>, models: Vec<Model>) -> Self {
        Self {
            name: name.into(),
            models,
        }
    }
}

impl TradeInCatalog {
    /// Build a catalog from already-typed brands.
    ///
    /// Models without variants are dropped so every model can be resolved.
    #[must_use]
    pub fn new(brands: Vec<Brand>) -> Self {
        let brands = brands
            .into_iter()
            .map(|mut brand| {
                brand.models.retain(|m| !m.variants.is_empty());
                brand
            })
            .filter(|brand| !brand.models.is_empty())
            .collect();
        Self { brands }
    }

    /// Decode the upstream JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not JSON of the expected shape.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawDocument =
            serde_json::from_str(body).map_err(|e| Error::Decode(format!("catalog: {e}")))?;
        Ok(raw.into_catalog())
    }

    /// Brands in upstream order.
    #[must_use]
    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    /// Brand names in upstream order.
    #[must_use]
    pub fn brand_names(&self) -> Vec<String> {
        self.brands.iter().map(|b| b.name.clone()).collect()
    }

    /// Total number of models across brands.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.brands.iter().map(|b| b.models.len()).sum()
    }

    /// True when no brand survived decoding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    phone: Option<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    brands: Vec<RawBrand>,
}

#[derive(Debug, Deserialize)]
struct RawBrand {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    models: Vec<RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    variants: Vec<RawVariant>,
}

#[derive(Debug, Deserialize)]
struct RawVariant {
    #[serde(default)]
    capacity: Option<String>,
    #[serde(default)]
    price: Option<LoosePrice>,
    #[serde(default, alias = "modelCode")]
    model_code: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

/// Prices arrive as numbers or as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoosePrice {
    Number(f64),
    Text(String),
}

impl LoosePrice {
    fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

impl RawDocument {
    fn into_catalog(self) -> TradeInCatalog {
        let Some(phone) = self.phone else {
            warn!("Trade-in catalog has no phone category");
            return TradeInCatalog::default();
        };

        let brands = phone
            .brands
            .into_iter()
            .filter_map(|raw| {
                let name = non_blank(raw.name)?;
                let models = raw
                    .models
                    .into_iter()
                    .filter_map(|model| model.into_model(&name))
                    .collect();
                Some(Brand { name, models })
            })
            .collect();

        TradeInCatalog::new(brands)
    }
}

impl RawModel {
    fn into_model(self, brand: &str) -> Option<Model> {
        let name = non_blank(self.name)?;
        let variants = self
            .variants
            .into_iter()
            .filter_map(|raw| {
                let price = raw.price.as_ref().and_then(LoosePrice::value);
                let model_code = non_blank(raw.model_code);
                match (price, model_code) {
                    (Some(price), Some(model_code)) => Some(Variant {
                        capacity: non_blank(raw.capacity)
                            .unwrap_or_else(|| DEFAULT_CAPACITY.to_string()),
                        price,
                        model_code,
                        image: raw.image,
                    }),
                    _ => {
                        warn!("Dropping unpriced or uncoded variant of {brand} {name}");
                        None
                    }
                }
            })
            .collect();
        Some(Model { name, variants })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
