//! Fuzzy resolution of a claimed (brand, model, capacity) against the catalog.
//!
//! Matching is best-effort and first-match: a catalog name matches when it
//! contains the query or the query contains it, ignoring case. Entries are
//! tried in catalog order and there is no scoring, so an ambiguous query
//! ("Galaxy S" with both "Galaxy S23" and "Galaxy S24" listed) resolves to
//! whichever entry comes first. Callers rely on this order; a ranked matcher
//! would be a behavior change.

use crate::catalog::{Brand, Model, TradeInCatalog, Variant};
use serde::Serialize;
use tracing::debug;

/// A claimed device matched to a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDevice {
    /// Canonical brand name from the catalog.
    pub brand: String,
    /// Canonical model name from the catalog.
    pub model: String,
    /// The selected variant.
    pub variant: Variant,
    /// Whether the requested capacity was found. False means the first
    /// variant was selected by default.
    pub capacity_matched: bool,
    /// Every variant of the model, in catalog order.
    pub variants: Vec<Variant>,
}

impl ResolvedDevice {
    /// Provider model code of the selected variant.
    #[must_use]
    pub fn model_code(&self) -> &str {
        &self.variant.model_code
    }

    /// Base price of the selected variant.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.variant.price
    }
}

/// Outcome of a catalog lookup. Misses carry the valid alternatives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// Brand and model matched.
    Found(ResolvedDevice),
    /// No brand matched the query.
    BrandNotFound {
        /// What the caller asked for.
        query: String,
        /// Every brand in the catalog.
        valid_brands: Vec<String>,
    },
    /// The brand matched but no model did.
    ModelNotFound {
        /// Canonical name of the matched brand.
        brand: String,
        /// What the caller asked for.
        query: String,
        /// Every model of the matched brand.
        valid_models: Vec<String>,
    },
}

/// Resolve a claimed device.
///
/// `capacity` is matched exactly (case-insensitive, trimmed); when it is
/// omitted or unknown the model's first variant is used.
#[must_use]
pub fn resolve(
    catalog: &TradeInCatalog,
    brand: &str,
    model: &str,
    capacity: Option<&str>,
) -> Resolution {
    let Some(matched_brand) = first_match(catalog.brands(), brand, |b| &b.name) else {
        debug!("No catalog brand matches '{brand}'");
        return Resolution::BrandNotFound {
            query: brand.to_string(),
            valid_brands: catalog.brand_names(),
        };
    };

    let Some(matched_model) = first_match(&matched_brand.models, model, |m| &m.name) else {
        debug!("No {} model matches '{model}'", matched_brand.name);
        return Resolution::ModelNotFound {
            brand: matched_brand.name.clone(),
            query: model.to_string(),
            valid_models: model_names(matched_brand),
        };
    };

    let (variant, capacity_matched) = select_variant(matched_model, capacity);
    let Some(variant) = variant else {
        // Catalog construction drops variantless models.
        return Resolution::ModelNotFound {
            brand: matched_brand.name.clone(),
            query: model.to_string(),
            valid_models: model_names(matched_brand),
        };
    };

    Resolution::Found(ResolvedDevice {
        brand: matched_brand.name.clone(),
        model: matched_model.name.clone(),
        variant: variant.clone(),
        capacity_matched,
        variants: matched_model.variants.clone(),
    })
}

/// Bidirectional case-insensitive substring match. Blank queries never match.
#[must_use]
pub fn names_match(candidate: &str, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }
    let candidate = candidate.trim().to_lowercase();
    !candidate.is_empty() && (candidate.contains(&query) || query.contains(&candidate))
}

fn first_match<'a, T>(items: &'a [T], query: &str, name: impl Fn(&T) -> &String) -> Option<&'a T> {
    items.iter().find(|&item| names_match(name(item), query))
}

fn select_variant<'a>(model: &'a Model, capacity: Option<&str>) -> (Option<&'a Variant>, bool) {
    let wanted = capacity.map(str::trim).filter(|c| !c.is_empty());
    if let Some(wanted) = wanted {
        if let Some(variant) = model
            .variants
            .iter()
            .find(|v| v.capacity.trim().eq_ignore_ascii_case(wanted))
        {
            return (Some(variant), true);
        }
        debug!("Capacity '{wanted}' not offered for {}, using first variant", model.name);
    }
    (model.variants.first(), false)
}

fn model_names(brand: &Brand) -> Vec<String> {
    brand.models.iter().map(|m| m.name.clone()).collect()
}
