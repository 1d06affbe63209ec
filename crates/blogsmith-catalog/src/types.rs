//! Response types for the commerce platform's product feed endpoint.
//!
//! ## Observed shape
//!
//! ### Tags
//! The feed returns tags as a **JSON array of strings**, never the legacy
//! comma-separated string. `#[serde(default)]` covers stores with no tags.
//!
//! ### Variant `price`
//! Always a decimal string (e.g. `"34.00"`), never a number and never null.
//! Parsed to a `Decimal` during normalization; unparseable values drop to
//! `None` rather than failing the whole page.
//!
//! ### `product_type`
//! Plain string that may be empty (`""`). Empty is treated as absent during
//! normalization.
//!
//! ### `metafields`
//! A flat JSON object of enrichment fields maintained alongside each
//! product. Keys are open-ended; the ones this pipeline reads are the
//! `smart_*` attribute set (`smart_length`, `smart_length_unit`,
//! `smart_material`, ...) plus `title_tag` (the storefront SEO title) and
//! `smart_subcategory`. Values arrive as strings **or numbers** depending
//! on how the field was written (`"smart_length": 120` and
//! `"smart_length": "120"` both occur), so the map holds raw JSON values
//! and normalization stringifies them. Absent on products that were never
//! enriched.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level response from `GET /products.json`.
#[derive(Debug, Deserialize)]
pub struct ProductFeedPage {
    pub products: Vec<FeedProduct>,
}

/// A single product as served by the feed.
#[derive(Debug, Deserialize)]
pub struct FeedProduct {
    /// Platform numeric product ID (e.g. `6789012345678`).
    pub id: i64,

    /// Display name (e.g. `"Cedar Raised Garden Bed"`).
    pub title: String,

    /// URL slug for the product page (e.g. `"cedar-raised-garden-bed"`).
    pub handle: String,

    /// Raw HTML description. May be `null` or absent.
    #[serde(default)]
    pub body_html: Option<String>,

    /// Category string. May be empty; normalized to `None` when so.
    #[serde(default)]
    pub product_type: Option<String>,

    /// Tags as a JSON array of strings, `[]` when none.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Vendor / brand name as configured on the platform.
    #[serde(default)]
    pub vendor: Option<String>,

    /// Primary image object.
    #[serde(default)]
    pub image: Option<FeedImage>,

    /// Full image gallery.
    #[serde(default)]
    pub images: Vec<FeedImage>,

    /// All purchasable variants.
    pub variants: Vec<FeedVariant>,

    /// Enrichment metafields; see the module docs for the observed shape.
    #[serde(default)]
    pub metafields: BTreeMap<String, serde_json::Value>,
}

/// A purchasable variant of a [`FeedProduct`].
#[derive(Debug, Deserialize)]
pub struct FeedVariant {
    pub id: i64,

    /// Variant display title, `"Default Title"` for single-variant products.
    pub title: String,

    /// Current price as a decimal string (e.g. `"34.00"`).
    pub price: String,

    /// Whether the variant is purchasable right now. Defaults to `true`
    /// when the feed omits the field.
    #[serde(default = "default_available")]
    pub available: bool,

    /// 1-based position; `1` is the storefront-default variant.
    #[serde(default)]
    pub position: Option<i32>,
}

/// A product image from the feed.
#[derive(Debug, Deserialize)]
pub struct FeedImage {
    #[serde(default)]
    pub id: Option<i64>,
    /// Canonical CDN URL.
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub position: Option<i32>,
}

fn default_available() -> bool {
    true
}
