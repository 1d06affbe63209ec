use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product from a store's catalog, normalized for relevance scoring and
/// article enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Platform numeric product ID, stored as a string to avoid precision loss.
    pub source_product_id: String,
    pub title: String,
    /// Platform URL slug, e.g. `"cedar-raised-bed-kit"`. Product links are
    /// built as `{store origin}/products/{handle}`.
    pub handle: String,
    /// Platform product type, e.g. `"Planters"`.
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Search-optimized title, when the store maintains one separately.
    pub seo_title: Option<String>,
    /// Default-variant price. `None` when the platform price did not parse.
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    /// Platform tags, as served by the feed.
    pub tags: Vec<String>,
    pub attributes: ProductAttributes,
}

/// Structured enrichment attributes sourced from platform metafields. Every
/// field is optional; an absent field only reduces what gets rendered into
/// the article's product card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    pub length: Option<String>,
    pub length_unit: Option<String>,
    pub width: Option<String>,
    pub width_unit: Option<String>,
    pub height: Option<String>,
    pub height_unit: Option<String>,
    pub material: Option<String>,
    pub weight: Option<String>,
    pub weight_unit: Option<String>,
    pub color: Option<String>,
    /// Vision-derived product description.
    pub description: Option<String>,
    pub functionality: Option<String>,
    pub characteristics: Option<String>,
    pub brand: Option<String>,
    /// Taxonomy path string, e.g. `"Home & Garden > Planters"`.
    pub category_path: Option<String>,
}

impl ProductAttributes {
    /// `true` when no attribute carries a value, meaning enrichment has
    /// nothing to render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &ProductAttributes::default()
    }
}

/// One product reference embedded in a generated article, in body order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLink {
    pub product_id: String,
    pub title: String,
    pub handle: String,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
}

impl ProductLink {
    /// Build the link entry for a product.
    #[must_use]
    pub fn for_product(product: &Product) -> Self {
        ProductLink {
            product_id: product.source_product_id.clone(),
            title: product.title.clone(),
            handle: product.handle.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            category: product.category.clone(),
        }
    }
}
