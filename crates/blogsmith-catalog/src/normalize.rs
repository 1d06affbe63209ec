//! Normalization from raw feed types to [`blogsmith_core::Product`].
//!
//! Conversion is deliberately infallible: enrichment attributes are an open
//! set and any of them may be absent, so missing or malformed fields reduce
//! the normalized product rather than failing the page.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use blogsmith_core::{Product, ProductAttributes};

use crate::types::{FeedProduct, FeedVariant};

/// Normalizes one raw [`FeedProduct`] into the engine-facing [`Product`].
///
/// Price comes from the storefront-default variant (position 1, falling
/// back to list order); a missing or unparseable price becomes `None`.
#[must_use]
pub fn normalize_product(product: FeedProduct) -> Product {
    let price = default_variant(&product.variants)
        .and_then(|variant| variant.price.parse::<Decimal>().ok());

    let image_url = product
        .image
        .map(|image| image.src)
        .or_else(|| product.images.into_iter().next().map(|image| image.src));

    let attributes = smart_attributes(&product.metafields, product.vendor.as_deref());

    Product {
        source_product_id: product.id.to_string(),
        title: product.title,
        handle: product.handle,
        category: product.product_type.filter(|s| !s.is_empty()),
        subcategory: metafield_text(&product.metafields, "smart_subcategory"),
        seo_title: metafield_text(&product.metafields, "title_tag")
            .or_else(|| metafield_text(&product.metafields, "seo_title")),
        price,
        image_url,
        tags: product.tags,
        attributes,
    }
}

/// The position-1 variant is the storefront default; products without
/// position data fall back to list order.
fn default_variant(variants: &[FeedVariant]) -> Option<&FeedVariant> {
    if variants.iter().any(|v| v.position.is_some()) {
        variants
            .iter()
            .find(|v| v.position == Some(1))
            .or_else(|| variants.first())
    } else {
        variants.first()
    }
}

fn smart_attributes(
    metafields: &BTreeMap<String, serde_json::Value>,
    vendor: Option<&str>,
) -> ProductAttributes {
    let text = |key| metafield_text(metafields, key);

    ProductAttributes {
        length: text("smart_length"),
        length_unit: text("smart_length_unit"),
        width: text("smart_width"),
        width_unit: text("smart_width_unit"),
        height: text("smart_height"),
        height_unit: text("smart_height_unit"),
        material: text("smart_material"),
        weight: text("smart_weight"),
        weight_unit: text("smart_weight_unit"),
        color: text("smart_color"),
        description: text("smart_description"),
        functionality: text("smart_functionality"),
        characteristics: text("smart_characteristics"),
        brand: text("smart_brand").or_else(|| {
            vendor
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }),
        category_path: text("smart_category"),
    }
}

/// Reads a metafield as text. Values arrive as JSON strings or numbers
/// depending on how the field was written; anything else is ignored.
fn metafield_text(metafields: &BTreeMap<String, serde_json::Value>, key: &str) -> Option<String> {
    match metafields.get(key)? {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
