//! Enrichment of generated articles with catalog product attributes.
//!
//! Generated bodies wrap each featured product in a card element carrying a
//! `data-product-handle` identifier. The merger locates each product's card
//! and appends an attribute block built from whatever catalog data the
//! product actually has. Cards that cannot be found, are already enriched,
//! or would receive an empty block are left untouched and counted.

use blogsmith_core::{Product, ProductAttributes};

use crate::scan::{element_span, tags, text_content, ElementSpan, TagKind};

/// Class of the wrapper element the merger inserts. Its presence inside a
/// card means the card was already enriched on an earlier pass.
pub const ATTRIBUTES_CLASS: &str = "product-attributes";

/// Class the generation prompt puts on every product card.
pub const CARD_CLASS: &str = "product-card";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub html: String,
    /// Cards that received an attribute block this pass.
    pub enriched: u32,
    /// Products whose card was missing, already enriched, or had no
    /// attributes to show.
    pub skipped: u32,
}

/// Enrich `html` with attribute blocks for each of `products`.
///
/// Each product enriches at most one card (the first match). Re-running the
/// merge over its own output changes nothing.
#[must_use]
pub fn merge(html: &str, products: &[Product]) -> MergeOutcome {
    let mut out = html.to_string();
    let mut enriched = 0u32;
    let mut skipped = 0u32;

    for product in products {
        let Some(span) = find_card(&out, product) else {
            skipped += 1;
            continue;
        };
        if already_enriched(&out[span.content_start..span.content_end]) {
            skipped += 1;
            continue;
        }
        match attribute_block(&product.attributes) {
            Some(block) => {
                out.insert_str(span.content_end, &block);
                enriched += 1;
            }
            None => skipped += 1,
        }
    }

    MergeOutcome {
        html: out,
        enriched,
        skipped,
    }
}

/// Whether `html` already links to the product page for `handle`.
#[must_use]
pub fn has_product_link(html: &str, handle: &str) -> bool {
    let path = format!("/products/{handle}");
    tags(html).iter().any(|tag| {
        tag.kind == TagKind::Open
            && tag.name == "a"
            && tag.attr("href").is_some_and(|href| href.contains(&path))
    })
}

/// Whether `html` contains a product card identified by `handle`.
#[must_use]
pub fn has_product_card(html: &str, handle: &str) -> bool {
    tags(html).iter().any(|tag| {
        tag.kind == TagKind::Open && tag.attr("data-product-handle") == Some(handle)
    })
}

/// Locate the card for `product`: first by its `data-product-handle`
/// identifier, then by falling back to the first card whose text mentions
/// the product title.
fn find_card(html: &str, product: &Product) -> Option<ElementSpan> {
    let all = tags(html);

    for tag in &all {
        if tag.kind == TagKind::Open
            && tag.attr("data-product-handle") == Some(product.handle.as_str())
        {
            if let Some(span) = element_span(html, tag) {
                return Some(span);
            }
        }
    }

    let title = text_content(&product.title);
    if title.is_empty() {
        return None;
    }
    for tag in &all {
        if tag.kind == TagKind::Open && tag.has_class(CARD_CLASS) {
            if let Some(span) = element_span(html, tag) {
                if text_content(&html[span.content_start..span.content_end]).contains(&title) {
                    return Some(span);
                }
            }
        }
    }

    None
}

fn already_enriched(card_inner: &str) -> bool {
    tags(card_inner)
        .iter()
        .any(|tag| tag.has_class(ATTRIBUTES_CLASS))
}

/// Render the attribute block, or `None` when the product has nothing to
/// show. Only groups with at least one entry are emitted.
fn attribute_block(attrs: &ProductAttributes) -> Option<String> {
    if attrs.is_empty() {
        return None;
    }

    let physical = [
        dimension_entry("Length", attrs.length.as_deref(), attrs.length_unit.as_deref()),
        dimension_entry("Width", attrs.width.as_deref(), attrs.width_unit.as_deref()),
        dimension_entry("Height", attrs.height.as_deref(), attrs.height_unit.as_deref()),
        plain_entry("Material", attrs.material.as_deref()),
        dimension_entry("Weight", attrs.weight.as_deref(), attrs.weight_unit.as_deref()),
    ];
    let visual = [
        plain_entry("Color", attrs.color.as_deref()),
        plain_entry("Appearance", attrs.description.as_deref()),
    ];
    let functional = [
        plain_entry("Functionality", attrs.functionality.as_deref()),
        plain_entry("Characteristics", attrs.characteristics.as_deref()),
    ];
    let meta = [
        plain_entry("Brand", attrs.brand.as_deref()),
        plain_entry("Category", attrs.category_path.as_deref()),
    ];

    let groups: String = [
        ("physical", physical.as_slice()),
        ("visual", visual.as_slice()),
        ("functional", functional.as_slice()),
        ("meta", meta.as_slice()),
    ]
    .iter()
    .filter_map(|(name, entries)| group_html(name, entries))
    .collect();

    if groups.is_empty() {
        return None;
    }
    Some(format!("<div class=\"{ATTRIBUTES_CLASS}\">{groups}</div>"))
}

fn group_html(name: &str, entries: &[Option<String>]) -> Option<String> {
    let items: String = entries.iter().flatten().cloned().collect();
    if items.is_empty() {
        return None;
    }
    Some(format!(
        "<div class=\"{ATTRIBUTES_CLASS}-{name}\"><ul>{items}</ul></div>"
    ))
}

fn dimension_entry(label: &str, value: Option<&str>, unit: Option<&str>) -> Option<String> {
    let value = value?;
    Some(match unit {
        Some(unit) => format!(
            "<li>{label}: {} {}</li>",
            escape_text(value),
            escape_text(unit)
        ),
        None => format!("<li>{label}: {}</li>", escape_text(value)),
    })
}

fn plain_entry(label: &str, value: Option<&str>) -> Option<String> {
    value.map(|v| format!("<li>{label}: {}</li>", escape_text(v)))
}

/// Escape catalog text for insertion into markup.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
