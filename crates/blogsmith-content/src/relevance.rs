//! Keyword relevance scoring over the store catalog.
//!
//! Selection is deliberately dumb: case-insensitive substring matches over a
//! handful of text fields, weighted toward the campaign's own keywords. When
//! nothing matches at all the pipeline still needs products to write about,
//! so selection falls back to catalog order and says so.

use std::cmp::Reverse;

use blogsmith_core::Product;

/// Points per campaign keyword found in a product's text fields.
const KEYWORD_WEIGHT: i32 = 3;
/// Points per topic word found. Topic words shorter than four characters
/// are too common to mean anything and are ignored.
const TOPIC_WORD_WEIGHT: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub products: Vec<Product>,
    /// True when every catalog product scored zero and the result is plain
    /// catalog order rather than a relevance ranking.
    pub fallback: bool,
}

/// Score one product against a campaign's keywords and topic.
#[must_use]
pub fn relevance_score(product: &Product, keywords: &[String], topic: &str) -> i32 {
    let haystack = search_text(product);
    let mut score = 0;

    for keyword in keywords {
        let needle = keyword.trim().to_lowercase();
        if !needle.is_empty() && haystack.contains(&needle) {
            score += KEYWORD_WEIGHT;
        }
    }

    for word in topic.to_lowercase().split_whitespace() {
        if word.chars().count() > 3 && haystack.contains(word) {
            score += TOPIC_WORD_WEIGHT;
        }
    }

    score
}

/// Rank the catalog by relevance and keep the top `limit` products.
///
/// Ties keep catalog order, so repeated runs over the same catalog select
/// the same products. An all-zero scoring round returns the first `limit`
/// products with `fallback` set.
#[must_use]
pub fn select_products(
    keywords: &[String],
    topic: &str,
    catalog: &[Product],
    limit: usize,
) -> Selection {
    let scored: Vec<(i32, &Product)> = catalog
        .iter()
        .map(|product| (relevance_score(product, keywords, topic), product))
        .collect();

    if scored.iter().all(|(score, _)| *score == 0) {
        return Selection {
            products: catalog.iter().take(limit).cloned().collect(),
            fallback: true,
        };
    }

    let mut scored = scored;
    scored.sort_by_key(|(score, _)| Reverse(*score));
    Selection {
        products: scored
            .into_iter()
            .take(limit)
            .map(|(_, product)| product.clone())
            .collect(),
        fallback: false,
    }
}

fn search_text(product: &Product) -> String {
    [
        product.title.as_str(),
        product.category.as_deref().unwrap_or(""),
        product.subcategory.as_deref().unwrap_or(""),
        product.seo_title.as_deref().unwrap_or(""),
    ]
    .join(" ")
    .to_lowercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{relevance_score, select_products};
    use blogsmith_core::{Product, ProductAttributes};

    fn product(id: &str, title: &str, category: Option<&str>) -> Product {
        Product {
            source_product_id: id.to_string(),
            title: title.to_string(),
            handle: title.to_lowercase().replace(' ', "-"),
            category: category.map(str::to_string),
            subcategory: None,
            seo_title: None,
            price: None,
            image_url: None,
            tags: Vec::new(),
            attributes: ProductAttributes::default(),
        }
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    // ---- relevance_score ----

    #[test]
    fn keyword_in_title_scores_three() {
        let p = product("1", "Cedar Raised Bed", None);
        assert_eq!(relevance_score(&p, &keywords(&["raised bed"]), ""), 3);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let p = product("1", "Cedar RAISED Bed", None);
        assert_eq!(relevance_score(&p, &keywords(&["Raised bed"]), ""), 3);
    }

    #[test]
    fn keyword_in_category_counts() {
        let p = product("1", "Trellis Kit", Some("Garden Structures"));
        assert_eq!(relevance_score(&p, &keywords(&["structures"]), ""), 3);
    }

    #[test]
    fn keyword_in_seo_title_counts() {
        let mut p = product("1", "Trellis Kit", None);
        p.seo_title = Some("Best climbing plant support".to_string());
        assert_eq!(relevance_score(&p, &keywords(&["climbing"]), ""), 3);
    }

    #[test]
    fn keyword_in_subcategory_counts() {
        let mut p = product("1", "Trellis Kit", None);
        p.subcategory = Some("Vertical Gardening".to_string());
        assert_eq!(relevance_score(&p, &keywords(&["vertical"]), ""), 3);
    }

    #[test]
    fn each_matching_keyword_adds_three() {
        let p = product("1", "Cedar Raised Garden Bed", Some("Planters"));
        let score = relevance_score(&p, &keywords(&["cedar", "planters", "compost"]), "");
        assert_eq!(score, 6);
    }

    #[test]
    fn blank_keywords_are_ignored() {
        let p = product("1", "Cedar Raised Bed", None);
        assert_eq!(relevance_score(&p, &keywords(&["  ", ""]), ""), 0);
    }

    #[test]
    fn topic_words_add_one_each() {
        let p = product("1", "Cedar Raised Garden Bed", None);
        // "cedar" and "garden" match; "bed" is too short to count.
        let score = relevance_score(&p, &[], "cedar garden bed ideas");
        assert_eq!(score, 2);
    }

    #[test]
    fn short_topic_words_never_match() {
        let p = product("1", "The Large Pot", None);
        // Only "large" is long enough to count; "the" and "pot" are ignored.
        assert_eq!(relevance_score(&p, &[], "the large pot"), 1);
    }

    #[test]
    fn keywords_and_topic_stack() {
        let p = product("1", "Cedar Raised Garden Bed", None);
        let score = relevance_score(&p, &keywords(&["raised bed"]), "cedar planters");
        assert_eq!(score, 4);
    }

    #[test]
    fn unrelated_product_scores_zero() {
        let p = product("1", "Ceramic Mug", Some("Kitchen"));
        assert_eq!(
            relevance_score(&p, &keywords(&["raised bed"]), "garden soil"),
            0
        );
    }

    // ---- select_products ----

    #[test]
    fn selection_orders_by_score_descending() {
        let catalog = vec![
            product("1", "Ceramic Mug", None),
            product("2", "Cedar Raised Garden Bed", None),
            product("3", "Garden Trowel", None),
        ];
        let selection = select_products(
            &keywords(&["cedar", "raised bed"]),
            "garden tools",
            &catalog,
            3,
        );

        assert!(!selection.fallback);
        let ids: Vec<&str> = selection
            .products
            .iter()
            .map(|p| p.source_product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = vec![
            product("1", "Garden Hose", None),
            product("2", "Garden Fork", None),
            product("3", "Garden Twine", None),
        ];
        let selection = select_products(&keywords(&["garden"]), "", &catalog, 3);

        let ids: Vec<&str> = selection
            .products
            .iter()
            .map(|p| p.source_product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn selection_truncates_to_limit() {
        let catalog = vec![
            product("1", "Garden Hose", None),
            product("2", "Garden Fork", None),
            product("3", "Garden Twine", None),
        ];
        let selection = select_products(&keywords(&["garden"]), "", &catalog, 2);
        assert_eq!(selection.products.len(), 2);
    }

    #[test]
    fn limit_beyond_catalog_returns_everything() {
        let catalog = vec![product("1", "Garden Hose", None)];
        let selection = select_products(&keywords(&["garden"]), "", &catalog, 5);
        assert_eq!(selection.products.len(), 1);
    }

    #[test]
    fn all_zero_scores_fall_back_to_catalog_order() {
        let catalog = vec![
            product("1", "Ceramic Mug", None),
            product("2", "Desk Lamp", None),
            product("3", "Wool Blanket", None),
        ];
        let selection = select_products(&keywords(&["hydroponics"]), "aquaponics", &catalog, 2);

        assert!(selection.fallback);
        let ids: Vec<&str> = selection
            .products
            .iter()
            .map(|p| p.source_product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn single_match_prevents_fallback() {
        let catalog = vec![
            product("1", "Ceramic Mug", None),
            product("2", "Hydroponics Starter", None),
        ];
        let selection = select_products(&keywords(&["hydroponics"]), "", &catalog, 1);

        assert!(!selection.fallback);
        assert_eq!(selection.products[0].source_product_id, "2");
    }

    #[test]
    fn empty_catalog_yields_empty_fallback() {
        let selection = select_products(&keywords(&["garden"]), "garden", &[], 5);
        assert!(selection.fallback);
        assert!(selection.products.is_empty());
    }
}
