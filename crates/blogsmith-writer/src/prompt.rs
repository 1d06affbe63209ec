//! Prompt assembly for article generation.
//!
//! Builds the system and user messages for the chat-completion call from a
//! campaign's settings, the selected products, and the store base URL. Pure
//! string assembly; the markup contract embedded here (one h1, sectioned
//! h2s, handle-tagged product cards) is what the downstream validator and
//! merger rely on.

use std::fmt::Write as _;

use blogsmith_core::{CampaignSettings, Product};

/// Everything the writer needs to generate one article.
#[derive(Debug, Clone, Copy)]
pub struct ArticleRequest<'a> {
    pub settings: &'a CampaignSettings,
    pub products: &'a [Product],
    /// Origin of the storefront, used to build absolute product links.
    pub store_base_url: &'a str,
}

/// System message: output contract and structural rules.
#[must_use]
pub fn build_system_prompt(settings: &CampaignSettings) -> String {
    let mut prompt = String::from(
        "You are an e-commerce content writer producing blog articles in HTML. \
         Respond with a JSON object with exactly these keys: \
         \"title\" (plain text), \"meta_description\" (plain text, at most 155 characters), \
         \"html_body\" (the article markup).\n\
         Rules for html_body:\n\
         - Start with exactly one <h1> carrying the article title. Never use a second <h1>.\n\
         - Break the article into <h2> sections; do not skip heading levels.\n\
         - Give every <h2> a slug-style id attribute.\n\
         - Write finished prose. Never leave bracketed placeholders or TODO notes.\n",
    );

    let _ = writeln!(
        prompt,
        "Write in {language}, in a {style} style with a {tone} tone.",
        language = settings.language,
        style = settings.writing_style,
        tone = settings.tone,
    );

    prompt
}

/// User message: the concrete brief for this run.
#[must_use]
pub fn build_user_prompt(request: &ArticleRequest<'_>) -> String {
    let settings = request.settings;
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Write a blog article about: {}", settings.topic);
    if let Some(description) = &settings.description {
        let _ = writeln!(prompt, "Campaign context: {description}");
    }
    let _ = writeln!(
        prompt,
        "Work these keywords in naturally: {}.",
        settings.keywords.join(", ")
    );
    let _ = writeln!(
        prompt,
        "Target length: between {} and {} words.",
        settings.word_count_min, settings.word_count_max
    );
    let _ = writeln!(
        prompt,
        "Use at least {} <h2> sections.",
        min_section_count(settings.word_count_min)
    );
    if let Some(structure) = &settings.content_structure {
        let _ = writeln!(prompt, "Follow this outline: {structure}");
    }
    if settings.seo_optimization {
        let _ = writeln!(
            prompt,
            "Optimize for search: keyword-bearing headings and a compelling meta description."
        );
    }
    if settings.image_integration {
        let _ = writeln!(
            prompt,
            "Where an image would help, insert <img data-image-search=\"two or three word query\" alt=\"descriptive alt text\"> and leave src empty."
        );
    }

    if settings.product_links && !request.products.is_empty() {
        push_product_brief(&mut prompt, request);
    } else {
        let _ = writeln!(
            prompt,
            "Do not include product cards or links to product pages."
        );
    }

    prompt
}

/// The product-card markup contract. The enrichment step locates cards by
/// their `data-product-handle`, so the identifier must survive generation
/// verbatim.
fn push_product_brief(prompt: &mut String, request: &ArticleRequest<'_>) {
    let settings = request.settings;
    let base = request.store_base_url.trim_end_matches('/');

    let _ = writeln!(
        prompt,
        "Feature each of these store products where it fits the article, each in its own card:"
    );
    for product in request.products {
        let category = product.category.as_deref().unwrap_or("uncategorized");
        let _ = writeln!(
            prompt,
            "- \"{title}\" (handle: {handle}, category: {category})",
            title = product.title,
            handle = product.handle,
        );
    }
    let _ = writeln!(
        prompt,
        "Card markup, keeping the data-product-handle value exactly as given:\n\
         <div class=\"product-card\" data-product-handle=\"HANDLE\"><h3><a href=\"{base}/products/HANDLE\">Product Title</a></h3><p>One or two sentences on why it fits.</p></div>"
    );
    if settings.internal_linking {
        let _ = writeln!(
            prompt,
            "Link to at most {} product pages in total.",
            settings.max_internal_links
        );
    }
}

/// Mirrors the validator's sectioning expectation for the target length.
fn min_section_count(word_count_min: i32) -> usize {
    usize::try_from(word_count_min / 300).unwrap_or(0).max(3)
}

#[cfg(test)]
mod tests {
    use blogsmith_core::{CampaignSettings, Frequency, Product, ProductAttributes};
    use chrono::{NaiveDate, NaiveTime};

    use super::{build_system_prompt, build_user_prompt, ArticleRequest};

    fn settings() -> CampaignSettings {
        CampaignSettings {
            name: "Spring Garden Guides".to_string(),
            description: Some("Weekly growing guides for the spring line".to_string()),
            frequency: Frequency::Weekly,
            schedule_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            schedule_day: Some(1),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date"),
            end_date: None,
            max_runs: None,
            topic: "raised bed gardening".to_string(),
            keywords: vec!["raised bed".to_string(), "cedar planter".to_string()],
            word_count_min: 900,
            word_count_max: 1200,
            writing_style: "practical how-to".to_string(),
            tone: "warm".to_string(),
            content_structure: None,
            language: "en".to_string(),
            internal_linking: true,
            max_internal_links: 3,
            image_integration: false,
            product_links: true,
            seo_optimization: true,
            auto_publish: false,
        }
    }

    fn product(handle: &str, title: &str) -> Product {
        Product {
            source_product_id: format!("gid-{handle}"),
            title: title.to_string(),
            handle: handle.to_string(),
            category: Some("Planters".to_string()),
            subcategory: None,
            seo_title: None,
            price: None,
            image_url: None,
            tags: Vec::new(),
            attributes: ProductAttributes::default(),
        }
    }

    #[test]
    fn system_prompt_pins_the_output_contract() {
        let prompt = build_system_prompt(&settings());

        assert!(prompt.contains("\"title\""));
        assert!(prompt.contains("\"meta_description\""));
        assert!(prompt.contains("\"html_body\""));
        assert!(prompt.contains("exactly one <h1>"));
        assert!(prompt.contains("practical how-to"));
        assert!(prompt.contains("warm"));
    }

    #[test]
    fn user_prompt_carries_the_brief() {
        let settings = settings();
        let products = [product("cedar-bed", "Cedar Raised Bed")];
        let prompt = build_user_prompt(&ArticleRequest {
            settings: &settings,
            products: &products,
            store_base_url: "https://shop.example",
        });

        assert!(prompt.contains("raised bed gardening"));
        assert!(prompt.contains("raised bed, cedar planter"));
        assert!(prompt.contains("between 900 and 1200 words"));
        assert!(prompt.contains("at least 3 <h2> sections"));
    }

    #[test]
    fn product_cards_embed_the_handle_contract() {
        let settings = settings();
        let products = [product("cedar-bed", "Cedar Raised Bed")];
        let prompt = build_user_prompt(&ArticleRequest {
            settings: &settings,
            products: &products,
            store_base_url: "https://shop.example/",
        });

        assert!(prompt.contains("data-product-handle"));
        assert!(prompt.contains("handle: cedar-bed"));
        assert!(prompt.contains("https://shop.example/products/HANDLE"));
        assert!(prompt.contains("at most 3 product pages"));
    }

    #[test]
    fn disabled_product_links_suppress_the_card_brief() {
        let mut settings = settings();
        settings.product_links = false;
        let products = [product("cedar-bed", "Cedar Raised Bed")];
        let prompt = build_user_prompt(&ArticleRequest {
            settings: &settings,
            products: &products,
            store_base_url: "https://shop.example",
        });

        assert!(!prompt.contains("data-product-handle"));
        assert!(prompt.contains("Do not include product cards"));
    }

    #[test]
    fn image_placeholders_appear_only_when_enabled() {
        let mut settings = settings();
        let prompt = build_user_prompt(&ArticleRequest {
            settings: &settings,
            products: &[],
            store_base_url: "https://shop.example",
        });
        assert!(!prompt.contains("data-image-search"));

        settings.image_integration = true;
        let prompt = build_user_prompt(&ArticleRequest {
            settings: &settings,
            products: &[],
            store_base_url: "https://shop.example",
        });
        assert!(prompt.contains("data-image-search"));
    }

    #[test]
    fn longer_articles_ask_for_more_sections() {
        let mut settings = settings();
        settings.word_count_min = 1800;
        settings.word_count_max = 2200;
        let prompt = build_user_prompt(&ArticleRequest {
            settings: &settings,
            products: &[],
            store_base_url: "https://shop.example",
        });

        assert!(prompt.contains("at least 6 <h2> sections"));
    }
}
