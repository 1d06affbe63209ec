//! Content analysis and enrichment for generated articles.
//!
//! Everything in this crate is pure string-in, value-out: the heading
//! analyzer and validator score article bodies, the relevance scorer ranks
//! catalog products for a campaign, and the merger injects product
//! attribute blocks into generated markup. No I/O happens here, which keeps
//! the generation pipeline's decision logic trivially testable.

pub mod headings;
pub mod merge;
pub mod relevance;
pub mod scan;
pub mod validator;

pub use headings::{analyze, Heading, HeadingReport};
pub use merge::{has_product_card, has_product_link, merge, MergeOutcome};
pub use relevance::{relevance_score, select_products, Selection};
pub use validator::{validate, validate_generated, ValidationReport, PASS_THRESHOLD};
