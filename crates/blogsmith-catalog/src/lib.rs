//! Read-only catalog access for content generation.
//!
//! Fetches a store's public product feed page by page, follows `Link`
//! header cursors, and normalizes the raw payload (including the `smart_*`
//! enrichment metafields) into [`blogsmith_core::Product`] values the
//! scorer and merger consume.

pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod types;

mod retry;

pub use client::{CatalogClient, MAX_PAGES};
pub use error::CatalogError;
pub use normalize::normalize_product;
pub use pagination::next_page_cursor;
pub use types::{FeedImage, FeedProduct, FeedVariant, ProductFeedPage};
