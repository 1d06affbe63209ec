//! Article generation via an external chat-completion API.
//!
//! [`prompt`] turns a campaign's settings and its selected products into
//! system/user messages carrying the markup contract the rest of the
//! pipeline depends on; [`client`] makes the call with timeout, retry, and
//! typed failure modes. A generation failure is always surfaced as a
//! [`WriterError`], never as an empty article.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

mod retry;

pub use client::WriterClient;
pub use error::WriterError;
pub use prompt::{build_system_prompt, build_user_prompt, ArticleRequest};
pub use types::GeneratedArticle;
