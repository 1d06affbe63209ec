//! Typed payloads for the chat-completion call.

use serde::Deserialize;

/// A generated article, parsed from the completion's JSON content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedArticle {
    pub title: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    pub html_body: String,
}

/// Response envelope. Only the fields this client reads are modeled.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionMessage {
    /// Null for refusals and tool calls, which this pipeline never requests.
    #[serde(default)]
    pub content: Option<String>,
}
