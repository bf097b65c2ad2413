//! [`NameOracle`] backed by a chat-completions model.

use super::client::{ChatClient, ChatMessage};
use super::{NEUTRAL_CONFIDENCE, NameOracle, parse_confidence, parse_name_lines};
use async_trait::async_trait;

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a precise information extraction assistant. \
Extract ONLY the full names of people who hold the given designation at the given company. \
Return names one per line, nothing else. If no relevant name is found, return NONE.";

/// Oracle that prompts a chat model.
#[derive(Debug, Clone)]
pub struct ChatOracle {
    client: ChatClient,
    text_max_chars: usize,
    context_max_chars: usize,
}

impl ChatOracle {
    /// `text_max_chars` bounds the text sent for extraction and
    /// `context_max_chars` the supporting text sent for confirmation.
    pub fn new(client: ChatClient, text_max_chars: usize, context_max_chars: usize) -> Self {
        Self {
            client,
            text_max_chars,
            context_max_chars,
        }
    }

    fn extraction_prompt(&self, text: &str, company: &str, designation: &str) -> String {
        format!(
            "Company: {company}\nDesignation: {designation}\n\nText:\n{}\n\n\
             Extract the full name(s) of the person(s) who hold the above designation at the above company. \
             Return names only, one per line.",
            truncate_chars(text, self.text_max_chars)
        )
    }

    fn confirmation_prompt(&self, name: &str, company: &str, designation: &str, context: &str) -> String {
        format!(
            "Is '{name}' the '{designation}' of '{company}'?\nSupporting text: {}\n\n\
             Reply with a single number between 0.0 and 1.0 representing your confidence. \
             0.0 = definitely not, 1.0 = definitely yes. Reply with the number ONLY.",
            truncate_chars(context, self.context_max_chars)
        )
    }
}

#[async_trait]
impl NameOracle for ChatOracle {
    async fn extract_names(&self, text: &str, company: &str, designation: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let messages = [
            ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(self.extraction_prompt(text, company, designation)),
        ];
        match self.client.complete(&messages).await {
            Ok(reply) => parse_name_lines(&reply),
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "name extraction call failed");
                Vec::new()
            }
        }
    }

    async fn confirm_designation(
        &self,
        name: &str,
        company: &str,
        designation: &str,
        context: &str,
    ) -> f64 {
        let messages = [ChatMessage::user(
            self.confirmation_prompt(name, company, designation, context),
        )];
        match self.client.complete(&messages).await {
            Ok(reply) => parse_confidence(&reply).unwrap_or_else(|| {
                tracing::debug!(reply = reply.as_str(), "confirmation reply has no number");
                NEUTRAL_CONFIDENCE
            }),
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "designation confirmation call failed");
                NEUTRAL_CONFIDENCE
            }
        }
    }
}

/// First `max_chars` characters of `text`.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
