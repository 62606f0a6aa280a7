//! Page assistant requests built on a [`CompletionService`].

use serde::Deserialize;
use tracing::debug;

use crate::completion::{ChatMessage, CompletionService};
use crate::error::CompletionError;
use crate::guide::GuideStep;

/// Characters of page text sent for a summary.
pub const SUMMARY_CONTENT_LIMIT: usize = 15_000;
/// Characters of page text attached to a chat as context.
pub const CHAT_CONTEXT_LIMIT: usize = 5_000;

pub const UNREADABLE_PAGE_MESSAGE: &str =
    "Could not read page content. Please refresh the page and try again.";

const ASSISTANT_PERSONA: &str =
    "You are ShadowLight, a helpful accessibility assistant. Answer briefly.";

pub struct Assistant<C> {
    service: C,
}

#[derive(Debug, Deserialize)]
struct GuidePlan {
    #[serde(default)]
    steps: Option<Vec<GuideStep>>,
}

impl<C: CompletionService> Assistant<C> {
    pub fn new(service: C) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &C {
        &self.service
    }

    /// Plain-language summary of the page text.
    pub async fn summarize(&self, page_text: &str) -> Result<String, CompletionError> {
        if page_text.trim().is_empty() {
            return Ok(UNREADABLE_PAGE_MESSAGE.to_string());
        }
        let prompt = format!(
            "Summarize this webpage content in simple, accessible language. Keep it concise.\n\nContent:\n{}",
            truncate_chars(page_text, SUMMARY_CONTENT_LIMIT)
        );
        self.service.complete(&[ChatMessage::user(prompt)]).await
    }

    /// Continues a conversation, optionally grounded in the page text.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        context: Option<&str>,
    ) -> Result<String, CompletionError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(ASSISTANT_PERSONA));
        if let Some(ctx) = context.filter(|c| !c.is_empty()) {
            messages.push(ChatMessage::system(format!(
                "Context of current page:\n{}",
                truncate_chars(ctx, CHAT_CONTEXT_LIMIT)
            )));
        }
        messages.extend_from_slice(history);
        self.service.complete(&messages).await
    }

    /// Asks for a list of guide steps accomplishing `intent`.
    pub async fn plan_guide(&self, intent: &str) -> Result<Vec<GuideStep>, CompletionError> {
        let prompt = format!(
            r#"You are an automation expert. The user wants to: "{intent}".
Return a list of steps in JSON format: {{ "steps": [{{ "selector": "css_selector", "instruction": "user_instruction" }}] }}.
Guess generic selectors for common sites (e.g. login form inputs, buttons).
If unsure, provide a best guess likely to exist (e.g. 'input[type="email"]', 'button[type="submit"]').
Return ONLY JSON."#
        );
        let reply = self.service.complete(&[ChatMessage::user(prompt)]).await?;
        let steps = parse_plan(&reply)?;
        debug!(intent, steps = steps.len(), "guide plan received");
        Ok(steps)
    }
}

/// Parses the outermost `{ .. }` span of a model reply as a guide plan.
pub fn parse_plan(reply: &str) -> Result<Vec<GuideStep>, CompletionError> {
    let json = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => "{}",
    };
    let plan: GuidePlan =
        serde_json::from_str(json).map_err(|e| CompletionError::MalformedPlan(e.to_string()))?;
    Ok(plan.steps.unwrap_or_default())
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}
