//! # Conversation session
//!
//! [`ChatSession`] owns all mutable conversational state (the turn history
//! and the currently detected mood) and orchestrates one full turn per
//! [`chat`](ChatSession::chat) call: classify → rank → format → generate.
//!
//! Degrade policies live here, not in the collaborators:
//!
//! - A failed or out-of-vocabulary mood classification is invisible: the turn
//!   proceeds with the previous mood (which persists until a positive
//!   detection overwrites it; a neutral turn never resets it).
//! - A failed encoding or reply generation yields a fixed apology string and
//!   leaves the history untouched; turns are recorded only when the model
//!   actually answered.
//!
//! Each session is a single logical thread of control: one `chat` call runs to
//! completion before the next, and the mutable fields are owned exclusively by
//! the session. The catalog behind the ranker is shared read-only.

use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    catalog::CatalogStore,
    client::{ChatCompleter, CompletionParams},
    encoder::Encoder,
    mood::{self, Mood},
    prompt,
    ranker::Ranker,
};

/// Results fed into each generation prompt.
const TOP_K: usize = 7;
/// Prior turns included in each generation request (3 user/assistant pairs).
const HISTORY_WINDOW: usize = 6;

const REPLY_TEMPERATURE: f32 = 0.7;
const REPLY_MAX_TOKENS: u32 = 1024;

/// Fixed reply when generation fails. The session state is never mutated on
/// this path.
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble answering right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

/// One recorded conversation turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

/// A single customer's conversation with the menu assistant.
pub struct ChatSession<C, E> {
    ranker: Ranker<E>,
    client: C,
    history: Vec<Turn>,
    current_mood: Option<Mood>,
}

impl<C: ChatCompleter, E: Encoder> ChatSession<C, E> {
    pub fn new(catalog: Arc<CatalogStore>, encoder: E, client: C) -> Self {
        Self {
            ranker: Ranker::new(catalog, encoder),
            client,
            history: Vec::new(),
            current_mood: None,
        }
    }

    /// Currently active mood, if any.
    pub fn mood(&self) -> Option<Mood> {
        self.current_mood
    }

    /// Full recorded history (successful turns only).
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Run one conversation turn and return the assistant's reply.
    ///
    /// Never fails: every internal failure degrades per the policies above.
    pub async fn chat(&mut self, message: &str) -> String {
        if let Some(mood) = mood::classify(&self.client, message).await {
            info!("detected mood: {mood}");
            self.current_mood = Some(mood);
        }

        let context = match self.ranker.search(message, self.current_mood, TOP_K) {
            Ok(results) => prompt::format_context(&results),
            Err(err) => {
                error!("menu ranking failed: {err}");
                return APOLOGY.to_string();
            }
        };

        let request = self.build_request(message, &context);
        let params = CompletionParams {
            temperature: REPLY_TEMPERATURE,
            max_tokens: REPLY_MAX_TOKENS,
        };

        match self.client.complete(request, params).await {
            Ok(reply) => {
                self.history.push(Turn {
                    role: TurnRole::User,
                    content: message.to_string(),
                });
                self.history.push(Turn {
                    role: TurnRole::Assistant,
                    content: reply.clone(),
                });
                reply
            }
            Err(err) => {
                error!("reply generation failed: {err}");
                APOLOGY.to_string()
            }
        }
    }

    /// Clear the history and the detected mood. Idempotent.
    pub fn reset(&mut self) {
        self.history.clear();
        self.current_mood = None;
        info!("conversation history and mood cleared");
    }

    /// Assemble the generation request: system prompt, the last
    /// [`HISTORY_WINDOW`] turns, then the user message embedding the question
    /// and the formatted context.
    fn build_request(&self, message: &str, context: &str) -> Vec<ChatCompletionRequestMessage> {
        let mut messages = vec![ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(prompt::system_prompt(
                    self.current_mood,
                )),
                name: None,
            },
        )];

        let window_start = self.history.len().saturating_sub(HISTORY_WINDOW);
        for turn in &self.history[window_start..] {
            messages.push(to_request_message(turn));
        }

        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt::build_user_message(
                    message,
                    self.current_mood,
                    context,
                )),
                name: None,
            },
        ));

        messages
    }
}

#[allow(deprecated)]
fn to_request_message(turn: &Turn) -> ChatCompletionRequestMessage {
    match turn.role {
        TurnRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(turn.content.clone()),
            name: None,
        }),
        TurnRole::Assistant => {
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    turn.content.clone(),
                )),
                name: None,
                refusal: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}
