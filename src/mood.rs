//! # Mood model
//!
//! Everything keyed on the customer's emotional state lives here: the closed
//! [`Mood`] enumeration, the static mood→preference-term and mood→tone tables,
//! query enhancement, and the LLM-backed classifier.
//!
//! "No mood detected" is represented as `Option<Mood>` being `None`, and it is
//! the classifier's degrade target: a collaborator failure or an
//! out-of-vocabulary token never surfaces as an error, it just means no mood.
//! Ranking and prompting must keep working regardless of how the classifier
//! misbehaves.
//!
//! The two tables are fixed, process-wide, read-only configuration. They are
//! plain `match` arms over the enum so there is no runtime initialization and
//! no way to mutate them.

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent,
};
use std::fmt;
use tracing::{debug, warn};

use crate::client::{ChatCompleter, CompletionParams};

/// Closed set of customer moods the system reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Sad,
    Happy,
    Excited,
    Celebration,
    Stressed,
    Tired,
    Romantic,
    Nostalgic,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Sad,
        Mood::Happy,
        Mood::Excited,
        Mood::Celebration,
        Mood::Stressed,
        Mood::Tired,
        Mood::Romantic,
        Mood::Nostalgic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Sad => "sad",
            Mood::Happy => "happy",
            Mood::Excited => "excited",
            Mood::Celebration => "celebration",
            Mood::Stressed => "stressed",
            Mood::Tired => "tired",
            Mood::Romantic => "romantic",
            Mood::Nostalgic => "nostalgic",
        }
    }

    /// Food vocabulary associated with this mood, most relevant first. The
    /// first three terms feed query enhancement; the whole list feeds the
    /// ranking boost.
    pub fn preference_terms(self) -> &'static [&'static str] {
        match self {
            Mood::Sad => &[
                "comfort food", "warm", "hearty", "creamy", "chocolate", "dessert", "soup", "pasta",
            ],
            Mood::Happy => &[
                "fresh", "light", "healthy", "salad", "grilled", "colorful", "fruit",
            ],
            Mood::Excited => &["spicy", "bold", "flavorful", "exotic", "adventurous", "tangy"],
            Mood::Celebration => &[
                "premium", "special", "indulgent", "deluxe", "fancy", "rich", "feast",
            ],
            Mood::Stressed => &[
                "soothing", "simple", "familiar", "easy", "mild", "tea", "smoothie",
            ],
            Mood::Tired => &[
                "energizing", "protein", "nutritious", "refreshing", "coffee", "juice",
            ],
            Mood::Romantic => &["elegant", "wine", "intimate", "special", "dessert", "sharing"],
            Mood::Nostalgic => &["traditional", "classic", "homestyle", "authentic", "comfort"],
        }
    }

    /// Tone preamble prepended to the base system prompt when this mood is
    /// active. See [`crate::prompt::system_prompt`].
    pub fn tone_preamble(self) -> &'static str {
        match self {
            Mood::Sad => {
                "You are a warm, empathetic restaurant assistant. The customer is feeling down, \
                 so be extra caring and supportive. Recommend comfort foods that might lift \
                 their spirits. Use a gentle, understanding tone."
            }
            Mood::Happy => {
                "You are an enthusiastic and upbeat restaurant assistant. The customer is in a \
                 great mood! Match their energy with cheerful recommendations. Suggest fresh, \
                 vibrant dishes."
            }
            Mood::Excited => {
                "You are an energetic restaurant assistant. The customer is excited and looking \
                 for something special! Recommend bold, flavorful, or adventurous dishes. Be \
                 enthusiastic about your suggestions."
            }
            Mood::Celebration => {
                "You are a celebratory restaurant assistant. The customer is celebrating \
                 something special! Recommend premium, indulgent items perfect for the occasion. \
                 Make them feel special."
            }
            Mood::Stressed => {
                "You are a calming, reassuring restaurant assistant. The customer seems \
                 stressed. Recommend soothing, simple, familiar foods. Use a calm and \
                 reassuring tone."
            }
            Mood::Tired => {
                "You are an understanding restaurant assistant. The customer seems tired and \
                 needs energy. Recommend energizing, nutritious options. Be supportive and \
                 helpful."
            }
            Mood::Romantic => {
                "You are a sophisticated restaurant assistant. The customer is planning \
                 something romantic. Recommend elegant dishes perfect for sharing or special \
                 occasions. Be thoughtful and refined."
            }
            Mood::Nostalgic => {
                "You are a warm restaurant assistant. The customer is feeling nostalgic. \
                 Recommend traditional, homestyle, classic dishes. Connect with their memories."
            }
        }
    }

    /// Validate a classifier token against the closed vocabulary.
    ///
    /// Case-insensitive, whitespace-trimmed, and tolerant of stray
    /// punctuation. `"neutral"` and anything unrecognized map to `None`.
    pub fn parse_token(token: &str) -> Option<Mood> {
        let normalized = token.trim().to_lowercase();
        let normalized = normalized.trim_matches(|c: char| !c.is_alphabetic());
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == normalized)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append mood vocabulary to a raw query before encoding.
///
/// With a mood: the first three preference terms, space-joined, after a single
/// space. Without a mood: the query unchanged. Pure, no I/O.
pub fn enhance_query(query: &str, mood: Option<Mood>) -> String {
    match mood {
        Some(mood) => {
            let terms = mood
                .preference_terms()
                .iter()
                .take(3)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            format!("{query} {terms}")
        }
        None => query.to_string(),
    }
}

const CLASSIFIER_TEMPERATURE: f32 = 0.3;
const CLASSIFIER_MAX_TOKENS: u32 = 10;

const CLASSIFIER_INSTRUCTIONS: &str = "\
You are a mood detection expert. Analyze the user's message and detect their emotional state.

Respond with ONLY ONE WORD from this list:
- sad (feeling down, upset, lonely, heartbroken)
- happy (cheerful, content, joyful, good mood)
- excited (energetic, enthusiastic, pumped)
- celebration (birthday, anniversary, achievement, party)
- stressed (anxious, overwhelmed, worried)
- tired (exhausted, drained, sleepy)
- romantic (date night, romantic dinner)
- nostalgic (missing home, childhood memories)
- neutral (no specific mood detected)

RESPOND WITH ONLY THE MOOD WORD, NOTHING ELSE.";

/// Detect the customer's mood from one free-text message.
///
/// Builds a single-turn, closed-vocabulary instruction for the generation
/// collaborator and validates the returned token. Any collaborator failure is
/// logged and degrades to `None`; the caller never has to handle an error.
pub async fn classify<C: ChatCompleter>(client: &C, text: &str) -> Option<Mood> {
    let messages = vec![
        ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(
                CLASSIFIER_INSTRUCTIONS.to_string(),
            ),
            name: None,
        }),
        ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(format!(
                "Detect the mood from this message: '{text}'"
            )),
            name: None,
        }),
    ];

    let params = CompletionParams {
        temperature: CLASSIFIER_TEMPERATURE,
        max_tokens: CLASSIFIER_MAX_TOKENS,
    };

    match client.complete(messages, params).await {
        Ok(token) => {
            let mood = Mood::parse_token(&token);
            debug!("classifier token {token:?} -> {mood:?}");
            mood
        }
        Err(err) => {
            warn!("mood classification failed, treating as neutral: {err}");
            None
        }
    }
}
