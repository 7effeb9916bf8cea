//! # Generation collaborator
//!
//! The chat model is an external, network-bound collaborator reached through
//! the narrow [`ChatCompleter`] contract: an ordered list of messages plus
//! sampling parameters in, plain text out. The production implementation,
//! [`OpenAiChat`], talks to any OpenAI-compatible endpoint via `async-openai`.
//!
//! The same collaborator is used twice per turn with very different
//! parameters: mood classification (low temperature, ~10-token budget,
//! closed-vocabulary instruction) and reply generation (higher temperature,
//! paragraph-scale limit). Callers own the degrade policy; this module only
//! reports failures as [`CollaboratorError`], it never swallows them.

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
};
use std::future::Future;
use tracing::debug;

use crate::{config::PalateConfig, error::CollaboratorError};

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Narrow contract for the free-text generation collaborator.
///
/// The session and the mood classifier are generic over this trait, so tests
/// substitute scripted implementations without any network I/O.
pub trait ChatCompleter {
    fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        params: CompletionParams,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send;
}

/// OpenAI-compatible chat client bound to one model.
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChat {
    /// Build a client from the application configuration (API base, key, model).
    pub fn from_config(config: &PalateConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.clone())
            .with_api_base(config.api_base.clone());
        debug!("chat client created for {}", config.api_base);
        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        }
    }
}

impl ChatCompleter for OpenAiChat {
    #[allow(deprecated)]
    fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        params: CompletionParams,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send {
        async move {
            let request = CreateChatCompletionRequestArgs::default()
                .model(self.model.clone())
                .temperature(params.temperature)
                .max_tokens(params.max_tokens)
                .messages(messages)
                .build()?;

            debug!("sending completion request: {:?}", request);
            let response = self.client.chat().create(request).await?;

            response
                .choices
                .into_iter()
                .find_map(|choice| choice.message.content)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
                .ok_or(CollaboratorError::EmptyResponse)
        }
    }
}
