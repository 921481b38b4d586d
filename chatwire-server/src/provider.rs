//! Language-model provider abstraction
//!
//! The server only talks to a model through [`LlmProvider`]. `MODEL_SWITCH`
//! frames end up in [`LlmProvider::set_model`]; chat frames in
//! [`LlmProvider::chat`].

use std::sync::RwLock;

use async_trait::async_trait;

use chatwire_protocol::{HistoryEntry, Role};
use chatwire_utils::{ChatwireError, Result};

/// A chat-capable model backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Produce the assistant's reply to `messages` using `model`
    ///
    /// `stream` asks the backend to stream tokens internally; the returned
    /// text is always the complete reply.
    async fn chat(&self, messages: &[HistoryEntry], model: &str, stream: bool) -> Result<String>;

    /// Embed each text into a vector
    async fn embed(&self, texts: &[String], model: &str) -> Result<Vec<Vec<f32>>>;

    /// Check that the configured credentials are accepted
    async fn validate_api_key(&self) -> bool;

    /// Select the model used by default
    fn set_model(&self, model: &str) -> Result<()>;

    /// Currently selected model
    fn model(&self) -> String;

    /// Models this provider can serve
    fn available_models(&self) -> Vec<String>;

    /// Get the name of the provider for logging
    fn name(&self) -> &str;
}

/// Deterministic provider that repeats the user back
///
/// Needs no network or credentials.
#[derive(Debug)]
pub struct EchoProvider {
    model: RwLock<String>,
    models: Vec<String>,
    dimensions: usize,
}

/// Models served by [`EchoProvider`]
pub const ECHO_MODELS: [&str; 2] = ["echo-small", "echo-large"];

impl EchoProvider {
    pub fn new() -> Self {
        Self {
            model: RwLock::new(ECHO_MODELS[0].to_string()),
            models: ECHO_MODELS.iter().map(|m| m.to_string()).collect(),
            dimensions: 8,
        }
    }

    /// Start with `model` selected
    pub fn with_model(model: &str) -> Result<Self> {
        let provider = Self::new();
        provider.set_model(model)?;
        Ok(provider)
    }

    fn check_model(&self, model: &str) -> Result<()> {
        if self.models.iter().any(|m| m == model) {
            Ok(())
        } else {
            Err(ChatwireError::UnknownModel(model.to_string()))
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions] += byte as f32;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn chat(&self, messages: &[HistoryEntry], model: &str, _stream: bool) -> Result<String> {
        self.check_model(model)?;

        messages
            .iter()
            .rev()
            .find(|entry| entry.role == Role::User)
            .map(|entry| entry.content.clone())
            .ok_or_else(|| ChatwireError::provider("no user message to answer"))
    }

    async fn embed(&self, texts: &[String], model: &str) -> Result<Vec<Vec<f32>>> {
        self.check_model(model)?;
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    async fn validate_api_key(&self) -> bool {
        true
    }

    fn set_model(&self, model: &str) -> Result<()> {
        self.check_model(model)?;
        let mut current = self.model.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = model.to_string();
        Ok(())
    }

    fn model(&self) -> String {
        self.model
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn available_models(&self) -> Vec<String> {
        self.models.clone()
    }

    fn name(&self) -> &str {
        "echo"
    }
}
