//! Text-generation client for the command channel.
//!
//! This module provides a trait-based abstraction over text-generation
//! providers, with OpenRouter as the primary implementation. A provider
//! failure is always distinguishable from a successful call that returned
//! odd text: the former is a [`GenerateError`], the latter is just a string
//! the caller gets to interpret.

mod error;
mod openrouter;

pub use error::GenerateError;
pub use openrouter::OpenRouterClient;

use async_trait::async_trait;

/// Trait for text-generation clients.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a plain-text completion for `prompt` using `model`.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, GenerateError>;
}
