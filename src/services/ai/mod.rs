pub mod openai;
pub mod receptionist;

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Runs one chat completion. The system prompt, when given, goes first.
    async fn chat(&self, system_prompt: Option<&str>, messages: &[Message]) -> anyhow::Result<String>;
}
