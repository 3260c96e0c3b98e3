use std::future::Future;

use anyhow::Context;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::models::BookingRequest;
use crate::services::ai::receptionist::answer_question;
use crate::services::ai::LlmProvider;
use crate::services::dispatcher::Collaborators;
use crate::services::relay::BookingRelay;

pub struct AppState {
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub relay: Box<dyn BookingRelay>,
}

impl AppState {
    async fn bounded<T>(&self, what: &'static str, call: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
        tokio::time::timeout(self.config.outbound_timeout, call)
            .await
            .with_context(|| format!("{what} timed out after {:?}", self.config.outbound_timeout))?
    }
}

#[async_trait]
impl Collaborators for AppState {
    async fn answer_question(&self, text: &str) -> anyhow::Result<String> {
        let call = answer_question(self.llm.as_ref(), self.config.system_prompt.as_deref(), text);
        self.bounded("language model", call).await
    }

    async fn relay_booking(&self, booking: &BookingRequest) -> anyhow::Result<()> {
        self.bounded("booking relay", self.relay.relay_booking(booking)).await
    }
}
