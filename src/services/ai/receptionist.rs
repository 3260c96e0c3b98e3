use crate::services::ai::{LlmProvider, Message};

pub const RECEPTIONIST_PROMPT: &str = "You are a professional and friendly virtual receptionist for a clinic or law office. \
Your job is to answer questions clearly and help callers feel confident and cared for. \
If someone asks about office hours, location, services, or booking, provide direct and polite answers. \
If the question is complex or unclear, let them know you'll connect them to a human. \
Keep responses concise, calm, and helpful.";

/// Answers a caller's free-form question in a single completion turn.
pub async fn answer_question(
    llm: &dyn LlmProvider,
    system_prompt: Option<&str>,
    question: &str,
) -> anyhow::Result<String> {
    let messages = [Message::user(question)];
    llm.chat(system_prompt, &messages).await
}
