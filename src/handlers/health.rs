pub async fn health() -> &'static str {
    "LLM Fallback & Booking Webhook is running."
}
