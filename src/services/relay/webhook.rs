use anyhow::Context;
use async_trait::async_trait;

use super::BookingRelay;
use crate::models::BookingRequest;

/// Posts bookings as JSON to an automation webhook (Zapier, Make, n8n, ...).
pub struct WebhookRelay {
    url: String,
    client: reqwest::Client,
}

impl WebhookRelay {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BookingRelay for WebhookRelay {
    async fn relay_booking(&self, booking: &BookingRequest) -> anyhow::Result<()> {
        anyhow::ensure!(!self.url.is_empty(), "booking webhook URL is not configured");

        self.client
            .post(&self.url)
            .json(booking)
            .send()
            .await
            .context("failed to call booking webhook")?
            .error_for_status()
            .context("booking webhook returned error")?;

        Ok(())
    }
}
