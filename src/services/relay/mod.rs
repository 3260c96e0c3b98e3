pub mod webhook;

use async_trait::async_trait;

use crate::models::BookingRequest;

/// Forwards a completed booking to whatever system actually schedules it.
#[async_trait]
pub trait BookingRelay: Send + Sync {
    async fn relay_booking(&self, booking: &BookingRequest) -> anyhow::Result<()>;
}
