pub mod booking;
pub mod request;
pub mod response;

pub use booking::{BookingRequest, CanonicalInstant};
pub use request::{FlowTag, FulfillmentRequest, SessionParameters, WebhookRequest};
pub use response::FulfillmentResponse;
