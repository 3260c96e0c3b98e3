use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Envelope the conversational platform expects back from a fulfillment call:
/// `{ "fulfillment_response": { "messages": [ { "text": { "text": [..] } } ] } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentResponse {
    pub fulfillment_response: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBody {
    pub messages: Vec<ResponseMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMessage {
    pub text: MessageText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageText {
    pub text: Vec<String>,
}

impl FulfillmentResponse {
    /// Wraps the messages, in order, into a single text message. Taking the
    /// first message separately keeps the envelope from ever being empty.
    pub fn format<S, I>(first: S, rest: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let text: Vec<String> = std::iter::once(first.into())
            .chain(rest.into_iter().map(Into::into))
            .collect();
        Self {
            fulfillment_response: ResponseBody {
                messages: vec![ResponseMessage {
                    text: MessageText { text },
                }],
            },
        }
    }

    pub fn text(message: impl Into<String>) -> Self {
        Self::format(message, std::iter::empty::<String>())
    }

    /// All message strings, flattened in order.
    pub fn texts(&self) -> Vec<&str> {
        self.fulfillment_response
            .messages
            .iter()
            .flat_map(|m| m.text.text.iter().map(String::as_str))
            .collect()
    }
}

impl IntoResponse for FulfillmentResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
