use async_trait::async_trait;
use chrono_tz::Tz;

use crate::errors::{AppError, BOOKING_SENT_MESSAGE, NOT_SURE_MESSAGE};
use crate::models::{BookingRequest, FlowTag, FulfillmentRequest, FulfillmentResponse};
use crate::services::datetime::normalize;

/// The two outbound capabilities a fulfillment may use.
#[async_trait]
pub trait Collaborators: Send + Sync {
    async fn answer_question(&self, text: &str) -> anyhow::Result<String>;
    async fn relay_booking(&self, booking: &BookingRequest) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Question,
    Booking,
    Unrecognized,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Question => "question",
            Route::Booking => "booking",
            Route::Unrecognized => "unrecognized",
        }
    }
}

/// What a fulfillment produced: the payload for the platform, plus the failure
/// behind it when the happy path was not taken.
#[derive(Debug)]
pub struct Reply {
    pub route: Route,
    pub response: FulfillmentResponse,
    pub error: Option<AppError>,
}

/// Picks the handling path. An untagged request still books when both the
/// name and datetime slots are filled, for agents that never set a tag.
pub fn classify(request: &FulfillmentRequest) -> Route {
    match &request.tag {
        Some(FlowTag::Fallback) => Route::Question,
        Some(FlowTag::Booking) => Route::Booking,
        None if request.parameters.name().is_some() && request.parameters.datetime().is_some() => {
            Route::Booking
        }
        _ => Route::Unrecognized,
    }
}

/// Handles one fulfillment call. Makes at most one outbound call and always
/// produces a response.
pub async fn dispatch(request: &FulfillmentRequest, collaborators: &dyn Collaborators, zone: &Tz) -> Reply {
    let route = classify(request);
    let outcome = match route {
        Route::Question => answer(request, collaborators).await,
        Route::Booking => book(request, collaborators, zone).await,
        Route::Unrecognized => Ok(NOT_SURE_MESSAGE.to_string()),
    };

    match outcome {
        Ok(message) => Reply {
            route,
            response: FulfillmentResponse::text(message),
            error: None,
        },
        Err(error) => {
            match &error {
                AppError::Ai(_) | AppError::Relay(_) => {
                    tracing::error!(route = route.as_str(), error = %error, "collaborator call failed");
                }
                AppError::Datetime(kind) => {
                    tracing::warn!(route = route.as_str(), kind = ?kind, "booking datetime rejected");
                }
                _ => tracing::info!(route = route.as_str(), reason = %error, "missing caller input"),
            }
            Reply {
                route,
                response: FulfillmentResponse::text(error.caller_message()),
                error: Some(error),
            }
        }
    }
}

async fn answer(request: &FulfillmentRequest, collaborators: &dyn Collaborators) -> Result<String, AppError> {
    let question = request.raw_text.as_deref().ok_or(AppError::MissingQuestion)?;
    collaborators.answer_question(question).await.map_err(AppError::Ai)
}

async fn book(
    request: &FulfillmentRequest,
    collaborators: &dyn Collaborators,
    zone: &Tz,
) -> Result<String, AppError> {
    let name = request.parameters.name().ok_or(AppError::MissingName)?;
    let datetime = normalize(request.parameters.datetime(), zone)?;

    let booking = BookingRequest {
        name: name.to_string(),
        datetime,
    };
    tracing::info!(name = %booking.name, datetime = %booking.datetime, "relaying booking");

    collaborators.relay_booking(&booking).await.map_err(AppError::Relay)?;
    Ok(BOOKING_SENT_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use super::*;
    use crate::errors::{BOOKING_FAILED_MESSAGE, BOOKING_INCOMPLETE_MESSAGE, QUESTION_FAILED_MESSAGE};
    use crate::models::WebhookRequest;
    use crate::services::datetime::NormalizationError;

    #[derive(Default)]
    struct Recorder {
        fail_answer: bool,
        fail_relay: bool,
        questions: Mutex<Vec<String>>,
        bookings: Mutex<Vec<BookingRequest>>,
    }

    impl Recorder {
        fn calls(&self) -> usize {
            self.questions.lock().unwrap().len() + self.bookings.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Collaborators for Recorder {
        async fn answer_question(&self, text: &str) -> anyhow::Result<String> {
            self.questions.lock().unwrap().push(text.to_string());
            if self.fail_answer {
                anyhow::bail!("model unavailable");
            }
            Ok("We're open 9-5.".to_string())
        }

        async fn relay_booking(&self, booking: &BookingRequest) -> anyhow::Result<()> {
            self.bookings.lock().unwrap().push(booking.clone());
            if self.fail_relay {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }
    }

    fn request(body: Value) -> FulfillmentRequest {
        serde_json::from_value::<WebhookRequest>(body).unwrap().into()
    }

    async fn run(body: Value, collaborators: &Recorder) -> Reply {
        dispatch(&request(body), collaborators, &Tz::UTC).await
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&request(json!({"fulfillmentInfo": {"tag": "fallback"}}))), Route::Question);
        assert_eq!(classify(&request(json!({"fulfillmentInfo": {"tag": "booking"}}))), Route::Booking);
        assert_eq!(
            classify(&request(json!({"sessionInfo": {"parameters": {"name": "Alex", "datetime": "2025-03-10"}}}))),
            Route::Booking
        );
        // Bare parameters only count when no tag was set.
        assert_eq!(
            classify(&request(json!({
                "fulfillmentInfo": {"tag": "faq"},
                "sessionInfo": {"parameters": {"name": "Alex", "datetime": "2025-03-10"}}
            }))),
            Route::Unrecognized
        );
        assert_eq!(
            classify(&request(json!({"sessionInfo": {"parameters": {"name": "Alex"}}}))),
            Route::Unrecognized
        );
        assert_eq!(classify(&request(json!({}))), Route::Unrecognized);
    }

    #[test]
    fn test_fallback_tag_wins_over_booking_parameters() {
        let req = request(json!({
            "fulfillmentInfo": {"tag": "fallback"},
            "sessionInfo": {"parameters": {"name": "Alex", "datetime": "2025-03-10"}}
        }));
        assert_eq!(classify(&req), Route::Question);
    }

    #[tokio::test]
    async fn test_question_answered() {
        let rec = Recorder::default();
        let reply = run(json!({"fulfillmentInfo": {"tag": "fallback"}, "text": "What are your hours?"}), &rec).await;
        assert_eq!(reply.response.texts(), vec!["We're open 9-5."]);
        assert!(reply.error.is_none());
        assert_eq!(*rec.questions.lock().unwrap(), vec!["What are your hours?".to_string()]);
        assert!(rec.bookings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_question_without_text_makes_no_call() {
        let rec = Recorder::default();
        let reply = run(json!({"fulfillmentInfo": {"tag": "fallback"}}), &rec).await;
        assert_eq!(reply.response.texts(), vec![NOT_SURE_MESSAGE]);
        assert!(matches!(reply.error, Some(AppError::MissingQuestion)));
        assert_eq!(rec.calls(), 0);
    }

    #[tokio::test]
    async fn test_question_failure() {
        let rec = Recorder {
            fail_answer: true,
            ..Default::default()
        };
        let reply = run(json!({"fulfillmentInfo": {"tag": "fallback"}, "text": "hours?"}), &rec).await;
        assert_eq!(reply.response.texts(), vec![QUESTION_FAILED_MESSAGE]);
        assert!(matches!(reply.error, Some(AppError::Ai(_))));
    }

    #[tokio::test]
    async fn test_booking_relayed() {
        let rec = Recorder::default();
        let reply = run(
            json!({
                "fulfillmentInfo": {"tag": "booking"},
                "sessionInfo": {"parameters": {"name": "Alex", "datetime": {"year": 2025, "month": 3, "day": 10, "hours": 14}}}
            }),
            &rec,
        )
        .await;
        assert_eq!(reply.response.texts(), vec![BOOKING_SENT_MESSAGE]);
        assert_eq!(reply.route, Route::Booking);

        let bookings = rec.bookings.lock().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].name, "Alex");
        assert_eq!(bookings[0].datetime.to_iso_string(), "2025-03-10T14:00:00.000Z");
        assert!(rec.questions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_parameters_book_without_tag() {
        let rec = Recorder::default();
        let reply = run(
            json!({"sessionInfo": {"parameters": {"name": "Jo", "datetime": "2025-06-01T09:30:00Z"}}}),
            &rec,
        )
        .await;
        assert_eq!(reply.response.texts(), vec![BOOKING_SENT_MESSAGE]);
        assert_eq!(rec.bookings.lock().unwrap()[0].datetime.to_iso_string(), "2025-06-01T09:30:00.000Z");
    }

    #[tokio::test]
    async fn test_booking_missing_name_makes_no_call() {
        let rec = Recorder::default();
        let reply = run(
            json!({"fulfillmentInfo": {"tag": "booking"}, "sessionInfo": {"parameters": {"datetime": "2025-03-10T14:00:00Z"}}}),
            &rec,
        )
        .await;
        assert_eq!(reply.response.texts(), vec![BOOKING_INCOMPLETE_MESSAGE]);
        assert!(matches!(reply.error, Some(AppError::MissingName)));
        assert_eq!(rec.calls(), 0);
    }

    #[tokio::test]
    async fn test_booking_bad_datetime_makes_no_call() {
        let cases = [
            (json!(null), NormalizationError::MissingDatetime),
            (json!("someday"), NormalizationError::UnparseableDatetime),
            (json!({"month": 3}), NormalizationError::UnparseableDatetime),
            (json!(12), NormalizationError::UnsupportedDatetimeShape),
        ];
        for (datetime, kind) in cases {
            let rec = Recorder::default();
            let reply = run(
                json!({"fulfillmentInfo": {"tag": "booking"}, "sessionInfo": {"parameters": {"name": "Alex", "datetime": datetime}}}),
                &rec,
            )
            .await;
            assert_eq!(reply.response.texts(), vec![BOOKING_INCOMPLETE_MESSAGE]);
            assert!(matches!(reply.error, Some(AppError::Datetime(k)) if k == kind));
            assert_eq!(rec.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_booking_relay_failure() {
        let rec = Recorder {
            fail_relay: true,
            ..Default::default()
        };
        let reply = run(
            json!({
                "fulfillmentInfo": {"tag": "booking"},
                "sessionInfo": {"parameters": {"name": "Alex", "datetime": {"year": 2025, "month": 3, "day": 10, "hours": 14}}}
            }),
            &rec,
        )
        .await;
        assert_eq!(reply.response.texts(), vec![BOOKING_FAILED_MESSAGE]);
        assert!(matches!(reply.error, Some(AppError::Relay(_))));
        assert_eq!(rec.bookings.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized() {
        let rec = Recorder::default();
        let reply = run(json!({"fulfillmentInfo": {"tag": "smalltalk"}, "text": "hey"}), &rec).await;
        assert_eq!(reply.response.texts(), vec![NOT_SURE_MESSAGE]);
        assert!(reply.error.is_none());
        assert_eq!(rec.calls(), 0);
    }
}
