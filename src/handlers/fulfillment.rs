use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::errors::NOT_SURE_MESSAGE;
use crate::models::{FulfillmentRequest, FulfillmentResponse, WebhookRequest};
use crate::services::dispatcher::dispatch;
use crate::state::AppState;

#[tracing::instrument(
    name = "fulfillment",
    skip_all,
    fields(request_id = %Uuid::new_v4(), route = tracing::field::Empty)
)]
pub async fn fulfill(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Response {
    // A body we can't read is still a conversational turn; answer it in-band.
    let request: FulfillmentRequest = match payload {
        Ok(Json(body)) => body.into(),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable fulfillment body");
            return (StatusCode::OK, FulfillmentResponse::text(NOT_SURE_MESSAGE)).into_response();
        }
    };

    let reply = dispatch(&request, state.as_ref(), &state.config.calendar_timezone).await;
    tracing::Span::current().record("route", reply.route.as_str());

    let status = reply
        .error
        .as_ref()
        .map(|e| e.status(state.config.llm_failure_status))
        .unwrap_or(StatusCode::OK);
    tracing::info!(status = status.as_u16(), "fulfillment answered");

    (status, reply.response).into_response()
}
