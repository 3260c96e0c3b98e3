use std::env;
use std::str::FromStr;
use std::time::Duration;

use axum::http::StatusCode;
use chrono_tz::Tz;

use crate::services::ai::receptionist::RECEPTIONIST_PROMPT;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    /// System persona sent ahead of the caller's question. `None` sends the
    /// question on its own.
    pub system_prompt: Option<String>,
    pub booking_webhook_url: String,
    pub outbound_timeout: Duration,
    /// Status returned when the language model fails to answer. Relay
    /// failures always answer 200.
    pub llm_failure_status: StatusCode,
    /// Zone used for datetimes that carry no offset of their own.
    pub calendar_timezone: Tz,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parsed_or("PORT", 3000),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            openai_temperature: parsed_or("OPENAI_TEMPERATURE", 0.7),
            system_prompt: match env::var("RECEPTIONIST_PROMPT") {
                Ok(prompt) if prompt.trim().is_empty() => None,
                Ok(prompt) => Some(prompt),
                Err(_) => Some(RECEPTIONIST_PROMPT.to_string()),
            },
            booking_webhook_url: env::var("BOOKING_WEBHOOK_URL")
                .or_else(|_| env::var("ZAPIER_WEBHOOK_URL"))
                .unwrap_or_default(),
            outbound_timeout: Duration::from_secs(parsed_or("OUTBOUND_TIMEOUT_SECS", 10)),
            llm_failure_status: env::var("LLM_FAILURE_STATUS")
                .ok()
                .and_then(|v| parse_status(&v))
                .unwrap_or(StatusCode::OK),
            calendar_timezone: parsed_or("CALENDAR_TIMEZONE", Tz::UTC),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_temperature: 0.7,
            system_prompt: Some(RECEPTIONIST_PROMPT.to_string()),
            booking_webhook_url: String::new(),
            outbound_timeout: Duration::from_secs(10),
            llm_failure_status: StatusCode::OK,
            calendar_timezone: Tz::UTC,
        }
    }
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "invalid configuration value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_status(raw: &str) -> Option<StatusCode> {
    let status = raw
        .trim()
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok());
    if status.is_none() {
        tracing::warn!(value = raw, "invalid LLM_FAILURE_STATUS, using 200");
    }
    status
}
