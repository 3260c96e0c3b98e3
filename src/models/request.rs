use serde::Deserialize;
use serde_json::Value;

/// Raw fulfillment body as the conversational platform posts it. Every field
/// is optional so that a partial body still parses; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub fulfillment_info: Option<FulfillmentInfo>,
    /// Legacy location of the caller's utterance.
    pub text: Option<String>,
    pub query_input: Option<QueryInput>,
    pub session_info: Option<SessionInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FulfillmentInfo {
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryInput {
    pub text: Option<TextInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextInput {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub parameters: SessionParameters,
}

/// Slot values collected by the platform. `name` is kept loosely typed since
/// person entities arrive as `{"name": "..."}` rather than a bare string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionParameters {
    pub name: Option<Value>,
    pub datetime: Option<Value>,
}

impl SessionParameters {
    pub fn name(&self) -> Option<&str> {
        let name = match self.name.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(entity) => entity.get("name")?.as_str()?,
            _ => return None,
        };
        non_blank(name)
    }

    /// The datetime slot, or `None` when it is missing, null or an empty string.
    pub fn datetime(&self) -> Option<&Value> {
        match self.datetime.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            value => Some(value),
        }
    }
}

/// Which conversational flow triggered the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowTag {
    Fallback,
    Booking,
    Other(String),
}

impl FlowTag {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "fallback" => FlowTag::Fallback,
            "booking" => FlowTag::Booking,
            other => FlowTag::Other(other.to_string()),
        }
    }
}

/// A text extraction strategy: looks in one place of the body for the caller's utterance.
type TextSource = fn(&WebhookRequest) -> Option<&str>;

/// Places the caller's utterance may live, highest priority first.
const TEXT_SOURCES: &[(&str, TextSource)] = &[
    ("text", legacy_text),
    ("queryInput.text.text", query_input_text),
];

fn legacy_text(req: &WebhookRequest) -> Option<&str> {
    req.text.as_deref()
}

fn query_input_text(req: &WebhookRequest) -> Option<&str> {
    req.query_input.as_ref()?.text.as_ref()?.text.as_deref()
}

/// Returns the first non-blank utterance along with where it was found.
pub fn extract_text(req: &WebhookRequest) -> Option<(&'static str, &str)> {
    TEXT_SOURCES
        .iter()
        .find_map(|(location, source)| source(req).and_then(non_blank).map(|t| (*location, t)))
}

/// Typed view of one fulfillment call, built once at the HTTP boundary.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentRequest {
    pub tag: Option<FlowTag>,
    pub raw_text: Option<String>,
    pub parameters: SessionParameters,
}

impl From<WebhookRequest> for FulfillmentRequest {
    fn from(req: WebhookRequest) -> Self {
        let raw_text = extract_text(&req).map(|(location, text)| {
            tracing::debug!(location, "caller text extracted");
            text.to_string()
        });
        let tag = req
            .fulfillment_info
            .as_ref()
            .and_then(|info| info.tag.as_deref())
            .and_then(non_blank)
            .map(FlowTag::parse);

        Self {
            tag,
            raw_text,
            parameters: req.session_info.map(|s| s.parameters).unwrap_or_default(),
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
