use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// JSON body returned for every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorBody {
    /// Create an error body with only a headline
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            path: None,
            timestamp: None,
        }
    }

    /// 404 body for a path that matched no route or static file
    pub fn not_found(path: &str) -> Self {
        Self {
            path: Some(path.to_string()),
            timestamp: Some(now_rfc3339()),
            ..Self::new("Not Found")
        }
    }

    /// Generic 500 body; never carries handler details
    pub fn internal() -> Self {
        Self::new("Internal Server Error")
    }

    /// Attach a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Current UTC time in RFC 3339 with millisecond precision
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
