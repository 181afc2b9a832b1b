//! SSE text framing for [`StreamEvent`].
//!
//! A frame is `event: <name>\ndata: <json>\n\n`. The payload is always a
//! single line: `serde_json` escapes every control character inside strings,
//! so log text containing newlines cannot break the framing.

use serde_json::Value;
use thiserror::Error;

use super::StreamEvent;

/// Encoding or decoding a frame failed.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed frame: {0}")]
    Malformed(String),
}

/// One named SSE event with its JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    pub name: String,
    pub data: String,
}

impl WireFrame {
    /// Split an event into its SSE name and single-line JSON payload.
    pub fn encode(event: &StreamEvent) -> Result<Self, WireError> {
        let mut value = serde_json::to_value(event)?;
        let data = value
            .get_mut("data")
            .map(Value::take)
            .ok_or_else(|| WireError::Malformed("event has no payload".to_string()))?;

        Ok(Self {
            name: event.name().to_string(),
            data: serde_json::to_string(&data)?,
        })
    }

    /// Rebuild the structured event this frame was encoded from.
    pub fn decode(&self) -> Result<StreamEvent, WireError> {
        let data: Value = serde_json::from_str(&self.data)?;
        let tagged = serde_json::json!({ "event": self.name, "data": data });
        Ok(serde_json::from_value(tagged)?)
    }

    /// Full frame text, including the terminating blank line.
    pub fn to_text(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.name, self.data)
    }

    /// Parse a captured SSE body back into frames.
    ///
    /// Only the `event` and `data` fields are understood; comments and
    /// keep-alive lines are skipped, as are blocks without a `data` line.
    pub fn parse_stream(body: &str) -> Vec<Self> {
        body.split("\n\n")
            .filter_map(|block| {
                let mut name = None;
                let mut data = None;
                for line in block.lines() {
                    if let Some(rest) = line.strip_prefix("event:") {
                        name = Some(rest.trim_start().to_string());
                    } else if let Some(rest) = line.strip_prefix("data:") {
                        data = Some(rest.trim_start().to_string());
                    }
                }
                Some(Self {
                    name: name.unwrap_or_else(|| "message".to_string()),
                    data: data?,
                })
            })
            .collect()
    }
}
