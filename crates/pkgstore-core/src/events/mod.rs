//! Events emitted on a package-operation stream.
//!
//! A stream is one SSE connection wrapping one package-manager invocation.
//! Events only exist on the wire; nothing here is persisted.
//!
//! # Wire Format
//!
//! Each event is written as a named SSE event whose `data` line carries the
//! variant's fields as JSON:
//!
//! ```text
//! event: done
//! data: {"ok":true,"exitCode":0,"totalSeconds":12}
//!
//! ```

mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PackageAction, Stage};

pub use wire::{WireError, WireFrame};

/// Tagged union of everything a stream session can emit.
///
/// The `event`/`data` tagging matches the SSE field names, so the serde
/// representation of this enum is exactly the (name, payload) pair that
/// goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// First event of every stream: what is being done and since when.
    Meta {
        action: PackageAction,
        #[serde(rename = "packageName")]
        package_name: String,
        /// Session start as Unix epoch milliseconds.
        #[serde(rename = "startTime", with = "chrono::serde::ts_milliseconds")]
        start_time: DateTime<Utc>,
    },

    /// The inferred lifecycle stage changed (or was re-confirmed).
    Stage { label: Stage },

    /// Periodic tick with whole seconds since the session started.
    Timer {
        #[serde(rename = "elapsedSeconds")]
        elapsed_seconds: u64,
    },

    /// A chunk of raw process output, stdout or stderr.
    Log { text: String },

    /// Terminal event. Nothing follows it on the same stream.
    Done {
        ok: bool,
        #[serde(rename = "exitCode")]
        exit_code: i32,
        #[serde(rename = "totalSeconds")]
        total_seconds: u64,
    },
}

impl StreamEvent {
    pub fn meta(action: PackageAction, package_name: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self::Meta {
            action,
            package_name: package_name.into(),
            start_time,
        }
    }

    pub const fn stage(label: Stage) -> Self {
        Self::Stage { label }
    }

    pub const fn timer(elapsed_seconds: u64) -> Self {
        Self::Timer { elapsed_seconds }
    }

    pub fn log(text: impl Into<String>) -> Self {
        Self::Log { text: text.into() }
    }

    /// Build the terminal event; `ok` is derived from the exit code.
    pub const fn done(exit_code: i32, total_seconds: u64) -> Self {
        Self::Done {
            ok: exit_code == 0,
            exit_code,
            total_seconds,
        }
    }

    /// SSE event name for this variant.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Meta { .. } => "meta",
            Self::Stage { .. } => "stage",
            Self::Timer { .. } => "timer",
            Self::Log { .. } => "log",
            Self::Done { .. } => "done",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn meta_serializes_with_wire_field_names() {
        let start = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let event = StreamEvent::meta(PackageAction::Install, "htop", start);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "event": "meta",
                "data": {"action": "install", "packageName": "htop", "startTime": 1_700_000_000_123_i64}
            })
        );
    }

    #[test]
    fn done_derives_ok_from_exit_code() {
        assert_eq!(
            StreamEvent::done(0, 3),
            StreamEvent::Done { ok: true, exit_code: 0, total_seconds: 3 }
        );
        assert_eq!(
            StreamEvent::done(100, 3),
            StreamEvent::Done { ok: false, exit_code: 100, total_seconds: 3 }
        );
    }

    #[test]
    fn only_done_is_terminal() {
        assert!(StreamEvent::done(1, 0).is_terminal());
        assert!(!StreamEvent::timer(1).is_terminal());
        assert!(!StreamEvent::stage(Stage::Starting).is_terminal());
    }
}
