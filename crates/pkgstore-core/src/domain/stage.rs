//! Coarse lifecycle stages inferred from package-manager output.
//!
//! This is text mining over `apt`'s unstructured, human-oriented output. The
//! markers below are what current `apt`/`dpkg` print, but nothing guarantees
//! they stay stable, and a chunk boundary can split a marker in two. Treat a
//! stage as a progress hint for the UI, never as a fact about the install.

use serde::{Deserialize, Serialize};

/// A human-readable phase label shown next to the spinner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    #[serde(rename = "Starting...")]
    Starting,
    #[serde(rename = "Downloading...")]
    Downloading,
    #[serde(rename = "Installing...")]
    Installing,
    #[serde(rename = "Configuring...")]
    Configuring,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Starting => "Starting...",
            Self::Downloading => "Downloading...",
            Self::Installing => "Installing...",
            Self::Configuring => "Configuring...",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered marker table; the first row with a matching marker wins.
const STAGE_MARKERS: &[(&[&str], Stage)] = &[
    (&["Need to get", "Get:"], Stage::Downloading),
    (&["Unpacking"], Stage::Installing),
    (&["Setting up"], Stage::Configuring),
];

/// Map one chunk of stdout text to the stage it suggests, if any.
///
/// The result depends only on `chunk`: the previous stage is not consulted,
/// so a late `Get:` line moves the label back to downloading.
pub fn classify(chunk: &str) -> Option<Stage> {
    STAGE_MARKERS
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| chunk.contains(m)))
        .map(|(_, stage)| *stage)
}
