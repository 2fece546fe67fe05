//! Trigger-marker detection.
//!
//! A message requests generation when it contains the configured marker,
//! compared case-insensitively. The question is whatever follows the first
//! occurrence of the marker. An empty marker matches every message at
//! offset 0, so the whole text becomes the question.

/// Default marker token
pub const DEFAULT_TRIGGER_MARKER: &str = "@gemini";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMarker {
    marker: String,
    lowered: String,
}

impl TriggerMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        let marker = marker.into().trim().to_string();
        let lowered = marker.to_lowercase();
        Self { marker, lowered }
    }

    pub fn as_str(&self) -> &str {
        &self.marker
    }

    /// Byte range of the first occurrence of the marker in `text`.
    fn locate(&self, text: &str) -> Option<(usize, usize)> {
        if self.marker.is_empty() {
            return Some((0, 0));
        }
        let len = self.marker.len();
        text.char_indices()
            .map(|(start, _)| start)
            .find(|&start| {
                text.get(start..start + len)
                    .is_some_and(|window| window.to_lowercase() == self.lowered)
            })
            .map(|start| (start, start + len))
    }

    pub fn is_triggered(&self, text: &str) -> bool {
        self.locate(text).is_some()
    }

    /// The trimmed remainder following the marker, or `None` when the marker
    /// is absent. An empty question is returned as `Some("")`.
    pub fn extract_question<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.locate(text).map(|(_, end)| text[end..].trim())
    }
}

impl Default for TriggerMarker {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_MARKER)
    }
}
