//! Section splitting.
//!
//! A page's OCR text is partitioned into at most three ordered sections, one
//! per email variant on the page. Two strategies exist: splitting after each
//! occurrence of a repeated marker (the unsubscribe notice that closes every
//! email), and splitting on explicit `Section N` labels.

mod labels;
mod repeated;

pub use labels::{LabelSplitter, SECTION_LABELS};
pub use repeated::{RepeatedMarkerSplitter, DEFAULT_SPLIT_MARKER};

use serde::{Deserialize, Serialize};

/// Hard cap on sections per page. Record assembly has exactly this many
/// slice slots.
pub const MAX_SECTIONS: usize = 3;

/// A located marker occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Marker that produced this boundary.
    pub marker: String,
    /// Byte offset where the marker starts.
    pub start: usize,
    /// Byte offset where the delimited region ends (marker end or line end).
    pub end: usize,
}

/// Ordered sections of one page, between one and [`MAX_SECTIONS`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    parts: Vec<String>,
}

impl Sections {
    /// Build from already-trimmed parts. Parts beyond the cap are dropped and
    /// an empty list becomes a single empty section.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts: Vec<String> = parts
            .into_iter()
            .take(MAX_SECTIONS)
            .map(Into::into)
            .collect();
        if parts.is_empty() {
            parts.push(String::new());
        }
        Self { parts }
    }

    /// A single section holding the whole (trimmed) text.
    pub fn whole(text: &str) -> Self {
        Self::from_parts([text.trim()])
    }

    /// Number of sections produced (1..=3).
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Never true: at least one section is always produced.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Section at `index`, if produced.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    /// Iterate over the produced sections.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(String::as_str)
    }

    /// Exactly three slots, padding missing sections with `""`.
    pub fn slots(&self) -> [&str; MAX_SECTIONS] {
        let mut slots = [""; MAX_SECTIONS];
        for (slot, part) in slots.iter_mut().zip(&self.parts) {
            *slot = part.as_str();
        }
        slots
    }

    /// Render as a labelled review document:
    /// `"Section 1\n…\n\nSection 2\n…"`.
    ///
    /// Splitting the rendering with [`LabelSplitter`] yields these sections
    /// again, provided no section body contains a label itself.
    pub fn to_labeled_text(&self) -> String {
        self.parts
            .iter()
            .zip(SECTION_LABELS)
            .map(|(part, label)| format!("{}\n{}", label, part))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Strategy for partitioning a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Split after occurrences of a repeated marker.
    #[default]
    Unsubscribe,
    /// Split on `Section 1` / `Section 2` / `Section 3` labels.
    Labels,
}

impl SplitStrategy {
    /// Build the splitter for this strategy. `marker` is only used by the
    /// repeated-marker strategy.
    pub fn splitter(self, marker: &str) -> Box<dyn SectionSplitter> {
        match self {
            SplitStrategy::Unsubscribe => Box::new(RepeatedMarkerSplitter::new(marker)),
            SplitStrategy::Labels => Box::new(LabelSplitter::new()),
        }
    }
}

/// Trait for section splitting strategies.
pub trait SectionSplitter {
    /// Partition `text` into ordered sections.
    fn split(&self, text: &str) -> Sections;

    /// Boundaries used for the split, ordered by start offset.
    fn boundaries(&self, text: &str) -> Vec<Boundary>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_caps_at_three() {
        let sections = Sections::from_parts(["a", "b", "c", "d"]);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections.slots(), ["a", "b", "c"]);
    }

    #[test]
    fn test_slots_pad_missing() {
        let sections = Sections::from_parts(["only"]);
        assert_eq!(sections.slots(), ["only", "", ""]);

        let empty = Sections::from_parts(Vec::<String>::new());
        assert_eq!(empty.len(), 1);
        assert_eq!(empty.get(0), Some(""));
    }

    #[test]
    fn test_labeled_text_resplits_to_same_sections() {
        let sections = Sections::from_parts([
            "Subject Line: First\nBody one",
            "Subject Line: Second",
            "Third email",
        ]);
        let labeled = sections.to_labeled_text();
        assert!(labeled.starts_with("Section 1\nSubject Line: First"));
        assert_eq!(LabelSplitter::new().split(&labeled), sections);
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&SplitStrategy::Labels).unwrap();
        assert_eq!(json, "\"labels\"");
        let parsed: SplitStrategy = serde_json::from_str("\"unsubscribe\"").unwrap();
        assert_eq!(parsed, SplitStrategy::Unsubscribe);
    }

    #[test]
    fn test_case_width_changes_never_panic() {
        let texts = [
            "ẞẞẞ unsubscribe İ unsubscribe Section 1\nSection 2",
            "İİ Section 2\nKK\nSection 1\nẞ unsubscribe",
            "KKKK unsubscribe",
        ];

        for text in texts {
            for strategy in [SplitStrategy::Unsubscribe, SplitStrategy::Labels] {
                let sections = strategy.splitter(DEFAULT_SPLIT_MARKER).split(text);
                assert!((1..=MAX_SECTIONS).contains(&sections.len()));
                for part in sections.iter() {
                    assert!(text.contains(part), "{:?} is not part of {:?}", part, text);
                }
            }
        }
    }
}
