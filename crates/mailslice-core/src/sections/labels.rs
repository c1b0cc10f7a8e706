//! Fixed-label splitting.

use tracing::{debug, trace};

use super::{Boundary, SectionSplitter, Sections};
use crate::text::{next_newline, slice_between, slice_from, Haystack};

/// Labels introducing each section of a labelled page.
pub const SECTION_LABELS: [&str; 3] = ["Section 1", "Section 2", "Section 3"];

/// Splits on the three fixed section labels.
///
/// Each label is searched independently from the start of the text and only
/// its first occurrence counts. Boundaries are ordered by position, so the
/// label text does not decide which slot a section lands in.
#[derive(Debug, Clone, Default)]
pub struct LabelSplitter;

impl LabelSplitter {
    /// Create a label splitter.
    pub fn new() -> Self {
        Self
    }
}

impl SectionSplitter for LabelSplitter {
    fn boundaries(&self, text: &str) -> Vec<Boundary> {
        let haystack = Haystack::new(text);

        let mut boundaries: Vec<Boundary> = SECTION_LABELS
            .iter()
            .filter_map(|label| {
                let start = haystack.find_ci(label)?;
                let end = match next_newline(text, start) {
                    Some(newline) => newline + 1,
                    None => start + label.len(),
                };
                trace!("Label {:?} at {}..{}", label, start, end);
                Some(Boundary {
                    marker: label.to_string(),
                    start,
                    end,
                })
            })
            .collect();

        boundaries.sort_by_key(|b| b.start);
        boundaries
    }

    fn split(&self, text: &str) -> Sections {
        let boundaries = self.boundaries(text);
        debug!("Found {} section labels", boundaries.len());

        if boundaries.is_empty() {
            return Sections::whole(text);
        }

        let parts = boundaries.iter().enumerate().map(|(i, boundary)| {
            match boundaries.get(i + 1) {
                Some(next) => slice_between(text, boundary.end, next.start),
                None => slice_from(text, boundary.end),
            }
        });

        Sections::from_parts(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_labels_yields_whole_text() {
        let sections = LabelSplitter::new().split("\n just text \n");
        assert_eq!(sections.slots(), ["just text", "", ""]);
    }

    #[test]
    fn test_one_label() {
        let sections = LabelSplitter::new().split("preamble\nSection 1\nbody");
        assert_eq!(sections.slots(), ["body", "", ""]);
    }

    #[test]
    fn test_two_labels() {
        let text = "Section 1\nfirst\n\nSection 2\nsecond\n";
        let sections = LabelSplitter::new().split(text);
        assert_eq!(sections.slots(), ["first", "second", ""]);
    }

    #[test]
    fn test_three_labels() {
        let text = "Section 1\na\nSection 2\nb\nSection 3\nc";
        let sections = LabelSplitter::new().split(text);
        assert_eq!(sections.slots(), ["a", "b", "c"]);
    }

    #[test]
    fn test_out_of_order_labels_follow_text_position() {
        let text = "Section 2\nfirst in text\nSection 1\nsecond in text";
        let sections = LabelSplitter::new().split(text);
        assert_eq!(sections.slots(), ["first in text", "second in text", ""]);
    }

    #[test]
    fn test_repeated_label_uses_first_occurrence() {
        let text = "Section 1\na\nSection 1\nb\nSection 2\nc";
        let sections = LabelSplitter::new().split(text);
        assert_eq!(sections.slots(), ["a\nSection 1\nb", "c", ""]);
    }

    #[test]
    fn test_label_without_trailing_newline() {
        let text = "Section 1\nbody\nSection 2";
        let boundaries = LabelSplitter::new().boundaries(text);
        assert_eq!(boundaries[1].end, text.len());
        let sections = LabelSplitter::new().split(text);
        assert_eq!(sections.slots(), ["body", "", ""]);
    }
}
