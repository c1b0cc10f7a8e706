//! Repeated-marker splitting.

use tracing::debug;

use super::{Boundary, SectionSplitter, Sections, MAX_SECTIONS};
use crate::text::{find_all, slice_between, slice_from, Case};

/// Marker closing every email on a page.
pub const DEFAULT_SPLIT_MARKER: &str = "unsubscribe";

/// Splits after each occurrence of one marker, case-insensitively.
///
/// Only the first two occurrences are honored as split points; any later
/// occurrence stays inside the third section.
#[derive(Debug, Clone)]
pub struct RepeatedMarkerSplitter {
    marker: String,
}

impl RepeatedMarkerSplitter {
    /// Create a splitter for `marker`.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for RepeatedMarkerSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_MARKER)
    }
}

impl SectionSplitter for RepeatedMarkerSplitter {
    fn boundaries(&self, text: &str) -> Vec<Boundary> {
        if self.marker.is_empty() {
            return Vec::new();
        }
        find_all(text, &self.marker, Case::Insensitive)
            .into_iter()
            .map(|start| Boundary {
                marker: self.marker.clone(),
                start,
                end: start + self.marker.len(),
            })
            .collect()
    }

    fn split(&self, text: &str) -> Sections {
        let boundaries = self.boundaries(text);
        debug!(
            "Found {} occurrences of {:?}, using {}",
            boundaries.len(),
            self.marker,
            boundaries.len().min(MAX_SECTIONS - 1)
        );

        let cuts: Vec<usize> = boundaries
            .iter()
            .take(MAX_SECTIONS - 1)
            .map(|b| b.end)
            .collect();

        match cuts.as_slice() {
            [] => Sections::whole(text),
            [first] => Sections::from_parts([
                slice_between(text, 0, *first),
                slice_from(text, *first),
            ]),
            [first, second, ..] => Sections::from_parts([
                slice_between(text, 0, *first),
                slice_between(text, *first, *second),
                slice_from(text, *second),
            ]),
        }
    }
}
