//! Literal marker search.
//!
//! Case-insensitive search lower-cases both operands and reports offsets
//! against the original text. This is only exact when lower-casing preserves
//! byte length, which holds for ASCII and most Latin text. When it does not,
//! reported offsets may be off; the slicer then returns an empty string
//! rather than panicking.

/// Case policy attached to a single lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    /// Compare lower-cased operands.
    #[default]
    Insensitive,
    /// Compare bytes as-is.
    Sensitive,
}

/// Text prepared for repeated marker lookups.
///
/// Holds the lower-cased copy so that an extraction pass over one section
/// lower-cases it only once.
#[derive(Debug, Clone)]
pub struct Haystack<'a> {
    original: &'a str,
    lowered: String,
}

impl<'a> Haystack<'a> {
    /// Prepare `text` for lookups.
    pub fn new(text: &'a str) -> Self {
        Self {
            original: text,
            lowered: text.to_lowercase(),
        }
    }

    /// The original, unmodified text.
    pub fn text(&self) -> &'a str {
        self.original
    }

    /// Length of the original text in bytes.
    pub fn len(&self) -> usize {
        self.original.len()
    }

    /// Whether the original text is empty.
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Find the first occurrence of `marker` at or after `start`.
    pub fn find(&self, marker: &str, start: usize, case: Case) -> Option<usize> {
        match case {
            Case::Sensitive => search(self.original, marker, start),
            Case::Insensitive => {
                let needle = marker.to_lowercase();
                search(&self.lowered, &needle, start)
            }
        }
    }

    /// Case-insensitive lookup from the start of the text.
    pub fn find_ci(&self, marker: &str) -> Option<usize> {
        self.find(marker, 0, Case::Insensitive)
    }
}

fn search(haystack: &str, needle: &str, start: usize) -> Option<usize> {
    haystack
        .get(start..)
        .and_then(|rest| rest.find(needle))
        .map(|pos| pos + start)
}

/// Find the first occurrence of `marker` in `text` at or after `start`.
///
/// Returns `None` when the marker does not occur; that is an expected
/// outcome, not an error.
pub fn find_marker(text: &str, marker: &str, start: usize, case: Case) -> Option<usize> {
    Haystack::new(text).find(marker, start, case)
}

/// Start offsets of every (possibly overlapping) occurrence of `marker`.
///
/// Each search resumes one character after the previous hit.
pub fn find_all(text: &str, marker: &str, case: Case) -> Vec<usize> {
    let haystack = Haystack::new(text);
    let mut positions = Vec::new();
    let mut start = 0;

    while let Some(pos) = haystack.find(marker, start, case) {
        positions.push(pos);
        let step = text
            .get(pos..)
            .and_then(|rest| rest.chars().next())
            .map(char::len_utf8)
            .unwrap_or(1);
        start = pos + step;
    }

    positions
}

/// Offset of the next `'\n'` at or after `from`.
pub fn next_newline(text: &str, from: usize) -> Option<usize> {
    search(text, "\n", from)
}

/// Offset of the next `'\n'` at or after `from`, or the text length.
pub fn line_end(text: &str, from: usize) -> usize {
    next_newline(text, from).unwrap_or(text.len())
}
