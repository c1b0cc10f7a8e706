//! Index slicing with clamping.

/// Substring between `start` and `end`, trimmed of surrounding whitespace.
///
/// Indices come from independent marker searches that may disagree, so an
/// inverted range, an out-of-range index or an offset that is not on a
/// character boundary yields `""`.
pub fn slice_between(text: &str, start: usize, end: usize) -> &str {
    let end = end.min(text.len());
    if start >= end {
        return "";
    }
    text.get(start..end).map(str::trim).unwrap_or("")
}

/// Substring from `start` to the end of `text`, trimmed.
pub fn slice_from(text: &str, start: usize) -> &str {
    slice_between(text, start, text.len())
}
