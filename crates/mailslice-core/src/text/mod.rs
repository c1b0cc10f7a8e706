//! Low-level text scanning: marker location and index slicing.
//!
//! All offsets are byte offsets into the original text.

mod locate;
mod slice;

pub use locate::{find_all, find_marker, line_end, next_newline, Case, Haystack};
pub use slice::{slice_between, slice_from};
