//! Field extraction from one section's text.

pub mod contact;
pub mod rules;

pub use contact::extract_contact;
pub use rules::{Anchor, Edge, FieldRule, Marker, Rule, FIELD_RULES};

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::models::record::{Field, FieldRecord, PageResult};
use crate::sections::Sections;
use crate::text::{line_end, next_newline, slice_between, Haystack};

/// Where a rule's markers were found, for rules that depend on another
/// field's position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Located {
    /// Offset of the start marker.
    start: Option<usize>,
    /// End of the captured block, set only when the whole block was found.
    end: Option<usize>,
}

/// Marker-table driven field extractor.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    rules: &'static [FieldRule],
}

impl FieldExtractor {
    /// Create an extractor for the built-in email template.
    pub fn new() -> Self {
        Self { rules: FIELD_RULES }
    }

    /// Create an extractor over a different rule table.
    pub fn with_rules(rules: &'static [FieldRule]) -> Self {
        Self { rules }
    }

    /// Extract one record from a section. Never fails: fields whose markers
    /// are absent keep their empty default.
    pub fn extract(&self, text: &str) -> FieldRecord {
        let haystack = Haystack::new(text);
        let mut record = FieldRecord::default();
        let mut located: HashMap<Field, Located> = HashMap::new();

        for entry in self.rules {
            let (value, position) = self.apply(&haystack, &entry.rule, &located);
            trace!("{:?} -> {:?}", entry.field, value);
            if let Some(value) = value {
                *record.get_mut(entry.field) = value;
            }
            located.insert(entry.field, position);
        }

        record.contact = extract_contact(&haystack);

        debug!(
            "Extracted {} non-empty fields from {} chars",
            record.filled_count(),
            text.len()
        );
        record
    }

    fn apply(
        &self,
        haystack: &Haystack<'_>,
        rule: &Rule,
        located: &HashMap<Field, Located>,
    ) -> (Option<String>, Located) {
        let text = haystack.text();

        match *rule {
            Rule::Labeled(label) => {
                let Some(pos) = haystack.find(label.text, 0, label.case) else {
                    return (None, Located::default());
                };
                let start = pos + label.text.len();
                let end = line_end(text, start);
                let value = slice_between(text, start, end).to_string();
                (Some(value), Located { start: Some(pos), end: Some(end) })
            }

            Rule::Line(candidates) => {
                let found = candidates
                    .iter()
                    .find_map(|marker| haystack.find(marker.text, 0, marker.case));
                let Some(pos) = found else {
                    return (None, Located::default());
                };
                let end = line_end(text, pos);
                let value = slice_between(text, pos, end).to_string();
                (Some(value), Located { start: Some(pos), end: Some(end) })
            }

            Rule::Between {
                start,
                end,
                after,
                collapse_newlines,
            } => {
                let search_from = after
                    .and_then(|field| located.get(&field))
                    .map(|prior| resume_after(text, prior))
                    .unwrap_or(0);

                let Some(start_pos) =
                    haystack.find(start.marker.text, search_from, start.marker.case)
                else {
                    return (None, Located::default());
                };
                let mut position = Located {
                    start: Some(start_pos),
                    end: None,
                };

                let Some(from) = anchor_offset(text, start, start_pos) else {
                    return (None, position);
                };
                let Some(end_pos) = haystack.find(end.marker.text, start_pos, end.marker.case)
                else {
                    return (None, position);
                };
                let Some(to) = anchor_offset(text, end, end_pos) else {
                    return (None, position);
                };
                position.end = Some(to);

                let value = slice_between(text, from, to);
                let value = if collapse_newlines {
                    value.replace('\n', " ").trim().to_string()
                } else {
                    value.to_string()
                };
                (Some(value), position)
            }

            Rule::CodeScan(prefix) => {
                let Some(pos) = haystack.find(prefix.text, 0, prefix.case) else {
                    return (None, Located::default());
                };
                let scan_from = pos + prefix.text.len();
                let end = text
                    .get(scan_from..)
                    .and_then(|rest| rest.find(char::is_whitespace))
                    .map(|i| scan_from + i)
                    .unwrap_or(text.len());
                let value = slice_between(text, pos, end).to_string();
                (Some(value), Located { start: Some(pos), end: Some(end) })
            }
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Offset where a dependent search resumes: after the prior block when it was
/// complete, one character past its start marker when only that was found,
/// otherwise the beginning of the text.
fn resume_after(text: &str, prior: &Located) -> usize {
    match (prior.end, prior.start) {
        (Some(end), _) => end,
        (None, Some(start)) => {
            let step = text
                .get(start..)
                .and_then(|rest| rest.chars().next())
                .map(char::len_utf8)
                .unwrap_or(1);
            start + step
        }
        (None, None) => 0,
    }
}

fn anchor_offset(text: &str, anchor: Anchor, pos: usize) -> Option<usize> {
    let marker_end = pos + anchor.marker.text.len();
    match anchor.edge {
        Edge::Start => Some(pos),
        Edge::End => Some(marker_end),
        Edge::NextLine => next_newline(text, marker_end).map(|newline| newline + 1),
    }
}

/// Extract every slot of `sections` independently and package them as one
/// page result.
pub fn assemble_page(page_number: u32, sections: &Sections) -> PageResult {
    let extractor = FieldExtractor::new();
    let slices = sections.slots().map(|section| extractor.extract(section));
    debug!(
        "Assembled page {} from {} sections",
        page_number,
        sections.len()
    );
    PageResult {
        page_number,
        slices,
    }
}
