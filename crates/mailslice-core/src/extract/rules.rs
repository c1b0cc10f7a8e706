//! Declarative marker table for the email template.
//!
//! Each entry pairs a record field with the rule that captures it. The table
//! is consumed by [`super::FieldExtractor`]; adding a field means adding a
//! row, not a code path.

use crate::models::record::Field;
use crate::text::Case;

/// A literal anchor with its case policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub text: &'static str,
    pub case: Case,
}

impl Marker {
    /// Case-insensitive marker.
    pub const fn new(text: &'static str) -> Self {
        Self {
            text,
            case: Case::Insensitive,
        }
    }

    /// Case-sensitive marker.
    pub const fn exact(text: &'static str) -> Self {
        Self {
            text,
            case: Case::Sensitive,
        }
    }
}

/// Which offset of a located marker delimits the captured range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// The marker's first byte (marker text included when used as a start).
    Start,
    /// Just past the marker text.
    End,
    /// First byte of the line after the marker's line.
    NextLine,
}

/// A marker plus the edge used as a range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub marker: Marker,
    pub edge: Edge,
}

impl Anchor {
    pub const fn at(marker: Marker) -> Self {
        Self {
            marker,
            edge: Edge::Start,
        }
    }

    pub const fn after(marker: Marker) -> Self {
        Self {
            marker,
            edge: Edge::End,
        }
    }

    pub const fn next_line(marker: Marker) -> Self {
        Self {
            marker,
            edge: Edge::NextLine,
        }
    }
}

/// Extraction pattern kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Text after the label up to end of line.
    Labeled(Marker),

    /// From the first candidate marker found to end of line. Candidates are
    /// tried in order; the first match wins.
    Line(&'static [Marker]),

    /// Text between two anchors. The end marker is searched from the start
    /// marker's position onward.
    Between {
        start: Anchor,
        end: Anchor,
        /// Begin the start-marker search after this field's block.
        after: Option<Field>,
        /// Replace line breaks with spaces.
        collapse_newlines: bool,
    },

    /// From a code prefix up to the next whitespace character.
    CodeScan(Marker),
}

/// One row of the marker table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub rule: Rule,
}

const PREHEADER: Marker = Marker::new("Preheader:");
const SISI_START: Marker = Marker::new("SELECT IMPORTANT SAFETY INFORMATION");
const REFERENCES: Marker = Marker::new("References:");
const PRIVACY: Marker = Marker::new("Privacy and Terms of Use");

const HEADLINE_CANDIDATES: &[Marker] = &[Marker::new("ORSERDU:"), Marker::new("elacestrant")];
const PRIMARY_CTA: &[Marker] = &[Marker::new("Learn more about ORSERDU >")];
const SECONDARY_CTA: &[Marker] = &[Marker::new("Click here to request more information")];
const PRICING: &[Marker] = &[Marker::new("For State pricing disclosures")];
const FOOTER: &[Marker] = &[PRIVACY];

/// Marker table for the marketing-email template, in evaluation order.
///
/// `SafetyInfo` must follow `Sisi`: its start marker is a substring of the
/// SISI heading, so its search begins after the SISI block.
pub static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::ToEmailAddress,
        rule: Rule::Labeled(Marker::new("To:")),
    },
    FieldRule {
        field: Field::FromEmailAddress,
        rule: Rule::Labeled(Marker::new("From:")),
    },
    FieldRule {
        field: Field::SubjectLine,
        rule: Rule::Labeled(Marker::new("Subject Line:")),
    },
    FieldRule {
        field: Field::Preheader,
        rule: Rule::Labeled(PREHEADER),
    },
    FieldRule {
        field: Field::HeaderHeroSection,
        rule: Rule::Between {
            start: Anchor::next_line(PREHEADER),
            end: Anchor::at(Marker::new("Dear Healthcare Professional")),
            after: None,
            collapse_newlines: false,
        },
    },
    FieldRule {
        field: Field::Headline,
        rule: Rule::Line(HEADLINE_CANDIDATES),
    },
    FieldRule {
        field: Field::BodyCopy,
        rule: Rule::Between {
            start: Anchor::at(Marker::new("Dear Healthcare Professional,")),
            end: Anchor::at(SISI_START),
            after: None,
            collapse_newlines: false,
        },
    },
    FieldRule {
        field: Field::Sisi,
        rule: Rule::Between {
            start: Anchor::at(SISI_START),
            end: Anchor::after(Marker::new(
                "Please see additional Important Safety Information below",
            )),
            after: None,
            collapse_newlines: false,
        },
    },
    FieldRule {
        field: Field::SafetyInfo,
        rule: Rule::Between {
            start: Anchor::at(Marker::new("IMPORTANT SAFETY INFORMATION")),
            end: Anchor::after(Marker::new("www.fda.gov/medwatch")),
            after: Some(Field::Sisi),
            collapse_newlines: false,
        },
    },
    FieldRule {
        field: Field::PrimaryCta,
        rule: Rule::Line(PRIMARY_CTA),
    },
    FieldRule {
        field: Field::SecondaryCta,
        rule: Rule::Line(SECONDARY_CTA),
    },
    FieldRule {
        field: Field::PricingDisclosure,
        rule: Rule::Line(PRICING),
    },
    FieldRule {
        field: Field::Abbreviation,
        rule: Rule::Between {
            start: Anchor::after(Marker::new("Abbreviations:")),
            end: Anchor::at(REFERENCES),
            after: None,
            collapse_newlines: true,
        },
    },
    FieldRule {
        field: Field::References,
        rule: Rule::Between {
            start: Anchor::after(REFERENCES),
            end: Anchor::at(Marker::new("MENARINI")),
            after: None,
            collapse_newlines: false,
        },
    },
    FieldRule {
        field: Field::CompanyInfo,
        rule: Rule::Between {
            start: Anchor::at(Marker::new("A Menarini Group Company")),
            end: Anchor::at(PRIVACY),
            after: None,
            collapse_newlines: false,
        },
    },
    FieldRule {
        field: Field::MlrCode,
        rule: Rule::CodeScan(Marker::new("MAT-US-ELA-")),
    },
    FieldRule {
        field: Field::Footer,
        rule: Rule::Line(FOOTER),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_field_has_at_most_one_rule() {
        for (i, rule) in FIELD_RULES.iter().enumerate() {
            assert!(
                FIELD_RULES[i + 1..].iter().all(|other| other.field != rule.field),
                "duplicate rule for {:?}",
                rule.field
            );
        }
    }

    #[test]
    fn test_dependent_rules_follow_their_dependency() {
        for (i, rule) in FIELD_RULES.iter().enumerate() {
            if let Rule::Between { after: Some(dep), .. } = rule.rule {
                let dep_index = FIELD_RULES.iter().position(|r| r.field == dep);
                assert!(matches!(dep_index, Some(d) if d < i), "{:?} runs before {:?}", rule.field, dep);
            }
        }
    }

    #[test]
    fn test_unpopulated_fields_have_no_rule() {
        for field in [Field::MeetInvite, Field::Closing] {
            assert!(FIELD_RULES.iter().all(|r| r.field != field));
        }
    }
}
