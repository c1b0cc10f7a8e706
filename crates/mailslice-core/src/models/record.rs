//! Field record ("slice") and page result models.
//!
//! JSON keys follow the established output schema, including the two
//! capitalized keys (`Header_hero_section`, `Headline`) and the `stemline`
//! contact block.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::sections::MAX_SECTIONS;

/// Fields of one email slice, all defaulting to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRecord {
    pub to_email_address: String,
    pub from_email_address: String,
    pub subject_line: String,
    pub preheader: String,

    /// Hero block between the preheader line and the greeting.
    #[serde(rename = "Header_hero_section")]
    pub header_hero_section: String,

    #[serde(rename = "Headline")]
    pub headline: String,

    pub body_copy: String,

    /// Short-form safety summary.
    pub sisi: String,

    pub primary_cta: String,
    pub secondary_cta: String,

    /// Full safety-information block.
    pub safety_info: SafetyInfo,

    pub pricing_disclosure: String,
    pub meet_invite: String,
    pub closing: String,

    /// Contact block for the marketing company.
    #[serde(rename = "stemline")]
    pub contact: ContactInfo,

    /// Abbreviations with line breaks collapsed to spaces.
    pub abbreviation: String,

    /// Free-text references block.
    pub references: String,

    pub company_info: String,

    /// Regulatory tracking code.
    pub mlr_code: String,

    pub footer: String,
}

/// Full safety-information block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyInfo {
    pub section: String,
}

/// Company contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    /// True when no sub-field was captured.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.phone.is_empty() && self.email.is_empty()
    }
}

/// Plain-text fields of a record addressable by the extraction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ToEmailAddress,
    FromEmailAddress,
    SubjectLine,
    Preheader,
    HeaderHeroSection,
    Headline,
    BodyCopy,
    Sisi,
    PrimaryCta,
    SecondaryCta,
    SafetyInfo,
    PricingDisclosure,
    MeetInvite,
    Closing,
    Abbreviation,
    References,
    CompanyInfo,
    MlrCode,
    Footer,
}

impl Field {
    /// Flat column name used for tabular output.
    pub fn column(self) -> &'static str {
        match self {
            Field::ToEmailAddress => "to_email_address",
            Field::FromEmailAddress => "from_email_address",
            Field::SubjectLine => "subject_line",
            Field::Preheader => "preheader",
            Field::HeaderHeroSection => "Header_hero_section",
            Field::Headline => "Headline",
            Field::BodyCopy => "body_copy",
            Field::Sisi => "sisi",
            Field::PrimaryCta => "primary_cta",
            Field::SecondaryCta => "secondary_cta",
            Field::SafetyInfo => "safety_info.section",
            Field::PricingDisclosure => "pricing_disclosure",
            Field::MeetInvite => "meet_invite",
            Field::Closing => "closing",
            Field::Abbreviation => "abbreviation",
            Field::References => "references",
            Field::CompanyInfo => "company_info",
            Field::MlrCode => "mlr_code",
            Field::Footer => "footer",
        }
    }

    /// Every text field in output order.
    pub const ALL: [Field; 19] = [
        Field::ToEmailAddress,
        Field::FromEmailAddress,
        Field::SubjectLine,
        Field::Preheader,
        Field::HeaderHeroSection,
        Field::Headline,
        Field::BodyCopy,
        Field::Sisi,
        Field::PrimaryCta,
        Field::SecondaryCta,
        Field::SafetyInfo,
        Field::PricingDisclosure,
        Field::MeetInvite,
        Field::Closing,
        Field::Abbreviation,
        Field::References,
        Field::CompanyInfo,
        Field::MlrCode,
        Field::Footer,
    ];
}

impl FieldRecord {
    /// Value of a text field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ToEmailAddress => &self.to_email_address,
            Field::FromEmailAddress => &self.from_email_address,
            Field::SubjectLine => &self.subject_line,
            Field::Preheader => &self.preheader,
            Field::HeaderHeroSection => &self.header_hero_section,
            Field::Headline => &self.headline,
            Field::BodyCopy => &self.body_copy,
            Field::Sisi => &self.sisi,
            Field::PrimaryCta => &self.primary_cta,
            Field::SecondaryCta => &self.secondary_cta,
            Field::SafetyInfo => &self.safety_info.section,
            Field::PricingDisclosure => &self.pricing_disclosure,
            Field::MeetInvite => &self.meet_invite,
            Field::Closing => &self.closing,
            Field::Abbreviation => &self.abbreviation,
            Field::References => &self.references,
            Field::CompanyInfo => &self.company_info,
            Field::MlrCode => &self.mlr_code,
            Field::Footer => &self.footer,
        }
    }

    /// Mutable access to a text field.
    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::ToEmailAddress => &mut self.to_email_address,
            Field::FromEmailAddress => &mut self.from_email_address,
            Field::SubjectLine => &mut self.subject_line,
            Field::Preheader => &mut self.preheader,
            Field::HeaderHeroSection => &mut self.header_hero_section,
            Field::Headline => &mut self.headline,
            Field::BodyCopy => &mut self.body_copy,
            Field::Sisi => &mut self.sisi,
            Field::PrimaryCta => &mut self.primary_cta,
            Field::SecondaryCta => &mut self.secondary_cta,
            Field::SafetyInfo => &mut self.safety_info.section,
            Field::PricingDisclosure => &mut self.pricing_disclosure,
            Field::MeetInvite => &mut self.meet_invite,
            Field::Closing => &mut self.closing,
            Field::Abbreviation => &mut self.abbreviation,
            Field::References => &mut self.references,
            Field::CompanyInfo => &mut self.company_info,
            Field::MlrCode => &mut self.mlr_code,
            Field::Footer => &mut self.footer,
        }
    }

    /// Flattened `(column, value)` pairs, contact sub-fields last.
    pub fn columns(&self) -> Vec<(&'static str, &str)> {
        let mut columns: Vec<(&'static str, &str)> = Field::ALL
            .iter()
            .map(|&field| (field.column(), self.get(field)))
            .collect();
        columns.push(("stemline.name", &self.contact.name));
        columns.push(("stemline.phone", &self.contact.phone));
        columns.push(("stemline.email", &self.contact.email));
        columns
    }

    /// Number of non-empty fields, counting contact sub-fields individually.
    pub fn filled_count(&self) -> usize {
        self.columns().iter().filter(|(_, v)| !v.is_empty()).count()
    }
}

/// Three slice records for one page.
///
/// Serializes as `{"page{N}": {"slice1": …, "slice2": …, "slice3": …}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    /// Source page number (1-indexed).
    pub page_number: u32,
    /// Records in section order.
    pub slices: [FieldRecord; MAX_SECTIONS],
}

impl PageResult {
    /// Top-level key for this page.
    pub fn key(&self) -> String {
        format!("page{}", self.page_number)
    }

    /// Slice names paired with their records.
    pub fn named_slices(&self) -> impl Iterator<Item = (String, &FieldRecord)> {
        self.slices
            .iter()
            .enumerate()
            .map(|(i, record)| (format!("slice{}", i + 1), record))
    }
}

impl Serialize for PageResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Slices<'a>(&'a [FieldRecord; MAX_SECTIONS]);

        impl Serialize for Slices<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(MAX_SECTIONS))?;
                for (i, record) in self.0.iter().enumerate() {
                    map.serialize_entry(&format!("slice{}", i + 1), record)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key(), &Slices(&self.slices))?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_record_serializes_empty_schema() {
        let value = serde_json::to_value(FieldRecord::default()).unwrap();
        assert_eq!(value["Header_hero_section"], "");
        assert_eq!(value["Headline"], "");
        assert_eq!(value["safety_info"], serde_json::json!({ "section": "" }));
        assert_eq!(
            value["stemline"],
            serde_json::json!({ "name": "", "phone": "", "email": "" })
        );
        assert_eq!(value.as_object().unwrap().len(), 20);
    }

    #[test]
    fn test_fresh_records_do_not_share_contact() {
        let mut first = FieldRecord::default();
        first.contact.phone = "1-877-332-7961".to_string();
        let second = FieldRecord::default();
        assert!(second.contact.is_empty());
    }

    #[test]
    fn test_get_mut_routes_safety_info() {
        let mut record = FieldRecord::default();
        *record.get_mut(Field::SafetyInfo) = "ISI".to_string();
        assert_eq!(record.safety_info.section, "ISI");
        assert_eq!(record.get(Field::SafetyInfo), "ISI");
    }

    #[test]
    fn test_columns_and_filled_count() {
        let mut record = FieldRecord::default();
        record.subject_line = "Hello".to_string();
        record.contact.email = "info@stemline.com".to_string();
        let columns = record.columns();
        assert_eq!(columns.len(), 22);
        assert_eq!(columns.last().unwrap().0, "stemline.email");
        assert_eq!(record.filled_count(), 2);
    }

    #[test]
    fn test_page_result_layout() {
        let mut page = PageResult {
            page_number: 2,
            ..Default::default()
        };
        page.slices[1].headline = "Élan ≥ 2".to_string();

        let json = serde_json::to_string(&page).unwrap();
        assert!(json.starts_with("{\"page2\":{\"slice1\":"));
        assert!(json.contains("Élan ≥ 2"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["page2"]["slice2"]["Headline"], "Élan ≥ 2");
        assert_eq!(value["page2"]["slice3"]["Headline"], "");
    }
}
