//! Nested contact-block capture.
//!
//! The contact block is only trusted when one of the known section headers
//! is present. Phone-like or email-like text elsewhere in the section is
//! ignored.

use tracing::trace;

use super::rules::Marker;
use crate::models::record::ContactInfo;
use crate::text::{line_end, slice_between, Case, Haystack};

/// Candidate contact-section headers, tried in order.
pub const CONTACT_HEADERS: [Marker; 6] = [
    Marker::new("Stemline:"),
    Marker::new("About Stemline:"),
    Marker::new("Stemline Information:"),
    Marker::new("Stemline Therapeutics:"),
    Marker::new("Contact Stemline:"),
    Marker::new("Stemline Contact Information:"),
];

const COMPANY_NAME: Marker = Marker::exact("Stemline Therapeutics");
const CONTACT_PHONE: &str = "1-877-332-7961";
const EMAIL_DOMAINS: [Marker; 2] = [Marker::exact("@stemline.com"), Marker::exact("@menarini.com")];

/// Capture `{name, phone, email}` from the first contact header found.
///
/// Without a header every sub-field is empty.
pub fn extract_contact(haystack: &Haystack<'_>) -> ContactInfo {
    let found = CONTACT_HEADERS.iter().find_map(|header| {
        haystack
            .find(header.text, 0, header.case)
            .map(|pos| (header, pos))
    });
    let Some((header, pos)) = found else {
        return ContactInfo::default();
    };

    let text = haystack.text();
    let header_end = pos + header.text.len();
    let block_end = haystack
        .find("\n\n", pos, Case::Sensitive)
        .or_else(|| haystack.find(":", header_end, Case::Insensitive))
        .unwrap_or(text.len());
    let block = slice_between(text, pos, block_end);
    trace!("Contact block under {:?}: {:?}", header.text, block);

    ContactInfo {
        name: company_line(block),
        phone: if block.contains(CONTACT_PHONE) {
            CONTACT_PHONE.to_string()
        } else {
            String::new()
        },
        email: email_address(block),
    }
}

fn company_line(block: &str) -> String {
    let block = Haystack::new(block);
    match block.find(COMPANY_NAME.text, 0, COMPANY_NAME.case) {
        Some(start) => {
            let end = line_end(block.text(), start);
            slice_between(block.text(), start, end).to_string()
        }
        None => String::new(),
    }
}

/// Email ending in one of the known domains, walking back from the domain to
/// the previous whitespace or colon.
fn email_address(block: &str) -> String {
    for domain in EMAIL_DOMAINS {
        let Some(at) = block.find(domain.text) else {
            continue;
        };
        let start = block[..at]
            .rfind([' ', '\n', '\t', ':'])
            .map(|i| i + 1)
            .unwrap_or(0);
        return slice_between(block, start, at + domain.text.len()).to_string();
    }
    String::new()
}
