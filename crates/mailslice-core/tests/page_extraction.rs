use mailslice_core::models::config::MailsliceConfig;
use mailslice_core::{PageProcessor, SplitStrategy};
use pretty_assertions::assert_eq;

const EMAIL_A: &str = "\
To: hcp@example.org
From: ORSERDU <news@orserdu.com>
Subject Line: Résultats de l'étude EMERALD
Preheader: Données actualisées
ORSERDU (elacestrant) tablets
Dear Healthcare Professional,
ORSERDU: the first oral SERD
SELECT IMPORTANT SAFETY INFORMATION
Dyslipidemia occurred.
Please see additional Important Safety Information below.
IMPORTANT SAFETY INFORMATION
Warnings.
Report at www.fda.gov/medwatch.
Stemline Contact Information:
Stemline Therapeutics, Inc.
1-877-332-7961 | medinfo@stemline.com

MAT-US-ELA-00626 v2
Privacy and Terms of Use
Click here to unsubscribe.";

const EMAIL_B: &str = "\
Subject Line: Second variant
elacestrant is now available
Footer note: Unsubscribe";

const EMAIL_C: &str = "\
Subject Line: Third variant
MAT-US-ELA-00999";

fn page_text() -> String {
    format!("{}\n{}\n{}", EMAIL_A, EMAIL_B, EMAIL_C)
}

#[test]
fn test_three_emails_on_one_page() {
    let processor = PageProcessor::new(MailsliceConfig::default());
    let result = processor.process_text(&page_text(), 2);
    let [a, b, c] = &result.page.slices;

    assert_eq!(a.subject_line, "Résultats de l'étude EMERALD");
    assert_eq!(a.headline, "ORSERDU: the first oral SERD");
    assert_eq!(a.contact.name, "Stemline Therapeutics, Inc.");
    assert_eq!(a.contact.phone, "1-877-332-7961");
    assert_eq!(a.contact.email, "medinfo@stemline.com");
    assert_eq!(a.mlr_code, "MAT-US-ELA-00626");
    assert!(a.sisi.starts_with("SELECT IMPORTANT SAFETY INFORMATION"));
    assert!(a.safety_info.section.ends_with("www.fda.gov/medwatch"));

    assert_eq!(b.subject_line, "Second variant");
    assert_eq!(b.headline, "elacestrant is now available");
    assert!(b.contact.is_empty());

    assert_eq!(c.subject_line, "Third variant");
    assert_eq!(c.mlr_code, "MAT-US-ELA-00999");
}

#[test]
fn test_page_json_shape() {
    let processor = PageProcessor::new(MailsliceConfig::default());
    let result = processor.process_text(&page_text(), 2);

    let json = serde_json::to_string_pretty(&result.page).unwrap();
    assert!(json.contains("Résultats de l'étude EMERALD"));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let page = value["page2"].as_object().unwrap();
    assert_eq!(page.keys().collect::<Vec<_>>(), ["slice1", "slice2", "slice3"]);
    assert_eq!(page["slice1"]["stemline"]["phone"], "1-877-332-7961");
    assert_eq!(page["slice3"]["Headline"], "");
}

#[test]
fn test_labeled_review_text_round_trips() {
    let processor = PageProcessor::new(MailsliceConfig::default());
    let first = processor.process_text(&page_text(), 2);

    let mut config = MailsliceConfig::default();
    config.extraction.split_strategy = SplitStrategy::Labels;
    let relabeled = PageProcessor::new(config).process_text(&first.sectioned_text(), 2);

    assert_eq!(relabeled.sections, first.sections);
    assert_eq!(relabeled.page, first.page);
}
