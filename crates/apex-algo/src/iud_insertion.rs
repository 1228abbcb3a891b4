//! Confirm that an IUD was inserted

use crate::detector::Detector;
use crate::shared::pattern;
use apex_core::{ApexResult, Document, Finding, Pattern, Status, TextSpan, status_enum};
use log::debug;

status_enum! {
    pub enum InsertionStatus {
        Failed = 0 => "FAILED",
        Hypothetical = 1 => "HYPOTHETICAL",
        Success = 2 => "SUCCESS",
        LikelySuccess = 3 => "LIKELY_SUCCESS",
        Unknown = 4 => "UNKNOWN",
        NoMention = 5 => "NO_MENTION",
    }
}

impl InsertionStatus {
    /// Result code reported for a status
    pub fn result(self) -> i32 {
        match self {
            Self::Success => 1,
            Self::LikelySuccess => 0,
            _ => -1,
        }
    }
}

pub const SUCCESSFUL_INSERTION: &str = concat!(
    r"(\bsuccessful(ly)?\b|length of strings?|(strings?|threads?) (were |was )?(trimmed|cut|snipped)|",
    r"iud was( then)? (inserted|placed))"
);
pub const UNSUCCESSFUL_INSERTION: &str = r"(unsuccess\w*|abandon\w*|abort\w*|terminated)";

/// Detector for IUD insertion
#[derive(Debug)]
pub struct InsertionDetector {
    iud: Pattern,
    insertion: Pattern,
    strings: Pattern,
    not_successful: Pattern,
    unsuccessful: Pattern,
    hypothetical: Pattern,
    post_success: Pattern,
    pre_success: Pattern,
    post_op: Pattern,
    historical: Pattern,
    appointment: Pattern,
    date: Pattern,
    negated: Pattern,
}

impl InsertionDetector {
    pub fn new() -> ApexResult<Self> {
        Ok(Self {
            iud: pattern(r"\b(mirena|paragard|iud|ius)\b", &[])?,
            insertion: pattern(r"\b(insert|place)", &[])?,
            strings: pattern(r"\b(strings)", &[])?,
            not_successful: pattern(r"(n[o']t|without|no)\W*(success)", &[])?,
            unsuccessful: pattern(UNSUCCESSFUL_INSERTION, &[])?,
            hypothetical: pattern(r"(following|remember)", &[])?,
            post_success: pattern(SUCCESSFUL_INSERTION, &[])?,
            pre_success: pattern(
                concat!(
                    r"(without( any)? (difficult|problem|complication)|as usual|usual( sterile)? fashion|",
                    r"(strings?|threads?) (were |was )?(trimmed|cut|snipped)|",
                    r"per manufacturer'?s? recommend)"
                ),
                &[],
            )?,
            post_op: pattern(
                concat!(
                    r"(you think are related to the iud|check the (iud )?strings|",
                    r"have your iud removed or replaced)"
                ),
                &[],
            )?,
            historical: pattern(
                r"(in the past|previous|months ago|days ago|last week|last month)",
                &[],
            )?,
            appointment: pattern(r"(appt|appointment)", &[])?,
            date: pattern(
                concat!(
                    r"(\d{1,2}/\d{1,2}|january|february|march|april|may|june|july|august|",
                    r"sept(ember)?|october|november|december|20\d{2})"
                ),
                &[r"\b(exp|expires?)"],
            )?,
            negated: pattern(r"not\W*inserted", &[])?,
        })
    }

    fn classify(&self, doc: &Document) -> (InsertionStatus, Option<String>) {
        if !doc.has_all(&[&self.iud, &self.insertion]) {
            return (InsertionStatus::NoMention, None);
        }
        let mentions = [&self.iud, &self.insertion, &self.strings];
        let vetoes = [&self.historical, &self.appointment, &self.date, &self.negated];
        let section = doc
            .select_sentences(&mentions)
            .negation(&vetoes)
            .neighboring_sentences(1)
            .merged();
        if section.is_empty() {
            return (InsertionStatus::Unknown, None);
        }

        let status = if section.has_pattern(&self.pre_success) {
            InsertionStatus::Success
        } else if section.has_any(&[&self.unsuccessful, &self.not_successful]) {
            InsertionStatus::Failed
        } else if section.has_pattern(&self.hypothetical) {
            InsertionStatus::Hypothetical
        } else if section.has_pattern(&self.post_success) {
            InsertionStatus::Success
        } else if section.has_pattern(&self.post_op) {
            InsertionStatus::LikelySuccess
        } else {
            InsertionStatus::Unknown
        };
        (status, Some(section.text().to_string()))
    }
}

impl Detector for InsertionDetector {
    fn name(&self) -> &'static str {
        "iud_insertion"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        let (status, text) = self.classify(doc);
        debug!("{}: insertion {}", doc.name(), status.name());
        let mut finding = Finding::new(status, status.result()).with_expected(expected);
        if let Some(text) = text {
            finding = finding.with_text(text);
        }
        Ok(vec![finding])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn detect(text: &str) -> Finding {
        let doc = Document::from_text("t", text).unwrap();
        let mut findings = InsertionDetector::new().unwrap().detect(&doc, None).unwrap();
        assert_eq!(findings.len(), 1);
        findings.remove(0)
    }

    #[rstest]
    #[case("iud inserted 3 months ago")]
    fn test_historical(#[case] text: &str) {
        let d = InsertionDetector::new().unwrap();
        assert!(d.historical.is_match(text));
        assert!(d.insertion.is_match(text));
        assert!(d.iud.is_match(text));
    }

    #[rstest]
    #[case("strings were cut")]
    #[case("strings trimmed")]
    #[case("inserted without difficulty")]
    #[case("in the usual sterile fashion")]
    fn test_pre_success(#[case] text: &str) {
        assert!(InsertionDetector::new().unwrap().pre_success.is_match(text));
    }

    #[rstest]
    #[case("strings trimmed")]
    #[case("strings were trimmed")]
    #[case("string was trimmed")]
    #[case("strings cut")]
    #[case("threads were snipped")]
    #[case("length of string")]
    #[case("successful removal and insertion of iud")]
    fn test_successful_insertion(#[case] text: &str) {
        assert!(pattern(SUCCESSFUL_INSERTION, &[]).unwrap().is_match(text));
    }

    #[rstest]
    #[case("abandoned iud placement")]
    #[case("unsuccessful iud insertion")]
    #[case("unsuccessful due to narrow os")]
    #[case("procedure aborted")]
    #[case("procedure terminated")]
    fn test_unsuccessful_insertion(#[case] text: &str) {
        assert!(pattern(UNSUCCESSFUL_INSERTION, &[]).unwrap().is_match(text));
        assert!(!pattern(SUCCESSFUL_INSERTION, &[]).unwrap().is_match(text));
    }

    #[test]
    fn test_successful_note() {
        let f = detect("Mirena IUD inserted.\nStrings trimmed to 3 cm.\nPatient tolerated well.");
        assert_eq!(f.status.name, "SUCCESS");
        assert_eq!(f.result, 1);
        assert!(f.text.unwrap().contains("Strings trimmed"));
    }

    #[test]
    fn test_failed_note() {
        let f = detect("IUD insertion attempted.\nProcedure abandoned due to stenosis.");
        assert_eq!(f.status.name, "FAILED");
        assert_eq!(f.result, -1);
    }

    #[test]
    fn test_no_mention() {
        let f = detect("Patient here for annual exam.");
        assert_eq!(f.status.name, "NO_MENTION");
        assert!(f.text.is_none());
    }

    #[test]
    fn test_historical_sentences_are_vetoed() {
        let f = detect("IUD inserted 3 months ago.");
        assert_eq!(f.status.name, "UNKNOWN");
        assert!(f.text.is_none());
    }
}
