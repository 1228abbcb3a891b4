//! Detect IUD expulsion and malposition in radiology reports
//!
//! Reports are split into header zones. The impression is trusted first; the
//! findings zone is only consulted when the history asks about the device or
//! its strings, and bare IUD sentences are the last resort.

use crate::detector::Detector;
use crate::iud_expulsion::{
    ExpulsionStatus, INSIDE, LOWER_UTERINE, MISC_EXCLUSION, NOTED, PlacementPatterns,
};
use crate::shared::{BOILERPLATE, NEGATION, Vocabulary, iud_expr, pattern};
use apex_core::{ApexResult, Document, Finding, Pattern, TextSpan};
use apex_diagnostics::ApexError;
use log::debug;
use regex::Regex;

const HEADERS: &str = concat!(
    r"([A-Z]+(?: [A-Z]+)?|Impression|Imp|Transvaginal|Transabdominal",
    r"|Findings|Examination|History)\W*?:"
);

const HISTORY_ZONE: [&str; 5] = [
    "HST",
    "SAS",
    "HISTORY",
    "CLINICAL INFORMATION",
    "CLINICAL HISTORY AND QUESTION",
];
const IMPRESSION_ZONE: [&str; 3] = ["IMPRESSION", "IMPRESSIONS", "IMP"];
const FINDINGS_ZONE: [&str; 3] = ["FINDINGS", "TRANSVAGINAL", "FINDING"];

/// Detector for IUD expulsion in radiology reports
#[derive(Debug)]
pub struct RadiologyExpulsionDetector {
    headers: Regex,
    vocab: Vocabulary,
    placement: PlacementPatterns,
    iud_present: Pattern,
    string: Pattern,
    visible: Pattern,
    iud_not_seen: Pattern,
    not_seen_iud: Pattern,
    malposition: Pattern,
    malposition_iud: Pattern,
}

impl RadiologyExpulsionDetector {
    pub fn new() -> ApexResult<Self> {
        let iud = iud_expr();
        let headers = Regex::new(HEADERS).map_err(|e| ApexError::invalid_regex(HEADERS, e))?;
        Ok(Self {
            headers,
            vocab: Vocabulary::new()?,
            placement: PlacementPatterns::new()?,
            iud_present: pattern(&format!("({}|absent)", NOTED), &[])?,
            string: pattern(r"string", &[])?,
            visible: pattern(
                r"(unable|missing|visible|\bsee|absent|\bnot?\b|inability|palpable)",
                &[],
            )?,
            iud_not_seen: pattern(&format!(r"(({})( was)? n[o\W]t {})", iud, NOTED), &[])?,
            not_seen_iud: pattern(&format!(r"\bno {} {}", iud, NOTED), &[])?,
            malposition: pattern(
                &format!(
                    r"({noted} {inside} (the )?{lower}|{iud}( (is|was))? {noted}\s+(\w+\s+){{0,4}}in (the )?{lower}|(inferior|distal) to (the )?(expect|desir|typical))",
                    noted = NOTED,
                    inside = INSIDE,
                    lower = LOWER_UTERINE,
                    iud = iud,
                ),
                &[MISC_EXCLUSION, NEGATION, r"string", r"polyp", BOILERPLATE],
            )?,
            malposition_iud: pattern(
                &format!(r"(mal ?position\w* {iud}|{iud} (is )?mal ?position)", iud = iud),
                &[NEGATION, r"string", BOILERPLATE, MISC_EXCLUSION],
            )?,
        })
    }

    /// Location findings in one span; the flag says whether any of them
    /// settles the question on its own
    fn scan<S: TextSpan>(&self, span: &S, with_lost: bool) -> (Vec<ExpulsionStatus>, bool) {
        let mut statuses = Vec::new();
        let mut decisive = false;
        if span.has_pattern(&self.placement.partial) {
            statuses.push(ExpulsionStatus::Partial);
            decisive = true;
        }
        if with_lost && span.has_any(&[&self.not_seen_iud, &self.iud_not_seen]) {
            statuses.push(ExpulsionStatus::Lost);
            decisive = true;
        }
        if span.has_any(&[&self.malposition, &self.malposition_iud]) {
            statuses.push(ExpulsionStatus::Malposition);
            decisive = true;
        }
        if span.has_pattern(&self.placement.proper_location) {
            statuses.push(ExpulsionStatus::ProperPlacement);
            decisive = true;
        }
        // these two describe position without ruling on it
        if span.has_pattern(&self.placement.in_uterus) {
            statuses.push(ExpulsionStatus::InUterus);
            decisive = false;
        }
        if span.has_pattern(&self.placement.lower_uterine_segment) {
            statuses.push(ExpulsionStatus::LowerUterineSegment);
            decisive = false;
        }
        (statuses, decisive)
    }
}

impl Detector for RadiologyExpulsionDetector {
    fn name(&self) -> &'static str {
        "iud_expulsion_rad"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        let sections = doc.split(&self.headers, 1);
        let history = sections.get_sections(&HISTORY_ZONE);
        let impression = sections.get_sections(&IMPRESSION_ZONE);
        let findings_zone = sections.get_sections(&FINDINGS_ZONE);

        let mut findings = Vec::new();
        if !impression.is_empty() {
            let (statuses, decisive) = self.scan(&impression, true);
            findings.extend(
                statuses
                    .into_iter()
                    .map(|s| s.finding(impression.text(), expected)),
            );
            if decisive {
                debug!("{}: decided from impression", doc.name());
                return Ok(findings);
            }
        }

        let asks_about_device = history.has_all(&[&self.vocab.iud, &self.iud_present])
            || history.has_all(&[&self.string, &self.visible]);
        if asks_about_device {
            let (statuses, _) = self.scan(&findings_zone, false);
            findings.extend(
                statuses
                    .into_iter()
                    .map(|s| s.finding(findings_zone.text(), expected)),
            );
            if findings.is_empty() {
                findings.push(ExpulsionStatus::None.finding(findings_zone.text(), expected));
            }
            return Ok(findings);
        }

        let mentions = [&self.vocab.iud];
        let mut any_sentence = false;
        for sentence in doc.select_sentences(&mentions).sections() {
            any_sentence = true;
            let (statuses, _) = self.scan(&sentence, false);
            findings.extend(
                statuses
                    .into_iter()
                    .map(|s| s.finding(sentence.text(), expected)),
            );
        }
        if !any_sentence {
            findings.push(Finding::of(ExpulsionStatus::Skip).with_expected(expected));
        } else if findings.is_empty() {
            findings.push(ExpulsionStatus::None.finding(doc.text(), expected));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn detector() -> RadiologyExpulsionDetector {
        RadiologyExpulsionDetector::new().unwrap()
    }

    fn statuses(text: &str) -> Vec<&'static str> {
        let doc = Document::from_text("rad", text).unwrap();
        detector()
            .detect(&doc, None)
            .unwrap()
            .into_iter()
            .map(|f| f.status.name)
            .collect()
    }

    #[rstest]
    #[case("a portion of the IUD that is still located within the lower uterine cavity")]
    #[case("IUD is malpositioned in the lower uterine segment")]
    #[case("distal to the expected / desired position")]
    fn test_malposition(#[case] text: &str) {
        assert!(detector().malposition.is_match(text));
    }

    #[test]
    fn test_not_seen() {
        let d = detector();
        assert!(d.not_seen_iud.is_match("No intrauterine device identified"));
        assert!(d.iud_not_seen.is_match("IUD was not visualized transabdominally or transvaginally"));
    }

    #[rstest]
    #[case("Confirm no IUD seen in abdomen / pelvis")]
    #[case("Mirena not seen")]
    fn test_history_asks_about_device(#[case] text: &str) {
        let d = detector();
        assert!(d.iud_present.is_match(text) && d.vocab.iud.is_match(text));
    }

    #[test]
    fn test_history_asks_about_strings() {
        let d = detector();
        assert!(d.string.is_match("strings missing") && d.visible.is_match("strings missing"));
    }

    #[test]
    fn test_impression_decides() {
        let report = "HISTORY: pelvic pain\nFINDINGS: IUD located in the cervix.\nIMPRESSION: IUD in appropriate position.";
        assert_eq!(statuses(report), vec!["PROPER_PLACEMENT"]);
    }

    #[test]
    fn test_missing_device_in_impression() {
        let report = "EXAM: US pelvis\nIMPRESSION: No intrauterine device identified.";
        assert_eq!(statuses(report), vec!["LOST"]);
    }

    #[test]
    fn test_findings_consulted_when_history_asks() {
        let report = "EXAM: US pelvis\nHISTORY: IUD strings not visible\nFINDINGS: The IUD is located in the cervical canal.\nIMPRESSION: See findings.";
        assert_eq!(statuses(report), vec!["PARTIAL", "MALPOSITION"]);
    }

    #[test]
    fn test_report_opening_with_history_reads_findings_zone() {
        let report = "HISTORY: IUD strings not visible\nFINDINGS: IUD seen in the lower uterine segment.\nIMPRESSION: See findings.";
        let doc = Document::from_text("rad", report).unwrap();
        let findings = detector().detect(&doc, None).unwrap();

        let names: Vec<_> = findings.iter().map(|f| f.status.name).collect();
        assert!(names.contains(&"LOWER_UTERINE_SEGMENT"));
        for finding in &findings {
            assert_eq!(
                finding.text.as_deref(),
                Some("IUD seen in the lower uterine segment.")
            );
        }
    }

    #[test]
    fn test_unremarkable_iud_sentence_is_none() {
        assert_eq!(statuses("Mirena noted on exam."), vec!["NONE"]);
    }

    #[test]
    fn test_skip_without_iud() {
        assert_eq!(statuses("EXAM: US pelvis\nIMPRESSION: Normal ovaries."), vec!["SKIP"]);
    }
}
