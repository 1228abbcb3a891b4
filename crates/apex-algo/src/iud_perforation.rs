//! Detect uterine perforation by an IUD

use crate::detector::Detector;
use crate::shared::{POSSIBLE, Vocabulary, iud_expr, pattern};
use apex_core::{ApexResult, Document, Finding, Pattern, PatternQuery, TextSpan, status_enum};
use log::debug;

status_enum! {
    pub enum PerforationStatus {
        None = 0 => "NONE",
        Perforation = 1 => "PERFORATION",
        Embedded = 2 => "EMBEDDED",
        Unknown = 3 => "UNKNOWN",
        Migrated = 4 => "MIGRATED",
        Partial = 5 => "PARTIAL",
        Possible = 6 => "POSSIBLE",
        LaparoscopicRemoval = 7 => "LAPAROSCOPIC_REMOVAL",
        Complete = 8 => "COMPLETE",
    }
}

const BOILERPLATE: &str = concat!(
    r"\b(complication|pamphlet|warning|information|review|side effect|counsel|sign|infection|ensure|",
    r"cramps|risk|\bif\b)"
);
const NEGATION: &str = r"(no evidence|without|r/o|rule out|normal|\bnot?\b|\bor\b)";
const HISTORY: &str = r"(history of|previous|hx|past)";
const IMPACT_NEGATION: &str = r"\b(cerumen|tympanic|ears?|hormon\w+)\b";

/// Detector for IUD perforation
#[derive(Debug)]
pub struct PerforationDetector {
    vocab: Vocabulary,
    complete: Pattern,
    perforation: Pattern,
    partial: Pattern,
    embedded: Pattern,
    migrated: Pattern,
    laparoscopic_removal: Pattern,
}

impl PerforationDetector {
    pub fn new() -> ApexResult<Self> {
        let iud = iud_expr();
        let strong = [BOILERPLATE, HISTORY, NEGATION, IMPACT_NEGATION];
        let hedged = [BOILERPLATE, HISTORY, POSSIBLE, NEGATION, IMPACT_NEGATION];
        Ok(Self {
            vocab: Vocabulary::new()?,
            complete: pattern(
                &format!(
                    concat!(
                        r"(intra (peritoneal|abdominal)|complete(ly)? perforat(ion|ed|e)s?|",
                        r"(pierc\w+|thr(ough|u))( the)?( uterine)? (serosa|perimetrium)|",
                        r"{} (visible|seen|noted|palpated) in (the )?vagina)"
                    ),
                    iud
                ),
                &strong,
            )?,
            perforation: pattern(
                concat!(
                    r"(perforat(ion|ed|e)s?|(pierc\w+|thr(ough|u)|into)( the)?( uterine)? ",
                    r"(endometrium|wall|myometrium|serosa|perimetrium))"
                ),
                &strong,
            )?,
            partial: pattern(
                &format!(
                    r"(partial(ly)? perforat(ion|ed|e)s?|arms? (broke|broken|fractured)|{} (visible|seen|noted) in (the )?cervix)",
                    iud
                ),
                &hedged,
            )?,
            embedded: pattern(r"([ie]mbedded|impacted)", &hedged)?,
            migrated: pattern(
                r"\b(stuck|migrat\w+|extrauterine|omentum|displac\w+|(intra)?peritoneal)",
                &[BOILERPLATE, HISTORY, POSSIBLE, NEGATION],
            )?,
            laparoscopic_removal: pattern(
                concat!(
                    r"((lap[ao]r[ao](scop|tom)|pelviscop)\w*\W+(\w+\W+){0,10}(remov|retriev|extract)\w*|",
                    r"(remov|retriev|extract)\w*\W+(\w+\W+){0,10}lap[ao]r[ao](scop|tom)\w*)"
                ),
                &[HISTORY, BOILERPLATE],
            )?,
        })
    }

    fn all(&self) -> [&Pattern; 5] {
        [
            &self.complete,
            &self.perforation,
            &self.embedded,
            &self.migrated,
            &self.laparoscopic_removal,
        ]
    }

    /// Strongest perforation sign in a span, if any
    fn classify<S: TextSpan>(&self, span: &S) -> Option<PerforationStatus> {
        if span.has_pattern(&self.complete) {
            Some(PerforationStatus::Complete)
        } else if span.has_pattern(&self.partial) {
            Some(PerforationStatus::Partial)
        } else if span.has_pattern(&self.perforation) {
            if span.has_pattern(&self.vocab.possible) {
                Some(PerforationStatus::Possible)
            } else {
                Some(PerforationStatus::Perforation)
            }
        } else if span.has_pattern(&self.embedded) {
            Some(PerforationStatus::Embedded)
        } else if span.has_pattern(&self.migrated) {
            Some(PerforationStatus::Migrated)
        } else {
            None
        }
    }
}

impl Detector for PerforationDetector {
    fn name(&self) -> &'static str {
        "iud_perforation"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        let all = self.all();
        if !doc.has_patterns(&all, PatternQuery::ANY.ignoring_negation()) {
            return Ok(vec![Finding::of(PerforationStatus::Skip).with_expected(expected)]);
        }

        let mut findings = Vec::new();
        let mentions = [&self.vocab.iud];
        for section in doc.select_sentences(&mentions).sections() {
            let date = section.get_pattern(&self.vocab.date, 0);
            if let Some(status) = self.classify(&section) {
                findings.push(
                    Finding::of(status)
                        .with_expected(expected)
                        .with_text(section.text())
                        .with_date(date.clone()),
                );
            }
            if section.has_pattern(&self.laparoscopic_removal) {
                findings.push(
                    Finding::of(PerforationStatus::LaparoscopicRemoval)
                        .with_expected(expected)
                        .with_text(section.text())
                        .with_date(date),
                );
            }
        }
        debug!(
            "{}: {} perforation finding(s) in IUD sentences",
            doc.name(),
            findings.len()
        );

        findings.push(
            Finding::new(PerforationStatus::None, -1)
                .with_expected(expected)
                .with_text(doc.text()),
        );
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_core::select_best;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn detector() -> PerforationDetector {
        PerforationDetector::new().unwrap()
    }

    #[rstest]
    #[case("completely perforated", "complete")]
    #[case("pierced the uterine perimetrium", "complete")]
    #[case("mirena visible in vagina", "complete")]
    #[case("perforation", "perforation")]
    #[case("into the uterine wall", "perforation")]
    #[case("partially perforated", "partial")]
    #[case("arm broke", "partial")]
    #[case("paraguard visible in cervix", "partial")]
    #[case("impacted iud", "embedded")]
    #[case("iud was displaced", "migrated")]
    #[case("laporascopically removed", "laparoscopic_removal")]
    #[case("retrieved with laparoscope", "laparoscopic_removal")]
    fn test_positive(#[case] text: &str, #[case] which: &str) {
        let d = detector();
        let p = match which {
            "complete" => &d.complete,
            "perforation" => &d.perforation,
            "partial" => &d.partial,
            "embedded" => &d.embedded,
            "migrated" => &d.migrated,
            _ => &d.laparoscopic_removal,
        };
        assert!(p.is_match(text), "{} should match {}", which, text);
    }

    #[rstest]
    #[case("no evidence of perforation")]
    #[case("history of perforation")]
    #[case("risk of perforation reviewed")]
    fn test_negated_perforation(#[case] text: &str) {
        assert!(!detector().perforation.is_match(text));
    }

    #[test]
    fn test_impacted_cerumen_is_not_embedded() {
        assert!(!detector().embedded.is_match("impacted cerumen in left ear"));
    }

    #[test]
    fn test_dated_perforation() {
        let doc = Document::from_text(
            "t",
            "On 03/04/2019 the IUD was found to have perforated the uterus.\nPlan: follow up.",
        )
        .unwrap();
        let findings = detector().detect(&doc, None).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].status.name, "PERFORATION");
        assert_eq!(findings[0].date.as_deref(), Some("03/04/2019"));

        let best = select_best(findings).unwrap();
        assert_eq!(best.result, 1);
    }

    #[test]
    fn test_no_iud_sentence_gives_none() {
        let doc = Document::from_text("t", "Uterine perforation during D&C.").unwrap();
        let findings = detector().detect(&doc, None).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status.name, "NONE");
        assert!(!findings[0].is_actionable());
    }

    #[test]
    fn test_skip_without_perforation_language() {
        let doc = Document::from_text("t", "IUD in place.").unwrap();
        let findings = detector().detect(&doc, Some(-1)).unwrap();
        assert!(findings[0].status.is_skip());
        assert_eq!(PerforationStatus::from_code(findings[0].status.code), Some(PerforationStatus::Skip));
    }
}
