//! Confirm that an IUD was removed

use crate::detector::Detector;
use crate::shared::{Vocabulary, pattern};
use apex_core::{ApexResult, Confidence, Document, Finding, Pattern, TextSpan, status_enum};

status_enum! {
    pub enum RemovalStatus {
        None = -1 => "NONE",
        Remove = 1 => "REMOVE",
        ToolRemove = 2 => "TOOL_REMOVE",
    }
}

const IN_PLACE: &str = r"in (place|situ)\b";
const NEGATION: &str = r"(ready|should|sometimes|must|decline|\bnot\b)";
const HYPOTHETICAL: &str = r"(option|possib\w+|desire|want|\bor\b|like|would|until|request)";
const BOILERPLATE: &str = concat!(
    r"(risk|after your visit|chance|conceive|appt|appointment|due (to|for|at)|recommend|",
    r"pregnan|pamphlet|schedul|doctor)"
);
const OTHER: &str = r"(fibroid|v25\.13)";

/// Detector for IUD removal
#[derive(Debug)]
pub struct RemovalDetector {
    iud: Pattern,
    remove: Pattern,
    probable: Pattern,
    definite: Pattern,
    tool: Pattern,
}

impl RemovalDetector {
    pub fn new() -> ApexResult<Self> {
        let vocab = Vocabulary::new()?;
        let negates = [NEGATION, BOILERPLATE, HYPOTHETICAL, IN_PLACE, OTHER];
        Ok(Self {
            iud: vocab.iud,
            remove: pattern(r"(remov\w+|replac\w+)", &negates)?,
            probable: pattern(
                r"(\biud|mirena|paragu?ard|skyla|lilett?a|kyleena)( was)? (remov\w+|replac\w+)",
                &negates,
            )?,
            definite: pattern(
                r"(remov\w+|replac\w+) (with(out)? (some |any )?(ease|difficulty|problem)|intact)",
                &negates,
            )?,
            tool: pattern(
                r"((ring )?forceps?|fashion|strings? grasp|grasp\w+ strings?)",
                &[],
            )?,
        })
    }
}

impl Detector for RemovalDetector {
    fn name(&self) -> &'static str {
        "iud_removal"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        if !doc.has_pattern_with(&self.remove, true) {
            let finding = Finding::of(RemovalStatus::Skip)
                .with_expected(expected)
                .with_text(doc.text());
            return Ok(vec![finding]);
        }

        let mentions = [&self.iud];
        let mut unmatched = Vec::new();
        for section in doc.select_sentences(&mentions).sections() {
            if !section.has_pattern(&self.remove) {
                unmatched.push(section.text().to_string());
                continue;
            }
            let status = if section.has_pattern(&self.tool) {
                RemovalStatus::ToolRemove
            } else {
                RemovalStatus::Remove
            };
            let confidence = if section.has_pattern(&self.definite) {
                Confidence::High
            } else if section.has_pattern(&self.probable) {
                Confidence::Medium
            } else {
                Confidence::Low
            };
            let finding = Finding::of(status)
                .with_expected(expected)
                .with_text(section.text())
                .with_confidence(confidence);
            return Ok(vec![finding]);
        }

        let finding = if unmatched.is_empty() {
            Finding::of(RemovalStatus::Skip).with_text(doc.text())
        } else {
            Finding::of(RemovalStatus::None).with_text(unmatched.join(" "))
        };
        Ok(vec![finding.with_expected(expected)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn detect(text: &str) -> Finding {
        let doc = Document::from_text("t", text).unwrap();
        let mut findings = RemovalDetector::new().unwrap().detect(&doc, Some(1)).unwrap();
        findings.remove(0)
    }

    #[rstest]
    #[case("removed by")]
    #[case("iud replaced")]
    fn test_remove(#[case] text: &str) {
        assert!(RemovalDetector::new().unwrap().remove.is_match(text));
    }

    #[rstest]
    #[case("mirena was removed")]
    #[case("IUD removed")]
    fn test_probable(#[case] text: &str) {
        assert!(RemovalDetector::new().unwrap().probable.is_match(text));
    }

    #[test]
    fn test_definite() {
        let d = RemovalDetector::new().unwrap();
        assert!(d.definite.is_match("skyla was removed with some difficulty"));
    }

    #[rstest]
    #[case("iud in place, not ready to remove")]
    #[case("would like iud removed")]
    #[case("risks of removal reviewed")]
    fn test_negated_removal(#[case] text: &str) {
        let d = RemovalDetector::new().unwrap();
        assert!(!d.remove.is_match(text));
        assert!(d.remove.matches_with(text, true).is_some());
    }

    #[test]
    fn test_tool_removal() {
        let f = detect("Strings grasped with ring forceps.\nIUD removed intact.");
        assert_eq!(f.status.name, "REMOVE");
        let f = detect("IUD removed with ring forceps without difficulty.");
        assert_eq!(f.status.name, "TOOL_REMOVE");
        assert_eq!(f.result, 2);
        assert_eq!(f.correct(), Some(false));
    }

    #[test]
    fn test_no_removal_language() {
        let f = detect("Mirena in good position.");
        assert_eq!(f.status.name, "SKIP");
        assert!(!f.is_actionable());
    }

    #[test]
    fn test_only_negated_removal() {
        let f = detect("Would like IUD removed next year.");
        assert_eq!(f.status.name, "NONE");
        assert_eq!(f.result, -1);
    }
}
