//! Detect IUD expulsion and malposition in clinic notes

use crate::detector::Detector;
use crate::shared::{POSSIBLE, Vocabulary, iud_expr, pattern};
use apex_core::{ApexResult, Document, Finding, Pattern, Status, TextSpan, status_enum};

status_enum! {
    pub enum ExpulsionStatus {
        None = -1 => "NONE",
        Expulsion = 1 => "EXPULSION",
        Malposition = 2 => "MALPOSITION",
        Protruding = 3 => "PROTRUDING",
        MissingString = 4 => "MISSING_STRING",
        Partial = 5 => "PARTIAL",
        Lost = 6 => "LOST",
        Displacement = 7 => "DISPLACEMENT",
        Possible = 8 => "POSSIBLE",
        PossDisplacement = 9 => "POSS_DISPLACEMENT",
        ProperPlacement = 10 => "PROPER_PLACEMENT",
        InUterus = 11 => "IN_UTERUS",
        LowerUterineSegment = 12 => "LOWER_UTERINE_SEGMENT",
    }
}

impl ExpulsionStatus {
    /// Result code reported for a status
    ///
    /// A correctly located device is evidence against expulsion.
    pub fn result(self) -> i32 {
        match self {
            Self::ProperPlacement | Self::InUterus => -1,
            other => other.code(),
        }
    }

    pub fn finding(self, text: &str, expected: Option<i32>) -> Finding {
        Finding::new(self, self.result())
            .with_expected(expected)
            .with_text(text)
    }
}

pub(crate) const HYPOTHETICAL: &str = concat!(
    r"(\bif\b|\bnose\b|contact|doctor|should|\bcan\b|includ|failure|",
    r"\bhow\b|\bcall|\brare|risk|associated|avoid)"
);
pub(crate) const HISTORICAL: &str = r"(hx|history|previous)";
pub(crate) const NEGATION: &str = r"(\bnot\b|\bor\b|\bno\b)";
/// Findings in neighbouring structures that share vocabulary with malposition
pub(crate) const MISC_EXCLUSION: &str = r"(cyst|fibroid|ovar(y|ian)|follic\w+|bladder)";
pub(crate) const NOTED: &str = concat!(
    r"(seen|noted|visuali[sz]\w*|identified|present|demonstrated|located|",
    r"(mal)?positioned|situated|appreciated)"
);
pub(crate) const INSIDE: &str = r"(in|within|inside|at)";
pub(crate) const LOWER_UTERINE: &str =
    r"(lower uter(ine|us)( (segment|cavity))?|cervi(x|cal)( (canal|region|os))?|endocervi\w+)";

/// Patterns for the location vocabulary shared by both expulsion detectors
#[derive(Debug)]
pub struct PlacementPatterns {
    pub partial: Pattern,
    pub proper_location: Pattern,
    pub in_uterus: Pattern,
    pub lower_uterine_segment: Pattern,
}

impl PlacementPatterns {
    pub fn new() -> ApexResult<Self> {
        let iud = iud_expr();
        Ok(Self {
            partial: pattern(
                concat!(
                    r"(partial\w* (expel|expul)|(expel|expul)\w* partial|",
                    r"(position|locat)\w* in (the )?(lower uterine segment\W+)?cervi(x|cal))"
                ),
                &[NEGATION, r"strings? of"],
            )?,
            proper_location: pattern(
                concat!(
                    r"((appropriate|expected|normal|satisfactory|proper|good|correct)(ly)? ",
                    r"(position|placement|location|locat\w+|plac\w+|situated)|",
                    r"(positioned|located|placed) (appropriately|correctly|properly))"
                ),
                &[NEGATION, r"\bmal", r"\b(in|un)(appropriate|correct|satisfactory)"],
            )?,
            in_uterus: pattern(
                &format!(
                    r"{} ({} )?(with)?in (the )?(uter(us|ine (cavity|fundus))|endometri(um|al (cavity|canal|stripe)))",
                    iud, NOTED
                ),
                &[NEGATION, r"\blower", r"cervi(x|cal)"],
            )?,
            lower_uterine_segment: pattern(
                r"(lower uterine segment|low lying|inferiorly (positioned|located|displaced))",
                &[NEGATION],
            )?,
        })
    }
}

/// Detector for IUD expulsion in clinic notes
#[derive(Debug)]
pub struct ExpulsionDetector {
    vocab: Vocabulary,
    placement: PlacementPatterns,
    incorrect: Pattern,
    placement_mention: Pattern,
    malposition: Pattern,
    displacement: Pattern,
    expulsion: Pattern,
    definite_expulsion: Pattern,
    visualized: Pattern,
    protrudes: Pattern,
    lost: Pattern,
    missing: Pattern,
    strings: Pattern,
}

impl ExpulsionDetector {
    pub fn new() -> ApexResult<Self> {
        Ok(Self {
            vocab: Vocabulary::new()?,
            placement: PlacementPatterns::new()?,
            incorrect: pattern(
                r"(incorrect(ly)?|poor(ly)?|wrong(ly)?|\bbad\b|\bmal\b)",
                &[HYPOTHETICAL, NEGATION],
            )?,
            placement_mention: pattern(r"(plac\w+|position\w*|location)", &[HYPOTHETICAL, NEGATION])?,
            malposition: pattern(
                r"(mal ?(position|place)\w*|trans ?located)",
                &[HYPOTHETICAL, NEGATION],
            )?,
            displacement: pattern(
                r"(\brotat\w+|(lower|inferior) (uter(ine|us)|cervi(x|cal))|displac\w+|dislodg\w+)",
                &[HYPOTHETICAL, NEGATION, HISTORICAL],
            )?,
            expulsion: pattern(r"(expel|expul)", &[HYPOTHETICAL, HISTORICAL, NEGATION])?,
            definite_expulsion: pattern(
                r"spontan\w+ (expel|expul)",
                &[HYPOTHETICAL, HISTORICAL, NEGATION],
            )?,
            visualized: pattern(
                &format!(r"({})( was)? (seen|visuali[sz])", iud_expr()),
                &[NEGATION, HYPOTHETICAL],
            )?,
            protrudes: pattern(r"protrud", &[r"strings?", HYPOTHETICAL])?,
            lost: pattern(r"(toilet|fell out)", &[])?,
            missing: pattern(r"(missing|\blost\b|can(no|\W)?t feel)", &[HYPOTHETICAL])?,
            strings: pattern(r"strings?", &[r"bothersome"])?,
        })
    }

    fn any(&self) -> [&Pattern; 10] {
        [
            &self.placement_mention,
            &self.malposition,
            &self.expulsion,
            &self.lost,
            &self.missing,
            &self.protrudes,
            &self.visualized,
            &self.placement.partial,
            &self.definite_expulsion,
            &self.displacement,
        ]
    }

    fn classify<S: TextSpan>(&self, span: &S) -> Vec<ExpulsionStatus> {
        let mut statuses = Vec::new();
        if span.has_all(&[&self.incorrect, &self.placement_mention])
            || span.has_pattern(&self.malposition)
        {
            statuses.push(ExpulsionStatus::Malposition);
        }
        if span.has_any(&[&self.expulsion, &self.definite_expulsion]) {
            statuses.push(if span.has_pattern(&self.vocab.possible) {
                ExpulsionStatus::Possible
            } else if span.has_pattern(&self.placement.partial) {
                ExpulsionStatus::Partial
            } else {
                ExpulsionStatus::Expulsion
            });
        } else if span.has_pattern(&self.placement.partial) {
            statuses.push(ExpulsionStatus::Partial);
        }
        if span.has_pattern(&self.protrudes) {
            statuses.push(ExpulsionStatus::Protruding);
        }
        if span.has_all(&[&self.missing, &self.strings]) {
            statuses.push(ExpulsionStatus::MissingString);
        }
        if span.has_pattern(&self.lost) {
            statuses.push(ExpulsionStatus::Lost);
        }
        if span.has_pattern(&self.displacement) {
            statuses.push(if span.has_pattern(&self.vocab.possible) {
                ExpulsionStatus::PossDisplacement
            } else {
                ExpulsionStatus::Displacement
            });
        }
        statuses
    }
}

impl Detector for ExpulsionDetector {
    fn name(&self) -> &'static str {
        "iud_expulsion"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        if !doc.has_any(&self.any()) {
            return Ok(vec![ExpulsionStatus::Skip.finding(doc.text(), expected)]);
        }

        let mut findings = Vec::new();
        let mentions = [&self.vocab.iud];
        for section in doc.select_sentences(&mentions).sections() {
            for status in self.classify(&section) {
                findings.push(status.finding(section.text(), expected));
            }
        }
        if findings.is_empty() {
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

    fn statuses(text: &str) -> Vec<&'static str> {
        let doc = Document::from_text("t", text).unwrap();
        ExpulsionDetector::new()
            .unwrap()
            .detect(&doc, None)
            .unwrap()
            .into_iter()
            .map(|f| f.status.name)
            .collect()
    }

    #[rstest]
    #[case(
        "There is an intrauterine device in place , however it is positioned in the cervix rather than the upper endometrial canal ."
    )]
    #[case("IUD is malpositioned in the lower uterine segment / cervix")]
    #[case("IUD is very low and located in the cervix")]
    #[case("located in the cervical canal")]
    #[case("tip now located in the cervical region")]
    fn test_partial(#[case] text: &str) {
        assert!(PlacementPatterns::new().unwrap().partial.is_match(text));
    }

    #[rstest]
    #[case("IUD in appropriate position", true)]
    #[case("IUD is positioned appropriately", true)]
    #[case("IUD is not in appropriate position", false)]
    #[case("IUD in inappropriate position", false)]
    fn test_proper_location(#[case] text: &str, #[case] expected: bool) {
        let p = PlacementPatterns::new().unwrap();
        assert_eq!(p.proper_location.is_match(text), expected);
    }

    #[test]
    fn test_in_uterus() {
        let p = PlacementPatterns::new().unwrap();
        assert!(p.in_uterus.is_match("IUD seen within the endometrial canal"));
        assert!(!p.in_uterus.is_match("IUD seen in the lower uterus"));
    }

    #[test]
    fn test_expelled() {
        assert_eq!(statuses("Her IUD was expelled last week."), vec!["EXPULSION"]);
    }

    #[test]
    fn test_possible_expulsion() {
        assert_eq!(statuses("Possible IUD expulsion."), vec!["POSSIBLE"]);
    }

    #[test]
    fn test_missing_strings() {
        assert_eq!(statuses("IUD strings missing on exam."), vec!["MISSING_STRING"]);
    }

    #[test]
    fn test_none_when_nothing_specific() {
        assert_eq!(statuses("IUD placement discussed."), vec!["NONE"]);
    }

    #[test]
    fn test_skip_without_vocabulary() {
        assert_eq!(statuses("Annual exam."), vec!["SKIP"]);
    }

    #[test]
    fn test_proper_placement_is_negative() {
        assert_eq!(ExpulsionStatus::ProperPlacement.result(), -1);
        assert_eq!(ExpulsionStatus::LowerUterineSegment.result(), 12);
    }
}
