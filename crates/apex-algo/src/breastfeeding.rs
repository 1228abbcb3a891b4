//! Determine breastfeeding status
//!
//! Notes often carry templated breastfeeding teaching. That language is
//! reported once as BOILERPLATE and erased before the remaining sentences
//! are scanned, so an answered template field is still read correctly.

use crate::detector::Detector;
use crate::shared::{HISTORICAL, HYPOTHETICAL, NEGATION, pattern};
use apex_core::{ApexResult, Document, Finding, Pattern, Status, TextSpan, status_enum};
use apex_diagnostics::APX0001;
use log::debug;

status_enum! {
    pub enum BreastfeedingStatus {
        None = -1 => "NONE",
        No = 0 => "NO",
        Breastfeeding = 1 => "BREASTFEEDING",
        BreastPain = 2 => "BREAST_PAIN",
        Pumping = 3 => "PUMPING",
        Bottle = 4 => "BOTTLE",
        Formula = 5 => "FORMULA",
        MilkSupply = 6 => "MILK_SUPPLY",
        LactationVisit = 7 => "LACTATION_VISIT",
        Maybe = 8 => "MAYBE",
        Boilerplate = 9 => "BOILERPLATE",
        Expressed = 10 => "EXPRESSED",
        History = 11 => "HISTORY",
        NoFormula = 12 => "NO_FORMULA",
    }
}

impl BreastfeedingStatus {
    /// Boilerplate is reported but never counts as evidence
    pub fn result(self) -> i32 {
        match self {
            Self::Boilerplate => -1,
            other => other.code(),
        }
    }

    fn finding(self, expected: Option<i32>) -> Finding {
        Finding::new(self, self.result()).with_expected(expected)
    }
}

const PAIN: &str = r"(sore\w*|pain\w*|infection|excoriat\w+|yeast|candida|engorg\w+)";
const BREAST: &str = r"(breast|nipple)";
const WORDS_3: &str = r"( \w+){0,3} ";

/// Detector for breastfeeding status
#[derive(Debug)]
pub struct BreastfeedingDetector {
    any_breast: Pattern,
    breast_pain: Pattern,
    nipple_shield: Pattern,
    breast_milk: Pattern,
    expressed_milk: Pattern,
    expressed_milk_exact: Pattern,
    lactation_visit: Pattern,
    duration: Pattern,
    feeding_type: Pattern,
    boilerplate: Pattern,
    unanswered: Pattern,
    history: Pattern,
    exact: Pattern,
    no_exact: Pattern,
    yes: Pattern,
    bf: Pattern,
    formula_exact: Pattern,
    formula_no: Pattern,
    pumping_exact: Pattern,
    pumping: Pattern,
    bottle_exact: Pattern,
}

impl BreastfeedingDetector {
    pub fn new() -> ApexResult<Self> {
        Ok(Self {
            any_breast: pattern(r"(breast|nipple|milk|lactat\w+|\bbf\b)", &[])?,
            breast_pain: pattern(
                &format!(
                    "({pain}{words}{breast}|{breast}{words}{pain})",
                    pain = PAIN,
                    breast = BREAST,
                    words = WORDS_3
                ),
                &[NEGATION, HYPOTHETICAL, HISTORICAL],
            )?,
            nipple_shield: pattern(
                r"((us(es|ing)|wean\w+ from|yes|with)( the)? nipple shield|nipple shield in use)",
                &[NEGATION, HYPOTHETICAL, HISTORICAL],
            )?,
            breast_milk: pattern(
                &format!(r"(breast milk|lactating|milk supply|supply{}milk)", WORDS_3),
                &[],
            )?,
            expressed_milk: pattern(r"(express\w+( breast)? milk)", &[])?,
            expressed_milk_exact: pattern(r"(expressed breast milk: y)", &[])?,
            lactation_visit: pattern(
                r"\blactation (visit|services?|consult(ation|ed|s)?\b|specialist|assessment)",
                &[],
            )?,
            duration: pattern(
                r"(duration at breast|time breast feeding|total intake this feeding)",
                &[],
            )?,
            feeding_type: pattern(r"(feeding methods? breast|type feeding breast)", &[])?,
            boilerplate: pattern(
                concat!(
                    r"(breastfeeding plan|most breastfeeding problems|use different positions|",
                    r"express some breastmilk|have the lactation nurse check out|",
                    r"breastfeeding questions|breastfeeding 101)"
                ),
                &[],
            )?,
            unanswered: pattern(r"breast feeding: \{yes no:\d+\}", &[])?,
            history: pattern(r"(breast feeding history: y)", &[])?,
            exact: pattern(
                r"(breast feeding: y|breast feeding: offered: y|taking breast: (y|for \d))",
                &[],
            )?,
            no_exact: pattern(
                r"(breast feeding: no|breast feeding: offered: no)",
                &[HISTORICAL],
            )?,
            yes: pattern(
                r"(breast feeding well|(is|been) breast feeding)",
                &[NEGATION, HYPOTHETICAL],
            )?,
            bf: pattern(r"(feed\w+ breast|breast feeding|breast fed|\bbf\b)", &[])?,
            formula_exact: pattern(r"(formula offered: y|formula: y)", &[])?,
            formula_no: pattern(r"formula: no", &[])?,
            pumping_exact: pattern(r"(yes breast pump|problems with pumping: no)", &[])?,
            pumping: pattern(r"breast pump", &[])?,
            bottle_exact: pattern(r"taking bottle: y", &[])?,
        })
    }

    /// Findings for one sentence; weak mentions are only read when the note
    /// carried no template language
    fn classify<S: TextSpan>(&self, span: &S, templated: bool) -> Vec<BreastfeedingStatus> {
        let mut statuses = Vec::new();
        let mut answered = false;
        if span.has_any(&[&self.exact, &self.duration, &self.feeding_type, &self.yes]) {
            statuses.push(BreastfeedingStatus::Breastfeeding);
            answered = true;
        }
        if span.has_pattern(&self.no_exact) {
            statuses.push(BreastfeedingStatus::No);
            answered = true;
        }
        let explicit = [
            (&self.breast_pain, BreastfeedingStatus::BreastPain),
            (&self.expressed_milk_exact, BreastfeedingStatus::Expressed),
            (&self.history, BreastfeedingStatus::History),
            (&self.formula_exact, BreastfeedingStatus::Formula),
            (&self.formula_no, BreastfeedingStatus::NoFormula),
            (&self.lactation_visit, BreastfeedingStatus::LactationVisit),
            (&self.pumping_exact, BreastfeedingStatus::Pumping),
            (&self.bottle_exact, BreastfeedingStatus::Bottle),
        ];
        for (p, status) in explicit {
            if span.has_pattern(p) {
                statuses.push(status);
            }
        }
        if templated || answered {
            return statuses;
        }
        if span.has_pattern(&self.nipple_shield) {
            statuses.push(BreastfeedingStatus::Breastfeeding);
        }
        if span.has_any(&[&self.breast_milk, &self.bf, &self.pumping, &self.expressed_milk]) {
            statuses.push(BreastfeedingStatus::Maybe);
        }
        statuses
    }
}

impl Detector for BreastfeedingDetector {
    fn name(&self) -> &'static str {
        "breastfeeding"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        let template = [&self.boilerplate, &self.unanswered];
        let mut findings = Vec::new();
        let stripped;
        let scan = match doc.get_patterns(&template, 0) {
            Some(phrase) => {
                findings.push(
                    BreastfeedingStatus::Boilerplate
                        .finding(expected)
                        .with_text(phrase),
                );
                stripped = match doc.remove_patterns(&template) {
                    Ok(stripped) => stripped,
                    Err(err) if err.code() == APX0001 => {
                        debug!("{}: nothing left after removing boilerplate", doc.name());
                        return Ok(findings);
                    }
                    Err(err) => return Err(err),
                };
                &stripped
            }
            None => doc,
        };
        let templated = scan.is_derived();

        let mentions = [&self.any_breast];
        let mut any_sentence = false;
        for section in scan.select_sentences(&mentions).sections() {
            any_sentence = true;
            for status in self.classify(&section, templated) {
                findings.push(
                    status
                        .finding(expected)
                        .with_text(section.text()),
                );
            }
        }

        if !any_sentence && findings.is_empty() {
            return Ok(vec![Finding::of(BreastfeedingStatus::Skip).with_expected(expected)]);
        }
        if findings.is_empty() {
            findings.push(BreastfeedingStatus::None.finding(expected));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_core::select_best;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn detector() -> BreastfeedingDetector {
        BreastfeedingDetector::new().unwrap()
    }

    fn statuses(text: &str) -> Vec<&'static str> {
        let doc = Document::from_text("t", text).unwrap();
        detector()
            .detect(&doc, None)
            .unwrap()
            .into_iter()
            .map(|f| f.status.name)
            .collect()
    }

    #[rstest]
    #[case("lactation consultation", true)]
    #[case("seen by lactation services", true)]
    #[case("prelactation consultation", false)]
    #[case(
        "The lactation consultant usually advises waiting 4-5 days between offering new foods",
        false
    )]
    fn test_lactation_visit(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(detector().lactation_visit.is_match(text), expected);
    }

    #[test]
    fn test_unanswered_template_field() {
        assert!(detector().unanswered.is_match("Breastfeeding: {YES NO:17553}"));
    }

    #[test]
    fn test_folded_question_is_an_answer() {
        assert_eq!(statuses("Breastfeeding?\nYes"), vec!["BREASTFEEDING"]);
    }

    #[test]
    fn test_pain_and_weak_mention() {
        assert_eq!(
            statuses("Nipple pain noted while breastfeeding."),
            vec!["BREAST_PAIN", "MAYBE"]
        );
    }

    #[test]
    fn test_boilerplate_is_removed_before_scanning() {
        let doc = Document::from_text(
            "t",
            "Breastfeeding 101 class handout given.\nBreast feeding: yes",
        )
        .unwrap();
        let findings = detector().detect(&doc, Some(1)).unwrap();
        let names: Vec<_> = findings.iter().map(|f| f.status.name).collect();
        assert_eq!(names, vec!["BOILERPLATE", "BREASTFEEDING"]);
        assert_eq!(findings[0].result, -1);

        let best = select_best(findings).unwrap();
        assert_eq!(best.status.name, "BREASTFEEDING");
        assert_eq!(best.correct(), Some(true));
    }

    #[test]
    fn test_template_suppresses_weak_mentions() {
        assert_eq!(
            statuses("Breastfeeding questions answered.\nBreast milk is best."),
            vec!["BOILERPLATE"]
        );
    }

    #[test]
    fn test_unrelated_milk_is_none() {
        assert_eq!(statuses("Milk allergy in brother."), vec!["NONE"]);
    }

    #[test]
    fn test_skip_without_breast_language() {
        assert_eq!(statuses("Annual exam."), vec!["SKIP"]);
    }
}
