//! Pattern vocabulary shared across detectors
//!
//! Expressions are written with literal spaces; [`apex_core::Pattern`] loosens
//! each space to `\W*` at compile time.

use apex_core::{ApexResult, Pattern};

pub const YEARS_AGO: &str = r"(?:\d+ (?:year|yr|week|wk|month|mon|day)s? (?:ago|before|previous))";
pub const NUMERIC_DATE: &str = r"\d+[-/]\d+[-/]\d+";
pub const MONTH_DAY: &str = r"\d+/\d+";
pub const MONTH_YEAR: &str =
    r"\b(?:jan|feb|mar|apr|may|jun|jul|aug|sept|oct|nov|dec)\w*(?:\W*\d{1,2})?\W*\d{4}";
pub const IN_MONTH: &str = r"\bin (?:jan|feb|mar|apr|may|jun|jul|aug|sept|oct|nov|dec)\w*";

pub const IUDS: &str = r"\b(iuds?|intrauterine( contraceptive)? devices?)";
pub const LNG_IUDS: &str = r"(lng ius|levonorgestrel( (releasing|rlse))? (intrauterine|us))";
pub const BRANDS: &str = r"(mirena|paragu?ard|skyla\b|lilett?a|kyleena|copper)";

pub const BOILERPLATE: &str = concat!(
    r"\b(complication|pamphlet|warning|information|review|side effect|counsel|\bsign|infection|ensure|",
    r"cramps|risk|\bif\b|after your visit|conceive|appt|appointment|due (to|for|at)|recommend|",
    r"pregnan|schedul|doctor|contact|\brare|\bhow\b|\bcall|includ|failure|",
    r"associated|avoid)"
);
pub const POSSIBLE: &str =
    r"\b(unlikely|possib(ly|le|ility)|improbable|potential|suspect|chance|may\b|afraid|concern|tentative)";
pub const NEGATION: &str = r"(no evidence|without|r/o|rule out|normal|\bnot?\b|\bor\b)";
pub const HISTORICAL: &str = r"(history|previous|hx|past)";
pub const HYPOTHETICAL: &str = concat!(
    r"(option|possib\w+|desire|want|will|\bcan\b|",
    r"\bor\b|like|would|need|until|request|when|you ll|",
    r"\bif\b|consider|concern|return|nervous|anxious|to be remov|could|",
    r"discuss|inform|should)"
);

/// Any IUD mention: generic, levonorgestrel or brand name
pub fn iud_expr() -> String {
    format!("({}|{}|{})", IUDS, LNG_IUDS, BRANDS)
}

pub fn date_expr() -> String {
    format!(
        "({}|{}|{}|{}|{})",
        YEARS_AGO, NUMERIC_DATE, MONTH_DAY, MONTH_YEAR, IN_MONTH
    )
}

/// Compile an expression with a list of negations
pub fn pattern(expr: &str, negates: &[&str]) -> ApexResult<Pattern> {
    Pattern::builder(expr).negates(negates.iter().copied()).build()
}

/// Patterns every IUD detector needs
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub iud: Pattern,
    pub date: Pattern,
    pub possible: Pattern,
}

impl Vocabulary {
    pub fn new() -> ApexResult<Self> {
        Ok(Self {
            iud: pattern(&iud_expr(), &[])?,
            date: pattern(&date_expr(), &[])?,
            possible: pattern(POSSIBLE, &[])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Mirena placed")]
    #[case("intrauterine contraceptive device")]
    #[case("LNG IUS")]
    #[case("levonorgestrel releasing intrauterine system")]
    #[case("the IUDs")]
    fn test_iud_mentions(#[case] text: &str) {
        assert!(Vocabulary::new().unwrap().iud.is_match(text));
    }

    #[rstest]
    #[case("seen 3 weeks ago", "3 weeks ago")]
    #[case("placed 01/02/2019", "01/02/2019")]
    #[case("placed March 2018", "March 2018")]
    #[case("since in june", "in june")]
    fn test_dates(#[case] text: &str, #[case] expected: &str) {
        let vocab = Vocabulary::new().unwrap();
        assert_eq!(vocab.date.matches(text).unwrap().as_str(), expected);
    }

    #[test]
    fn test_fragments_compile() {
        for expr in [BOILERPLATE, POSSIBLE, NEGATION, HISTORICAL, HYPOTHETICAL] {
            assert!(pattern(expr, &[]).is_ok(), "{}", expr);
        }
    }
}
