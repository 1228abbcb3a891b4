//! Detect signs of a difficult IUD insertion

use crate::detector::Detector;
use crate::shared::{HYPOTHETICAL, Vocabulary, pattern};
use apex_core::{ApexResult, Document, Finding, Pattern, TextSpan, status_enum};

status_enum! {
    pub enum DifficultInsertionStatus {
        None = -1 => "NONE",
        ProviderStatement = 1 => "PROVIDER_STATEMENT",
        UltrasoundGuidance = 2 => "ULTRASOUND_GUIDANCE",
        CervicalDilation = 3 => "CERVICAL_DILATION",
        ParacervicalBlock = 4 => "PARACERVICAL_BLOCK",
        Misoprostol = 5 => "MISOPROSTOL",
    }
}

/// Detector for difficult IUD insertions
#[derive(Debug)]
pub struct DifficultInsertionDetector {
    iud: Pattern,
    insertion: Pattern,
    indicators: Vec<(DifficultInsertionStatus, Pattern)>,
}

impl DifficultInsertionDetector {
    pub fn new() -> ApexResult<Self> {
        let negates = [r"\b(not?|without)\b", HYPOTHETICAL];
        Ok(Self {
            iud: Vocabulary::new()?.iud,
            insertion: pattern(r"insert(ed|ion)", &[])?,
            indicators: vec![
                (
                    DifficultInsertionStatus::ProviderStatement,
                    pattern(
                        r"(((difficult|complicated|challenging)( \w+)? insertion)|insertion( \w+)? (was )?(difficult|complicated|challenging))",
                        &negates,
                    )?,
                ),
                (
                    DifficultInsertionStatus::UltrasoundGuidance,
                    pattern(r"(u/?s|ultrasound|sonograph\w*) guid(ed?|ance)", &negates)?,
                ),
                (
                    DifficultInsertionStatus::CervicalDilation,
                    pattern(r"(cervi(x|cal) (was )?dilat\w+|dilators?\b|os finder)", &negates)?,
                ),
                (
                    DifficultInsertionStatus::ParacervicalBlock,
                    pattern(r"(para ?cervical( block)?|cervical block|lidocaine)", &negates)?,
                ),
                (
                    DifficultInsertionStatus::Misoprostol,
                    pattern(r"(cytotec|misoprostol)", &negates)?,
                ),
            ],
        })
    }
}

impl Detector for DifficultInsertionDetector {
    fn name(&self) -> &'static str {
        "iud_difficult_insertion"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        if !doc.has_pattern_with(&self.insertion, true) {
            return Ok(vec![Finding::of(DifficultInsertionStatus::Skip).with_expected(expected)]);
        }

        let mut findings = Vec::new();
        let mentions = [&self.iud];
        for section in doc
            .select_sentences(&mentions)
            .neighboring_sentences(1)
            .sections()
        {
            for (status, indicator) in &self.indicators {
                if section.has_pattern(indicator) {
                    findings.push(
                        Finding::of(*status)
                            .with_expected(expected)
                            .with_text(section.text()),
                    );
                }
            }
        }
        if findings.is_empty() {
            findings.push(Finding::of(DifficultInsertionStatus::None).with_expected(expected));
        }
        Ok(findings)
    }
}
