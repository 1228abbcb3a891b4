//! Determine parity (number of births)

use crate::detector::Detector;
use crate::shared::pattern;
use apex_core::{ApexResult, Confidence, Document, Finding, Pattern, Status, TextSpan, status_enum};
use apex_diagnostics::ApexError;
use log::debug;
use std::fmt;

status_enum! {
    pub enum ParityStatus {
        None = -1 => "NONE",
        P0 = 0 => "P0",
        P1 = 1 => "P1",
        P2 = 2 => "P2",
        P3 = 3 => "P3",
        P4 = 4 => "P4",
        P5 = 5 => "P5",
        P6 = 6 => "P6",
        P7 = 7 => "P7",
        P8 = 8 => "P8",
        P9 = 9 => "P9",
        P10 = 10 => "P10",
        P11 = 11 => "P11",
        P12 = 12 => "P12",
        Multiparous = 100 => "MULTIPAROUS",
    }
}

/// Where a parity value was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParitySource {
    /// Explicit parity field
    Parity,
    /// Inferred from gravida when the parity field is off by one
    Gravida,
    /// Count of children
    Children,
    Nulliparous,
    Multiparous,
    None,
}

impl ParitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parity => "parity",
            Self::Gravida => "gravida",
            Self::Children => "children",
            Self::Nulliparous => "nulliparous",
            Self::Multiparous => "multiparous",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ParitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`ParityDetector::determine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityReading {
    pub status: ParityStatus,
    pub text: Option<String>,
    pub source: ParitySource,
    pub confidence: Confidence,
}

impl ParityReading {
    fn new(status: ParityStatus, text: impl Into<String>, source: ParitySource) -> Self {
        Self {
            status,
            text: Some(text.into()),
            source,
            confidence: Confidence::Medium,
        }
    }

    fn skip() -> Self {
        Self {
            status: ParityStatus::Skip,
            text: None,
            source: ParitySource::None,
            confidence: Confidence::Medium,
        }
    }

    fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

const NUMBER_WORDS: &str =
    r"(one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";
const TEMPLATE: &str = r"grav para term preterm abortions tab sab ect mult living";

/// Read a captured count as a number
///
/// Accepts digits and the number words used in notes.
pub fn parse_count(captured: &str) -> ApexResult<u32> {
    let captured = captured.trim();
    if let Ok(n) = captured.parse::<u32>() {
        return Ok(n);
    }
    let n = match captured.to_ascii_lowercase().as_str() {
        "zero" | "none" => 0,
        "one" | "once" => 1,
        "two" | "twice" => 2,
        "three" | "thrice" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return Err(ApexError::not_numeric(captured)),
    };
    Ok(n)
}

/// Status for a birth count; counts past P12 have no status
pub fn extract_status(count: u32) -> Option<ParityStatus> {
    i32::try_from(count)
        .ok()
        .and_then(ParityStatus::from_code)
        .filter(|s| (0..=12).contains(&s.code()))
}

/// Parity from the `P` half of a G/P field
///
/// Four digits are read as TPAL; term plus preterm births give the parity.
fn field_parity(captured: &str) -> ApexResult<u32> {
    let digits: Vec<u32> = captured.chars().filter_map(|c| c.to_digit(10)).collect();
    match digits.as_slice() {
        [term, preterm, _, _] => Ok(term + preterm),
        _ => parse_count(captured),
    }
}

/// Detector for parity
#[derive(Debug)]
pub struct ParityDetector {
    gravida_0: Pattern,
    para_0: Pattern,
    nulliparous: Pattern,
    child_0: Pattern,
    gp_field: Pattern,
    para_n: Pattern,
    child_num: Pattern,
    child_word: Pattern,
    word_child: Pattern,
    multiparous: Pattern,
}

impl ParityDetector {
    pub fn new() -> ApexResult<Self> {
        Ok(Self {
            gravida_0: pattern(&format!(r"(\b(g|grav\w*) 0\b|{} 0\b)", TEMPLATE), &[])?,
            para_0: pattern(
                &format!(
                    r"(\bg \d{{1,2}} p 0\b|\bpara (0|zero|none|na)\b|{} \d{{1,2}} 0\b)",
                    TEMPLATE
                ),
                &[],
            )?,
            nulliparous: pattern(r"(virginal|null?i ?(par[ao]|grav))", &[])?,
            child_0: pattern(r"children: (none|0)\b", &[])?,
            gp_field: Pattern::builder(
                r"(?:\bg (\d{1,2}) p (\d{1,4})\b|\bgravida (\d{1,2}),? para (\d{1,4})\b)",
            )
            .group_stride(2)
            .build()?,
            para_n: Pattern::builder(format!(
                r"(?:\bpara (\d{{1,2}}|{words})\b|{template} \d{{1,2}} (\d{{1,2}})\b)",
                words = NUMBER_WORDS,
                template = TEMPLATE
            ))
            .group_stride(1)
            .build()?,
            child_num: pattern(r"children: ([1-9]\d?)\b", &[])?,
            child_word: pattern(&format!(r"children: {}\b", NUMBER_WORDS), &[])?,
            word_child: pattern(&format!(r"\b{} (child|kid)", NUMBER_WORDS), &[])?,
            multiparous: pattern(r"(multipar\w*|c(ervi)?x( \w+){0,5} par[ao]us)", &[])?,
        })
    }

    /// Parity of a document along with where it was read from
    pub fn determine(&self, doc: &Document) -> ApexResult<ParityReading> {
        let zero = [&self.gravida_0, &self.para_0, &self.nulliparous, &self.child_0];
        if let Some(text) = doc.get_patterns(&zero, 0) {
            return Ok(ParityReading::new(ParityStatus::P0, text, ParitySource::Nulliparous));
        }

        let mut field_present = false;
        if let Some(groups) = doc.get_pattern_groups(&self.gp_field, &[0, 1, 2]) {
            field_present = true;
            if let [Some(text), Some(gravida), Some(para)] = groups.as_slice() {
                let gravida = parse_count(gravida)?;
                let para = field_parity(para)?;
                if para <= gravida {
                    if let Some(status) = extract_status(para) {
                        return Ok(ParityReading::new(status, text, ParitySource::Parity)
                            .with_confidence(Confidence::VeryHigh));
                    }
                } else if para == gravida + 1 {
                    if let Some(status) = extract_status(gravida) {
                        return Ok(ParityReading::new(status, text, ParitySource::Gravida)
                            .with_confidence(Confidence::Low));
                    }
                }
                debug!("{}: unusable G/P field {:?}", doc.name(), text);
            }
        }

        // a bare para count may contradict an unusable G/P field
        let mut fallbacks: Vec<(&Pattern, ParitySource)> = Vec::new();
        if !field_present {
            fallbacks.push((&self.para_n, ParitySource::Parity));
        }
        fallbacks.extend([
            (&self.child_num, ParitySource::Children),
            (&self.child_word, ParitySource::Children),
            (&self.word_child, ParitySource::Children),
        ]);
        if let Some((captured, source)) = doc.get_patterns_named(&fallbacks, 1) {
            if let Some(status) = extract_status(parse_count(&captured)?) {
                let text = doc
                    .get_patterns_named(&fallbacks, 0)
                    .map_or(captured, |(text, _)| text);
                return Ok(ParityReading::new(status, text, source));
            }
        }

        if let Some(text) = doc.get_pattern(&self.multiparous, 0) {
            return Ok(ParityReading::new(
                ParityStatus::Multiparous,
                text,
                ParitySource::Multiparous,
            ));
        }
        Ok(ParityReading::skip())
    }
}

impl Detector for ParityDetector {
    fn name(&self) -> &'static str {
        "parity"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        let reading = self.determine(doc)?;
        let mut finding = Finding::of(reading.status)
            .with_expected(expected)
            .with_confidence(reading.confidence)
            .with_extra(reading.source.as_str());
        if let Some(text) = reading.text {
            finding = finding.with_text(text);
        }
        Ok(vec![finding])
    }
}
