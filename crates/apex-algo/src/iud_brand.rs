//! Identify the IUD brand

use crate::detector::Detector;
use crate::shared::pattern;
use apex_core::{ApexResult, Document, Finding, Pattern, PatternQuery, TextSpan, status_enum};
use indexmap::IndexMap;
use log::debug;

status_enum! {
    pub enum BrandStatus {
        None = -1 => "NONE",
        Paragard = 1 => "PARAGARD",
        Mirena = 2 => "MIRENA",
        Liletta = 3 => "LILETTA",
        Kyleena = 4 => "KYLEENA",
        Skyla = 5 => "SKYLA",
        Copper = 6 => "COPPER",
        Lng = 7 => "LNG",
    }
}

const HYPOTHETICAL: &str = concat!(
    r"(risks?|benefits?|\bvs\b|\bor\b|questions?|please|stocked|order|",
    r"pamphlet|brochure|\bif\b|option|availab|decid|plan|interest|consult|",
    r"want|desir[ei]\w*|appt|appointment|\bcan\b|could|would|believe|think|switch|",
    r"information)"
);

/// One brand mention and its context
#[derive(Debug, Clone)]
struct Candidate {
    brand: BrandStatus,
    using: bool,
    text: String,
}

/// Detector for the IUD brand
#[derive(Debug)]
pub struct BrandDetector {
    paragard: Pattern,
    mirena: Pattern,
    liletta: Pattern,
    kyleena: Pattern,
    skyla: Pattern,
    copper: Pattern,
    lng: Pattern,
    using: Pattern,
}

impl BrandDetector {
    pub fn new() -> ApexResult<Self> {
        Ok(Self {
            paragard: pattern(r"(paragu?ard)", &[HYPOTHETICAL])?,
            mirena: pattern(r"(mirena)", &[HYPOTHETICAL])?,
            liletta: pattern(r"(lilett?a)", &[HYPOTHETICAL])?,
            kyleena: pattern(r"(kyleena)", &[HYPOTHETICAL])?,
            skyla: pattern(r"(skyla)\b", &[HYPOTHETICAL])?,
            copper: pattern(r"(copper) (\w+ )?iu[sd]\b", &[HYPOTHETICAL])?,
            lng: pattern(
                r"(levonorgestrel|lng) (\w+ )?iu[sd]\b",
                &[r"oral tab", HYPOTHETICAL, r"plan b"],
            )?,
            using: pattern(
                concat!(
                    r"(ha[sd]|us(es?|ing)|insert(ed|ion)|iud type|contracepti(on|ve)|",
                    r"in (situ|place)|(re)?placed)"
                ),
                &[r"(expel|remove)"],
            )?,
        })
    }

    fn brands(&self) -> [&Pattern; 7] {
        [
            &self.paragard,
            &self.mirena,
            &self.liletta,
            &self.kyleena,
            &self.skyla,
            &self.copper,
            &self.lng,
        ]
    }

    fn candidates(&self, doc: &Document) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let named = [
            (BrandStatus::Paragard, vec![&self.paragard, &self.copper]),
            (BrandStatus::Mirena, vec![&self.mirena]),
            (BrandStatus::Liletta, vec![&self.liletta]),
            (BrandStatus::Kyleena, vec![&self.kyleena]),
            (BrandStatus::Skyla, vec![&self.skyla]),
        ];
        let brands = self.brands();
        for section in doc
            .select_sentences(&brands)
            .neighboring_sentences(1)
            .sections()
        {
            for (brand, patterns) in &named {
                if section.has_any(patterns) {
                    candidates.push(Candidate {
                        brand: *brand,
                        using: section.has_pattern(&self.using),
                        text: section.text().to_string(),
                    });
                }
            }
        }
        if candidates.is_empty() && doc.has_pattern(&self.lng) {
            candidates.push(Candidate {
                brand: BrandStatus::Lng,
                using: false,
                text: doc.text().to_string(),
            });
        }
        candidates
    }
}

/// Keep usage-context mentions when there are any, then the most frequent
/// brand; a tie between the two most frequent brands is undecidable
fn disambiguate(candidates: Vec<Candidate>) -> Option<Vec<Candidate>> {
    if candidates.len() <= 1 {
        return Some(candidates);
    }
    let has_using = candidates.iter().any(|c| c.using);
    let candidates: Vec<_> = candidates
        .into_iter()
        .filter(|c| c.using == has_using)
        .collect();

    let mut counts: IndexMap<BrandStatus, usize> = IndexMap::new();
    for c in &candidates {
        *counts.entry(c.brand).or_default() += 1;
    }
    if counts.len() <= 1 {
        return Some(candidates);
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    let mut ranked = counts.values();
    let top = ranked.next().copied().unwrap_or_default();
    let runner_up = ranked.next().copied().unwrap_or_default();
    if top == runner_up {
        return None;
    }
    Some(
        candidates
            .into_iter()
            .filter(|c| counts.get(&c.brand) == Some(&top))
            .collect(),
    )
}

impl Detector for BrandDetector {
    fn name(&self) -> &'static str {
        "iud_brand"
    }

    fn detect(&self, doc: &Document, expected: Option<i32>) -> ApexResult<Vec<Finding>> {
        let brands = self.brands();
        if !doc.has_patterns(&brands, PatternQuery::ANY.ignoring_negation()) {
            return Ok(vec![Finding::of(BrandStatus::Skip).with_expected(expected)]);
        }

        let candidates = self.candidates(doc);
        debug!("{}: {} brand candidate(s)", doc.name(), candidates.len());
        let Some(chosen) = disambiguate(candidates) else {
            return Ok(vec![
                Finding::of(BrandStatus::None)
                    .with_expected(expected)
                    .with_text(doc.text()),
            ]);
        };
        if chosen.is_empty() {
            return Ok(vec![Finding::of(BrandStatus::None).with_expected(expected)]);
        }
        Ok(chosen
            .into_iter()
            .map(|c| {
                Finding::of(c.brand)
                    .with_expected(expected)
                    .with_text(c.text)
                    .with_extra(if c.using { "using" } else { "mention" })
            })
            .collect())
    }
}
