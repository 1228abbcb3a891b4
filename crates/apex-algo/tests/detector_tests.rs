//! Detector Tests
//!
//! End-to-end runs of the built-in detectors over small notes:
//! - parity read from explicit and inconsistent G/P fields
//! - every registered detector over one clinic note
//! - templated breastfeeding notes

use apex_algo::{
    BreastfeedingDetector, Detector, DetectorRegistry, ParityDetector, ParitySource, ParityStatus,
};
use apex_core::{Document, Finding, select_best};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// Test Helpers
// ============================================================================

fn doc(text: &str) -> Document {
    Document::from_text("note", text).unwrap()
}

fn best(detector: &dyn Detector, text: &str) -> Finding {
    let findings = detector.detect(&doc(text), None).unwrap();
    select_best(findings).unwrap()
}

// ============================================================================
// Parity
// ============================================================================

#[rstest]
#[case("G 1 P 1001", ParityStatus::P1, ParitySource::Parity)]
#[case("G 1 P 2", ParityStatus::P1, ParitySource::Gravida)]
#[case("G 3 P 7", ParityStatus::Skip, ParitySource::None)]
fn test_parity_field(
    #[case] text: &str,
    #[case] status: ParityStatus,
    #[case] source: ParitySource,
) {
    let reading = ParityDetector::new().unwrap().determine(&doc(text)).unwrap();
    assert_eq!(reading.status, status);
    assert_eq!(reading.source, source);
}

#[test]
fn test_parity_finding_records_source() {
    let finding = best(&ParityDetector::new().unwrap(), "G 1 P 2");
    assert_eq!(finding.status.name, "P1");
    assert_eq!(finding.extras, vec!["gravida".to_string()]);
}

// ============================================================================
// Registry
// ============================================================================

const CLINIC_NOTE: &str = "\
Mirena inserted without difficulty.
Strings trimmed to 3 cm.
Breastfeeding well.
G 2 P 2002";

#[rstest]
#[case("iud_insertion", "SUCCESS", 1)]
#[case("iud_brand", "MIRENA", 2)]
#[case("iud_perforation", "SKIP", 99)]
#[case("iud_removal", "SKIP", 99)]
#[case("iud_expulsion", "SKIP", 99)]
#[case("iud_expulsion_rad", "NONE", -1)]
#[case("parity", "P2", 2)]
#[case("breastfeeding", "BREASTFEEDING", 1)]
fn test_registry_over_clinic_note(
    #[case] name: &str,
    #[case] status: &str,
    #[case] result: i32,
) {
    let registry = DetectorRegistry::with_defaults().unwrap();
    let detector = registry.get(name).unwrap();
    let finding = best(detector.as_ref(), CLINIC_NOTE);
    assert_eq!((finding.status.name, finding.result), (status, result));
}

#[test]
fn test_every_detector_produces_a_finding() {
    let registry = DetectorRegistry::with_defaults().unwrap();
    let note = doc(CLINIC_NOTE);
    for detector in registry.select(&[]).unwrap() {
        let findings = detector.detect(&note, Some(1)).unwrap();
        assert!(!findings.is_empty(), "{} produced nothing", detector.name());
        assert!(findings.iter().all(|f| f.expected == Some(1)));
    }
}

// ============================================================================
// Breastfeeding
// ============================================================================

#[test]
fn test_unanswered_template_is_only_boilerplate() {
    let findings = BreastfeedingDetector::new()
        .unwrap()
        .detect(&doc("Breastfeeding: {YES NO:17553}\nFollow up in 6 weeks."), None)
        .unwrap();
    let names: Vec<_> = findings.iter().map(|f| f.status.name).collect();
    assert_eq!(names, vec!["BOILERPLATE"]);
    assert!(select_best(findings).is_some_and(|f| !f.is_actionable()));
}

#[test]
fn test_question_answer_folding() {
    let finding = best(&BreastfeedingDetector::new().unwrap(), "Breastfeeding?\nNo");
    assert_eq!(finding.status.name, "NO");
    assert_eq!(finding.result, 0);
}
