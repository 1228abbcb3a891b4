//! Pattern evaluation over sentences, sections and documents

use apex_core::{Document, Pattern, PatternQuery, Section, TextSpan};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn pattern(expr: &str) -> Pattern {
    Pattern::new(expr).unwrap()
}

#[test]
fn negation_is_scoped_to_the_evaluated_span() {
    let doc = Document::from_text("n", "No IUD complications.\nIUD inserted today.").unwrap();
    let inserted = Pattern::builder("iud").negate(r"\bno\b").build().unwrap();

    // the document-level span contains "No", so the whole span is negated
    assert!(!doc.has_pattern(&inserted));

    let per_sentence: Vec<bool> = doc
        .sentences()
        .iter()
        .map(|s| s.has_pattern(&inserted))
        .collect();
    assert_eq!(per_sentence, vec![false, true]);
}

#[rstest]
#[case("strings visible", "strings\nvisible", true)]
#[case("strings visible", "strings -- visible", true)]
#[case("strings visible", "stringsvisible", true)]
#[case("strings visible", "strings were visible", false)]
fn whitespace_loosening(#[case] expr: &str, #[case] text: &str, #[case] expected: bool) {
    let doc = Document::from_text("w", format!("x {} x", text)).unwrap();
    assert_eq!(doc.has_pattern(&pattern(expr)), expected);
}

#[test]
fn evidence_accumulates_on_the_document() {
    let doc = Document::from_text("e", "Mirena placed.\nStrings trimmed to 3cm.").unwrap();
    let mirena = pattern("mirena");
    let strings = pattern("strings?");
    let pats = [&mirena, &strings];
    for sentence in doc.sentences() {
        sentence.has_any(&pats);
    }
    assert_eq!(doc.cask().to_string(), "{mirena, strings}");
}

#[test]
fn get_patterns_first_match_wins() {
    let doc = Document::from_text("g", "Para 2, gravida 3").unwrap();
    let para = pattern(r"para (\d)");
    let gravida = pattern(r"gravida (\d)");
    assert_eq!(doc.get_patterns(&[&gravida, &para], 1).as_deref(), Some("3"));
    assert_eq!(
        doc.get_patterns_named(&[(&para, "para"), (&gravida, "gravida")], 1),
        Some(("2".to_string(), "para"))
    );
    assert_eq!(
        doc.get_pattern_groups(&pattern(r"para (\d), gravida (\d)"), &[2, 1]),
        Some(vec![Some("3".to_string()), Some("2".to_string())])
    );
}

#[test]
fn section_union_negation_crosses_sentences() {
    let doc = Document::from_text("s", "Paragard discussed\nrisks reviewed").unwrap();
    let brand = Pattern::builder("paragard").negate("risks").build().unwrap();
    let section = doc.section_from_indices(0..=1);
    assert!(!section.has_pattern(&brand));
    let single: Section = doc.section_from_indices([0]);
    assert!(single.has_pattern(&brand));
}

const WORDS: [&str; 5] = ["iud", "strings", "mirena", "copper", "removed"];

proptest! {
    #[test]
    fn aggregation_agrees_with_count(mask in prop::collection::vec(any::<bool>(), WORDS.len())) {
        let present: Vec<&str> = WORDS
            .iter()
            .zip(&mask)
            .filter_map(|(w, m)| m.then_some(*w))
            .collect();
        prop_assume!(!present.is_empty());
        let doc = Document::from_text("p", present.join(" ")).unwrap();

        let compiled: Vec<Pattern> = WORDS.iter().map(|w| pattern(&format!(r"\b{}\b", w))).collect();
        let refs: Vec<&Pattern> = compiled.iter().collect();

        let count = doc.count_patterns(&refs, false);
        prop_assert_eq!(count, present.len());
        prop_assert_eq!(doc.has_any(&refs), count > 0);
        prop_assert_eq!(doc.has_all(&refs), count == refs.len());
        prop_assert_eq!(
            doc.has_patterns(&refs, PatternQuery::ALL.ignoring_negation()),
            count == refs.len()
        );
    }

    #[test]
    fn neighbour_windows_are_symmetric_and_clipped(
        hits in prop::collection::vec(any::<bool>(), 1..20),
        k in 0usize..4,
    ) {
        let lines: Vec<String> = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| if *hit { format!("hit {}", i) } else { format!("line {}", i) })
            .collect();
        let doc = Document::from_text("w", lines.join("\n")).unwrap();
        let hit = pattern(r"\bhit\b");
        let pats = [&hit];
        let selection = doc.select_sentences(&pats).neighboring_sentences(k);

        let expected: Vec<usize> = hits
            .iter()
            .enumerate()
            .filter_map(|(i, h)| h.then_some(i))
            .collect();
        prop_assert_eq!(selection.indices(), expected.clone());

        let n = hits.len();
        for (i, section) in expected.iter().zip(selection.sections()) {
            let start = i.saturating_sub(k);
            let end = (i + k).min(n - 1);
            prop_assert_eq!(section.len(), end - start + 1);
            let hit_text = format!("hit {}", i);
            let start_suffix = format!(" {}", start);
            prop_assert!(section.text().contains(&hit_text));
            prop_assert!(section.sentences()[0].text().ends_with(&start_suffix));
        }
    }
}
