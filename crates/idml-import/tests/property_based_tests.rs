//! Property-based tests for text normalization, assignment and classification
//!
//! These check invariants that must hold for every input rather than for a
//! handful of hand-picked fixtures.

use std::collections::HashSet;

use idml_import::assign::{assign, solve_exact, total_cost};
use idml_import::text::{extract_trailing_url, normalize};
use idml_import::{Paragraph, ParsedStory, Position, StoryClassifier, StyleVocabulary};
use proptest::prelude::*;

fn position() -> impl Strategy<Value = Position> {
    (-500i32..500, -500i32..500).prop_map(|(x, y)| Position::new(f64::from(x), f64::from(y)))
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..used.len() {
            if !used[i] {
                used[i] = true;
                prefix.push(i);
                extend(prefix, used, out);
                prefix.pop();
                used[i] = false;
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::new(), &mut vec![false; n], &mut out);
    out
}

#[test]
fn test_normalize_is_idempotent() {
    proptest!(|(text in "\\PC{0,80}")| {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
        prop_assert!(!once.contains("  "));
    });
}

#[test]
fn test_trailing_url_is_split_off() {
    proptest!(|(
        words in prop::collection::vec("[A-Za-z]{1,12}", 1..6),
        url in "[a-z]{1,10}\\.(com|de|org)(/[a-z0-9]{1,8})?",
    )| {
        let text = words.join(" ");
        let (rest, found) = extract_trailing_url(&format!("{text} {url}"));
        prop_assert_eq!(rest, text);
        prop_assert_eq!(found, format!("https://{url}"));
    });
}

#[test]
fn test_plain_words_have_no_url() {
    proptest!(|(words in prop::collection::vec("[A-Za-z]{1,12}", 1..6))| {
        let text = words.join(" ");
        let (rest, found) = extract_trailing_url(&text);
        prop_assert_eq!(rest, text);
        prop_assert!(found.is_empty());
    });
}

#[test]
fn test_exact_assignment_is_optimal() {
    let sets = (1usize..=6).prop_flat_map(|n| {
        (
            prop::collection::vec(position(), n),
            prop::collection::vec(position(), n),
        )
    });
    proptest!(|((anchors, candidates) in sets)| {
        let mapping = solve_exact(&anchors, &candidates);
        let cost = total_cost(&anchors, &candidates, &mapping);
        let best = permutations(anchors.len())
            .iter()
            .map(|p| total_cost(&anchors, &candidates, p))
            .fold(f64::INFINITY, f64::min);

        prop_assert!(cost <= best + 1e-6, "cost {} exceeds optimum {}", cost, best);
        let distinct: HashSet<usize> = mapping.iter().copied().collect();
        prop_assert_eq!(distinct.len(), anchors.len());
    });
}

#[test]
fn test_assignment_is_injective() {
    proptest!(|(
        anchors in prop::collection::vec(position(), 0..12),
        candidates in prop::collection::vec(position(), 0..12),
    )| {
        let mapping = assign(&anchors, &candidates);
        prop_assert_eq!(mapping.len(), anchors.len());

        let used: Vec<usize> = mapping.iter().flatten().copied().collect();
        let distinct: HashSet<usize> = used.iter().copied().collect();
        prop_assert_eq!(distinct.len(), used.len());
        prop_assert_eq!(used.len(), anchors.len().min(candidates.len()));
        prop_assert!(used.iter().all(|&i| i < candidates.len()));
    });
}

const STYLES: &[&str] = &[
    "Headline", "Lead", "Location", "Teaser-Link", "Teaser-Headline", "Info-Location",
    "Info-Head", "Info-Body", "Versal", "Info-Intro", "Body",
];

fn story() -> impl Strategy<Value = Vec<(usize, String, bool)>> {
    prop::collection::vec((0..STYLES.len(), "[A-Za-z ]{1,20}", any::<bool>()), 1..5)
}

#[test]
fn test_each_story_takes_one_role() {
    proptest!(|(specs in prop::collection::vec(story(), 0..8))| {
        let stories: Vec<ParsedStory> = specs
            .iter()
            .enumerate()
            .map(|(index, paragraphs)| {
                let paragraphs = paragraphs
                    .iter()
                    .map(|(style, text, linked)| {
                        let url = if *linked { "example.com" } else { "" };
                        Paragraph::with_url(STYLES[*style], text.as_str(), url)
                    })
                    .collect();
                ParsedStory::from_paragraphs(format!("u{index}"), paragraphs)
            })
            .collect();

        let vocabulary = StyleVocabulary::default();
        let classifier = StoryClassifier::new(&vocabulary);
        let found = classifier.classify(&stories);
        prop_assert_eq!(&found, &classifier.classify(&stories));

        let mut owners: Vec<&str> = found.teasers.iter().map(|t| t.story_id.as_str()).collect();
        owners.extend(found.info_teasers.iter().map(|i| i.story_id.as_str()));
        owners.extend(found.headline_story.as_deref());
        owners.extend(found.lead_story.as_deref());
        let distinct: HashSet<&str> = owners.iter().copied().collect();
        prop_assert_eq!(distinct.len(), owners.len());
        prop_assert_eq!(found.info_teasers.len(), found.parallax_items.len());
    });
}
