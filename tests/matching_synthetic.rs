// tests/matching_synthetic.rs
// Seeded randomized token streams checked against independently computed counts.

use std::collections::HashSet;

use perma_text_analyzer::matcher::{MatchStrategy, Matcher};
use perma_text_analyzer::scoring::{score, Encoding};
use perma_text_analyzer::tokenize::tokenize;
use perma_text_analyzer::Lexicon;
use rand::{rngs::StdRng, Rng, SeedableRng};

const VOCAB: &[&str] = &[
    "love", "joy", "friends", "work", "sad", "angry", "alone", "the", "a", "day", "proud", "tired",
];

fn lexicon() -> Lexicon {
    Lexicon::new()
        .with("POS_E", "love", 0.9)
        .with("POS_E", "joy", 0.7)
        .with("POS_R", "friends", 0.8)
        .with("POS_R", "love", 0.3)
        .with("POS_A", "proud", 0.6)
        .with("NEG_E", "sad", -0.7)
        .with("NEG_E", "angry", -0.8)
        .with("NEG_R", "alone", -0.6)
        .with("NEG_P", "tired", -0.2)
}

fn random_tokens(rng: &mut StdRng, len: usize) -> Vec<String> {
    (0..len)
        .map(|_| VOCAB[rng.random_range(0..VOCAB.len())].to_string())
        .collect()
}

/// Occurrences of every distinct word in any category with `prefix`.
fn expected_total(lex: &Lexicon, tokens: &[String], prefix: &str) -> usize {
    let words: HashSet<&str> = lex
        .categories()
        .iter()
        .filter(|c| c.name().starts_with(prefix))
        .flat_map(|c| c.entries().iter().map(|e| e.word.as_str()))
        .collect();
    tokens.iter().filter(|t| words.contains(t.as_str())).count()
}

#[test]
fn prefix_totals_match_independent_count() {
    let lex = lexicon();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let len = rng.random_range(1..60);
        let tokens = random_tokens(&mut rng, len);
        for strategy in [MatchStrategy::ExactToken, MatchStrategy::BoundaryRegex] {
            let set = Matcher::new(strategy, None).match_lexicon(&tokens, &lex);
            assert_eq!(set.total("POS"), expected_total(&lex, &tokens, "POS"));
            assert_eq!(set.total("NEG"), expected_total(&lex, &tokens, "NEG"));
            assert_eq!(set.total(""), expected_total(&lex, &tokens, ""));
            assert_eq!(set.words("POS").len(), set.total("POS"));
        }
    }
}

#[test]
fn binary_is_repetition_invariant_and_frequency_is_linear() {
    let lex = lexicon();
    let matcher = Matcher::default();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let len = rng.random_range(1..40);
        let tokens = random_tokens(&mut rng, len);
        let doubled: Vec<String> = tokens.iter().chain(tokens.iter()).cloned().collect();

        let once = matcher.match_lexicon(&tokens, &lex);
        let twice = matcher.match_lexicon(&doubled, &lex);
        for cat in ["POS_E", "POS_R", "NEG_E", "NEG_R"] {
            let b1 = score(once.get(cat), tokens.len(), 0.0, Encoding::Binary).unwrap();
            let b2 = score(twice.get(cat), doubled.len(), 0.0, Encoding::Binary).unwrap();
            assert!((b1 - b2).abs() < 1e-12, "{cat}: {b1} vs {b2}");

            // Twice the count over twice the words: same frequency score.
            let f1 = score(once.get(cat), tokens.len(), 0.0, Encoding::Frequency).unwrap();
            let f2 = score(twice.get(cat), doubled.len(), 0.0, Encoding::Frequency).unwrap();
            assert!((f1 - f2).abs() < 1e-12, "{cat}: {f1} vs {f2}");
        }
    }
}

#[test]
fn tokenizer_is_deterministic_on_noisy_input() {
    let pieces = [
        "i", "love", ":)", "@bob", "#blessed", "http://x.com", "555-123-4567", "...", "don't",
        "well-being", "&amp;", "3.14", "<b>", "!!",
    ];
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..100 {
        let n = rng.random_range(1..25);
        let text = (0..n)
            .map(|_| pieces[rng.random_range(0..pieces.len())])
            .collect::<Vec<_>>()
            .join(" ");
        for clean in [false, true] {
            assert_eq!(tokenize(&text, clean), tokenize(&text, clean));
        }
        assert!(!tokenize(&text, false).is_empty());
    }
}
