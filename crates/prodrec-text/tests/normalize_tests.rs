use proptest::prelude::*;

use prodrec_text::stopwords::ENGLISH;
use prodrec_text::{extract_category, TextNormalizer};

fn normalizer() -> TextNormalizer {
    TextNormalizer::new().expect("normalizer")
}

#[test]
fn strips_leading_digits_and_stopwords() {
    assert_eq!(normalizer().normalize("123 The Quick Brown Fox"), "quick brown fox");
}

#[test]
fn only_leading_digits_are_stripped() {
    let n = normalizer();
    assert_eq!(n.normalize("42nd Street 42"), "nd street 42");
    assert_eq!(n.normalize("Model 3000 speaker"), "model 3000 speaker");
}

#[test]
fn punctuation_separates_and_underscore_joins() {
    let n = normalizer();
    assert_eq!(n.normalize("Wi-Fi, router!! (dual_band)"), "wi fi router dual_band");
    assert_eq!(n.normalize("  spaced\t\tout\n"), "spaced out");
}

#[test]
fn empty_when_nothing_survives() {
    let n = normalizer();
    assert_eq!(n.normalize(""), "");
    assert_eq!(n.normalize("The and OF it"), "");
    assert_eq!(n.normalize("12345"), "");
    assert_eq!(n.normalize("?!..."), "");
}

#[test]
fn non_strings_are_stringified() {
    let n = normalizer();
    assert_eq!(n.normalize_value(&3.5_f64), "5");
    assert_eq!(n.normalize_value(&true), "true");
    assert_eq!(n.normalize_value("Hello World"), "hello world");
}

#[test]
fn custom_stopwords_replace_default_set() {
    let n = TextNormalizer::with_stopwords(["Cheap".to_string()]).expect("normalizer");
    assert_eq!(n.normalize("The cheap lamp"), "the lamp");
}

#[test]
fn category_levels() {
    let path = "[\"Electronics >> Phones >> Cases\"]";
    assert_eq!(extract_category(path, 0).as_deref(), Some("Electronics"));
    assert_eq!(extract_category(path, 2).as_deref(), Some("Cases"));
    assert_eq!(extract_category(path, 5), None);
}

proptest! {
    #[test]
    fn output_is_lowercase_word_tokens_without_stopwords(input in "[ -~]{0,64}") {
        let out = normalizer().normalize(&input);
        prop_assert_eq!(out.trim(), out.as_str());
        if !out.is_empty() {
            for token in out.split(' ') {
                prop_assert!(!token.is_empty(), "double space in {:?}", out);
                prop_assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
                prop_assert!(!ENGLISH.contains(&token));
            }
        }
    }

    #[test]
    fn stable_once_normalized(input in "[ -~]{0,64}") {
        let n = normalizer();
        let once = n.normalize(&input);
        prop_assume!(!once.starts_with(|c: char| c.is_ascii_digit()));
        prop_assert_eq!(n.normalize(&once), once);
    }
}
