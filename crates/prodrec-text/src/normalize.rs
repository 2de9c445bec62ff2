use std::fmt::Display;

use anyhow::Result;
use tantivy::tokenizer::{LowerCaser, RegexTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

use crate::stopwords;

/// Canonicalizes free-form product text for embedding comparison.
///
/// The pipeline is: lower-case, drop a leading run of ASCII digits, split on
/// runs of word characters (`\w+`), remove stopwords, join with single spaces.
/// The output is a fixed point of the pipeline.
#[derive(Clone)]
pub struct TextNormalizer {
	analyzer: TextAnalyzer,
}

impl TextNormalizer {
	/// Normalizer using the English stopword list.
	pub fn new() -> Result<Self> {
		Self::with_stopwords(stopwords::ENGLISH.iter().map(|s| (*s).to_string()))
	}

	pub fn with_stopwords<I>(words: I) -> Result<Self>
	where
		I: IntoIterator<Item = String>,
	{
		let words: Vec<String> = words.into_iter().map(|w| w.to_lowercase()).collect();
		let analyzer = TextAnalyzer::builder(RegexTokenizer::new(r"\w+")?)
			.filter(LowerCaser)
			.filter(StopWordFilter::remove(words))
			.build();
		Ok(Self { analyzer })
	}

	pub fn normalize(&self, text: &str) -> String {
		let lower = text.to_lowercase();
		let body = lower.trim_start_matches(|c: char| c.is_ascii_digit());
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(body);
		let mut tokens: Vec<String> = Vec::new();
		while stream.advance() {
			tokens.push(stream.token().text.clone());
		}
		tokens.join(" ")
	}

	/// Normalize any displayable value by stringifying it first.
	pub fn normalize_value<T: Display + ?Sized>(&self, value: &T) -> String {
		self.normalize(&value.to_string())
	}
}
