//! Neutralizes untrusted strings before they are embedded in an FTS5 expression.
//!
//! Both normalizers are total: any input produces tokens built from `[A-Za-z0-9_]` (plus
//! whitespace for identifiers), so no quote, parenthesis, column qualifier, or prefix marker can
//! reach the query parser from the caller.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Replacement for characters that would otherwise split a token, e.g. "Bob's" and "Bob.s".
pub const SPLIT_GUARD: &str = "0";

static DOT_DASH_APOSTROPHE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[.\-']").expect("Pattern must compile."));
static NOT_WORD: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_]").expect("Pattern must compile."));
static NOT_WORD_NOR_SPACE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_\s]").expect("Pattern must compile."));

/// Prefix-matching term list produced from a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeText {
	terms: Vec<String>,
}
impl FreeText {
	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}
}

pub fn normalize_free_text(input: &str) -> FreeText {
	let folded = fold_to_latin(input).to_lowercase();
	let guarded = DOT_DASH_APOSTROPHE.replace_all(&folded, SPLIT_GUARD);
	let spaced = NOT_WORD.replace_all(&guarded, " ");
	let terms = spaced.split_whitespace().map(str::to_string).collect();

	FreeText { terms }
}

pub fn normalize_identifier(input: &str) -> String {
	NOT_WORD_NOR_SPACE.replace_all(input.trim(), SPLIT_GUARD).into_owned()
}

/// Splits a comma-separated request parameter, dropping blank items.
pub fn split_list(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

/// Maps letters to their closest Latin spelling and strips diacritics.
pub fn fold_to_latin(input: &str) -> String {
	let mut out = String::with_capacity(input.len());

	for ch in input.chars() {
		match latin_digraph(ch) {
			Some(digraph) => out.push_str(digraph),
			None => out.extend(std::iter::once(ch).nfkd().filter(|c| !is_combining_mark(*c))),
		}
	}

	out
}

fn latin_digraph(ch: char) -> Option<&'static str> {
	let digraph = match ch {
		'æ' => "ae",
		'Æ' => "AE",
		'ø' => "oe",
		'Ø' => "OE",
		'å' => "aa",
		'Å' => "AA",
		'œ' => "oe",
		'Œ' => "OE",
		'ß' => "ss",
		'þ' => "th",
		'Þ' => "TH",
		'ð' => "d",
		'Ð' => "D",
		'ł' => "l",
		'Ł' => "L",
		_ => return None,
	};

	Some(digraph)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn digraphs_take_precedence_over_decomposition() {
		assert_eq!(fold_to_latin("Århus"), "AArhus");
		assert_eq!(fold_to_latin("Ærø"), "AEroe");
		assert_eq!(fold_to_latin("café"), "cafe");
	}

	#[test]
	fn split_list_drops_blank_items() {
		assert_eq!(split_list(""), Vec::<String>::new());
		assert_eq!(split_list(" a, ,b ,"), vec!["a".to_string(), "b".to_string()]);
	}
}
