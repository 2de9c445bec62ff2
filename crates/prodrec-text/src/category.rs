const LEVEL_SEPARATOR: &str = ">>";

/// Segment `level` of a category path such as `["Electronics >> Phones"]`.
///
/// Surrounding brackets, then single quotes, then double quotes are stripped
/// from both ends before splitting on `>>`. Returns `None` when the path has
/// fewer than `level + 1` segments.
pub fn extract_category(text: &str, level: usize) -> Option<String> {
	let cleaned = text
		.trim_matches(|c| c == '[' || c == ']')
		.trim_matches('\'')
		.trim_matches('"');
	cleaned.split(LEVEL_SEPARATOR).nth(level).map(|segment| segment.trim().to_string())
}

/// Level-0 category. Always present, possibly empty.
pub fn top_level_category(text: &str) -> String {
	extract_category(text, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_each_wrapper_independently() {
		assert_eq!(extract_category("['Toys >> Cars']", 0).as_deref(), Some("Toys"));
		assert_eq!(extract_category("\"Books\"", 0).as_deref(), Some("Books"));
		assert_eq!(extract_category("[[Home >> Decor]]", 1).as_deref(), Some("Decor"));
	}

	#[test]
	fn plain_text_is_single_level() {
		assert_eq!(extract_category("Clothing", 0).as_deref(), Some("Clothing"));
		assert_eq!(extract_category("Clothing", 1), None);
		assert_eq!(top_level_category(""), "");
	}
}
