use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_\-]+").expect("static header separator regex"));

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("static whitespace regex"));

/// Text normalization and keyword matching helpers shared by the stages
pub struct TextUtils;

impl TextUtils {
    /// Header key used for alias lookup: trimmed, lowercased, separator runs
    /// collapsed to a single underscore
    pub fn normalize_header(header: &str) -> String {
        let trimmed = header.trim_start_matches('\u{feff}').trim().to_lowercase();
        HEADER_SEPARATORS
            .replace_all(&trimmed, "_")
            .trim_matches('_')
            .to_string()
    }

    /// Trim and collapse internal whitespace to single spaces
    pub fn collapse_whitespace(value: &str) -> String {
        WHITESPACE_RUNS.replace_all(value.trim(), " ").into_owned()
    }

    /// Title-case each word, including hyphenated parts
    pub fn title_case(value: &str) -> String {
        Self::collapse_whitespace(value)
            .split(' ')
            .map(|word| {
                word.split('-')
                    .map(Self::capitalize)
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn capitalize(part: &str) -> String {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }

    /// Lowercase key used for table lookups
    pub fn lookup_key(value: &str) -> String {
        Self::collapse_whitespace(value).to_lowercase()
    }

    /// Whole-word keyword match. Both sides are split on non-alphanumeric
    /// characters, so "c-level" matches "C-Level" and "cto" does not match
    /// "Director".
    pub fn contains_keyword(text: &str, keyword: &str) -> bool {
        let haystack = Self::padded_tokens(text);
        let needle = Self::padded_tokens(keyword);
        !needle.trim().is_empty() && haystack.contains(&needle)
    }

    pub fn contains_any_keyword<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
        keywords.iter().any(|k| Self::contains_keyword(text, k.as_ref()))
    }

    fn padded_tokens(text: &str) -> String {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        format!(" {} ", tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(TextUtils::normalize_header("  Full   Name "), "full_name");
        assert_eq!(TextUtils::normalize_header("E-Mail"), "e_mail");
        assert_eq!(TextUtils::normalize_header("\u{feff}LeadID"), "leadid");
        assert_eq!(TextUtils::normalize_header("company__size"), "company_size");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(TextUtils::title_case("  jane   DOE "), "Jane Doe");
        assert_eq!(TextUtils::title_case("mary-jane watson"), "Mary-Jane Watson");
        assert_eq!(TextUtils::title_case(""), "");
    }

    #[test]
    fn test_contains_keyword_respects_word_boundaries() {
        assert!(TextUtils::contains_keyword("VP of Sales", "vp"));
        assert!(TextUtils::contains_keyword("C-Level", "c-level"));
        assert!(TextUtils::contains_keyword("Head of FP&A", "fp&a"));
        assert!(TextUtils::contains_keyword("Senior Vice President", "vice president"));
        assert!(!TextUtils::contains_keyword("Director", "cto"));
        assert!(!TextUtils::contains_keyword("MVP Builder", "vp"));
        assert!(!TextUtils::contains_keyword("anything", ""));
    }
}
