// Small string helpers shared by the loader, normalizer and resolver.
use num_format::{Locale, ToFormattedString};

/// Parse the ward number column.
///
/// - Trims whitespace.
/// - Returns `None` for empty cells and anything that is not a plain
///   non-negative integer (divider rows, "Total", "1a", ...).
pub fn parse_ward_no(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

/// Capitalize the first character of every space-separated word and
/// lower-case the rest, regardless of the input casing. Spacing is kept as is.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Strip a trailing whole word (or phrase) from `s`, returning the trimmed
/// remainder. The word must be separated from a non-empty remainder by
/// whitespace, so `"Pala Municipality"` loses its suffix but
/// `"Municipality"` and `"XMunicipality"` do not.
pub fn strip_trailing_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    let rest = s.trim_end().strip_suffix(word)?;
    if !rest.ends_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_end();
    (!rest.is_empty()).then_some(rest)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `9,855 rows parsed`).
    n.to_formatted_string(&Locale::en)
}
