//! Answer normalization
//!
//! Canonicalizes free-text and option-letter answers so that equality
//! comparison ignores case, markdown emphasis, surrounding explanation and
//! punctuation. The canonical form is only used for grouping and is never
//! shown to users.

use std::fmt::Display;

/// Markers that may follow a multiple-choice option letter ("B.", "c)", "a:")
const OPTION_MARKERS: [char; 4] = ['.', ')', ':', '-'];

/// Normalize an answer for equality comparison.
///
/// Idempotent: `normalize_answer(&normalize_answer(x)) == normalize_answer(x)`.
///
/// # Example
///
/// ```
/// use consensus_domain::normalize_answer;
///
/// assert_eq!(normalize_answer("B."), "b");
/// assert_eq!(normalize_answer("  b "), "b");
/// assert_eq!(normalize_answer("B. Paris"), "b");
/// assert_eq!(normalize_answer("**Paris.**"), "paris");
/// assert_eq!(normalize_answer("The answer is: 42!"), "the answer is 42");
/// ```
pub fn normalize_answer(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let stripped = lowered.replace("**", "").replace('`', "");

    if let Some(letter) = option_letter(&stripped) {
        return letter.to_string();
    }

    let cleaned = clean_free_text(&stripped);
    // Cleaning can expose an option prefix ("b,. foo" -> "b . foo").
    match option_letter(&cleaned) {
        Some(letter) => letter.to_string(),
        None => cleaned,
    }
}

/// Normalize any displayable value (numbers, booleans, ...) via its string form.
pub fn normalize_value<T: Display + ?Sized>(value: &T) -> String {
    normalize_answer(&value.to_string())
}

/// Detect a multiple-choice option letter.
///
/// Matches either a lone letter `a`-`d` with an optional marker (`"b"`, `"b ."`),
/// or a letter and marker followed by whitespace and further text (`"b. paris"`).
fn option_letter(text: &str) -> Option<char> {
    let mut chars = text.trim_start().chars();
    let letter = chars.next().filter(|c| ('a'..='d').contains(c))?;

    let rest = chars.as_str().trim_start();
    if rest.is_empty() {
        return Some(letter);
    }

    let mut rest_chars = rest.chars();
    let marker = rest_chars.next()?;
    if !OPTION_MARKERS.contains(&marker) {
        return None;
    }

    let tail = rest_chars.as_str();
    if tail.trim().is_empty() || tail.starts_with(char::is_whitespace) {
        Some(letter)
    } else {
        None
    }
}

fn clean_free_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | ' ') {
                c
            } else {
                ' '
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches(['.', ' ']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_letter_variants() {
        assert_eq!(normalize_answer("B."), "b");
        assert_eq!(normalize_answer("  b "), "b");
        assert_eq!(normalize_answer("c)"), "c");
        assert_eq!(normalize_answer("D:"), "d");
        assert_eq!(normalize_answer("a -"), "a");
        assert_eq!(normalize_answer("`C`"), "c");
    }

    #[test]
    fn test_option_prefix_with_explanation() {
        assert_eq!(normalize_answer("B. Paris"), "b");
        assert_eq!(normalize_answer("**A)** because of gravity"), "a");
        assert_eq!(normalize_answer("d - none of the above"), "d");
    }

    #[test]
    fn test_letters_outside_options_are_free_text() {
        assert_eq!(normalize_answer("E."), "e");
        assert_eq!(normalize_answer("b52 bomber"), "b52 bomber");
        assert_eq!(normalize_answer("A.B."), "a.b");
    }

    #[test]
    fn test_free_text_cleanup() {
        assert_eq!(normalize_answer("**Paris.**"), "paris");
        assert_eq!(normalize_answer("  New   York!! "), "new york");
        assert_eq!(normalize_answer("3.14"), "3.14");
        assert_eq!(normalize_answer("-7"), "-7");
        assert_eq!(normalize_answer("42..."), "42");
        assert_eq!(normalize_answer("Münich"), "m nich");
        assert_eq!(normalize_answer(""), "");
        assert_eq!(normalize_answer("?!"), "");
    }

    #[test]
    fn test_cleanup_exposing_option_prefix() {
        assert_eq!(normalize_answer("b,. foo"), "b");
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&42), "42");
        assert_eq!(normalize_value(&true), "true");
        assert_eq!(normalize_value(&2.5), "2.5");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "B.",
            "  b ",
            "**Paris.**",
            "B. Paris",
            "x .",
            "1..",
            "b,. foo",
            "d.c.",
            ". leading dot",
            "Answer:\n`C`",
            "The Answer Is 7!",
            "naïve café",
            "a\tb",
            "",
            "- . -",
        ];
        for sample in samples {
            let once = normalize_answer(sample);
            assert_eq!(normalize_answer(&once), once, "not idempotent for {sample:?}");
        }
    }
}
