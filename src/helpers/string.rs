//! Text measurement utilities used to size spreadsheet columns and rows.
//! Widths are expressed in the spreadsheet's abstract column unit (roughly one Latin glyph).

/// Safety margin applied on top of the raw glyph count.
pub(crate) const WIDTH_FACTOR: f64 = 1.2;

/// Horizontal weight of an East Asian ideograph relative to a Latin glyph.
const CJK_WEIGHT: usize = 2;

/// Checks whether a character is rendered double-width (CJK ideographs, kana, hangul, fullwidth forms).
#[inline]
pub(crate) fn is_cjk(character: char) -> bool {
    matches!(character,
        '\u{3040}'..='\u{30FF}'   // Hiragana and Katakana
        | '\u{3400}'..='\u{4DBF}' // CJK Unified Ideographs Extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
        | '\u{AC00}'..='\u{D7AF}' // Hangul Syllables
        | '\u{F900}'..='\u{FAFF}' // CJK Compatibility Ideographs
        | '\u{FF01}'..='\u{FF60}' // Fullwidth Forms
    )
}

/// Estimates the display width of a text.
///
/// CJK characters count twice, everything else once, and the total is scaled by
/// [`WIDTH_FACTOR`]. The empty string measures 0.
pub(crate) fn estimate_width(text: &str) -> f64 {
    let (cjk, other) = text.chars().fold((0usize, 0usize), |(cjk, other), character| {
        if is_cjk(character) {
            (cjk + 1, other)
        } else {
            (cjk, other + 1)
        }
    });
    (cjk * CJK_WEIGHT + other) as f64 * WIDTH_FACTOR
}

/// Returns the length of a text in characters.
#[inline]
pub(crate) fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Truncates a text to at most `limit` characters, replacing the tail with `...`.
/// Texts within the limit are returned unchanged.
pub(crate) fn truncate(text: &str, limit: usize) -> String {
    const ELLIPSIS: &str = "...";
    if char_count(text) <= limit {
        return text.to_owned();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Estimates how many visual lines a wrapped text occupies.
///
/// Embedded line breaks win over length: `n` newlines give `n + 1` lines,
/// otherwise the text is split every `chars_per_line` characters.
pub(crate) fn estimate_lines(text: &str, chars_per_line: usize) -> usize {
    let breaks = text.matches('\n').count();
    if breaks > 0 {
        breaks + 1
    } else {
        char_count(text).div_ceil(chars_per_line.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::helpers::string::*;
    use proptest::prelude::*;

    #[test]
    fn width_of_empty_string() {
        assert_eq!(estimate_width(""), 0.0);
    }

    #[test]
    fn width_of_latin_text() {
        assert_eq!(estimate_width("abcde"), 5.0 * 1.2);
    }

    #[test]
    fn width_of_cjk_text() {
        assert_eq!(estimate_width("中文标题"), 4.0 * 2.0 * 1.2);
        assert_eq!(estimate_width("テスト"), 3.0 * 2.0 * 1.2);
    }

    #[test]
    fn width_of_mixed_text() {
        // 2 ideographs + "ab"
        assert_eq!(estimate_width("中文ab"), (2.0 * 2.0 + 2.0) * 1.2);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn truncate_long_text() {
        let truncated = truncate("abcdefghijklmnop", 10);
        assert_eq!(truncated, "abcdefg...");
        assert_eq!(char_count(&truncated), 10);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_counts_characters() {
        let truncated = truncate("中文中文中文中文", 6);
        assert_eq!(truncated, "中文中...");
        assert_eq!(char_count(&truncated), 6);
    }

    #[test]
    fn lines_from_breaks() {
        assert_eq!(estimate_lines("a\nb\nc", 30), 3);
    }

    #[test]
    fn lines_from_length() {
        assert_eq!(estimate_lines(&"x".repeat(45), 30), 2);
        assert_eq!(estimate_lines(&"x".repeat(30), 30), 1);
        assert_eq!(estimate_lines("", 30), 1);
    }

    proptest! {
        #[test]
        fn width_is_monotonic(prefix in "\\PC*", suffix in "\\PC+") {
            let longer = format!("{prefix}{suffix}");
            prop_assert!(estimate_width(&longer) >= estimate_width(&prefix));
        }

        #[test]
        fn width_of_cjk_run(count in 0usize..64) {
            let text = "汉".repeat(count);
            prop_assert_eq!(estimate_width(&text), (count * 2) as f64 * 1.2);
        }

        #[test]
        fn width_of_latin_run(count in 0usize..64) {
            let text = "a".repeat(count);
            prop_assert_eq!(estimate_width(&text), count as f64 * 1.2);
        }

        #[test]
        fn truncation_hits_limit(text in "\\PC{20,80}", limit in 4usize..20) {
            let truncated = truncate(&text, limit);
            prop_assert_eq!(char_count(&truncated), limit);
            prop_assert!(truncated.ends_with("..."));
        }
    }
}
