//! Display helpers shared by the fallback narrative and the report renderer.

/// Format an integer with thousands separators: `1234567` -> `"1,234,567"`.
#[must_use]
pub fn number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Like [`number`], but renders a hidden value as `"N/A"`.
#[must_use]
pub fn optional_number(n: Option<u64>) -> String {
    n.map_or_else(|| "N/A".to_string(), number)
}

/// Engagement percentage with two decimals: `4.1` -> `"4.10%"`.
#[must_use]
pub fn engagement(value: f64) -> String {
    format!("{value:.2}%")
}

/// Outlier multiplier with two decimals: `1.01` -> `"1.01x"`.
#[must_use]
pub fn outlier(value: f64) -> String {
    format!("{value:.2}x")
}

/// Shorten `text` to at most `max_len` characters, ending in `...` when cut.
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_inserts_separators() {
        assert_eq!(number(0), "0");
        assert_eq!(number(999), "999");
        assert_eq!(number(1_000), "1,000");
        assert_eq!(number(1_234_567), "1,234,567");
        assert_eq!(number(12_345), "12,345");
    }

    #[test]
    fn optional_number_handles_hidden_counts() {
        assert_eq!(optional_number(None), "N/A");
        assert_eq!(optional_number(Some(2_500)), "2,500");
    }

    #[test]
    fn engagement_and_outlier_use_two_decimals() {
        assert_eq!(engagement(4.1), "4.10%");
        assert_eq!(outlier(1.01), "1.01x");
        assert_eq!(outlier(0.0), "0.00x");
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn truncate_cuts_long_text() {
        assert_eq!(truncate("abcdefghijk", 10), "abcdefg...");
        assert_eq!(truncate("abcdefghijk", 10).chars().count(), 10);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
