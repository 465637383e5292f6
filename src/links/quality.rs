/// Rank a free-text quality label by its first run of ASCII digits.
///
/// Returns 0 for empty text, text without digits, or a digit run too large to
/// represent. There is no unit awareness: "4K" ranks as 4.
pub fn parse_quality(text: &str) -> u32 {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return 0;
    };

    let digits = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("1080p"), 1080);
        assert_eq!(parse_quality("HD 720"), 720);
        assert_eq!(parse_quality("WEB-DL 480p x264"), 480);
        assert_eq!(parse_quality("4K"), 4);
    }

    #[test]
    fn test_parse_quality_without_digits() {
        assert_eq!(parse_quality(""), 0);
        assert_eq!(parse_quality("HD"), 0);
        assert_eq!(parse_quality("   "), 0);
    }

    #[test]
    fn test_parse_quality_overflow_is_zero() {
        assert_eq!(parse_quality("99999999999999999999p"), 0);
    }
}
