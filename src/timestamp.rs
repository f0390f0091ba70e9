/// A data line's leading timestamp token, keeping enough of the original text
/// to reproduce its formatting once the value changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampToken {
    value: f64,
    // Digit count after the decimal point, or None when the token had no point.
    frac_digits: Option<usize>,
    // Character width of the original token.
    width: usize,
}

impl TimestampToken {
    /// Parse a whitespace-delimited token as a timestamp.
    ///
    /// Succeeds for anything that reads as a float literal, including `inf`
    /// and `nan`; those still classify the line as a data record even though
    /// [`rewrite`](Self::rewrite) will refuse them.
    pub fn parse(token: &str) -> Option<Self> {
        let value: f64 = token.parse().ok()?;
        let frac_digits = token.split_once('.').map(|(_, frac)| frac.len());

        Some(TimestampToken {
            value,
            frac_digits,
            width: token.len(),
        })
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Render `value + offset` in the original token's format: the same
    /// fractional digit count (integer-truncated when the original had no
    /// decimal point), right-justified to at least the original width.
    ///
    /// Returns the shifted value along with its rendering, or None when
    /// either the token or the sum is not a finite number.
    pub fn rewrite(&self, offset: f64) -> Option<(f64, String)> {
        let new = self.value + offset;
        if !new.is_finite() {
            return None;
        }

        let text = match self.frac_digits {
            Some(digits) => format!("{new:.digits$}"),
            None => format!("{}", new.trunc() as i64),
        };

        Some((new, format!("{text:>width$}", width = self.width)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keeps_precision() {
        let token = TimestampToken::parse("12.345").unwrap();

        let (value, text) = token.rewrite(25.0).unwrap();
        assert_eq!(text, "37.345");
        assert!((value - 37.345).abs() < 1e-9);
    }

    #[test]
    fn test_integer_token_stays_integer() {
        let token = TimestampToken::parse("1000").unwrap();

        let (_, text) = token.rewrite(9.0).unwrap();
        assert_eq!(text, "1009");
    }

    #[test]
    fn test_integer_token_truncates_toward_zero() {
        let token = TimestampToken::parse("3").unwrap();

        let (value, text) = token.rewrite(0.9).unwrap();
        assert_eq!(text, "3");
        assert!((value - 3.9).abs() < 1e-9);
    }

    #[test]
    fn test_pads_to_original_width() {
        // "0007" reads as 7.0 but is four columns wide
        let token = TimestampToken::parse("0007").unwrap();

        let (_, text) = token.rewrite(9.0).unwrap();
        assert_eq!(text, "  16");
    }

    #[test]
    fn test_wider_result_is_not_clipped() {
        let token = TimestampToken::parse("9.5").unwrap();

        let (_, text) = token.rewrite(1000.0).unwrap();
        assert_eq!(text, "1009.5");
    }

    #[test]
    fn test_trailing_point_means_zero_digits() {
        let token = TimestampToken::parse("5.").unwrap();

        let (_, text) = token.rewrite(1.25).unwrap();
        assert_eq!(text, " 6");
    }

    #[test]
    fn test_leading_point() {
        let token = TimestampToken::parse(".5").unwrap();

        let (_, text) = token.rewrite(2.0).unwrap();
        assert_eq!(text, "2.5");
    }

    #[test]
    fn test_negative_token() {
        let token = TimestampToken::parse("-0.5").unwrap();

        let (_, text) = token.rewrite(2.0).unwrap();
        assert_eq!(text, " 1.5");
    }

    #[test]
    fn test_non_numeric_token() {
        assert!(TimestampToken::parse("CANFD").is_none());
        assert!(TimestampToken::parse("1x2").is_none());
    }

    #[test]
    fn test_non_finite_parses_but_never_rewrites() {
        let token = TimestampToken::parse("inf").unwrap();
        assert!(token.rewrite(1.0).is_none());

        let token = TimestampToken::parse("nan").unwrap();
        assert!(token.rewrite(1.0).is_none());
    }
}
