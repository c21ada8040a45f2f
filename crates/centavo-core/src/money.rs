//! Amount parsing and currency formatting.
//!
//! Amounts are whole currency units (Colombian pesos have no cents in
//! practice), entered as `15000`, `15.000`, or `15,000` and displayed with a
//! `.` thousands separator: `15.000 COP`.

/// Parse a user-entered amount.
///
/// Strips `.` and `,` separators, then requires a positive integer. Zero,
/// negatives, and anything non-numeric are rejected.
pub fn parse_amount(input: &str) -> Option<i64> {
    let cleaned: String = input.chars().filter(|c| *c != '.' && *c != ',').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match cleaned.parse::<i64>() {
        Ok(amount) if amount > 0 => Some(amount),
        _ => None,
    }
}

/// Format an amount with dot-separated thousands and the currency code.
///
/// `15000` → `"15.000 COP"`.
pub fn format_currency(amount: i64, currency: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} {currency}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_amounts() {
        assert_eq!(parse_amount("15000"), Some(15_000));
        assert_eq!(parse_amount("1"), Some(1));
    }

    #[test]
    fn parses_separator_variants() {
        assert_eq!(parse_amount("15.000"), Some(15_000));
        assert_eq!(parse_amount("15,000"), Some(15_000));
        assert_eq!(parse_amount("1.234.567"), Some(1_234_567));
    }

    #[test]
    fn rejects_non_positive_and_garbage() {
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("."), None);
    }

    #[test]
    fn formats_thousands_with_dots() {
        assert_eq!(format_currency(15_000, "COP"), "15.000 COP");
        assert_eq!(format_currency(1_234_567, "COP"), "1.234.567 COP");
        assert_eq!(format_currency(999, "COP"), "999 COP");
        assert_eq!(format_currency(0, "COP"), "0 COP");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_currency(-140_000, "COP"), "-140.000 COP");
    }

    #[test]
    fn formats_other_currencies() {
        assert_eq!(format_currency(50, "USD"), "50 USD");
    }
}
