use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Escapes text for Telegram MarkdownV2.
///
/// Every character the Bot API reserves in MarkdownV2 is prefixed with a
/// backslash, so arbitrary user or model text can be embedded safely.
///
/// # Example
///
/// ```
/// use tickerbot::core::utils::escape_markdown_v2;
///
/// assert_eq!(escape_markdown_v2("+2.5%"), "\\+2\\.5%");
/// ```
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '_' => result.push_str("\\_"),
            '*' => result.push_str("\\*"),
            '[' => result.push_str("\\["),
            ']' => result.push_str("\\]"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            '~' => result.push_str("\\~"),
            '`' => result.push_str("\\`"),
            '>' => result.push_str("\\>"),
            '#' => result.push_str("\\#"),
            '+' => result.push_str("\\+"),
            '-' => result.push_str("\\-"),
            '=' => result.push_str("\\="),
            '|' => result.push_str("\\|"),
            '{' => result.push_str("\\{"),
            '}' => result.push_str("\\}"),
            '.' => result.push_str("\\."),
            '!' => result.push_str("\\!"),
            _ => result.push(c),
        }
    }

    result
}

/// Inserts `,` every three digits of the integer part of a plain decimal string.
fn group_thousands(plain: &str) -> String {
    let (sign, digits) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Formats a price with thousands separators.
///
/// Amounts of 1 and above get two decimals; smaller amounts keep up to six
/// significant decimals so sub-cent coins stay readable.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tickerbot::core::utils::format_amount;
///
/// assert_eq!(format_amount(dec!(64500)), "64,500.00");
/// assert_eq!(format_amount(dec!(0.000012345)), "0.000012");
/// ```
pub fn format_amount(amount: Decimal) -> String {
    if amount.abs() >= Decimal::ONE || amount.is_zero() {
        return group_thousands(&format!("{:.2}", amount.round_dp(2)));
    }

    let formatted = format!("{:.6}", amount.round_dp(6));
    let trimmed = formatted.trim_end_matches('0');
    let decimals = trimmed.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0);
    if decimals < 2 {
        format!("{:.2}", amount.round_dp(2))
    } else {
        trimmed.to_string()
    }
}

/// Formats large amounts with a T/B/M suffix (`1.27T`).
pub fn format_compact(amount: Decimal) -> String {
    let abs = amount.abs();
    let (divisor, suffix) = if abs >= dec!(1000000000000) {
        (dec!(1000000000000), "T")
    } else if abs >= dec!(1000000000) {
        (dec!(1000000000), "B")
    } else if abs >= dec!(1000000) {
        (dec!(1000000), "M")
    } else {
        return format_amount(amount);
    };
    format!("{:.2}{}", (amount / divisor).round_dp(2), suffix)
}

/// Signed percentage with two decimals (`+2.50%`, `-0.80%`, `0.00%`).
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    if rounded > Decimal::ZERO {
        format!("+{:.2}%", rounded)
    } else if rounded.is_zero() {
        "0.00%".to_string()
    } else {
        format!("{:.2}%", rounded)
    }
}

/// Truncates to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown_v2_reserved_characters() {
        assert_eq!(escape_markdown_v2("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_markdown_v2("(1.5)!"), "\\(1\\.5\\)\\!");
        assert_eq!(escape_markdown_v2("plain text"), "plain text");
    }

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(64500)), "64,500.00");
        assert_eq!(format_amount(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_amount(dec!(999)), "999.00");
        assert_eq!(format_amount(dec!(-1500.5)), "-1,500.50");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_format_amount_small_values() {
        assert_eq!(format_amount(dec!(0.52)), "0.52");
        assert_eq!(format_amount(dec!(0.1234)), "0.1234");
        assert_eq!(format_amount(dec!(0.000012345)), "0.000012");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(dec!(1270000000000)), "1.27T");
        assert_eq!(format_compact(dec!(69000000000)), "69.00B");
        assert_eq!(format_compact(dec!(2500000)), "2.50M");
        assert_eq!(format_compact(dec!(12345)), "12,345.00");
    }

    #[test]
    fn test_format_percent_sign() {
        assert_eq!(format_percent(dec!(2.5)), "+2.50%");
        assert_eq!(format_percent(dec!(-0.8)), "-0.80%");
        assert_eq!(format_percent(Decimal::ZERO), "0.00%");
        assert_eq!(format_percent(dec!(-0.001)), "0.00%");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("şğü", 2), "şğ");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
