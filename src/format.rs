//! Display formatting for counts, yen amounts and hours.
//!
//! These strings are compared verbatim in tests; keep them stable.

pub const CURRENCY_SYMBOL: char = '¥';

/// Insert `,` every three digits counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Integer with thousands separators: `1000` -> `1,000`.
pub fn format_count<N: Into<i128>>(n: N) -> String {
    let n = n.into();
    let grouped = group_thousands(&n.unsigned_abs().to_string());
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Two fixed decimals with thousands separators: `5391.21` -> `5,391.21`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value.is_sign_negative() && fixed != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

pub fn format_currency(value: f64) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_amount(value))
}

pub fn format_hour(hour: u8) -> String {
    format!("{}時", hour)
}
