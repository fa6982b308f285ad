//! Step parsers and validators. Parsers are total over `&str` and return `None` for
//! input the step cannot use; validators check range and length on the parsed value.

use reqwest::Url;
use vpnshop_db::models::BYTES_PER_GB;

use super::FieldValue;

pub const MAX_TITLE_CHARS: usize = 64;
pub const MAX_DESCRIPTION_CHARS: usize = 512;
pub const MAX_PRICE: u64 = 1_000_000_000_000;
pub const MAX_DURATION_DAYS: u64 = 3650;
/// Largest gigabyte count whose byte size still fits an `i64`.
pub const MAX_DATA_LIMIT_GB: u64 = (i64::MAX / BYTES_PER_GB) as u64;

/// Maps Persian and Arabic-Indic digits to ASCII and drops thousands separators.
pub fn normalize_digits(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '\u{066C}' | '_' | ' ' | '\u{00A0}'))
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            other => other,
        })
        .collect()
}

pub fn parse_text(raw: &str) -> Option<FieldValue> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    Some(FieldValue::Text(text.to_string()))
}

/// Like [`parse_text`] but keeps surrounding whitespace, which may be part of a
/// password.
pub fn parse_secret(raw: &str) -> Option<FieldValue> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(FieldValue::Text(raw.to_string()))
}

/// Non-negative integers only. Signs, decimals and exponents are rejected rather than
/// rounded.
pub fn parse_number(raw: &str) -> Option<FieldValue> {
    let digits = normalize_digits(raw);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok().map(FieldValue::Number)
}

/// Absolute http(s) URL with a host. Trailing slashes are stripped so `{url}/login`
/// never doubles them.
pub fn parse_url(raw: &str) -> Option<FieldValue> {
    let text = raw.trim();
    let url = Url::parse(text).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(FieldValue::Text(text.trim_end_matches('/').to_string()))
}

fn char_limit(value: &FieldValue, max: usize, message: &'static str) -> Result<(), &'static str> {
    match value {
        FieldValue::Text(text) if text.chars().count() <= max => Ok(()),
        _ => Err(message),
    }
}

fn number_range(
    value: &FieldValue,
    max: u64,
    message: &'static str,
) -> Result<(), &'static str> {
    match value {
        FieldValue::Number(n) if (1..=max).contains(n) => Ok(()),
        _ => Err(message),
    }
}

pub fn validate_title(value: &FieldValue) -> Result<(), &'static str> {
    char_limit(
        value,
        MAX_TITLE_CHARS,
        "❌ عنوان پلن حداکثر ۶۴ کاراکتر است. دوباره وارد کنید:",
    )
}

pub fn validate_description(value: &FieldValue) -> Result<(), &'static str> {
    char_limit(
        value,
        MAX_DESCRIPTION_CHARS,
        "❌ توضیحات حداکثر ۵۱۲ کاراکتر است. دوباره وارد کنید:",
    )
}

pub fn validate_price(value: &FieldValue) -> Result<(), &'static str> {
    number_range(
        value,
        MAX_PRICE,
        "❌ قیمت باید بیشتر از صفر و کمتر از هزار میلیارد تومان باشد. دوباره وارد کنید:",
    )
}

pub fn validate_duration(value: &FieldValue) -> Result<(), &'static str> {
    number_range(
        value,
        MAX_DURATION_DAYS,
        "❌ مدت زمان باید بین ۱ تا ۳۶۵۰ روز باشد. دوباره وارد کنید:",
    )
}

pub fn validate_data_limit(value: &FieldValue) -> Result<(), &'static str> {
    number_range(
        value,
        MAX_DATA_LIMIT_GB,
        "❌ حجم وارد شده خارج از محدوده مجاز است. دوباره وارد کنید:",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_accept_persian_digits_and_separators() {
        assert_eq!(parse_number("100000"), Some(FieldValue::Number(100_000)));
        assert_eq!(parse_number(" ۱۰۰٬۰۰۰ "), Some(FieldValue::Number(100_000)));
        assert_eq!(parse_number("٣٠"), Some(FieldValue::Number(30)));
        assert_eq!(parse_number("1,500,000"), Some(FieldValue::Number(1_500_000)));
    }

    #[test]
    fn numbers_reject_non_numeric_input() {
        for raw in ["abc", "", "   ", "12.5", "-3", "1e6", "NaN", "۱۲a", "99999999999999999999999"] {
            assert_eq!(parse_number(raw), None, "input {:?}", raw);
        }
    }

    #[test]
    fn text_is_trimmed_and_non_empty() {
        assert_eq!(parse_text("  Gold "), Some(FieldValue::Text("Gold".into())));
        assert_eq!(parse_text(" \n "), None);
    }

    #[test]
    fn secrets_keep_their_whitespace() {
        assert_eq!(
            parse_secret("  pa ss  "),
            Some(FieldValue::Text("  pa ss  ".into()))
        );
        assert_eq!(parse_secret(" \t "), None);
        assert_eq!(parse_secret(""), None);
    }

    #[test]
    fn urls_need_http_scheme_and_host() {
        assert_eq!(
            parse_url("https://panel.example.com:2053/TOFTr6aum2/"),
            Some(FieldValue::Text("https://panel.example.com:2053/TOFTr6aum2".into()))
        );
        assert_eq!(parse_url("panel.example.com"), None);
        assert_eq!(parse_url("ftp://panel.example.com"), None);
        assert_eq!(parse_url("https://"), None);
    }

    #[test]
    fn ranges_are_enforced() {
        assert!(validate_price(&FieldValue::Number(0)).is_err());
        assert!(validate_price(&FieldValue::Number(100_000)).is_ok());
        assert!(validate_duration(&FieldValue::Number(3651)).is_err());
        assert!(validate_data_limit(&FieldValue::Number(1_000_000)).is_ok());
        assert!(validate_data_limit(&FieldValue::Number(MAX_DATA_LIMIT_GB)).is_ok());
        assert!(validate_data_limit(&FieldValue::Number(MAX_DATA_LIMIT_GB + 1)).is_err());
        assert!(validate_title(&FieldValue::Text("x".repeat(65))).is_err());
        assert!(validate_title(&FieldValue::Text("ط".repeat(64))).is_ok());
    }
}
