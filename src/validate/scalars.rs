//! Scalar coercion helpers shared by the evaluators, cleaner and resolver.
//!
//! Raw values arrive as optional text. These helpers define, in one place,
//! what "blank", "numeric", "boolean" and the date shapes mean, so every
//! rule and cleaning step agrees on the same coercions. All of them are
//! total: malformed input coerces to `None`/`false`, never an error.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Null, or text that trims to empty.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}

/// Parse trimmed text as a finite float. Blank, unparseable and non-finite
/// values are all `None`, so missing and malformed numbers look the same
/// downstream.
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Lenient boolean coercion over trimmed, lowercased text.
///
/// `true/1/yes/y` and `false/0/no/n` map to their boolean; everything else,
/// including blank, is `None`.
pub fn parse_bool(value: Option<&str>) -> Option<bool> {
    let text = value?.trim().to_lowercase();
    match text.as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Present but not coercible to a number.
pub fn is_non_numeric_text(value: Option<&str>) -> bool {
    !is_blank(value) && parse_number(value).is_none()
}

/// Present but not in canonical `YYYY-MM-DD` shape.
pub fn is_non_iso_date(value: Option<&str>) -> bool {
    match value {
        Some(text) if !text.trim().is_empty() => !is_iso_date_shape(text.trim()),
        _ => false,
    }
}

fn is_iso_date_shape(text: &str) -> bool {
    text.len() == 10
        && text.bytes().enumerate().all(|(index, byte)| match index {
            4 | 7 => byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Split a strict `NN/NN/YYYY` date into `(left, right, year)`.
///
/// Both day-first and month-first readings are possible when each `NN` is
/// at most 12; the cleaner resolves that ambiguity month-first.
pub fn slash_date_parts(value: &str) -> Option<(u32, u32, i32)> {
    let text = value.trim();
    if text.len() != 10 {
        return None;
    }
    let shape_ok = text.bytes().enumerate().all(|(index, byte)| match index {
        2 | 5 => byte == b'/',
        _ => byte.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    let left = text[0..2].parse::<u32>().ok()?;
    let right = text[3..5].parse::<u32>().ok()?;
    let year = text[6..10].parse::<i32>().ok()?;
    Some((left, right, year))
}

/// `NN/NN/YYYY` where both segments could be a month.
pub fn is_ambiguous_slash_date(value: Option<&str>) -> bool {
    match value {
        Some(text) => {
            matches!(slash_date_parts(text), Some((left, right, _)) if left <= 12 && right <= 12)
        }
        None => false,
    }
}

/// Whether the value parses as an IP address in a private, loopback,
/// link-local or unspecified range. Unparseable text is `false`.
pub fn is_private_ip(value: Option<&str>) -> bool {
    let Some(text) = value else {
        return false;
    };
    match text.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            ip.is_private() || ip.is_loopback() || ip.is_link_local() || ip.is_unspecified()
        }
        Ok(IpAddr::V6(ip)) => {
            ip.is_loopback()
                || ip.is_unspecified()
                || (ip.segments()[0] & 0xfe00) == 0xfc00
                || (ip.segments()[0] & 0xffc0) == 0xfe80
        }
        Err(_) => false,
    }
}

/// Lenient UTC timestamp parse.
///
/// Accepts RFC 3339 (offsets are converted to UTC), naive datetimes with a
/// `T` or space separator, and bare dates read as midnight UTC.
pub fn parse_utc_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("   \t")));
        assert!(!is_blank(Some(" x ")));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some(" 52000.5 ")), Some(52000.5));
        assert_eq!(parse_number(Some("1e3")), Some(1000.0));
        assert_eq!(parse_number(Some("-3")), Some(-3.0));
        assert_eq!(parse_number(Some("52,000")), None);
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_parse_bool_vocabulary() {
        assert_eq!(parse_bool(Some(" YES ")), Some(true));
        assert_eq!(parse_bool(Some("1")), Some(true));
        assert_eq!(parse_bool(Some("n")), Some(false));
        assert_eq!(parse_bool(Some("False")), Some(false));
        assert_eq!(parse_bool(Some("approved")), None);
        assert_eq!(parse_bool(Some("")), None);
        assert_eq!(parse_bool(None), None);
    }

    #[test]
    fn test_non_numeric_text() {
        assert!(is_non_numeric_text(Some("abc")));
        assert!(!is_non_numeric_text(Some("42")));
        assert!(!is_non_numeric_text(Some("  ")));
        assert!(!is_non_numeric_text(None));
    }

    #[test]
    fn test_non_iso_date() {
        assert!(!is_non_iso_date(Some("1990-05-13")));
        assert!(is_non_iso_date(Some("1990/05/13")));
        assert!(is_non_iso_date(Some("13/05/1990")));
        assert!(is_non_iso_date(Some("1990-5-3")));
        assert!(!is_non_iso_date(Some("")));
        assert!(!is_non_iso_date(None));
    }

    #[test]
    fn test_ambiguous_slash_dates() {
        assert!(is_ambiguous_slash_date(Some("05/06/1990")));
        assert!(is_ambiguous_slash_date(Some(" 12/12/2000 ")));
        assert!(!is_ambiguous_slash_date(Some("13/05/1990")));
        assert!(!is_ambiguous_slash_date(Some("5/6/1990")));
        assert!(!is_ambiguous_slash_date(Some("1990-05-13")));
        assert!(!is_ambiguous_slash_date(None));
    }

    #[test]
    fn test_private_ip_ranges() {
        assert!(is_private_ip(Some("192.168.1.5")));
        assert!(is_private_ip(Some("10.0.0.1")));
        assert!(is_private_ip(Some("172.16.8.3")));
        assert!(is_private_ip(Some("127.0.0.1")));
        assert!(is_private_ip(Some(" ::1 ")));
        assert!(!is_private_ip(Some("8.8.8.8")));
        assert!(!is_private_ip(Some("not-an-ip")));
        assert!(!is_private_ip(Some("")));
        assert!(!is_private_ip(None));
    }

    #[test]
    fn test_parse_utc_timestamp_variants() {
        let rfc = parse_utc_timestamp("2024-03-01T10:00:00Z").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let offset = parse_utc_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(offset, rfc);

        assert!(parse_utc_timestamp("2024-03-01T10:00:00").is_some());
        assert!(parse_utc_timestamp("2024-03-01 10:00:00").is_some());
        assert!(parse_utc_timestamp("2024-03-01T10:00:00.250Z").is_some());

        let midnight = parse_utc_timestamp("2024-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        assert!(parse_utc_timestamp("yesterday").is_none());
        assert!(parse_utc_timestamp("  ").is_none());
    }
}
