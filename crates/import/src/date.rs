use chrono::NaiveDate;
use stmtnorm_core::{NormalizeError, RecordDate};

use crate::util::{re, retain_chars};

re!(re_iso, r"^(\d{4})-(\d{2})-(\d{2})$");
re!(re_dmy_dash, r"^(\d{1,2})-(\d{1,2})-(\d{4})$");
re!(re_dmy_slash, r"^(\d{1,2})/(\d{1,2})/(\d{4})$");

/// Drop everything except digits, hyphens and slashes.
pub fn strip_date_noise(raw: &str) -> String {
    retain_chars(raw, |c| c.is_ascii_digit() || c == '-' || c == '/')
}

/// Whether `raw` looks like a date in one of the supported layouts.
pub fn is_date_token(raw: &str) -> bool {
    split_ymd(&strip_date_noise(raw)).is_some()
}

/// Normalize a date token to ISO.
///
/// A token that matches a layout but not a real calendar day, or matches no
/// layout at all, comes back as `RecordDate::Unparsed` so the caller can
/// decide whether to keep it. Only a token with no date characters left is
/// an error.
pub fn normalize_date(raw: &str) -> Result<RecordDate, NormalizeError> {
    let stripped = strip_date_noise(raw);
    if stripped.is_empty() {
        return Err(NormalizeError::UnparseableDate(raw.trim().to_string()));
    }

    let Some((year, month, day)) = split_ymd(&stripped) else {
        return Ok(RecordDate::Unparsed(stripped));
    };

    let parsed = year
        .parse::<i32>()
        .ok()
        .zip(month.parse::<u32>().ok())
        .zip(day.parse::<u32>().ok())
        .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d));

    Ok(match parsed {
        Some(date) => RecordDate::Iso(date),
        None => RecordDate::Unparsed(format!("{year}-{month:0>2}-{day:0>2}")),
    })
}

/// Year, month and day components in the order they must be emitted.
fn split_ymd(s: &str) -> Option<(&str, &str, &str)> {
    if let Some(c) = re_iso().captures(s) {
        return Some((c.get(1)?.as_str(), c.get(2)?.as_str(), c.get(3)?.as_str()));
    }
    for re in [re_dmy_dash(), re_dmy_slash()] {
        if let Some(c) = re.captures(s) {
            return Some((c.get(3)?.as_str(), c.get(2)?.as_str(), c.get(1)?.as_str()));
        }
    }
    None
}
