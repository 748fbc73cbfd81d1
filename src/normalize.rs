//! Lenient input coercion.
//!
//! Collections may arrive as a single record or a list, teacher attributes as
//! delimited strings, and dates in a few ISO 8601 shapes. Nothing here fails:
//! absent input becomes empty and unreadable dates are skipped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// A single record or a list of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

/// Absent input normalizes to an empty list; order is preserved.
pub fn normalize_list<T>(value: Option<OneOrMany<T>>) -> Vec<T> {
    value.map(OneOrMany::into_vec).unwrap_or_default()
}

/// Reads an explicit `null` as the field's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list of tokens sent either as `"a, b; c"` or as `["a", "b", "c"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delimited {
    List(Vec<String>),
    Text(String),
}

impl Delimited {
    /// Non-empty tokens split on commas, semicolons and whitespace.
    pub fn tokens(&self) -> Vec<&str> {
        let pieces: Vec<&str> = match self {
            Delimited::Text(text) => vec![text.as_str()],
            Delimited::List(items) => items.iter().map(String::as_str).collect(),
        };
        pieces
            .into_iter()
            .flat_map(|piece| piece.split(|c: char| c == ',' || c == ';' || c.is_whitespace()))
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl From<&str> for Delimited {
    fn from(text: &str) -> Self {
        Delimited::Text(text.to_string())
    }
}

/// Reduces a date or date-time string to its calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 (converted to UTC first) and naive
/// `YYYY-MM-DDTHH:MM[:SS]` forms.
pub fn canonical_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|moment| moment.date())
}

/// Canonical set of dates; duplicates collapse and unreadable entries drop out.
pub fn canonical_dates<'a, I>(raw: I) -> HashSet<NaiveDate>
where
    I: IntoIterator<Item = &'a str>,
{
    raw.into_iter().filter_map(canonical_date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn single_record_becomes_list() {
        let one: OneOrMany<String> = serde_json::from_value(json!("2025-01-08")).unwrap();
        assert_eq!(normalize_list(Some(one)), vec!["2025-01-08".to_string()]);

        let many: OneOrMany<String> = serde_json::from_value(json!(["b", "a"])).unwrap();
        assert_eq!(normalize_list(Some(many)), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn absent_list_is_empty() {
        assert!(normalize_list::<String>(None).is_empty());
    }

    #[test]
    fn delimited_text_splits_on_mixed_separators() {
        let subjects = Delimited::from("S1, S2;S3  S4,,");
        assert_eq!(subjects.tokens(), vec!["S1", "S2", "S3", "S4"]);
    }

    #[test]
    fn delimited_list_is_trimmed() {
        let subjects: Delimited = serde_json::from_value(json!(["S1", " S2 ", ""])).unwrap();
        assert_eq!(subjects.tokens(), vec!["S1", "S2"]);
    }

    #[test]
    fn dates_in_several_shapes() {
        assert_eq!(canonical_date("2025-01-08"), Some(date(2025, 1, 8)));
        assert_eq!(canonical_date(" 2025-01-08 "), Some(date(2025, 1, 8)));
        assert_eq!(canonical_date("2025-01-08T10:30:00Z"), Some(date(2025, 1, 8)));
        assert_eq!(canonical_date("2025-01-08T23:30:00-05:00"), Some(date(2025, 1, 9)));
        assert_eq!(canonical_date("2025-01-08T10:30:00"), Some(date(2025, 1, 8)));
        assert_eq!(canonical_date("not a date"), None);
    }

    #[test]
    fn date_set_collapses_duplicates() {
        let dates = canonical_dates(["2025-01-08", "2025-01-08T00:00:00Z", "garbage"]);
        assert_eq!(dates.len(), 1);
        assert!(dates.contains(&date(2025, 1, 8)));
    }
}
