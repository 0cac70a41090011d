//! Merge-patch helpers.
//!
//! Update payloads use `Option` fields: `None` (absent, `null` or blank text)
//! leaves the stored value untouched.

use core::fmt::Display;
use core::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Deserialize an optional text field, treating blank strings as absent and
/// parsing the rest with `FromStr`.
///
/// Use with `#[serde(default, deserialize_with = "blank_as_none")]`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Overwrite `slot` when a value was supplied. Returns whether it changed.
pub fn merge<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) if *slot != v => {
            *slot = v;
            true
        }
        _ => false,
    }
}

/// [`merge`] for optional stored values.
pub fn merge_opt<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) if slot.as_ref() != Some(&v) => {
            *slot = Some(v);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "blank_as_none")]
        name: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none")]
        born: Option<NaiveDate>,
    }

    #[test]
    fn blank_and_missing_are_none() {
        let p: Sample = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert!(p.name.is_none());
        assert!(p.born.is_none());

        let p: Sample = serde_json::from_str(r#"{"name": null, "born": ""}"#).unwrap();
        assert!(p.name.is_none());
        assert!(p.born.is_none());
    }

    #[test]
    fn present_values_are_parsed() {
        let p: Sample = serde_json::from_str(r#"{"name": "Siti", "born": "1999-02-03"}"#).unwrap();
        assert_eq!(p.name.as_deref(), Some("Siti"));
        assert_eq!(p.born, NaiveDate::from_ymd_opt(1999, 2, 3));
    }

    #[test]
    fn unparsable_values_are_errors() {
        assert!(serde_json::from_str::<Sample>(r#"{"born": "03/02/1999"}"#).is_err());
    }

    #[test]
    fn merge_only_touches_supplied_values() {
        let mut kept = String::from("a");
        assert!(!merge(&mut kept, None));
        assert_eq!(kept, "a");
        assert!(merge(&mut kept, Some("b".to_string())));
        assert_eq!(kept, "b");

        let mut opt: Option<u8> = None;
        assert!(merge_opt(&mut opt, Some(3)));
        assert!(!merge_opt(&mut opt, Some(3)));
        assert_eq!(opt, Some(3));
    }
}
