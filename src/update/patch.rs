use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::types::Role;

/// One field of a sparse update.
///
/// A key missing from the body is `Absent` (leave unchanged); an explicit
/// `null` is `Null` (clear the column). Use with `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Value(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Converts a patch value into a bound parameter.
pub trait Assignable {
    /// Parameter value and optional SQL cast. `None` drops the assignment.
    fn to_param(&self) -> Option<(Value, Option<&'static str>)>;

    /// Literal written for an explicit null; `None` writes SQL `NULL`
    fn null_value() -> Option<Value> {
        None
    }
}

impl Assignable for String {
    fn to_param(&self) -> Option<(Value, Option<&'static str>)> {
        Some((Value::String(self.clone()), None))
    }
}

impl Assignable for NaiveDate {
    fn to_param(&self) -> Option<(Value, Option<&'static str>)> {
        Some((Value::String(self.format("%Y-%m-%d").to_string()), Some("date")))
    }
}

impl Assignable for Role {
    fn to_param(&self) -> Option<(Value, Option<&'static str>)> {
        Some((Value::String(self.as_str().to_string()), None))
    }

    fn null_value() -> Option<Value> {
        Some(Value::String(Role::User.as_str().to_string()))
    }
}

/// Integer accepting a JSON number or a numeric string (form fields).
/// Anything else fails deserialization, so the whole body is rejected with 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int(pub i64);

impl<'de> Deserialize<'de> for Int {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_i64()
                .map(Int)
                .ok_or_else(|| de::Error::custom(format!("expected an integer, got {}", n))),
            Value::String(s) => s
                .trim()
                .parse()
                .map(Int)
                .map_err(|_| de::Error::custom(format!("expected an integer, got {:?}", s))),
            other => Err(de::Error::custom(format!("expected an integer, got {}", other))),
        }
    }
}

impl Assignable for Int {
    fn to_param(&self) -> Option<(Value, Option<&'static str>)> {
        Some((Value::from(self.0), None))
    }
}

/// Finite float accepting a JSON number or a numeric string. Like [`Int`],
/// an unparseable value rejects the whole body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float(pub f64);

impl<'de> Deserialize<'de> for Float {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .map(Float)
            .ok_or_else(|| de::Error::custom("expected a number"))
    }
}

impl Assignable for Float {
    fn to_param(&self) -> Option<(Value, Option<&'static str>)> {
        Some((Value::from(self.0), None))
    }
}

/// Boolean flag stored as 1/0. Accepts booleans, numbers and their string
/// forms. An explicit null is stored as 0 since flag columns are NOT NULL.
/// Any other string (`"maybe"`) rejects the whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl Flag {
    pub fn as_int(&self) -> i64 {
        if self.0 {
            1
        } else {
            0
        }
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(Flag(b)),
            Value::Number(n) => Ok(Flag(n.as_f64().map(|f| f != 0.0).unwrap_or(false))),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Flag(true)),
                "false" | "0" | "no" | "off" | "" => Ok(Flag(false)),
                other => Err(de::Error::custom(format!("expected a boolean flag, got {:?}", other))),
            },
            other => Err(de::Error::custom(format!("expected a boolean flag, got {}", other))),
        }
    }
}

impl Assignable for Flag {
    fn to_param(&self) -> Option<(Value, Option<&'static str>)> {
        Some((Value::from(self.as_int()), None))
    }

    fn null_value() -> Option<Value> {
        Some(Value::from(0))
    }
}

/// JSON-valued column (cast, crew, tags, subtitles, audio languages...).
///
/// Arrives either as a structure or as a serialized string. A string that
/// does not parse is kept as `Unparseable` and dropped from the update with
/// a warning; the rest of the body still applies. Scalars are strict, these
/// are not.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonField {
    Parsed(Value),
    Unparseable(String),
}

impl JsonField {
    pub fn parsed(&self) -> Option<&Value> {
        match self {
            JsonField::Parsed(v) => Some(v),
            JsonField::Unparseable(_) => None,
        }
    }
}

impl From<Value> for JsonField {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => match serde_json::from_str::<Value>(&s) {
                Ok(parsed) => JsonField::Parsed(parsed),
                Err(_) => JsonField::Unparseable(s),
            },
            other => JsonField::Parsed(other),
        }
    }
}

impl<'de> Deserialize<'de> for JsonField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(JsonField::from)
    }
}

impl Assignable for JsonField {
    fn to_param(&self) -> Option<(Value, Option<&'static str>)> {
        // Sent as text and cast so any JSON shape fits a JSONB column
        self.parsed()
            .map(|v| (Value::String(v.to_string()), Some("jsonb")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        title: Patch<String>,
        count: Patch<Int>,
        active: Patch<Flag>,
        cast: Patch<JsonField>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let sample: Sample = serde_json::from_value(json!({ "title": null, "count": 3 })).unwrap();
        assert_eq!(sample.title, Patch::Null);
        assert_eq!(sample.count, Patch::Value(Int(3)));
        assert!(sample.active.is_absent());
    }

    #[test]
    fn flags_accept_common_spellings() {
        for (input, expected) in [
            (json!(true), true),
            (json!("true"), true),
            (json!("1"), true),
            (json!(1), true),
            (json!(false), false),
            (json!("0"), false),
            (json!(0), false),
        ] {
            let sample: Sample = serde_json::from_value(json!({ "active": input })).unwrap();
            assert_eq!(sample.active, Patch::Value(Flag(expected)));
        }
        assert!(serde_json::from_value::<Sample>(json!({ "active": "perhaps" })).is_err());
    }

    #[test]
    fn numeric_strings_deserialize_as_ints() {
        let sample: Sample = serde_json::from_value(json!({ "count": " 12 " })).unwrap();
        assert_eq!(sample.count, Patch::Value(Int(12)));
        assert!(serde_json::from_value::<Sample>(json!({ "count": "twelve" })).is_err());
    }

    #[test]
    fn json_fields_parse_serialized_strings() {
        let sample: Sample = serde_json::from_value(json!({ "cast": "[\"Ana\",\"Raj\"]" })).unwrap();
        assert_eq!(sample.cast, Patch::Value(JsonField::Parsed(json!(["Ana", "Raj"]))));

        let sample: Sample = serde_json::from_value(json!({ "cast": ["Ana"] })).unwrap();
        assert_eq!(sample.cast, Patch::Value(JsonField::Parsed(json!(["Ana"]))));
    }

    #[test]
    fn unparseable_json_is_kept_but_not_assignable() {
        let sample: Sample = serde_json::from_value(json!({ "cast": "[Ana, " })).unwrap();
        let field = sample.cast.value().unwrap();
        assert_eq!(field, &JsonField::Unparseable("[Ana, ".to_string()));
        assert!(field.to_param().is_none());
    }

    #[test]
    fn bad_scalars_reject_the_body_but_bad_json_does_not() {
        let rejected = serde_json::from_value::<Sample>(json!({ "title": "Kept", "active": "maybe" }));
        assert!(rejected.is_err());

        let sample: Sample = serde_json::from_value(json!({ "title": "Kept", "cast": "maybe" })).unwrap();
        assert_eq!(sample.title, Patch::Value("Kept".to_string()));
        assert!(sample.cast.value().and_then(|c| c.to_param()).is_none());
    }

    #[test]
    fn json_params_are_cast_to_jsonb() {
        let (value, cast) = JsonField::Parsed(json!({ "dop": "Lee" })).to_param().unwrap();
        assert_eq!(value, json!("{\"dop\":\"Lee\"}"));
        assert_eq!(cast, Some("jsonb"));
    }
}
