//! Tolerant field decoders for controller records.
//!
//! The controller is loose about field types: the same field may arrive as a
//! string on one device personality and as a number on another, and any field
//! may be `null`. These decoders absorb that per field, so one odd value never
//! fails the record or the collection around it.

use serde::{Deserialize, Deserializer, de::IgnoredAny};

/// Any JSON scalar (or structure) the controller might put in a field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Unsigned(u64),
    Integer(i64),
    Float(f64),
    Text(String),
    Flag(bool),
    Other(IgnoredAny),
}

impl Raw {
    fn into_text(self) -> String {
        match self {
            Raw::Unsigned(v) => v.to_string(),
            Raw::Integer(v) => v.to_string(),
            Raw::Float(v) => v.to_string(),
            Raw::Text(s) => s,
            Raw::Flag(b) => b.to_string(),
            Raw::Other(_) => String::new(),
        }
    }

    fn into_i64(self) -> Option<i64> {
        match self {
            Raw::Unsigned(v) => i64::try_from(v).ok(),
            Raw::Integer(v) => Some(v),
            Raw::Float(v) if v.is_finite() => Some(v as i64),
            Raw::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(|v| v as i64)
                })
            }
            _ => None,
        }
    }

    fn into_u64(self) -> Option<u64> {
        match self {
            Raw::Unsigned(v) => Some(v),
            Raw::Text(s) => {
                let s = s.trim();
                s.parse::<u64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && *v >= 0.0)
                        .map(|v| v as u64)
                })
            }
            Raw::Float(v) if v.is_finite() && v >= 0.0 => Some(v as u64),
            _ => None,
        }
    }
}

/// A text field: numbers and booleans are rendered, `null` becomes `""`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.map(Raw::into_text).unwrap_or_default())
}

/// A cumulative counter: numbers or numeric strings, anything else is 0.
pub(crate) fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.and_then(Raw::into_u64).unwrap_or(0))
}

/// A signed integer, string or numeric on the wire; unparsable values are 0.
pub(crate) fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.and_then(Raw::into_i64).unwrap_or(0))
}

/// An optional timestamp in milliseconds; unparsable values are absent.
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.and_then(Raw::into_i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "text")]
        text: String,
        #[serde(default, deserialize_with = "counter")]
        counter: u64,
        #[serde(default, deserialize_with = "integer")]
        integer: i64,
        #[serde(default, deserialize_with = "timestamp")]
        timestamp: Option<i64>,
    }

    fn decode(field: &str, value: Value) -> Fields {
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), value);
        serde_json::from_value(Value::Object(body)).unwrap()
    }

    #[test]
    fn test_text_accepts_any_scalar() {
        assert_eq!(decode("text", json!("edge-a")).text, "edge-a");
        assert_eq!(decode("text", json!(2048)).text, "2048");
        assert_eq!(decode("text", json!(-3)).text, "-3");
        assert_eq!(decode("text", json!(1.5)).text, "1.5");
        assert_eq!(decode("text", json!(true)).text, "true");
        assert_eq!(decode("text", Value::Null).text, "");
        assert_eq!(decode("text", json!(["a"])).text, "");
    }

    #[test]
    fn test_counter_forms() {
        assert_eq!(decode("counter", json!(123456)).counter, 123456);
        assert_eq!(decode("counter", json!("123456")).counter, 123456);
        assert_eq!(decode("counter", json!(" 42.0 ")).counter, 42);
        assert_eq!(decode("counter", json!(7.9)).counter, 7);
        assert_eq!(decode("counter", Value::Null).counter, 0);
        assert_eq!(decode("counter", json!(-5)).counter, 0);
        assert_eq!(decode("counter", json!("n/a")).counter, 0);
        assert_eq!(decode("counter", json!({"x": 1})).counter, 0);
    }

    #[test]
    fn test_integer_and_timestamp() {
        assert_eq!(decode("integer", json!("14")).integer, 14);
        assert_eq!(decode("integer", json!(-1)).integer, -1);
        assert_eq!(decode("integer", json!("junk")).integer, 0);

        assert_eq!(
            decode("timestamp", json!(1_700_000_000_000_i64)).timestamp,
            Some(1_700_000_000_000)
        );
        assert_eq!(decode("timestamp", json!("1700000000000")).timestamp, Some(1_700_000_000_000));
        assert_eq!(decode("timestamp", Value::Null).timestamp, None);
        assert_eq!(decode("timestamp", json!("yesterday")).timestamp, None);
    }
}
