use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, SeqAccess, Visitor},
    ser::{SerializeMap, SerializeSeq},
};
use serde_json::Value;

/// String-keyed bag of dynamic values, used for parameters, properties,
/// entities and context updates.
pub type ValueMap = BTreeMap<String, DynamicValue>;

/// Wire form of [`DynamicValue::Unsupported`].
pub const UNSUPPORTED_SENTINEL: &str = "Unsupported type";

/// A JSON-originated value whose type is only known once the plan is parsed.
///
/// JSON has no date type, so decoding never produces `Timestamp`: date-like
/// strings stay `String` and are read as instants through
/// [`DynamicValue::as_timestamp`]. `Timestamp` values come from handlers and
/// encode as RFC 3339 strings. Floats must be finite; [`From<f64>`] maps
/// NaN and infinities to `Unsupported`.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Timestamp(DateTime<Utc>),
    Map(ValueMap),
    List(Vec<DynamicValue>),
    Unsupported,
}

impl DynamicValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Integer(_) => "integer",
            DynamicValue::Float(_) => "float",
            DynamicValue::Bool(_) => "boolean",
            DynamicValue::String(_) => "string",
            DynamicValue::Timestamp(_) => "timestamp",
            DynamicValue::Map(_) => "map",
            DynamicValue::List(_) => "list",
            DynamicValue::Unsupported => "unsupported",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Float(f) => Some(*f),
            DynamicValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Timestamps, and strings [`parse_timestamp`] accepts.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            DynamicValue::Timestamp(t) => Some(*t),
            DynamicValue::String(s) => parse_timestamp(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Human-readable rendition used by text synthesis and plain renderers.
    pub fn to_display_string(&self) -> String {
        match self {
            DynamicValue::String(s) => s.clone(),
            DynamicValue::Timestamp(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
            other => Value::from(other.clone()).to_string(),
        }
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DynamicValue::Integer(i) => serializer.serialize_i64(*i),
            DynamicValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            DynamicValue::Float(_) => serializer.serialize_str(UNSUPPORTED_SENTINEL),
            DynamicValue::Bool(b) => serializer.serialize_bool(*b),
            DynamicValue::String(s) => serializer.serialize_str(s),
            DynamicValue::Timestamp(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DynamicValue::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            DynamicValue::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for v in l {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            DynamicValue::Unsupported => serializer.serialize_str(UNSUPPORTED_SENTINEL),
        }
    }
}

struct DynamicValueVisitor;

impl<'de> Visitor<'de> for DynamicValueVisitor {
    type Value = DynamicValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<DynamicValue, E> {
        Ok(i64::try_from(v)
            .map(DynamicValue::Integer)
            .unwrap_or(DynamicValue::Float(v as f64)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<DynamicValue, E> {
        Ok(DynamicValue::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<DynamicValue, E> {
        Ok(DynamicValue::String(v))
    }

    fn visit_unit<E>(self) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Unsupported)
    }

    fn visit_none<E>(self) -> Result<DynamicValue, E> {
        Ok(DynamicValue::Unsupported)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<DynamicValue, D::Error> {
        DynamicValue::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<DynamicValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DynamicValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<DynamicValue, A::Error> {
        let mut map = ValueMap::new();
        while let Some((k, v)) = access.next_entry::<String, DynamicValue>()? {
            map.insert(k, v);
        }
        Ok(DynamicValue::Map(map))
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DynamicValueVisitor)
    }
}

/// Reads an instant from model-written text.
///
/// Tries RFC 3339 first, then offset-less date-times and bare dates, which
/// are taken to be UTC (a bare date means midnight).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

impl From<Value> for DynamicValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DynamicValue::Unsupported,
            Value::Bool(b) => DynamicValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DynamicValue::Integer(i),
                None => n.as_f64().map_or(DynamicValue::Unsupported, DynamicValue::Float),
            },
            Value::String(s) => DynamicValue::String(s),
            Value::Array(items) => DynamicValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(obj) => {
                DynamicValue::Map(obj.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<DynamicValue> for Value {
    fn from(value: DynamicValue) -> Self {
        match value {
            DynamicValue::Integer(i) => Value::from(i),
            DynamicValue::Float(f) if f.is_finite() => Value::from(f),
            DynamicValue::Float(_) => Value::String(UNSUPPORTED_SENTINEL.to_string()),
            DynamicValue::Bool(b) => Value::Bool(b),
            DynamicValue::String(s) => Value::String(s),
            DynamicValue::Timestamp(t) => {
                Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            DynamicValue::Map(m) => {
                Value::Object(m.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            DynamicValue::List(l) => Value::Array(l.into_iter().map(Into::into).collect()),
            DynamicValue::Unsupported => Value::String(UNSUPPORTED_SENTINEL.to_string()),
        }
    }
}

impl From<i64> for DynamicValue {
    fn from(v: i64) -> Self {
        DynamicValue::Integer(v)
    }
}

impl From<i32> for DynamicValue {
    fn from(v: i32) -> Self {
        DynamicValue::Integer(v.into())
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            DynamicValue::Float(v)
        } else {
            DynamicValue::Unsupported
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::String(v.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::String(v)
    }
}

impl From<DateTime<Utc>> for DynamicValue {
    fn from(v: DateTime<Utc>) -> Self {
        DynamicValue::Timestamp(v)
    }
}

impl From<ValueMap> for DynamicValue {
    fn from(v: ValueMap) -> Self {
        DynamicValue::Map(v)
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(v: Vec<DynamicValue>) -> Self {
        DynamicValue::List(v)
    }
}

/// Builds a [`ValueMap`] from `key => value` pairs.
#[macro_export]
macro_rules! value_map {
    () => { $crate::models::ValueMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::models::ValueMap::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::models::DynamicValue::from($value),
            );
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn round_trip(value: &DynamicValue) -> DynamicValue {
        let encoded = serde_json::to_string(value).unwrap();
        serde_json::from_str(&encoded).unwrap()
    }

    #[test]
    fn scalar_tags_survive_round_trip() {
        for value in [
            DynamicValue::Integer(-42),
            DynamicValue::Float(2.0),
            DynamicValue::Float(3.25),
            DynamicValue::Bool(true),
            DynamicValue::String("On Time".into()),
        ] {
            let decoded = round_trip(&value);
            assert_eq!(decoded.type_name(), value.type_name());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn date_shaped_strings_keep_the_string_tag() {
        let value = DynamicValue::String("2024-10-14T09:30:00Z".into());
        let decoded = round_trip(&value);
        assert_eq!(decoded.type_name(), "string");
        assert_eq!(decoded, value);
    }

    #[test]
    fn timestamps_encode_as_rfc3339_and_read_back_as_instants() {
        let at = Utc.with_ymd_and_hms(2024, 10, 14, 9, 30, 0).unwrap();
        let value = DynamicValue::Map(value_map! {
            "at" => at,
            "legs" => vec![DynamicValue::from(1), DynamicValue::from("two")],
        });
        let decoded = round_trip(&value);
        assert_eq!(decoded.get("at"), Some(&DynamicValue::from("2024-10-14T09:30:00Z")));
        assert_eq!(decoded.get("at").and_then(DynamicValue::as_timestamp), Some(at));
        assert_eq!(decoded.get("legs"), value.get("legs"));
    }

    #[test]
    fn null_decodes_to_unsupported_sentinel() {
        let decoded: ValueMap = serde_json::from_value(json!({"a": null, "b": 1})).unwrap();
        assert_eq!(decoded["a"], DynamicValue::Unsupported);
        assert_eq!(
            serde_json::to_value(&decoded["a"]).unwrap(),
            json!(UNSUPPORTED_SENTINEL)
        );
        assert_eq!(decoded["b"], DynamicValue::Integer(1));
    }

    #[test]
    fn strings_decode_as_strings_and_parse_as_timestamps_on_demand() {
        let decoded: DynamicValue = serde_json::from_value(json!("tomorrow at 9")).unwrap();
        assert_eq!(decoded, DynamicValue::String("tomorrow at 9".into()));
        assert_eq!(decoded.as_timestamp(), None);

        let decoded: DynamicValue = serde_json::from_value(json!("2024-10-14T09:30:00Z")).unwrap();
        assert_eq!(decoded, DynamicValue::String("2024-10-14T09:30:00Z".into()));
        assert_eq!(
            decoded.as_timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 10, 14, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn offset_less_forms_are_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 10, 14, 15, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-10-14T15:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-10-14 15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-10-14T17:00:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-10-14"),
            Some(Utc.with_ymd_and_hms(2024, 10, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("14/10/2024"), None);
    }

    #[test]
    fn non_finite_floats_become_unsupported() {
        assert_eq!(DynamicValue::from(f64::INFINITY), DynamicValue::Unsupported);
        assert_eq!(DynamicValue::from(f64::NAN), DynamicValue::Unsupported);
        assert_eq!(
            serde_json::to_value(DynamicValue::Float(f64::NEG_INFINITY)).unwrap(),
            json!(UNSUPPORTED_SENTINEL)
        );
        assert_eq!(
            Value::from(DynamicValue::Float(f64::NAN)),
            json!(UNSUPPORTED_SENTINEL)
        );
    }

    #[test]
    fn json_value_conversion_matches_serde_path() {
        let raw = json!({"n": 5, "f": 1.5, "s": "x", "l": [true], "o": {"k": "v"}});
        let via_from = DynamicValue::from(raw.clone());
        let via_serde: DynamicValue = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(via_from, via_serde);
        assert_eq!(Value::from(via_from), raw);
    }

    #[test]
    fn integer_widens_to_float_on_access() {
        assert_eq!(DynamicValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(DynamicValue::String("3".into()).as_f64(), None);
    }
}
