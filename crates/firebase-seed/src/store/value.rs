//! JSON to Firestore typed-value encoding.

use serde_json::{Map, Value, json};

use crate::record::Record;

/// Largest integer a JSON number can carry without losing precision in
/// the clients that usually write these documents.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Whole, in range, and not negative zero (which stays a double).
fn is_safe_integer(f: f64) -> bool {
    f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER && !(f == 0.0 && f.is_sign_negative())
}

/// Encodes a record as the `fields` map of a Firestore document.
pub fn encode_fields(record: &Record) -> Map<String, Value> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

/// Encodes one JSON value as a Firestore `Value`.
///
/// Whole numbers become `integerValue` even when written as `10.0`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return json!({ "integerValue": i.to_string() });
            }
            match n.as_f64() {
                Some(f) if is_safe_integer(f) => {
                    json!({ "integerValue": (f as i64).to_string() })
                }
                Some(f) => json!({ "doubleValue": f }),
                None => json!({ "stringValue": n.to_string() }),
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(encode_value(&json!(null)), json!({"nullValue": null}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&json!("Widget")), json!({"stringValue": "Widget"}));
        assert_eq!(encode_value(&json!(10)), json!({"integerValue": "10"}));
        assert_eq!(encode_value(&json!(-3)), json!({"integerValue": "-3"}));
        assert_eq!(encode_value(&json!(9.99)), json!({"doubleValue": 9.99}));
    }

    #[test]
    fn test_whole_float_is_integer() {
        assert_eq!(encode_value(&json!(10.0)), json!({"integerValue": "10"}));
        assert_eq!(encode_value(&json!(1e20)), json!({"doubleValue": 1e20}));
    }

    #[test]
    fn test_negative_zero_is_double() {
        let v = encode_value(&json!(-0.0));
        let d = v["doubleValue"].as_f64().unwrap();

        assert_eq!(d, 0.0);
        assert!(d.is_sign_negative());
        assert!(v.get("integerValue").is_none());
        assert_eq!(encode_value(&json!(0.0)), json!({"integerValue": "0"}));
    }

    #[test]
    fn test_large_unsigned_is_double() {
        let v = encode_value(&json!(u64::MAX));
        assert!(v.get("doubleValue").is_some());
    }

    #[test]
    fn test_nested() {
        let record = match json!({
            "name": "Contact",
            "phones": ["+47 1", "+47 2"],
            "address": {"city": "Oslo", "zip": 150}
        }) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };

        let fields = encode_fields(&record);

        assert_eq!(fields["name"], json!({"stringValue": "Contact"}));
        assert_eq!(
            fields["phones"],
            json!({"arrayValue": {"values": [
                {"stringValue": "+47 1"},
                {"stringValue": "+47 2"}
            ]}})
        );
        assert_eq!(
            fields["address"],
            json!({"mapValue": {"fields": {
                "city": {"stringValue": "Oslo"},
                "zip": {"integerValue": "150"}
            }}})
        );
    }
}
