//! Per-field validation: coercion, clamping and enum restriction.
//!
//! Every rule is permissive. A malformed value is replaced by a documented
//! fallback or clamped into range, never reported as an error. Rules are
//! independent per field, except [`Rule::NumberAbove`] which reads the
//! already-resolved value of its lower-bound field.

use serde_json::{Map, Number, Value};

use crate::action;
use crate::person;
use crate::types::SlotType;

/// How a single field is sanitized.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// String; numbers are stringified, anything else takes the default.
    Text,
    /// Number clamped to `[min, max]`; unparsable input becomes `fallback`.
    Number { min: f64, max: f64, fallback: f64 },
    /// Like `Number`, rounded to a whole number before clamping.
    Integer { min: f64, max: f64, fallback: f64 },
    /// Number whose lower bound is the resolved value of `floor_key`.
    NumberAbove {
        floor_key: &'static str,
        max: f64,
        fallback: f64,
    },
    /// Number that may be `null` ("inherit"). Empty input stays `null`.
    NullableNumber { min: f64, max: f64 },
    /// One of a fixed set of strings.
    Choice {
        allowed: &'static [&'static str],
        fallback: &'static str,
    },
    /// `true` unless the value is exactly `false`.
    TrueUnlessFalse,
    /// `false` unless the value is truthy.
    FalseUnlessTrue,
    /// A slot type; `custom` is rewritten to `notifications`.
    SlotType,
    /// A tagged action; cleaned for its kind.
    Action,
    /// The person entry array.
    Persons,
    /// An embedded object; anything else is dropped.
    Object,
    /// Kept as given.
    Passthrough,
}

impl Rule {
    /// Apply the rule. `default` is the default-table value (or `Null` when the
    /// field has none); `resolved` holds fields validated earlier in the pass.
    ///
    /// Returns `None` when the field should be removed.
    pub fn apply(&self, value: &Value, default: &Value, resolved: &Map<String, Value>) -> Option<Value> {
        let out = match self {
            Rule::Text => match value {
                Value::String(_) => value.clone(),
                Value::Number(n) => Value::String(n.to_string()),
                _ => default.clone(),
            },
            Rule::Number { min, max, fallback } => {
                number_value(parse_number(value).unwrap_or(*fallback).clamp(*min, *max))
            }
            Rule::Integer { min, max, fallback } => {
                number_value(parse_number(value).unwrap_or(*fallback).round().clamp(*min, *max))
            }
            Rule::NumberAbove {
                floor_key,
                max,
                fallback,
            } => {
                let floor = resolved
                    .get(*floor_key)
                    .and_then(parse_number)
                    .unwrap_or(f64::NEG_INFINITY)
                    .min(*max);
                number_value(parse_number(value).unwrap_or(*fallback).clamp(floor, *max))
            }
            Rule::NullableNumber { min, max } => match value {
                Value::Null => Value::Null,
                Value::String(s) if s.trim().is_empty() => Value::Null,
                other => match parse_number(other) {
                    Some(n) => number_value(n.clamp(*min, *max)),
                    None => Value::Null,
                },
            },
            Rule::Choice { allowed, fallback } => match value.as_str() {
                Some(s) if allowed.contains(&s) => value.clone(),
                _ => Value::String((*fallback).to_string()),
            },
            Rule::TrueUnlessFalse => Value::Bool(*value != Value::Bool(false)),
            Rule::FalseUnlessTrue => Value::Bool(truthy(value)),
            Rule::SlotType => {
                let slot_type = value
                    .as_str()
                    .and_then(SlotType::parse)
                    .unwrap_or(SlotType::None);
                Value::String(slot_type.as_str().to_string())
            }
            Rule::Action => {
                let source = if value.is_null() { default } else { value };
                action::cleanup_action(source)
            }
            Rule::Persons => Value::Array(person::normalize_entries(value)),
            Rule::Object => match value {
                Value::Object(_) => value.clone(),
                _ => return None,
            },
            Rule::Passthrough => value.clone(),
        };
        Some(out)
    }
}

/// Parse a value as a finite number. Numeric strings are accepted.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Store a number in canonical form: integral values as integers.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Loose truthiness as hand-edited documents expect it: `false`, `0`,
/// the empty string and `null` are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(rule: &Rule, value: Value) -> Option<Value> {
        rule.apply(&value, &Value::Null, &Map::new())
    }

    #[test]
    fn integers_are_rounded_then_clamped() {
        let rule = Rule::Integer {
            min: 0.0,
            max: 2.0,
            fallback: 0.0,
        };
        assert_eq!(apply(&rule, json!(1.7)), Some(json!(2)));
        assert_eq!(apply(&rule, json!("1.2")), Some(json!(1)));
        assert_eq!(apply(&rule, json!(9)), Some(json!(2)));
        assert_eq!(apply(&rule, json!("x")), Some(json!(0)));
    }

    const HEIGHT: Rule = Rule::Number {
        min: 10.0,
        max: 100.0,
        fallback: 35.0,
    };

    #[test]
    fn number_clamps_low_and_high() {
        assert_eq!(apply(&HEIGHT, json!(5)), Some(json!(10)));
        assert_eq!(apply(&HEIGHT, json!(500)), Some(json!(100)));
        assert_eq!(apply(&HEIGHT, json!(50)), Some(json!(50)));
    }

    #[test]
    fn number_parses_strings() {
        assert_eq!(apply(&HEIGHT, json!(" 42 ")), Some(json!(42)));
        assert_eq!(apply(&HEIGHT, json!("12.5")), Some(json!(12.5)));
    }

    #[test]
    fn number_falls_back_when_unparsable() {
        assert_eq!(apply(&HEIGHT, json!("tall")), Some(json!(35)));
        assert_eq!(apply(&HEIGHT, json!(null)), Some(json!(35)));
        assert_eq!(apply(&HEIGHT, json!(true)), Some(json!(35)));
        assert_eq!(apply(&HEIGHT, json!("inf")), Some(json!(35)));
    }

    #[test]
    fn number_above_uses_resolved_floor() {
        let rule = Rule::NumberAbove {
            floor_key: "min_height",
            max: 4000.0,
            fallback: 600.0,
        };
        let mut resolved = Map::new();
        resolved.insert("min_height".into(), json!(300));
        assert_eq!(rule.apply(&json!(200), &Value::Null, &resolved), Some(json!(300)));
        assert_eq!(rule.apply(&json!(9000), &Value::Null, &resolved), Some(json!(4000)));
        assert_eq!(rule.apply(&json!(450), &Value::Null, &resolved), Some(json!(450)));
    }

    #[test]
    fn nullable_keeps_null_distinct_from_zero() {
        let rule = Rule::NullableNumber {
            min: -500.0,
            max: 500.0,
        };
        assert_eq!(apply(&rule, json!("")), Some(Value::Null));
        assert_eq!(apply(&rule, json!(null)), Some(Value::Null));
        assert_eq!(apply(&rule, json!(0)), Some(json!(0)));
        assert_eq!(apply(&rule, json!("-900")), Some(json!(-500)));
        assert_eq!(apply(&rule, json!("left")), Some(Value::Null));
    }

    #[test]
    fn choice_replaces_unknown_with_fallback() {
        let rule = Rule::Choice {
            allowed: &["light", "normal", "bold"],
            fallback: "normal",
        };
        assert_eq!(apply(&rule, json!("bold")), Some(json!("bold")));
        assert_eq!(apply(&rule, json!("heavy")), Some(json!("normal")));
        assert_eq!(apply(&rule, json!(700)), Some(json!("normal")));
    }

    #[test]
    fn boolean_policies_differ_on_missing_values() {
        assert_eq!(apply(&Rule::TrueUnlessFalse, json!(null)), Some(json!(true)));
        assert_eq!(apply(&Rule::TrueUnlessFalse, json!(false)), Some(json!(false)));
        assert_eq!(apply(&Rule::TrueUnlessFalse, json!(0)), Some(json!(true)));
        assert_eq!(apply(&Rule::FalseUnlessTrue, json!(null)), Some(json!(false)));
        assert_eq!(apply(&Rule::FalseUnlessTrue, json!(1)), Some(json!(true)));
        assert_eq!(apply(&Rule::FalseUnlessTrue, json!("")), Some(json!(false)));
        assert_eq!(apply(&Rule::FalseUnlessTrue, json!("yes")), Some(json!(true)));
    }

    #[test]
    fn text_stringifies_numbers_and_defaults_the_rest() {
        let default = json!("fallback");
        let none = Map::new();
        assert_eq!(Rule::Text.apply(&json!("x"), &default, &none), Some(json!("x")));
        assert_eq!(Rule::Text.apply(&json!(2024), &default, &none), Some(json!("2024")));
        assert_eq!(Rule::Text.apply(&json!(null), &default, &none), Some(json!("fallback")));
    }

    #[test]
    fn slot_type_rewrites_alias_and_rejects_unknown() {
        assert_eq!(apply(&Rule::SlotType, json!("custom")), Some(json!("notifications")));
        assert_eq!(apply(&Rule::SlotType, json!("weather")), Some(json!("weather")));
        assert_eq!(apply(&Rule::SlotType, json!("clock")), Some(json!("none")));
    }

    #[test]
    fn object_rule_drops_non_objects() {
        assert_eq!(apply(&Rule::Object, json!({"type": "tile"})), Some(json!({"type": "tile"})));
        assert_eq!(apply(&Rule::Object, json!("tile")), None);
    }

    #[test]
    fn canonical_number_form() {
        assert_eq!(number_value(1.0), json!(1));
        assert_eq!(number_value(-3.0), json!(-3));
        assert_eq!(number_value(0.3), json!(0.3));
    }
}
