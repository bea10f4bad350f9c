//! Helpers for extracting typed parameters from a `serde_json::Value` object.
//!
//! The scalar helpers take a JSON value, a key name, and a default; a missing
//! or mistyped key yields the default. [`param_choice`] is the exception: an
//! enumerated option with an unrecognized value is a configuration error.

use crate::error::EngineError;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or
/// not a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Resolves an enumerated string option against `(name, value)` pairs.
///
/// A missing key selects `default`. A present value that matches none of
/// `choices` is rejected with `EngineError::InvalidParam` listing the
/// accepted names.
pub fn param_choice<T: Copy>(
    params: &Value,
    name: &str,
    choices: &[(&str, T)],
    default: T,
) -> Result<T, EngineError> {
    let Some(raw) = params.get(name) else {
        return Ok(default);
    };
    let accepted = || {
        choices
            .iter()
            .map(|(n, _)| *n)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let text = raw.as_str().ok_or_else(|| EngineError::InvalidParam {
        name: name.to_owned(),
        reason: format!("expected a string, one of: {}", accepted()),
    })?;
    choices
        .iter()
        .find(|(n, _)| *n == text)
        .map(|&(_, v)| v)
        .ok_or_else(|| EngineError::InvalidParam {
            name: name.to_owned(),
            reason: format!("unknown value '{text}', expected one of: {}", accepted()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_f64_extracts_float_and_integer() {
        let params = json!({"scale": 2.5, "count": 10});
        assert!((param_f64(&params, "scale", 1.0) - 2.5).abs() < f64::EPSILON);
        assert!((param_f64(&params, "count", 0.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_missing_or_wrong_type() {
        let params = json!({"scale": "wide"});
        assert!((param_f64(&params, "scale", 5.0) - 5.0).abs() < f64::EPSILON);
        assert!((param_f64(&params, "center_x", -1.0) + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_for_non_object() {
        let params = json!("not an object");
        assert!((param_f64(&params, "scale", 7.0) - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_usize_extracts_existing_integer() {
        assert_eq!(param_usize(&json!({"emitters": 4}), "emitters", 3), 4);
    }

    #[test]
    fn param_usize_rejects_float_and_negative() {
        assert_eq!(param_usize(&json!({"emitters": 2.5}), "emitters", 3), 3);
        assert_eq!(param_usize(&json!({"emitters": -1}), "emitters", 3), 3);
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        A,
        B,
    }

    const MODES: &[(&str, Mode)] = &[("a", Mode::A), ("b", Mode::B)];

    #[test]
    fn param_choice_missing_key_uses_default() {
        assert_eq!(param_choice(&json!({}), "mode", MODES, Mode::B).unwrap(), Mode::B);
    }

    #[test]
    fn param_choice_matches_named_value() {
        let got = param_choice(&json!({"mode": "a"}), "mode", MODES, Mode::B).unwrap();
        assert_eq!(got, Mode::A);
    }

    #[test]
    fn param_choice_rejects_unknown_value_with_accepted_list() {
        let err = param_choice(&json!({"mode": "c"}), "mode", MODES, Mode::A).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("mode") && msg.contains("a, b"), "got: {msg}");
    }

    #[test]
    fn param_choice_rejects_non_string() {
        let err = param_choice(&json!({"mode": 3}), "mode", MODES, Mode::A).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParam { .. }));
    }
}
