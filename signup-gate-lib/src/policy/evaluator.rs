//! Evaluator bridging the pipeline's structured input and output to CEL.

use super::PolicyDocument;
use crate::Result;
use cel_interpreter::objects::{Key, Map};
use cel_interpreter::{Context, Value};
use chrono::Local;
use ohno::{IntoAppError, app_err};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Evaluate a policy document against a structured input.
///
/// The input is bound under the `input` variable; a `now` timestamp is also
/// available to policies. The document's output is addressed by the
/// dot-separated `query` path and deserialized into the caller's output
/// type.
///
/// # Errors
///
/// Returns an error when the input cannot be serialized, the program fails
/// to execute, the query path does not resolve, or the addressed output
/// does not deserialize into `O`. All of these are infrastructure errors,
/// distinct from any decision the policy expresses.
pub fn evaluate<I, O>(document: &PolicyDocument, query: &str, input: &I) -> Result<O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    let input = serde_json::to_value(input).into_app_err("could not serialize policy input")?;

    let mut context = Context::default();
    context.add_variable_from_value("input", json_to_value(&input));
    context.add_variable_from_value("now", Value::Timestamp(Local::now().fixed_offset()));

    let output = document
        .program()
        .execute(&context)
        .into_app_err_with(|| format!("could not evaluate policy for query '{query}'"))?;

    let addressed = lookup(&output, query)?;
    let json = value_to_json(addressed)?;

    serde_json::from_value(json)
        .into_app_err_with(|| format!("policy produced a malformed decision for query '{query}'"))
}

/// Walk a dot-separated query path through the evaluated policy output.
fn lookup<'a>(value: &'a Value, query: &str) -> Result<&'a Value> {
    let mut current = value;
    for segment in query.split('.') {
        let Value::Map(map) = current else {
            return Err(app_err!(
                "policy output is not addressable at '{segment}' for query '{query}'"
            ));
        };
        current = map
            .map
            .get(&Key::String(Arc::new(segment.to_string())))
            .ok_or_else(|| app_err!("policy output has no entry '{segment}' for query '{query}'"))?;
    }
    Ok(current)
}

/// Convert a JSON document into a CEL value for the evaluation context.
fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::String(Arc::new(s.clone())),
        serde_json::Value::Array(items) => {
            Value::List(Arc::new(items.iter().map(json_to_value).collect()))
        }
        serde_json::Value::Object(fields) => {
            let mut map: HashMap<Arc<String>, Value> = HashMap::with_capacity(fields.len());
            for (name, value) in fields {
                let _ = map.insert(Arc::new(name.clone()), json_to_value(value));
            }
            Value::Map(Map::from(map))
        }
    }
}

/// Convert an evaluated CEL value back into JSON so the caller can
/// deserialize it.
fn value_to_json(value: &Value) -> Result<serde_json::Value> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(i) => Ok(serde_json::Value::from(*i)),
        Value::UInt(u) => Ok(serde_json::Value::from(*u)),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| app_err!("policy output contains a non-finite number")),
        Value::String(s) => Ok(serde_json::Value::String(s.to_string())),
        Value::Timestamp(t) => Ok(serde_json::Value::String(t.to_rfc3339())),
        Value::List(items) => items
            .iter()
            .map(value_to_json)
            .collect::<Result<Vec<_>>>()
            .map(serde_json::Value::Array),
        Value::Map(map) => {
            let mut object = serde_json::Map::with_capacity(map.map.len());
            for (key, entry) in map.map.iter() {
                let Key::String(name) = key else {
                    return Err(app_err!("policy output contains a non-string map key: {key:?}"));
                };
                let _ = object.insert(name.to_string(), value_to_json(entry)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        other => Err(app_err!("policy output contains an unsupported value: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    const TEST_POLICY: &str = r#"
        {
            "presignup": {
                "result": input.emailVerification == null || input.emailVerification.valid
                    ? {"action": "allow", "response": {"autoConfirmUser": true}}
                    : {"action": "deny", "reason": "invalid"}
            }
        }
    "#;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct TestInput {
        trigger: String,
        email_verification: Option<TestVerification>,
    }

    #[derive(Debug, Serialize)]
    struct TestVerification {
        valid: bool,
        score: f32,
    }

    #[derive(Debug, Deserialize)]
    struct Decision {
        action: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        response: serde_json::Value,
    }

    fn test_input(verification: Option<TestVerification>) -> TestInput {
        TestInput {
            trigger: "PreSignUp_SignUp".to_string(),
            email_verification: verification,
        }
    }

    #[test]
    fn test_allow_when_verification_absent() {
        let document = PolicyDocument::from_source(TEST_POLICY).unwrap();

        let decision: Decision =
            evaluate(&document, "presignup.result", &test_input(None)).unwrap();

        assert_eq!(decision.action, "allow");
        assert_eq!(decision.reason, None);
        assert_eq!(decision.response["autoConfirmUser"], true);
    }

    #[test]
    fn test_allow_when_verification_valid() {
        let document = PolicyDocument::from_source(TEST_POLICY).unwrap();
        let input = test_input(Some(TestVerification { valid: true, score: 96.0 }));

        let decision: Decision = evaluate(&document, "presignup.result", &input).unwrap();

        assert_eq!(decision.action, "allow");
    }

    #[test]
    fn test_deny_when_verification_invalid() {
        let document = PolicyDocument::from_source(TEST_POLICY).unwrap();
        let input = test_input(Some(TestVerification { valid: false, score: 3.0 }));

        let decision: Decision = evaluate(&document, "presignup.result", &input).unwrap();

        assert_eq!(decision.action, "deny");
        assert_eq!(decision.reason.as_deref(), Some("invalid"));
    }

    #[test]
    fn test_unknown_query_entry_is_an_error() {
        let document = PolicyDocument::from_source(TEST_POLICY).unwrap();

        let err = evaluate::<_, Decision>(&document, "presignup.missing", &test_input(None))
            .unwrap_err();

        assert!(err.to_string().contains("no entry 'missing'"));
    }

    #[test]
    fn test_query_through_non_map_is_an_error() {
        let document = PolicyDocument::from_source(r#"{"presignup": 42}"#).unwrap();

        let err =
            evaluate::<_, Decision>(&document, "presignup.result", &test_input(None)).unwrap_err();

        assert!(err.to_string().contains("not addressable"));
    }

    #[test]
    fn test_execution_failure_is_an_error() {
        let document = PolicyDocument::from_source(r#"{"presignup": {"result": nonexistent}}"#).unwrap();

        let err =
            evaluate::<_, Decision>(&document, "presignup.result", &test_input(None)).unwrap_err();

        assert!(err.to_string().contains("could not evaluate policy"));
    }

    #[test]
    fn test_malformed_decision_is_an_error() {
        let document = PolicyDocument::from_source(r#"{"presignup": {"result": "allow"}}"#).unwrap();

        let err =
            evaluate::<_, Decision>(&document, "presignup.result", &test_input(None)).unwrap_err();

        assert!(err.to_string().contains("malformed decision"));
    }

    #[test]
    fn test_now_variable_available() {
        let document = PolicyDocument::from_source(r#"{"meta": {"fresh": now == now}}"#).unwrap();

        let fresh: bool = evaluate(&document, "meta.fresh", &test_input(None)).unwrap();

        assert!(fresh);
    }

    #[test]
    fn test_input_fields_visible_to_policy() {
        let document =
            PolicyDocument::from_source(r#"{"echo": {"trigger": input.trigger}}"#).unwrap();

        let trigger: String = evaluate(&document, "echo.trigger", &test_input(None)).unwrap();

        assert_eq!(trigger, "PreSignUp_SignUp");
    }

    #[test]
    fn test_output_value_shapes() {
        let document = PolicyDocument::from_source(
            r#"{"out": {"list": [1, 2.5, "x", true, null], "nested": {"k": "v"}}}"#,
        )
        .unwrap();

        let out: serde_json::Value = evaluate(&document, "out", &test_input(None)).unwrap();

        assert_eq!(out["list"][0], 1);
        assert_eq!(out["list"][1], 2.5);
        assert_eq!(out["list"][2], "x");
        assert_eq!(out["list"][3], true);
        assert!(out["list"][4].is_null());
        assert_eq!(out["nested"]["k"], "v");
    }
}
