use serde_json::Value;

use crate::context::BenchContext;

/// Substitute `${NAME}` tokens from the context into a template tree.
///
/// Strings are scanned for every `${NAME}` occurrence; arrays and objects are
/// resolved element-wise; other scalars pass through unchanged. A name absent
/// from the context stays as literal `${NAME}` text — a benchmark should not
/// halt on an optional variable. The input template is never mutated.
#[must_use]
pub fn resolve(template: &Value, ctx: &BenchContext) -> Value {
    match template {
        Value::String(s) => Value::String(resolve_str(s, ctx)),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve(v, ctx)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve(v, ctx)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn resolve_str(s: &str, ctx: &BenchContext) -> String {
    let mut out = s.to_string();
    for (name, value) in ctx {
        let token = format!("${{{name}}}");
        if out.contains(&token) {
            out = out.replace(&token, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    fn ctx(pairs: &[(&str, &str)]) -> BenchContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn token_free_template_resolves_to_itself() {
        let t = json!({"a": 1, "b": [true, null, "plain"], "c": {"d": 2.5}});
        let resolved = resolve(&t, &ctx(&[("TOKEN", "abc")]));
        assert_eq!(resolved, t);
    }

    #[test]
    fn known_token_is_substituted() {
        let t = json!({"token": "${TOKEN}"});
        let resolved = resolve(&t, &ctx(&[("TOKEN", "abc")]));
        assert_eq!(resolved, json!({"token": "abc"}));
    }

    #[test]
    fn unknown_token_stays_literal() {
        let t = json!({"token": "${TOKEN}"});
        let resolved = resolve(&t, &ctx(&[]));
        assert_eq!(resolved, json!({"token": "${TOKEN}"}));
    }

    #[test]
    fn substitutes_every_occurrence_within_a_string() {
        let t = json!("${A}-${A}-${B}");
        let resolved = resolve(&t, &ctx(&[("A", "x"), ("B", "y")]));
        assert_eq!(resolved, json!("x-x-y"));
    }

    #[test]
    fn resolves_recursively_through_nested_structures() {
        let t = json!({
            "outer": {"id": "${CHALLENGE_ID}"},
            "list": ["${TOKEN}", {"deep": "${TOKEN}"}],
            "n": 7
        });
        let resolved = resolve(&t, &ctx(&[("TOKEN", "t1"), ("CHALLENGE_ID", "c9")]));
        assert_eq!(
            resolved,
            json!({
                "outer": {"id": "c9"},
                "list": ["t1", {"deep": "t1"}],
                "n": 7
            })
        );
    }

    #[test]
    fn non_string_scalars_pass_through() {
        let t = json!([1, 2.5, true, null]);
        assert_eq!(resolve(&t, &ctx(&[("X", "y")])), t);
    }

    #[test]
    fn input_template_is_not_mutated() {
        let t = json!({"token": "${TOKEN}"});
        let before = t.clone();
        let _ = resolve(&t, &ctx(&[("TOKEN", "abc")]));
        assert_eq!(t, before);
    }
}
