use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use serde_json::{Value, json};

use sweepr_http::{HttpClient, HttpRequest};

/// Dynamic variables harvested by the bootstrap sequence (token, ids),
/// read-only once built.
pub type BenchContext = BTreeMap<String, String>;

/// Optional string lookup over a parsed response, path segment by segment.
///
/// Numbers stringify (services disagree on whether ids are strings); any
/// other shape, or a missing segment, is `None` so the caller can pick a
/// default instead of failing the bootstrap.
#[must_use]
pub fn json_field_str(value: &Value, path: &[&str]) -> Option<String> {
    let mut cur = value;
    for seg in path {
        cur = cur.get(seg)?;
    }

    match cur {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Run the bootstrap sequence once, sequentially, before any measurement:
/// register a fresh user, log in for a token, create a throwaway challenge,
/// submit a placeholder artifact, and trigger one evaluation.
///
/// Every step is best-effort. A failed request or a missing field leaves the
/// corresponding variable as an empty string; dependent requests then fail at
/// measurement time and show up in the error counts, which is where a
/// misbehaving target belongs.
pub async fn prepare_context(
    client: &HttpClient,
    base_url: &str,
    headers: &[(String, String)],
    timeout: Duration,
) -> BenchContext {
    let base = base_url.trim_end_matches('/');
    let mut ctx = BenchContext::new();

    let username = format!("user_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
    let password = "pw";

    let _ = post_json(
        client,
        &format!("{base}/register"),
        headers,
        &json!({"username": username, "password": password}),
        timeout,
    )
    .await;

    let login = post_json(
        client,
        &format!("{base}/login"),
        headers,
        &json!({"username": username, "password": password}),
        timeout,
    )
    .await;
    let token = login
        .as_ref()
        .and_then(|v| json_field_str(v, &["token"]))
        .unwrap_or_default();
    ctx.insert("TOKEN".to_string(), token.clone());

    let challenge = post_json(
        client,
        &format!("{base}/challenges"),
        headers,
        &json!({"token": token, "title": "Bench Challenge", "description": "benchmark"}),
        timeout,
    )
    .await;
    let challenge_id = challenge
        .as_ref()
        .and_then(|v| json_field_str(v, &["challenge", "id"]))
        .unwrap_or_else(|| "default".to_string());
    ctx.insert("CHALLENGE_ID".to_string(), challenge_id.clone());

    let submission = post_json(
        client,
        &format!("{base}/submit"),
        headers,
        &json!({"token": token, "challenge_id": challenge_id, "artifact": "demo_model_v1"}),
        timeout,
    )
    .await;
    let submission_id = submission
        .as_ref()
        .and_then(|v| json_field_str(v, &["submission", "id"]))
        .unwrap_or_default();
    ctx.insert("SUBMISSION_ID".to_string(), submission_id.clone());

    if !submission_id.is_empty() {
        let _ = post_json(
            client,
            &format!("{base}/evaluate"),
            headers,
            &json!({"submission_id": submission_id, "challenge_id": challenge_id}),
            timeout,
        )
        .await;
    }

    ctx
}

/// POST a JSON body and parse the response as JSON. Transport errors,
/// non-JSON bodies, and bad statuses all collapse to `None`; the bootstrap
/// treats the target as untrusted.
async fn post_json(
    client: &HttpClient,
    url: &str,
    headers: &[(String, String)],
    body: &Value,
    timeout: Duration,
) -> Option<Value> {
    let payload = serde_json::to_vec(body).ok()?;

    let mut req_headers = headers.to_vec();
    req_headers.push(("content-type".to_string(), "application/json".to_string()));

    let req = HttpRequest::post(url, Bytes::from(payload))
        .with_headers(req_headers)
        .with_timeout(Some(timeout));

    let res = client.request(req).await.ok()?;
    serde_json::from_slice(&res.body).ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn json_field_str_reads_nested_strings() {
        let v = json!({"challenge": {"id": "ch_1"}});
        assert_eq!(
            json_field_str(&v, &["challenge", "id"]),
            Some("ch_1".to_string())
        );
    }

    #[test]
    fn json_field_str_stringifies_numbers() {
        let v = json!({"submission": {"id": 42}});
        assert_eq!(
            json_field_str(&v, &["submission", "id"]),
            Some("42".to_string())
        );
    }

    #[test]
    fn json_field_str_absent_path_is_none() {
        let v = json!({"challenge": {}});
        assert_eq!(json_field_str(&v, &["challenge", "id"]), None);
        assert_eq!(json_field_str(&v, &["nope"]), None);
    }

    #[test]
    fn json_field_str_rejects_non_scalar_shapes() {
        let v = json!({"token": {"nested": true}});
        assert_eq!(json_field_str(&v, &["token"]), None);

        let v = json!({"token": [1, 2]});
        assert_eq!(json_field_str(&v, &["token"]), None);
    }
}
