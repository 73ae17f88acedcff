use std::time::Instant;

use sweepr_http::{HttpClient, HttpRequest};

use crate::outcome::RequestOutcome;

/// Issue one timed request and always return an outcome.
///
/// Latency spans from immediately before dispatch to after the full response
/// body has been drained. Transport failures (connect refused, DNS, timeout,
/// protocol errors) become `success=false, status=-1` with the error kind and
/// description attached; non-2xx statuses become failed outcomes that still
/// carry the real status and measured body size. Nothing escapes as an `Err`,
/// and nothing here retries, logs, or touches shared state.
pub async fn invoke(client: &HttpClient, req: HttpRequest) -> RequestOutcome {
    let started = Instant::now();
    let result = client.request(req).await;
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(res) => RequestOutcome {
            success: (200..300).contains(&res.status),
            status: i32::from(res.status),
            latency_ms,
            resp_len: res.body.len() as u64,
            error: None,
        },
        Err(err) => RequestOutcome {
            success: false,
            status: -1,
            latency_ms,
            resp_len: 0,
            error: Some(format!("{}: {err}", err.transport_error_kind())),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn transport_failure_becomes_outcome_not_error() {
        // TEST-NET-1 address with a short timeout: nothing listens there.
        let client = HttpClient::new(Some(Duration::from_millis(100)));
        let req = HttpRequest::get("http://192.0.2.1:81/")
            .with_timeout(Some(Duration::from_millis(300)));

        let outcome = invoke(&client, req).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, -1);
        assert_eq!(outcome.resp_len, 0);
        assert!(outcome.latency_ms >= 0.0);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn invalid_url_becomes_outcome() {
        let client = HttpClient::default();
        let outcome = invoke(&client, HttpRequest::get("not a url")).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, -1);
        let err = outcome.error.unwrap();
        assert!(err.starts_with("invalid_url"), "unexpected error: {err}");
    }
}
