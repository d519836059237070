use std::time::Duration;

use tracing::debug;

use crate::error::CatalogError;

const BODY_SNIPPET_CHARS: usize = 240;

pub(crate) fn build_agent(connect_timeout: Duration, read_timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(connect_timeout)
        .timeout_read(read_timeout)
        .timeout_write(read_timeout)
        .build()
}

/// Issues one GET and returns the body. There is no retry: 429 maps to
/// `UpstreamRateLimited`, every other failure to `UpstreamUnavailable`.
pub(crate) fn get_text(
    agent: &ureq::Agent,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, CatalogError> {
    let mut request = agent.get(url);
    for (key, value) in query {
        request = request.query(key, value);
    }
    debug!(url, "GET");

    match request.call() {
        Ok(response) => response.into_string().map_err(|err| {
            CatalogError::UpstreamUnavailable(format!("response decode failed: {err}"))
        }),
        Err(ureq::Error::Status(status, response)) => {
            let response_body = response.into_string().ok().unwrap_or_default();
            let body = response_body.trim();
            let status_error = if body.is_empty() {
                format!("HTTP status {status}")
            } else {
                let truncated = body.chars().take(BODY_SNIPPET_CHARS).collect::<String>();
                format!("HTTP status {status} ({truncated})")
            };
            debug!(url, status, "request rejected");

            if status == 429 {
                Err(CatalogError::UpstreamRateLimited(status_error))
            } else {
                Err(CatalogError::UpstreamUnavailable(status_error))
            }
        }
        Err(ureq::Error::Transport(err)) => Err(CatalogError::UpstreamUnavailable(format!(
            "transport error: {err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, TestServer};

    fn agent(read_timeout_ms: u64) -> ureq::Agent {
        build_agent(
            Duration::from_millis(200),
            Duration::from_millis(read_timeout_ms),
        )
    }

    #[test]
    fn returns_body_and_sends_query_pairs() {
        let server = TestServer::spawn(vec![Reply::new(200, "ok".to_string())]);

        let result = get_text(
            &agent(200),
            &server.url("/search/movie"),
            &[("query", "fight club"), ("page", "2")],
        );

        assert_eq!(result.expect("request should succeed"), "ok");
        let requests = server.request_lines();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("GET /search/movie?"), "{requests:?}");
        assert!(requests[0].contains("page=2"), "{requests:?}");
        assert!(requests[0].contains("query=fight"), "{requests:?}");
    }

    #[test]
    fn maps_429_to_rate_limited_without_retrying() {
        let server = TestServer::spawn(vec![
            Reply::new(429, "slow down".to_string()),
            Reply::new(200, "ok".to_string()),
        ]);

        let err = get_text(&agent(200), &server.url("/movie/550"), &[])
            .expect_err("429 should surface");

        assert_eq!(
            err,
            CatalogError::UpstreamRateLimited("HTTP status 429 (slow down)".to_string())
        );
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn maps_server_errors_to_unavailable() {
        let server = TestServer::spawn(vec![Reply::new(503, String::new())]);

        let err = get_text(&agent(200), &server.url("/movie/550"), &[])
            .expect_err("503 should surface");

        assert_eq!(
            err,
            CatalogError::UpstreamUnavailable("HTTP status 503".to_string())
        );
    }

    #[test]
    fn maps_read_timeout_to_unavailable() {
        let server = TestServer::spawn(vec![
            Reply::new(200, "late").after(Duration::from_millis(150)),
        ]);

        let err = get_text(&agent(20), &server.url("/movie/550"), &[])
            .expect_err("timeout should surface");

        match err {
            CatalogError::UpstreamUnavailable(message) => {
                assert!(message.starts_with("transport error"), "{message}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
