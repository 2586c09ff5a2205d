use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::request::Parts;
use axum::http::Request;

/// Interpret the raw `wait` query value as a millisecond delay.
///
/// Absent or malformed values mean no delay; a bad `wait` is never a reason
/// to reject a dump request.
pub fn parse_wait(raw: Option<&str>) -> Duration {
    let millis = raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
    Duration::from_millis(millis)
}

/// Serialize an inbound request into its wire-format text: request line,
/// headers in received order, blank line, body.
///
/// Collecting the body is the only fallible step; a transport-level failure
/// there surfaces as an error carrying the underlying description.
pub async fn dump_request(req: Request<Body>) -> Result<Vec<u8>> {
    let (parts, body) = req.into_parts();
    let body = to_bytes(body, usize::MAX)
        .await
        .context("failed to read request body")?;
    Ok(render(&parts, &body))
}

fn render(parts: &Parts, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(256 + body.len());
    out.extend_from_slice(
        format!("{} {} {:?}\r\n", parts.method, parts.uri, parts.version).as_bytes(),
    );
    for (name, value) in &parts.headers {
        out.extend_from_slice(canonical_header_name(name.as_str()).as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

/// Restore conventional header capitalization (`x-test` -> `X-Test`).
/// The HTTP layer lowercases names on ingest; dumps keep the form clients
/// actually typed into their tooling.
fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = c == '-';
    }
    out
}
