use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;

use crate::types::ProbeResult;

/// Fixed per-target connect timeout. One attempt per target, no retries:
/// reachability is a point-in-time fact, retrying would blur it.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Probe `host` on each of `ports` with a bounded TCP connect.
///
/// Targets are probed sequentially in the given order and every target yields
/// exactly one result at the matching index, even when the attempt fails.
/// A successful connect classifies as `"Open"` and the connection is dropped
/// immediately without sending or reading anything; any error (refused,
/// unresolvable, timed out) becomes a `"Connection error: ..."` status.
pub async fn probe(host: &str, ports: &[String]) -> Vec<ProbeResult> {
    let mut results = Vec::with_capacity(ports.len());
    for port in ports {
        results.push(probe_one(host, port).await);
    }
    results
}

async fn probe_one(host: &str, port: &str) -> ProbeResult {
    let addr = join_host_port(host, port);
    match time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr.as_str())).await {
        // Stream dropped here; an open connection always classifies as Open.
        Ok(Ok(_stream)) => ProbeResult::open(host, port),
        Ok(Err(e)) => ProbeResult::error(host, port, e),
        Err(_elapsed) => ProbeResult::error(
            host,
            port,
            format!("connect timed out after {}ms", CONNECT_TIMEOUT.as_millis()),
        ),
    }
}

/// Join host and port into a dialable address, bracketing IPv6 literals.
fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn join_host_port_brackets_ipv6() {
        assert_eq!(join_host_port("127.0.0.1", "80"), "127.0.0.1:80");
        assert_eq!(join_host_port("::1", "80"), "[::1]:80");
    }

    #[tokio::test]
    async fn open_port_reports_open_and_releases_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port().to_string();

        let results = probe("127.0.0.1", &[port.clone()]).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, "Open");
        assert_eq!(results[0].ip, "127.0.0.1");
        assert_eq!(results[0].port, port);

        // The prober must have dropped its end: the accepted socket sees EOF.
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1];
        let n = stream.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn closed_port_reports_connection_error() {
        // Bind then drop to find a port that is very likely closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port().to_string();
        drop(listener);

        let results = probe("127.0.0.1", &[port]).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].status.starts_with("Connection error:"));
    }

    #[tokio::test]
    async fn unparsable_port_becomes_error_entry() {
        let results = probe("127.0.0.1", &["not-a-port".to_string()]).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].status.starts_with("Connection error:"));
    }

    #[tokio::test]
    async fn every_target_yields_a_result_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port().to_string();

        let ports = vec!["not-a-port".to_string(), open_port.clone()];
        let results = probe("127.0.0.1", &ports).await;
        assert_eq!(results.len(), ports.len());
        assert!(results[0].status.starts_with("Connection error:"));
        assert_eq!(results[1].status, "Open");
        assert_eq!(results[1].port, open_port);
    }
}
