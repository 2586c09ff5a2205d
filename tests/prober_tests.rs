use std::time::Instant;

use netdiag_rs::prober::{self, CONNECT_TIMEOUT};
use tokio::net::TcpListener;

#[tokio::test]
async fn closed_port_errors_within_timeout_bound() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    drop(listener);

    let start = Instant::now();
    let results = prober::probe("127.0.0.1", &[port]).await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 1);
    assert!(results[0].status.contains("error"));
    // Refused on loopback, plus generous slack for slow CI.
    assert!(elapsed < CONNECT_TIMEOUT * 2);
}

#[tokio::test]
async fn open_port_reports_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    let results = prober::probe("127.0.0.1", &[port.clone()]).await;
    assert_eq!(
        results,
        vec![netdiag_rs::types::ProbeResult::open("127.0.0.1", &port)]
    );
}

#[tokio::test]
async fn result_count_matches_port_count() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = listener.local_addr().unwrap().port().to_string();
    let gone = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_port = gone.local_addr().unwrap().port().to_string();
    drop(gone);

    let ports = vec![
        open_port.clone(),
        closed_port.clone(),
        "bogus".to_string(),
        open_port.clone(),
    ];
    let results = prober::probe("127.0.0.1", &ports).await;

    assert_eq!(results.len(), ports.len());
    for (i, port) in ports.iter().enumerate() {
        assert_eq!(&results[i].port, port, "index correspondence at {i}");
    }
    assert_eq!(results[0].status, "Open");
    assert!(results[1].status.starts_with("Connection error:"));
    assert!(results[2].status.starts_with("Connection error:"));
    assert_eq!(results[3].status, "Open");
}
