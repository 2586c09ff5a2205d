use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::RngCore;
use tracing::info;

/// Per-operation counters fed by closed spans.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OpStats {
    pub count: u64,
    pub total_latency: Duration,
}

/// Append-only metrics table shared between the instrumentation envelope and
/// the metrics exposition listener.
#[derive(Debug, Default)]
pub struct Metrics {
    ops: Mutex<HashMap<String, OpStats>>,
}

impl Metrics {
    fn record(&self, operation: &str, latency: Duration) {
        // Observability is best-effort: a poisoned table is skipped, never
        // propagated into the diagnostic result.
        if let Ok(mut ops) = self.ops.lock() {
            let stats = ops.entry(operation.to_string()).or_default();
            stats.count += 1;
            stats.total_latency += latency;
        }
    }

    /// Sorted copy of the current per-operation stats.
    pub fn snapshot(&self) -> Vec<(String, OpStats)> {
        let mut out: Vec<(String, OpStats)> = match self.ops.lock() {
            Ok(ops) => ops.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Err(_) => Vec::new(),
        };
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Plain-text rendition served by the metrics listener, one line per
    /// operation.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (name, stats) in self.snapshot() {
            let total_ms = stats.total_latency.as_millis();
            let _ = writeln!(
                out,
                "operation={name} count={} total_latency_ms={total_ms}",
                stats.count
            );
        }
        out
    }
}

/// Handle threaded into every diagnostic handler. Opens spans and owns the
/// metrics table; never a process-wide singleton.
#[derive(Clone)]
pub struct Instrumentation {
    service: String,
    metrics: Arc<Metrics>,
}

impl Instrumentation {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            metrics: Arc::new(Metrics::default()),
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Open a span for one diagnostic operation. The returned guard closes
    /// the span on every exit path: dropping it emits the correlated log
    /// record and feeds the metrics table.
    pub fn start_span(&self, operation: &str) -> DiagnosticSpan {
        let mut rng = rand::thread_rng();
        let mut trace_bytes = [0u8; 16];
        let mut span_bytes = [0u8; 8];
        rng.fill_bytes(&mut trace_bytes);
        rng.fill_bytes(&mut span_bytes);

        DiagnosticSpan {
            service: self.service.clone(),
            operation: operation.to_string(),
            trace_id: hex_encode(&trace_bytes),
            span_id: hex_encode(&span_bytes),
            attributes: Vec::new(),
            outcome: "ok".to_string(),
            started: Instant::now(),
            metrics: self.metrics.clone(),
        }
    }

    /// Run a fallible operation inside a span. The span closes whether `op`
    /// succeeds or fails; an `Err` only changes the recorded outcome summary.
    pub fn instrument<T, E: std::fmt::Display>(
        &self,
        operation: &str,
        op: impl FnOnce(&mut DiagnosticSpan) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut span = self.start_span(operation);
        let result = op(&mut span);
        if let Err(e) = &result {
            span.set_outcome(format!("error: {e}"));
        }
        result
    }
}

/// Correlation context for one operation: created, active, closed once, never
/// reentered. Closing happens in `Drop`.
pub struct DiagnosticSpan {
    service: String,
    operation: String,
    trace_id: String,
    span_id: String,
    attributes: Vec<(String, String)>,
    outcome: String,
    started: Instant,
    metrics: Arc<Metrics>,
}

impl DiagnosticSpan {
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.push((key.to_string(), value.into()));
    }

    pub fn set_outcome(&mut self, summary: impl Into<String>) {
        self.outcome = summary.into();
    }

    fn attributes_line(&self) -> String {
        self.attributes
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Drop for DiagnosticSpan {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        self.metrics.record(&self.operation, elapsed);
        info!(
            service = %self.service,
            operation = %self.operation,
            trace_id = %self.trace_id,
            span_id = %self.span_id,
            outcome = %self.outcome,
            attributes = %self.attributes_line(),
            elapsed_ms = elapsed.as_millis() as u64,
            "span closed"
        );
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}
