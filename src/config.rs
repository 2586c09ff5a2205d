use clap::Parser;

/// netdiag-rs — minimal diagnostic HTTP service for reachability probes and request echo.
///
/// Every flag also reads from the environment, matching how the service is
/// deployed (platform-injected `PORT`, `COLOR`, `CF_INSTANCE_INDEX`).
#[derive(Debug, Clone, Parser)]
#[command(
    name = "netdiag-rs",
    version,
    about = "Minimal diagnostic HTTP service: TCP reachability probes and request echo.",
    long_about = None
)]
pub struct Config {
    /// Port for the main diagnostic listener.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for the metrics exposition listener.
    #[arg(long = "metrics-port", env = "METRICS_PORT", default_value_t = 9100)]
    pub metrics_port: u16,

    /// Instance color label; takes precedence over the instance index.
    #[arg(long, env = "COLOR")]
    pub color: Option<String>,

    /// Platform-assigned instance index.
    #[arg(long = "instance-index", env = "CF_INSTANCE_INDEX")]
    pub instance_index: Option<String>,

    /// Trace collector endpoint. Recorded for the exporter sidecar; the
    /// service itself only logs it.
    #[arg(long = "reporter-url", env = "REPORTER_URL")]
    pub reporter_url: Option<String>,
}

impl Config {
    /// Identifier shown in the greeting: color wins, then instance index,
    /// then "unknown".
    pub fn instance_label(&self) -> &str {
        self.color
            .as_deref()
            .or(self.instance_index.as_deref())
            .unwrap_or("unknown")
    }
}
