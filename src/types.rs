use serde::{Deserialize, Serialize};

/// Outcome of one TCP reachability check against a host:port target.
///
/// Field names are serialized in the historical wire form (`IP`, `Port`,
/// `Status`) so existing dashboards and scripts keep parsing responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "Port")]
    pub port: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl ProbeResult {
    pub fn open(host: &str, port: &str) -> Self {
        Self {
            ip: host.to_string(),
            port: port.to_string(),
            status: "Open".to_string(),
        }
    }

    pub fn error(host: &str, port: &str, detail: impl std::fmt::Display) -> Self {
        Self {
            ip: host.to_string(),
            port: port.to_string(),
            status: format!("Connection error: {detail}"),
        }
    }
}
