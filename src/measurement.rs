//! Measurement data structures

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single reachability target, fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub name: String,
    pub host: String,
}

/// A configured category of service targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub name: String,
    pub services: Vec<ServiceTarget>,
}

/// Result of one reachability check against a [`ServiceTarget`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub name: String,
    pub host: String,
    pub alive: bool,

    /// Latency in milliseconds; meaningful only when `alive`.
    pub time: f64,

    /// 0 when alive, 100 when not (binary loss model per check).
    pub packet_loss: f64,
}

impl ServiceCheck {
    pub fn reachable(target: &ServiceTarget, time_ms: f64) -> Self {
        Self {
            name: target.name.clone(),
            host: target.host.clone(),
            alive: true,
            time: time_ms,
            packet_loss: 0.0,
        }
    }

    pub fn unreachable(target: &ServiceTarget) -> Self {
        Self {
            name: target.name.clone(),
            host: target.host.clone(),
            alive: false,
            time: 0.0,
            packet_loss: 100.0,
        }
    }
}

/// Descriptive information about the measurement server endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub location: String,
    pub country: String,
}

/// Per-category service checks, preserving configured catalogue order.
///
/// Serialized as a JSON object; the wire format requires keys in
/// catalogue order, which a sorted map would not preserve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePings(pub Vec<(String, Vec<ServiceCheck>)>);

impl ServicePings {
    /// Checks for one category, or None if the category is unknown.
    pub fn category(&self, name: &str) -> Option<&[ServiceCheck]> {
        self.0
            .iter()
            .find(|(category, _)| category == name)
            .map(|(_, checks)| checks.as_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ServicePings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, checks) in &self.0 {
            map.serialize_entry(category, checks)?;
        }
        map.end()
    }
}

/// Output of one throughput probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputSample {
    /// Download throughput in Mbps.
    pub download: f64,

    /// Upload throughput in Mbps.
    pub upload: f64,

    /// Latency in milliseconds.
    pub ping: f64,

    /// Latency variance in milliseconds.
    pub jitter: f64,

    /// Packet loss percentage.
    pub packet_loss: f64,

    pub isp: String,
    pub server: ServerInfo,
}

/// One complete measurement, immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Utc>,
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    pub jitter: f64,
    pub packet_loss: f64,
    pub isp: String,
    pub server: ServerInfo,
    pub service_pings: ServicePings,
}

impl MeasurementRecord {
    /// Assembles a record from a throughput sample and the collected
    /// service checks, stamped with the current instant.
    pub fn assemble(throughput: ThroughputSample, service_pings: ServicePings) -> Self {
        Self {
            timestamp: Utc::now(),
            download: throughput.download,
            upload: throughput.upload,
            ping: throughput.ping,
            jitter: throughput.jitter,
            packet_loss: throughput.packet_loss,
            isp: throughput.isp,
            server: throughput.server,
            service_pings,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(download: f64) -> MeasurementRecord {
    MeasurementRecord::assemble(
        ThroughputSample {
            download,
            upload: 80.0,
            ping: 12.0,
            jitter: 2.0,
            packet_loss: 0.5,
            isp: "Test ISP".to_string(),
            server: ServerInfo {
                name: "Test Server".to_string(),
                location: "Test Area".to_string(),
                country: "Test Country".to_string(),
            },
        },
        ServicePings::default(),
    )
}
