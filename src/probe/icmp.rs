//! ICMP reachability probe

use super::simulated::SimulatedProbe;
use crate::error::MonitorError;
use crate::measurement::{ServiceCheck, ServiceTarget, ThroughputSample};
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config as PingConfig, PingIdentifier, PingSequence};
use tracing::debug;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks service reachability with real ICMP echo requests.
///
/// ICMP cannot estimate throughput, so the throughput block stays
/// synthesized; only the per-service checks hit the network.
pub struct IcmpProbe {
    client: Client,
    synthetic: SimulatedProbe,
}

impl IcmpProbe {
    pub fn new() -> Result<Self, MonitorError> {
        let client = Client::new(&PingConfig::default()).map_err(|e| {
            MonitorError::MeasurementFailure(format!(
                "failed to create ICMP client (CAP_NET_RAW required): {e}"
            ))
        })?;

        Ok(Self {
            client,
            synthetic: SimulatedProbe,
        })
    }

    pub fn measure_throughput(&self) -> ThroughputSample {
        self.synthetic.measure_throughput()
    }

    pub async fn check_service(
        &self,
        target: &ServiceTarget,
    ) -> Result<ServiceCheck, MonitorError> {
        let ip = resolve_host(&target.host)?;
        let payload = [0u8; 56];

        let mut pinger = self.client.pinger(ip, PingIdentifier(rand::random())).await;

        match tokio::time::timeout(PING_TIMEOUT, pinger.ping(PingSequence(0), &payload)).await {
            Ok(Ok((_packet, duration))) => {
                let rtt_ms = duration.as_secs_f64() * 1000.0;
                debug!("ICMP {} ({}) -> {:.2}ms", target.host, ip, rtt_ms);
                Ok(ServiceCheck::reachable(target, rtt_ms))
            }
            Ok(Err(e)) => {
                debug!("ICMP {} ({}) -> unreachable: {}", target.host, ip, e);
                Ok(ServiceCheck::unreachable(target))
            }
            Err(_) => {
                debug!("ICMP {} ({}) -> timeout after {:?}", target.host, ip, PING_TIMEOUT);
                Ok(ServiceCheck::unreachable(target))
            }
        }
    }
}

fn resolve_host(host: &str) -> Result<IpAddr, MonitorError> {
    use std::net::ToSocketAddrs;

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    format!("{host}:0")
        .to_socket_addrs()
        .map_err(|e| MonitorError::ProbeFailure {
            target: host.to_string(),
            reason: e.to_string(),
        })?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| MonitorError::ProbeFailure {
            target: host.to_string(),
            reason: "no addresses found".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_literal_addresses() {
        let ip = resolve_host("192.0.2.1").unwrap();
        assert_eq!(ip.to_string(), "192.0.2.1");
    }

    #[test]
    fn resolve_rejects_unresolvable_names() {
        assert!(resolve_host("host.invalid").is_err());
    }
}
