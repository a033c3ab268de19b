//! Measurement probes and the full-measurement engine

mod icmp;
mod simulated;

pub use icmp::IcmpProbe;
pub use simulated::SimulatedProbe;

use crate::error::MonitorError;
use crate::measurement::{
    MeasurementRecord, ServiceCategory, ServiceCheck, ServicePings, ServiceTarget,
    ThroughputSample,
};
use tracing::warn;

/// Probe backend, selected once at startup from configuration.
pub enum Probe {
    Simulated(SimulatedProbe),
    Icmp(IcmpProbe),
    #[cfg(test)]
    Fixed(FixedProbe),
}

impl Probe {
    async fn measure_throughput(&self) -> Result<ThroughputSample, MonitorError> {
        match self {
            Probe::Simulated(probe) => Ok(probe.measure_throughput()),
            Probe::Icmp(probe) => Ok(probe.measure_throughput()),
            #[cfg(test)]
            Probe::Fixed(probe) => probe.measure_throughput().await,
        }
    }

    async fn check_service(&self, target: &ServiceTarget) -> Result<ServiceCheck, MonitorError> {
        match self {
            Probe::Simulated(probe) => Ok(probe.check_service(target)),
            Probe::Icmp(probe) => probe.check_service(target).await,
            #[cfg(test)]
            Probe::Fixed(probe) => probe.check_service(target).await,
        }
    }
}

/// Runs one complete measurement against the configured catalogue.
pub struct MeasurementEngine {
    probe: Probe,
}

impl MeasurementEngine {
    pub fn new(probe: Probe) -> Self {
        Self { probe }
    }

    /// One throughput sample plus one reachability check per configured
    /// target, category grouping and within-category order preserved.
    ///
    /// A failed service check degrades that one target to unreachable;
    /// a failed throughput probe fails the whole measurement.
    pub async fn run_full_measurement(
        &self,
        catalogue: &[ServiceCategory],
    ) -> Result<MeasurementRecord, MonitorError> {
        let throughput = self
            .probe
            .measure_throughput()
            .await
            .map_err(|e| MonitorError::MeasurementFailure(e.to_string()))?;

        let mut service_pings = ServicePings::default();
        for category in catalogue {
            let mut checks = Vec::with_capacity(category.services.len());
            for target in &category.services {
                let check = match self.probe.check_service(target).await {
                    Ok(check) => check,
                    Err(e) => {
                        warn!("service check failed for {}: {}", target.host, e);
                        ServiceCheck::unreachable(target)
                    }
                };
                checks.push(check);
            }
            service_pings.0.push((category.name.clone(), checks));
        }

        Ok(MeasurementRecord::assemble(throughput, service_pings))
    }
}

/// Deterministic probe for tests: fixed throughput values, scripted
/// per-host reachability, optional failure injection and per-check
/// delay.
#[cfg(test)]
pub(crate) struct FixedProbe {
    pub sample: ThroughputSample,
    pub dead_hosts: std::collections::HashSet<String>,
    pub failing_hosts: std::collections::HashSet<String>,
    pub fail_throughput: bool,
    pub check_delay: std::time::Duration,
}

#[cfg(test)]
impl Default for FixedProbe {
    fn default() -> Self {
        use crate::measurement::ServerInfo;

        Self {
            sample: ThroughputSample {
                download: 300.0,
                upload: 70.0,
                ping: 25.0,
                jitter: 4.0,
                packet_loss: 1.0,
                isp: "Fixed ISP".to_string(),
                server: ServerInfo {
                    name: "Fixed Server".to_string(),
                    location: "Nowhere".to_string(),
                    country: "Nowhere Country".to_string(),
                },
            },
            dead_hosts: Default::default(),
            failing_hosts: Default::default(),
            fail_throughput: false,
            check_delay: std::time::Duration::ZERO,
        }
    }
}

#[cfg(test)]
impl FixedProbe {
    async fn measure_throughput(&self) -> Result<ThroughputSample, MonitorError> {
        if self.fail_throughput {
            return Err(MonitorError::ProbeFailure {
                target: "throughput".to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(self.sample.clone())
    }

    async fn check_service(&self, target: &ServiceTarget) -> Result<ServiceCheck, MonitorError> {
        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }
        if self.failing_hosts.contains(&target.host) {
            return Err(MonitorError::ProbeFailure {
                target: target.host.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        if self.dead_hosts.contains(&target.host) {
            return Ok(ServiceCheck::unreachable(target));
        }
        Ok(ServiceCheck::reachable(target, 42.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<ServiceCategory> {
        vec![
            ServiceCategory {
                name: "social".to_string(),
                services: vec![
                    ServiceTarget {
                        name: "Facebook".to_string(),
                        host: "facebook.com".to_string(),
                    },
                    ServiceTarget {
                        name: "Instagram".to_string(),
                        host: "instagram.com".to_string(),
                    },
                ],
            },
            ServiceCategory {
                name: "games".to_string(),
                services: vec![
                    ServiceTarget {
                        name: "Steam".to_string(),
                        host: "steamcommunity.com".to_string(),
                    },
                    ServiceTarget {
                        name: "Xbox Live".to_string(),
                        host: "xbox.com".to_string(),
                    },
                ],
            },
        ]
    }

    #[tokio::test]
    async fn full_measurement_preserves_catalogue_shape() {
        let engine = MeasurementEngine::new(Probe::Fixed(FixedProbe::default()));
        let record = engine.run_full_measurement(&catalogue()).await.unwrap();

        assert_eq!(record.download, 300.0);
        assert_eq!(record.service_pings.len(), 2);

        let social = record.service_pings.category("social").unwrap();
        assert_eq!(social.len(), 2);
        assert_eq!(social[0].name, "Facebook");
        assert_eq!(social[1].name, "Instagram");

        let games = record.service_pings.category("games").unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].name, "Steam");
        assert_eq!(games[1].name, "Xbox Live");
    }

    #[tokio::test]
    async fn dead_service_is_recorded_with_full_loss() {
        let probe = FixedProbe {
            dead_hosts: ["xbox.com".to_string()].into(),
            ..Default::default()
        };
        let engine = MeasurementEngine::new(Probe::Fixed(probe));
        let record = engine.run_full_measurement(&catalogue()).await.unwrap();

        let games = record.service_pings.category("games").unwrap();
        assert!(games[0].alive);
        assert_eq!(games[0].packet_loss, 0.0);
        assert!(!games[1].alive);
        assert_eq!(games[1].time, 0.0);
        assert_eq!(games[1].packet_loss, 100.0);
    }

    #[tokio::test]
    async fn check_error_degrades_to_unreachable() {
        let probe = FixedProbe {
            failing_hosts: ["instagram.com".to_string()].into(),
            ..Default::default()
        };
        let engine = MeasurementEngine::new(Probe::Fixed(probe));
        let record = engine.run_full_measurement(&catalogue()).await.unwrap();

        let social = record.service_pings.category("social").unwrap();
        assert!(social[0].alive);
        assert!(!social[1].alive);
        assert_eq!(social[1].packet_loss, 100.0);
    }

    #[tokio::test]
    async fn throughput_error_fails_the_measurement() {
        let probe = FixedProbe {
            fail_throughput: true,
            ..Default::default()
        };
        let engine = MeasurementEngine::new(Probe::Fixed(probe));

        let result = engine.run_full_measurement(&catalogue()).await;
        assert!(matches!(result, Err(MonitorError::MeasurementFailure(_))));
    }

    #[tokio::test]
    async fn empty_catalogue_yields_empty_service_pings() {
        let engine = MeasurementEngine::new(Probe::Fixed(FixedProbe::default()));
        let record = engine.run_full_measurement(&[]).await.unwrap();
        assert!(record.service_pings.is_empty());
    }
}
