//! Randomized reference probe
//!
//! Generates plausible values without touching the network:
//! 50-550 Mbps down, 20-120 Mbps up, 5-55 ms ping, 1-11 ms jitter,
//! under 2% loss, and a 5% chance per service of an unreachable
//! result.

use crate::measurement::{ServerInfo, ServiceCheck, ServiceTarget, ThroughputSample};
use rand::Rng;

pub struct SimulatedProbe;

impl SimulatedProbe {
    pub fn measure_throughput(&self) -> ThroughputSample {
        let mut rng = rand::thread_rng();
        ThroughputSample {
            download: rng.gen_range(50.0..550.0),
            upload: rng.gen_range(20.0..120.0),
            ping: rng.gen_range(5.0..55.0),
            jitter: rng.gen_range(1.0..11.0),
            packet_loss: rng.gen_range(0.0..2.0),
            isp: "Simulated ISP".to_string(),
            server: ServerInfo {
                name: "Simulated Server".to_string(),
                location: "Local Area".to_string(),
                country: "Local Country".to_string(),
            },
        }
    }

    pub fn check_service(&self, target: &ServiceTarget) -> ServiceCheck {
        let mut rng = rand::thread_rng();
        if rng.gen_range(0.0..1.0) > 0.05 {
            // Simulated latency between 20 and 150 ms
            ServiceCheck::reachable(target, rng.gen_range(20.0..150.0))
        } else {
            ServiceCheck::unreachable(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ServiceTarget {
        ServiceTarget {
            name: "Example".to_string(),
            host: "example.com".to_string(),
        }
    }

    #[test]
    fn throughput_stays_in_documented_ranges() {
        let probe = SimulatedProbe;
        for _ in 0..200 {
            let sample = probe.measure_throughput();
            assert!((50.0..550.0).contains(&sample.download));
            assert!((20.0..120.0).contains(&sample.upload));
            assert!((5.0..55.0).contains(&sample.ping));
            assert!((1.0..11.0).contains(&sample.jitter));
            assert!((0.0..2.0).contains(&sample.packet_loss));
        }
    }

    #[test]
    fn service_checks_keep_the_binary_loss_model() {
        let probe = SimulatedProbe;
        for _ in 0..200 {
            let check = probe.check_service(&target());
            if check.alive {
                assert_eq!(check.packet_loss, 0.0);
                assert!((20.0..150.0).contains(&check.time));
            } else {
                assert_eq!(check.packet_loss, 100.0);
                assert_eq!(check.time, 0.0);
            }
        }
    }
}
