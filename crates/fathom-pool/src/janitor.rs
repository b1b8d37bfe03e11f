//! Wake-interval / TTL table driving the adaptive janitor sweep.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JanitorThresholds {
    pub wake_interval: Duration,
    pub cold_ttl: Duration,
    pub hot_ttl: Duration,
}

/// Select the wake-interval/TTL row for the current memory-pressure reading.
pub fn thresholds_for(pressure_pct: f64) -> JanitorThresholds {
    if pressure_pct > 80.0 {
        JanitorThresholds {
            wake_interval: Duration::from_secs(10),
            cold_ttl: Duration::from_secs(30),
            hot_ttl: Duration::from_secs(120),
        }
    } else if pressure_pct > 60.0 {
        JanitorThresholds {
            wake_interval: Duration::from_secs(30),
            cold_ttl: Duration::from_secs(60),
            hot_ttl: Duration::from_secs(300),
        }
    } else {
        JanitorThresholds {
            wake_interval: Duration::from_secs(60),
            cold_ttl: Duration::from_secs(300),
            hot_ttl: Duration::from_secs(1800),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_pressure_uses_tightest_row() {
        let t = thresholds_for(85.0);
        assert_eq!(t.wake_interval, Duration::from_secs(10));
        assert_eq!(t.cold_ttl, Duration::from_secs(30));
    }

    #[test]
    fn moderate_pressure_uses_middle_row() {
        let t = thresholds_for(70.0);
        assert_eq!(t.wake_interval, Duration::from_secs(30));
    }

    #[test]
    fn low_pressure_uses_loosest_row() {
        let t = thresholds_for(10.0);
        assert_eq!(t.hot_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn boundary_values_fall_to_the_lower_row() {
        // Exactly at a boundary is not "greater than", so it takes the next row down.
        let t = thresholds_for(80.0);
        assert_eq!(t.wake_interval, Duration::from_secs(30));
        let t = thresholds_for(60.0);
        assert_eq!(t.wake_interval, Duration::from_secs(60));
    }
}
