//! Host memory-pressure detection: cgroup v2, then cgroup v1, then a
//! whole-host `sysinfo` fallback. Returns a percentage in `[0.0, 100.0]`.

use std::fs;

const CGROUP_V2_CURRENT: &str = "/sys/fs/cgroup/memory.current";
const CGROUP_V2_MAX: &str = "/sys/fs/cgroup/memory.max";
const CGROUP_V1_USAGE: &str = "/sys/fs/cgroup/memory/memory.usage_in_bytes";
const CGROUP_V1_LIMIT: &str = "/sys/fs/cgroup/memory/memory.limit_in_bytes";

/// Current memory pressure as a percentage of the applicable limit.
pub fn memory_pressure_percent() -> f64 {
    if let Some(pct) = cgroup_v2_percent() {
        return pct;
    }
    if let Some(pct) = cgroup_v1_percent() {
        return pct;
    }
    host_percent()
}

fn cgroup_v2_percent() -> Option<f64> {
    let current: u64 = fs::read_to_string(CGROUP_V2_CURRENT).ok()?.trim().parse().ok()?;
    let max_raw = fs::read_to_string(CGROUP_V2_MAX).ok()?;
    let max_raw = max_raw.trim();
    if max_raw == "max" {
        return None;
    }
    let max: u64 = max_raw.parse().ok()?;
    ratio_percent(current, max)
}

fn cgroup_v1_percent() -> Option<f64> {
    let usage: u64 = fs::read_to_string(CGROUP_V1_USAGE).ok()?.trim().parse().ok()?;
    let limit: u64 = fs::read_to_string(CGROUP_V1_LIMIT).ok()?.trim().parse().ok()?;
    // An unset cgroup v1 limit reads back as a very large sentinel value.
    if limit > u64::MAX / 2 {
        return None;
    }
    ratio_percent(usage, limit)
}

fn ratio_percent(used: u64, limit: u64) -> Option<f64> {
    if limit == 0 {
        return None;
    }
    Some((used as f64 / limit as f64) * 100.0)
}

fn host_percent() -> f64 {
    use sysinfo::System;
    let mut sys = System::new_all();
    sys.refresh_memory();
    let total = sys.total_memory();
    if total == 0 {
        return 0.0;
    }
    let used = total - sys.available_memory();
    (used as f64 / total as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_percent_is_bounded() {
        let pct = host_percent();
        assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn ratio_percent_handles_zero_limit() {
        assert_eq!(ratio_percent(10, 0), None);
        assert_eq!(ratio_percent(50, 100), Some(50.0));
    }
}
