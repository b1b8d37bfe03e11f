//! Minimal host memory-percent reader for the admission loop.
//!
//! Mirrors `fathom-pool`'s cgroup-then-host detection; duplicated here
//! rather than taken as a dependency since `fathom-dispatch` otherwise
//! has no reason to depend on the browser pool crate.

use std::fs;

pub fn memory_percent() -> f64 {
    if let Some(pct) = cgroup_v2_percent() {
        return pct;
    }
    if let Some(pct) = cgroup_v1_percent() {
        return pct;
    }
    host_percent()
}

fn cgroup_v2_percent() -> Option<f64> {
    let current: u64 = fs::read_to_string("/sys/fs/cgroup/memory.current")
        .ok()?
        .trim()
        .parse()
        .ok()?;
    let max_raw = fs::read_to_string("/sys/fs/cgroup/memory.max").ok()?;
    let max_raw = max_raw.trim();
    if max_raw == "max" {
        return None;
    }
    let max: u64 = max_raw.parse().ok()?;
    if max == 0 {
        return None;
    }
    Some((current as f64 / max as f64) * 100.0)
}

fn cgroup_v1_percent() -> Option<f64> {
    let usage: u64 = fs::read_to_string("/sys/fs/cgroup/memory/memory.usage_in_bytes")
        .ok()?
        .trim()
        .parse()
        .ok()?;
    let limit: u64 = fs::read_to_string("/sys/fs/cgroup/memory/memory.limit_in_bytes")
        .ok()?
        .trim()
        .parse()
        .ok()?;
    if limit == 0 || limit > u64::MAX / 2 {
        return None;
    }
    Some((usage as f64 / limit as f64) * 100.0)
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
}
