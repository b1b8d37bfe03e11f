//! Process-wide defaults loaded from `FATHOM_*` environment variables,
//! in the style of the teacher's `ApiConfig::from_env` (one
//! `env::var` lookup per overridable field, falling back silently to
//! the compiled-in default on an unset or unparseable value).

use std::time::Duration;

/// Defaults a freshly-started process seeds its builders with, before
/// any per-call `BrowserConfig`/`RunConfig` overrides are applied.
#[derive(Debug, Clone)]
pub struct ProcessDefaults {
    pub headless: bool,
    pub page_timeout: Duration,
    pub max_session_permit: usize,
    pub memory_threshold_percent: f64,
    pub rate_limit_max_retries: u32,
    pub session_ttl: Duration,
    pub check_robots_txt: bool,
}

impl Default for ProcessDefaults {
    fn default() -> Self {
        ProcessDefaults {
            headless: true,
            page_timeout: Duration::from_secs(30),
            max_session_permit: 10,
            memory_threshold_percent: 90.0,
            rate_limit_max_retries: 5,
            session_ttl: Duration::from_secs(30 * 60),
            check_robots_txt: false,
        }
    }
}

impl ProcessDefaults {
    /// Overlay `FATHOM_*` environment variables onto the compiled-in
    /// defaults. A present-but-unparseable value is ignored and the
    /// default is kept, rather than failing process startup.
    pub fn from_env() -> Self {
        let mut defaults = ProcessDefaults::default();

        if let Ok(val) = std::env::var("FATHOM_HEADLESS") {
            if let Ok(parsed) = val.parse() {
                defaults.headless = parsed;
            }
        }
        if let Ok(val) = std::env::var("FATHOM_PAGE_TIMEOUT_SECS") {
            if let Ok(parsed) = val.parse::<u64>() {
                defaults.page_timeout = Duration::from_secs(parsed);
            }
        }
        if let Ok(val) = std::env::var("FATHOM_MAX_SESSION_PERMIT") {
            if let Ok(parsed) = val.parse() {
                defaults.max_session_permit = parsed;
            }
        }
        if let Ok(val) = std::env::var("FATHOM_MEMORY_THRESHOLD_PERCENT") {
            if let Ok(parsed) = val.parse() {
                defaults.memory_threshold_percent = parsed;
            }
        }
        if let Ok(val) = std::env::var("FATHOM_RATE_LIMIT_MAX_RETRIES") {
            if let Ok(parsed) = val.parse() {
                defaults.rate_limit_max_retries = parsed;
            }
        }
        if let Ok(val) = std::env::var("FATHOM_SESSION_TTL_SECS") {
            if let Ok(parsed) = val.parse::<u64>() {
                defaults.session_ttl = Duration::from_secs(parsed);
            }
        }
        if let Ok(val) = std::env::var("FATHOM_CHECK_ROBOTS_TXT") {
            if let Ok(parsed) = val.parse() {
                defaults.check_robots_txt = parsed;
            }
        }

        defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_reasonable() {
        let defaults = ProcessDefaults::default();
        assert!(defaults.headless);
        assert_eq!(defaults.max_session_permit, 10);
        assert_eq!(defaults.memory_threshold_percent, 90.0);
    }

    #[test]
    fn from_env_ignores_unset_variables() {
        std::env::remove_var("FATHOM_MAX_SESSION_PERMIT");
        let defaults = ProcessDefaults::from_env();
        assert_eq!(defaults.max_session_permit, 10);
    }

    #[test]
    fn from_env_overlays_parseable_values() {
        std::env::set_var("FATHOM_MAX_SESSION_PERMIT", "25");
        let defaults = ProcessDefaults::from_env();
        assert_eq!(defaults.max_session_permit, 25);
        std::env::remove_var("FATHOM_MAX_SESSION_PERMIT");
    }
}
