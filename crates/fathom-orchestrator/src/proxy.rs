//! Proxy rotation, called at step 4 of the single-URL contract. No
//! concrete implementation ships here (the teacher's proxy pools are
//! deployment-specific); callers inject their own.

/// Supplies the next proxy URL to inject into a run's effective
/// [`fathom_types::config::BrowserConfig`].
pub trait ProxyRotationStrategy: Send + Sync {
    fn next_proxy(&self) -> Option<String>;
}
