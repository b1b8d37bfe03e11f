//! Named extension points on the fetch pipeline. Hooks are user-
//! registered async callables, invoked only at their declared phase.

use async_trait::async_trait;
use spider_chrome::Page;
use std::collections::HashMap;
use std::sync::Arc;

/// The declared phases a hook may be registered against, matching the
/// fetch pipeline's ordered steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    OnBrowserCreated,
    OnPageContextCreated,
    OnUserAgentUpdated,
    OnExecutionStarted,
    BeforeGoto,
    AfterGoto,
    BeforeRetrieveHtml,
    BeforeReturnHtml,
}

/// An async callable invoked with the current page, for side effects
/// only (e.g. injecting a script, recording a metric).
#[async_trait]
pub trait Hook: Send + Sync {
    async fn call(&self, page: &Page);
}

/// Adapts a boxed closure returning a boxed future into a [`Hook`],
/// for callers who'd rather register a plain async closure than
/// implement the trait by hand.
pub struct FnHook<F>(pub F)
where
    F: for<'a> Fn(&'a Page) -> futures::future::BoxFuture<'a, ()> + Send + Sync;

#[async_trait]
impl<F> Hook for FnHook<F>
where
    F: for<'a> Fn(&'a Page) -> futures::future::BoxFuture<'a, ()> + Send + Sync,
{
    async fn call(&self, page: &Page) {
        (self.0)(page).await
    }
}

/// Map from hook phase to an ordered list of registered hooks.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: HashMap<HookPhase, Vec<Arc<dyn Hook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        HookRegistry::default()
    }

    pub fn register(&mut self, phase: HookPhase, hook: Arc<dyn Hook>) {
        self.hooks.entry(phase).or_default().push(hook);
    }

    /// Invoke every hook registered at `phase`, in registration order.
    pub async fn invoke(&self, phase: HookPhase, page: &Page) {
        if let Some(hooks) = self.hooks.get(&phase) {
            for hook in hooks {
                hook.call(page).await;
            }
        }
    }
}
