//! Unit-under-test contract and the registry units are resolved from.
//!
//! A unit exposes one asynchronous entry point, `flight`, which receives the façade, the payload and a
//! completion handle. The unit must eventually call the handle; the harness tolerates, and ignores, duplicates.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{HarnessError, HarnessResult};
use crate::payload::Payload;
use crate::run::Completion;
use crate::services::Services;

#[async_trait]
pub trait Unit: Send + Sync {
    async fn flight(&self, services: Services, payload: Payload, done: Completion);
}

/// Adapter that turns an async closure into a [`Unit`].
pub struct FnUnit<F> {
    entry: F,
}

/// Wrap `entry` as a unit.
///
/// ```rust,no_run
/// use unit_harness::unit::unit_fn;
///
/// let unit = unit_fn(|services, _payload, done| async move {
///     services.log("hello", "info");
///     done.succeed("ok");
/// });
/// # let _ = unit;
/// ```
pub fn unit_fn<F, Fut>(entry: F) -> FnUnit<F>
where
    F: Fn(Services, Payload, Completion) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    FnUnit { entry }
}

#[async_trait]
impl<F, Fut> Unit for FnUnit<F>
where
    F: Fn(Services, Payload, Completion) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn flight(&self, services: Services, payload: Payload, done: Completion) {
        (self.entry)(services, payload, done).await;
    }
}

/// Units the CLI can run, keyed by name.
#[derive(Default, Clone)]
pub struct UnitRegistry {
    units: BTreeMap<String, Arc<dyn Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, unit: Arc<dyn Unit>) {
        self.units.insert(name.into(), unit);
    }

    pub fn with(mut self, name: impl Into<String>, unit: impl Unit + 'static) -> Self {
        self.register(name, Arc::new(unit));
        self
    }

    /// Resolve `name`. Fails with [`HarnessError::UnitLoad`] before any run exists.
    pub fn resolve(&self, name: &str) -> HarnessResult<Arc<dyn Unit>> {
        self.units.get(name).cloned().ok_or_else(|| HarnessError::UnitLoad {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn noop() -> impl Unit {
        unit_fn(|_services, _payload, done| async move {
            done.succeed(());
        })
    }

    #[test]
    fn test_resolve_registered_unit() {
        let registry = UnitRegistry::new().with("noop", noop()).with("another", noop());
        assert!(registry.resolve("noop").is_ok());
        assert_eq!(registry.names(), vec!["another", "noop"]);
    }

    #[test]
    fn test_unknown_unit_fails_to_load() {
        let registry = UnitRegistry::new().with("noop", noop());
        let err = registry.resolve("missing").err().unwrap();
        assert!(matches!(err, HarnessError::UnitLoad { ref name, .. } if name == "missing"));
        assert_eq!(err.to_string(), "It was not possible to load the unit 'missing'");
    }
}
