use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

/// Error type for releasing a resource
#[derive(Debug, thiserror::Error)]
pub enum DisposeError {
    #[error("resource already released: {0}")]
    AlreadyReleased(String),
    #[error("failed to release {name}: {reason}")]
    Failed { name: String, reason: String },
}

/// Something that must be released when its owner is torn down
pub trait Disposable {
    /// Name used in diagnostics
    fn name(&self) -> &str {
        "resource"
    }

    fn dispose(&self) -> Result<(), DisposeError>;
}

/// Outcome of a `dispose_all` pass
#[derive(Debug, Default)]
pub struct DisposeReport {
    pub released: usize,
    pub failed: Vec<DisposeError>,
}

impl DisposeReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ad-hoc release callback wrapped as a resource
struct FnResource<F: FnOnce() -> Result<(), DisposeError>> {
    name: String,
    release: RefCell<Option<F>>,
}

impl<F: FnOnce() -> Result<(), DisposeError>> Disposable for FnResource<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn dispose(&self) -> Result<(), DisposeError> {
        match self.release.borrow_mut().take() {
            Some(release) => release(),
            None => Err(DisposeError::AlreadyReleased(self.name.clone())),
        }
    }
}

/// Collects the disposable resources of one component so they can be released together.
///
/// Resources are released in reverse registration order, each exactly once.
/// A failure is logged and reported but never stops the remaining releases.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: Vec<Rc<dyn Disposable>>,
    disposed: bool,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `resource` for release and hand it back.
    ///
    /// Once the registry is disposed, the resource is released immediately
    /// instead of being recorded.
    pub fn register<R: Disposable + 'static>(&mut self, resource: Rc<R>) -> Rc<R> {
        self.track(Rc::clone(&resource) as Rc<dyn Disposable>);
        resource
    }

    /// Record a release callback. Runs it immediately once disposed.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, release: F)
    where
        F: FnOnce() -> Result<(), DisposeError> + 'static,
    {
        self.track(Rc::new(FnResource {
            name: name.into(),
            release: RefCell::new(Some(release)),
        }));
    }

    fn track(&mut self, resource: Rc<dyn Disposable>) {
        if !self.disposed {
            self.resources.push(resource);
            return;
        }
        warn!(name = resource.name(), "registered after dispose, releasing now");
        if let Err(e) = release(resource.as_ref()) {
            warn!(error = %e, "late release failed");
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release everything registered so far. Later calls are no-ops.
    pub fn dispose_all(&mut self) -> DisposeReport {
        let mut report = DisposeReport::default();
        while let Some(resource) = self.resources.pop() {
            match release(resource.as_ref()) {
                Ok(()) => report.released += 1,
                Err(e) => {
                    warn!(name = resource.name(), error = %e, "release failed");
                    report.failed.push(e);
                }
            }
        }
        self.disposed = true;
        report
    }
}

fn release(resource: &dyn Disposable) -> Result<(), DisposeError> {
    resource.dispose()?;
    debug!(name = resource.name(), "released");
    Ok(())
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            self.dispose_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Timer {
        label: String,
        releases: Cell<u32>,
        fail: bool,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Timer {
        fn new(label: &str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Timer {
                label: label.to_string(),
                releases: Cell::new(0),
                fail: false,
                log: Rc::clone(log),
            }
        }

        fn failing(label: &str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Timer {
                fail: true,
                ..Timer::new(label, log)
            }
        }
    }

    impl Disposable for Timer {
        fn name(&self) -> &str {
            &self.label
        }

        fn dispose(&self) -> Result<(), DisposeError> {
            self.releases.set(self.releases.get() + 1);
            self.log.borrow_mut().push(self.label.clone());
            if self.fail {
                return Err(DisposeError::Failed {
                    name: self.label.clone(),
                    reason: "timer stuck".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_register_returns_same_resource() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        let timer = Rc::new(Timer::new("tick", &log));
        let back = registry.register(Rc::clone(&timer));
        assert!(Rc::ptr_eq(&timer, &back));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dispose_all_reverse_order_exactly_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        let a = registry.register(Rc::new(Timer::new("a", &log)));
        let b = registry.register(Rc::new(Timer::new("b", &log)));

        let report = registry.dispose_all();
        assert!(report.is_clean());
        assert_eq!(report.released, 2);
        assert_eq!(*log.borrow(), vec!["b".to_string(), "a".to_string()]);

        let again = registry.dispose_all();
        assert_eq!(again.released, 0);
        assert_eq!(a.releases.get(), 1);
        assert_eq!(b.releases.get(), 1);
        assert!(registry.is_disposed());
    }

    #[test]
    fn test_failure_does_not_block_others() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        let first = registry.register(Rc::new(Timer::new("first", &log)));
        registry.register(Rc::new(Timer::failing("broken", &log)));
        let last = registry.register(Rc::new(Timer::new("last", &log)));

        let report = registry.dispose_all();
        assert_eq!(report.released, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            report.failed[0].to_string(),
            "failed to release broken: timer stuck"
        );
        assert_eq!(first.releases.get(), 1);
        assert_eq!(last.releases.get(), 1);
    }

    #[test]
    fn test_register_fn() {
        let fired = Rc::new(Cell::new(0));
        let mut registry = ResourceRegistry::new();
        let counter = Rc::clone(&fired);
        registry.register_fn("subscription", move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        assert_eq!(registry.dispose_all().released, 1);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_register_after_dispose_releases_immediately() {
        let fired = Rc::new(Cell::new(0));
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        registry.dispose_all();

        let counter = Rc::clone(&fired);
        registry.register_fn("late", move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        let timer = registry.register(Rc::new(Timer::new("late timer", &log)));
        assert_eq!(fired.get(), 1);
        assert_eq!(timer.releases.get(), 1);
        assert!(registry.is_empty());

        assert_eq!(registry.dispose_all().released, 0);
        assert_eq!(fired.get(), 1);
        assert_eq!(timer.releases.get(), 1);
    }

    #[test]
    fn test_drop_releases_pending() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let timer = Rc::new(Timer::new("scoped", &log));
        {
            let mut registry = ResourceRegistry::new();
            registry.register(Rc::clone(&timer));
        }
        assert_eq!(timer.releases.get(), 1);
    }
}
