//! Turn-scoped resources with guaranteed release.
//!
//! Connections and in-memory snapshots opened while serving a conversation turn
//! are registered in a [`ResourceScope`] instead of being cached on the object
//! that opened them. [`ResourceScope::scope`] releases everything registered,
//! in reverse order of registration, once the wrapped future completes, fails
//! or panics.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;

use crate::{Result, TRACING_TARGET_RESOURCE};

/// A handle that must be released at the end of a turn.
#[async_trait::async_trait]
pub trait Release: Send {
    /// Releases the underlying resource.
    async fn release(self: Box<Self>) -> Result<()>;
}

/// Adapter turning a closure into a [`Release`].
pub struct ReleaseFn<F>(F);

impl<F> ReleaseFn<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    /// Wraps a synchronous release closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait::async_trait]
impl<F> Release for ReleaseFn<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    async fn release(self: Box<Self>) -> Result<()> {
        (self.0)()
    }
}

/// A value paired with the handle that releases the resources behind it.
pub struct Scoped<T> {
    value: T,
    name: String,
    release: Option<Box<dyn Release>>,
}

impl<T> Scoped<T> {
    /// Pairs a value with its release handle.
    pub fn new(name: impl Into<String>, value: T, release: impl Release + 'static) -> Self {
        Self {
            value,
            name: name.into(),
            release: Some(Box::new(release)),
        }
    }

    /// Wraps a value that holds no resource.
    pub fn unmanaged(value: T) -> Self {
        Self {
            value,
            name: String::new(),
            release: None,
        }
    }

    /// Returns the value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Moves the release handle into the scope and returns the value.
    pub fn register(self, scope: &ResourceScope) -> T {
        if let Some(release) = self.release {
            scope.register_boxed(self.name, release);
        }
        self.value
    }
}

impl<T> std::fmt::Debug for Scoped<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scoped")
            .field("name", &self.name)
            .field("managed", &self.release.is_some())
            .finish()
    }
}

type Entry = (String, Box<dyn Release>);

/// Collection of resources released together at the end of a turn.
///
/// Cheap to clone; clones share the same set of resources.
#[derive(Clone, Default)]
pub struct ResourceScope {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl ResourceScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a resource for release at the end of the turn.
    pub fn register(&self, name: impl Into<String>, release: impl Release + 'static) {
        self.register_boxed(name.into(), Box::new(release));
    }

    fn register_boxed(&self, name: String, release: Box<dyn Release>) {
        tracing::trace!(target: TRACING_TARGET_RESOURCE, resource = %name, "resource registered");
        self.entries().push((name, release));
    }

    /// Returns the number of resources awaiting release.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns whether no resource awaits release.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Releases all registered resources in reverse registration order.
    ///
    /// Every resource is released even if an earlier one fails; the first
    /// failure is returned.
    pub async fn release_all(&self) -> Result<()> {
        let entries = std::mem::take(&mut *self.entries());
        let mut first_error = None;

        for (name, release) in entries.into_iter().rev() {
            match release.release().await {
                Ok(()) => {
                    tracing::debug!(target: TRACING_TARGET_RESOURCE, resource = %name, "resource released");
                }
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_RESOURCE,
                        resource = %name,
                        error = %error,
                        "failed to release resource"
                    );
                    first_error.get_or_insert(error);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Runs a future and releases the scope afterwards, whatever the outcome.
    ///
    /// A panic inside `future` is re-raised after the release. An error from
    /// `future` takes precedence over a release error.
    pub async fn scope<T, Fut>(&self, future: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let outcome = AssertUnwindSafe(future).catch_unwind().await;
        let released = self.release_all().await;

        match outcome {
            Ok(result) => {
                let value = result?;
                released?;
                Ok(value)
            }
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl std::fmt::Debug for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.entries().iter().map(|(n, _)| n.clone()).collect();
        f.debug_struct("ResourceScope")
            .field("resources", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::Error;

    fn counter_release(
        counter: &Arc<AtomicUsize>,
    ) -> ReleaseFn<impl FnOnce() -> Result<()> + use<>> {
        let counter = counter.clone();
        ReleaseFn::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[tokio::test]
    async fn releases_on_success() {
        let released = Arc::new(AtomicUsize::new(0));
        let scope = ResourceScope::new();

        let value = scope
            .scope(async {
                scope.register("conn", counter_release(&released));
                Ok(7)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn releases_on_failure() {
        let released = Arc::new(AtomicUsize::new(0));
        let scope = ResourceScope::new();

        let error = scope
            .scope(async {
                scope.register("conn", counter_release(&released));
                Err::<(), _>(Error::execution("boom"))
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, crate::ErrorKind::Execution);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn releases_on_panic() {
        let released = Arc::new(AtomicUsize::new(0));
        let scope = ResourceScope::new();
        let inner = scope.clone();
        let counter = released.clone();

        let handle = tokio::spawn(async move {
            inner
                .scope(async {
                    inner.register("conn", counter_release(&counter));
                    if counter.load(Ordering::SeqCst) == 0 {
                        panic!("task panicked");
                    }
                    Ok(())
                })
                .await
        });

        assert!(handle.await.unwrap_err().is_panic());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn release_continues_after_failure() {
        let released = Arc::new(AtomicUsize::new(0));
        let scope = ResourceScope::new();
        scope.register("first", counter_release(&released));
        scope.register(
            "second",
            ReleaseFn::new(|| Err(Error::execution("close failed"))),
        );

        assert!(scope.release_all().await.is_err());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scoped_value_registers_release() {
        let released = Arc::new(AtomicUsize::new(0));
        let scope = ResourceScope::new();

        let scoped = Scoped::new("snapshot", "store", counter_release(&released));
        assert_eq!(*scoped.value(), "store");
        assert_eq!(scoped.register(&scope), "store");
        assert_eq!(scope.len(), 1);

        scope.release_all().await.unwrap();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
