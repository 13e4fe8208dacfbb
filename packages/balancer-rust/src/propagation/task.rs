//! Context-propagating wrappers for closures and futures.
//!
//! Both wrappers capture a snapshot of the submitting thread's live map at
//! construction time (submission time) and reinstate it when the wrapped unit
//! actually executes, on whatever thread the runtime chooses.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use zonal_core::{AttributeMap, ContextCarrier};

// ---------------------------------------------------------------------------
// PropagatingTask
// ---------------------------------------------------------------------------

/// One-shot closure wrapper: captures the live map at construction and
/// switches the executing thread to that snapshot before running the delegate.
///
/// The snapshot is read-only after capture. The executing thread keeps the
/// switched-in map after the delegate returns; pooled executors rely on the
/// next task switching again (or on [`ContextCarrier::remove`] at the end of
/// the unit of work).
pub struct PropagatingTask<F> {
    snapshot: AttributeMap,
    task: F,
}

impl<F> PropagatingTask<F> {
    /// Wraps `task`, capturing the calling thread's live map.
    pub fn new(task: F) -> Self {
        Self {
            snapshot: ContextCarrier::copy(),
            task,
        }
    }

    /// The captured snapshot, for inspection.
    #[must_use]
    pub fn snapshot(&self) -> &AttributeMap {
        &self.snapshot
    }
}

impl<F, R> PropagatingTask<F>
where
    F: FnOnce() -> R,
{
    /// Switches the executing thread to the captured snapshot, then runs the
    /// delegate.
    pub fn run(self) -> R {
        ContextCarrier::switch_to(&self.snapshot);
        (self.task)()
    }
}

/// Convenience wrapper producing a plain closure, for executors that take
/// `FnOnce` directly.
pub fn propagating<F, R>(task: F) -> impl FnOnce() -> R
where
    F: FnOnce() -> R,
{
    let wrapped = PropagatingTask::new(task);
    move || wrapped.run()
}

// ---------------------------------------------------------------------------
// PropagatingFuture
// ---------------------------------------------------------------------------

/// Future wrapper that scopes the captured map around every poll.
///
/// On each poll the wrapper installs its map into the executing thread's
/// slot, polls the inner future, then harvests the (possibly mutated) map
/// back out and restores whatever the thread held before. The task therefore
/// observes its submission-time attributes across await points and thread
/// migration, and worker threads are never left holding another task's map
/// between polls.
///
/// The inner future is boxed so the wrapper needs no pin projection.
pub struct PropagatingFuture<F> {
    inner: Pin<Box<F>>,
    map: Option<AttributeMap>,
}

impl<F> PropagatingFuture<F>
where
    F: Future,
{
    /// Wraps `inner`, capturing the calling thread's live map.
    pub fn new(inner: F) -> Self {
        Self {
            inner: Box::pin(inner),
            map: Some(ContextCarrier::copy()),
        }
    }

    /// Wraps `inner` with an explicit snapshot instead of the calling
    /// thread's live map.
    pub fn with_snapshot(inner: F, snapshot: AttributeMap) -> Self {
        Self {
            inner: Box::pin(inner),
            map: Some(snapshot),
        }
    }
}

impl<F> Future for PropagatingFuture<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let prior = ContextCarrier::swap(this.map.take());
        let result = this.inner.as_mut().poll(cx);
        this.map = ContextCarrier::swap(prior);
        result
    }
}

/// Extension trait attaching [`PropagatingFuture`] to any future.
pub trait FutureContextExt: Future + Sized {
    /// Captures the calling thread's live map and carries it into this
    /// future's polls.
    fn propagate_context(self) -> PropagatingFuture<Self> {
        PropagatingFuture::new(self)
    }
}

impl<T: Future + Sized> FutureContextExt for T {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
