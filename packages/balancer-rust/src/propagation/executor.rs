//! Context-propagating decorators for host-provided execution primitives.
//!
//! The host hands us whatever it uses to run work (a thread pool, a timer
//! wheel); these decorators wrap the submission path so each submitted task
//! carries the submitting thread's attributes. Capture happens at submission
//! time, restore on the executing thread before the delegate runs.
//!
//! Every decorator carries an idempotent re-wrapping guard: `wrap()` returns
//! the delegate untouched when it already propagates context, so applying the
//! decorators generically to every executor-shaped object in a host container
//! never nests wrappers.

use std::sync::Arc;
use std::time::Duration;

use super::task::propagating;

/// A boxed unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

// ---------------------------------------------------------------------------
// Host-primitive traits
// ---------------------------------------------------------------------------

/// Something that runs tasks, eventually, on threads of its choosing.
pub trait TaskExecutor: Send + Sync {
    /// Submits a task for execution.
    fn execute(&self, task: Task);

    /// Re-wrapping guard: `true` when submitted tasks already carry the
    /// submitting thread's attributes.
    fn propagates_context(&self) -> bool {
        false
    }
}

/// Something that runs tasks after a delay.
pub trait TaskScheduler: Send + Sync {
    /// Schedules a task to run once after `delay`.
    fn schedule(&self, delay: Duration, task: Task);

    /// Re-wrapping guard, as on [`TaskExecutor`].
    fn propagates_context(&self) -> bool {
        false
    }
}

impl<E: TaskExecutor + ?Sized> TaskExecutor for Arc<E> {
    fn execute(&self, task: Task) {
        (**self).execute(task);
    }

    fn propagates_context(&self) -> bool {
        (**self).propagates_context()
    }
}

impl<S: TaskScheduler + ?Sized> TaskScheduler for Arc<S> {
    fn schedule(&self, delay: Duration, task: Task) {
        (**self).schedule(delay, task);
    }

    fn propagates_context(&self) -> bool {
        (**self).propagates_context()
    }
}

// ---------------------------------------------------------------------------
// PropagatingExecutor
// ---------------------------------------------------------------------------

/// Decorator that snapshots the live map when `execute` is called and
/// switches the executing thread to it before the task body runs.
pub struct PropagatingExecutor<E> {
    delegate: E,
}

impl<E: TaskExecutor> PropagatingExecutor<E> {
    /// Wraps `delegate`. Use [`wrap_executor`] when the delegate might
    /// already propagate.
    pub fn new(delegate: E) -> Self {
        Self { delegate }
    }

    /// The wrapped delegate.
    pub fn delegate(&self) -> &E {
        &self.delegate
    }
}

impl<E: TaskExecutor> TaskExecutor for PropagatingExecutor<E> {
    fn execute(&self, task: Task) {
        // Capture on the submitting thread, before handing off.
        self.delegate.execute(Box::new(propagating(task)));
    }

    fn propagates_context(&self) -> bool {
        true
    }
}

/// Wraps an executor unless it already propagates context.
pub fn wrap_executor(delegate: Arc<dyn TaskExecutor>) -> Arc<dyn TaskExecutor> {
    if delegate.propagates_context() {
        delegate
    } else {
        Arc::new(PropagatingExecutor::new(delegate))
    }
}

// ---------------------------------------------------------------------------
// PropagatingScheduler
// ---------------------------------------------------------------------------

/// Decorator for delayed execution: capture at schedule time, restore when
/// the delay elapses and the task finally runs.
pub struct PropagatingScheduler<S> {
    delegate: S,
}

impl<S: TaskScheduler> PropagatingScheduler<S> {
    /// Wraps `delegate`. Use [`wrap_scheduler`] when the delegate might
    /// already propagate.
    pub fn new(delegate: S) -> Self {
        Self { delegate }
    }
}

impl<S: TaskScheduler> TaskScheduler for PropagatingScheduler<S> {
    fn schedule(&self, delay: Duration, task: Task) {
        self.delegate.schedule(delay, Box::new(propagating(task)));
    }

    fn propagates_context(&self) -> bool {
        true
    }
}

/// Wraps a scheduler unless it already propagates context.
pub fn wrap_scheduler(delegate: Arc<dyn TaskScheduler>) -> Arc<dyn TaskScheduler> {
    if delegate.propagates_context() {
        delegate
    } else {
        Arc::new(PropagatingScheduler::new(delegate))
    }
}

// ---------------------------------------------------------------------------
// PropagatingPool
// ---------------------------------------------------------------------------

/// Composite decorator for a primitive that both executes and schedules.
///
/// Each capability is delegated to its own single-purpose decorator over a
/// shared handle, rather than re-implementing capture/restore twice.
pub struct PropagatingPool<P: ?Sized> {
    executor: PropagatingExecutor<Arc<P>>,
    scheduler: PropagatingScheduler<Arc<P>>,
}

impl<P> PropagatingPool<P>
where
    P: TaskExecutor + TaskScheduler + ?Sized,
{
    /// Wraps a shared pool handle.
    pub fn new(delegate: Arc<P>) -> Self {
        Self {
            executor: PropagatingExecutor::new(Arc::clone(&delegate)),
            scheduler: PropagatingScheduler::new(delegate),
        }
    }
}

impl<P> TaskExecutor for PropagatingPool<P>
where
    P: TaskExecutor + TaskScheduler + ?Sized,
{
    fn execute(&self, task: Task) {
        self.executor.execute(task);
    }

    fn propagates_context(&self) -> bool {
        true
    }
}

impl<P> TaskScheduler for PropagatingPool<P>
where
    P: TaskExecutor + TaskScheduler + ?Sized,
{
    fn schedule(&self, delay: Duration, task: Task) {
        self.scheduler.schedule(delay, task);
    }

    fn propagates_context(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
