//! Tower middleware that carries the caller's attributes into the response
//! future.
//!
//! Tower services routinely move their futures onto other tasks or threads;
//! this layer captures the live map at `call` time and scopes it around every
//! poll of the inner future, so downstream decisions (zone selection, routing)
//! see the attributes that were present when the call was made.

use tower::{Layer, Service};

use super::task::PropagatingFuture;

// ---------------------------------------------------------------------------
// ContextPropagationLayer
// ---------------------------------------------------------------------------

/// Tower layer wrapping services in [`ContextPropagationService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextPropagationLayer;

impl<S> Layer<S> for ContextPropagationLayer {
    type Service = ContextPropagationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContextPropagationService { inner }
    }
}

// ---------------------------------------------------------------------------
// ContextPropagationService
// ---------------------------------------------------------------------------

/// Service decorator: snapshots the live map per call and restores it around
/// each poll of the inner future.
#[derive(Debug, Clone)]
pub struct ContextPropagationService<S> {
    inner: S,
}

impl<S, R> Service<R> for ContextPropagationService<S>
where
    S: Service<R>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = PropagatingFuture<S::Future>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: R) -> Self::Future {
        // Capture happens here, on the calling thread; the future may be
        // polled anywhere.
        PropagatingFuture::new(self.inner.call(request))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
