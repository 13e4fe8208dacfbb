//! Boundary adapters: capture attributes on one side of a concurrency or
//! transport boundary, reinstate them on the other.
//!
//! Every adapter follows the same contract:
//!
//! 1. **Capture** — snapshot the live map when the adapter (or the wrapped
//!    unit of work) is constructed, on the submitting thread.
//! 2. **Restore** — reinstate that snapshot on whatever thread the delegate
//!    ends up running on, before it runs.
//! 3. **Transport copy** — messaging/frame/HTTP adapters additionally copy
//!    accepted attributes into or out of the transport's property bag,
//!    best-effort per key.
//! 4. **Re-wrap guard** — `wrap_*` helpers return an already-propagating
//!    delegate untouched instead of nesting decorators.

pub mod bag;
pub mod executor;
pub mod frame;
pub mod http;
pub mod layer;
pub mod messaging;
pub mod task;

pub use bag::{export_attributes, import_attributes, PropertyBag};
pub use executor::{
    wrap_executor, wrap_scheduler, PropagatingExecutor, PropagatingPool, PropagatingScheduler,
    Task, TaskExecutor, TaskScheduler,
};
pub use frame::{
    handle_frame_with_context, wrap_session, Frame, FramePropagation, FrameSession,
    PropagatingSession,
};
pub use http::HttpPropagation;
pub use layer::{ContextPropagationLayer, ContextPropagationService};
pub use messaging::{
    wrap_handler, wrap_producer, Message, MessageHandler, MessageProducer, MessagingPropagation,
    PropagatingHandler, PropagatingProducer,
};
pub use task::{propagating, FutureContextExt, PropagatingFuture, PropagatingTask};
