//! Process-wide, thread-scoped holder for the live [`AttributeMap`].
//!
//! Each thread owns at most one live map, created lazily on first access.
//! The carrier is pure bookkeeping over an in-process slot: none of its
//! operations fail or block.
//!
//! Thread-local state does not follow work across thread boundaries. Any code
//! that hands work to another thread (pool submission, async task, message
//! listener) must go through a boundary adapter that captures a snapshot with
//! [`ContextCarrier::copy`] and reinstates it with [`ContextCarrier::switch_to`]
//! on the executing thread, or do the same by hand. Threads liable to be
//! reused must call [`ContextCarrier::remove`] at the end of a unit of work,
//! otherwise attributes leak into the next unrelated unit scheduled on the
//! same thread.

use std::cell::RefCell;

use crate::attributes::AttributeMap;

thread_local! {
    static LIVE: RefCell<Option<AttributeMap>> = const { RefCell::new(None) };
}

/// Access point for the calling thread's live attribute map.
///
/// All operations are associated functions; there is nothing to construct.
#[derive(Debug, Clone, Copy)]
pub struct ContextCarrier;

impl ContextCarrier {
    /// Runs `f` against the calling thread's live map, creating an empty map
    /// first if the thread has none.
    ///
    /// `f` must not call back into the carrier; the slot is borrowed for the
    /// duration of the closure.
    pub fn with_current<R>(f: impl FnOnce(&mut AttributeMap) -> R) -> R {
        LIVE.with(|slot| f(slot.borrow_mut().get_or_insert_with(AttributeMap::new)))
    }

    /// Returns the non-null value stored under `key` in the live map.
    #[must_use]
    pub fn get(key: &str) -> Option<String> {
        Self::with_current(|map| map.get(key).map(str::to_string))
    }

    /// Inserts an entry into the live map. `None` stores an explicit null.
    pub fn put(key: impl Into<String>, value: Option<String>) {
        Self::with_current(|map| {
            map.insert(key, value);
        });
    }

    /// Deep snapshot of the calling thread's live map, safe to hand to
    /// another thread. An unattached thread yields an empty snapshot.
    #[must_use]
    pub fn copy() -> AttributeMap {
        LIVE.with(|slot| slot.borrow().clone().unwrap_or_default())
    }

    /// Replaces the calling thread's live map with a copy of `source`.
    ///
    /// Later mutation on this thread cannot corrupt `source` for its other
    /// consumers. Call before any code on the thread reads the live map.
    pub fn switch_to(source: &AttributeMap) {
        LIVE.with(|slot| {
            *slot.borrow_mut() = Some(source.clone());
        });
    }

    /// Detaches the live map from the calling thread; the next access creates
    /// a fresh empty map. Invoke at the natural end of a unit of work that
    /// runs on a reusable thread.
    pub fn remove() {
        LIVE.with(|slot| {
            *slot.borrow_mut() = None;
        });
    }

    /// Swaps the raw slot contents, returning what the thread previously held.
    ///
    /// Adapter plumbing: the future adapter uses this to install its own map
    /// around each poll and hand the thread's prior state back afterwards.
    /// `None` means "no live map attached".
    pub fn swap(next: Option<AttributeMap>) -> Option<AttributeMap> {
        LIVE.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), next))
    }

    /// Returns `true` when the calling thread currently has a live map.
    #[must_use]
    pub fn is_attached() -> bool {
        LIVE.with(|slot| slot.borrow().is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
