//! Native stack growth for deeply nested scripts
//!
//! Recursive Logo procedures, nested lists and long chains of unary minus
//! all recurse on the host stack. Those paths run through
//! [`ensure_sufficient_stack`], which moves onto a fresh heap-allocated
//! segment when the current one runs low, so the call-depth limit is what
//! stops a runaway script instead of the thread's stack size.

use std::future::{poll_fn, Future};

use crate::eval::LocalBoxFuture;

/// Grow when less than this remains.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Size of each new segment.
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first switching to a new stack segment if the current one is
/// nearly exhausted.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Poll `future` under [`ensure_sufficient_stack`].
///
/// Every poll re-enters the whole chain of nested futures, so the check
/// has to happen on each poll rather than once at creation.
pub(crate) fn grow_stack<'a, T: 'a>(
    mut future: LocalBoxFuture<'a, T>,
) -> LocalBoxFuture<'a, T> {
    Box::pin(poll_fn(move |cx| {
        ensure_sufficient_stack(|| future.as_mut().poll(cx))
    }))
}
