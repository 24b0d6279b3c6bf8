//! OpenGL error checking.
//!
//! GL reports errors through a queue of flags polled with `glGetError`. Wrap a
//! call in [`gl_call!`] to drain stale flags first, run the call, then report
//! anything the call raised with the call text and its source location.

use glow::HasContext;

/// Source of pending GL error flags.
pub trait GlErrorQueue {
    /// Pops the oldest pending error, or `glow::NO_ERROR` when none is left.
    fn pop_error(&self) -> u32;
}

impl GlErrorQueue for glow::Context {
    fn pop_error(&self) -> u32 {
        unsafe { self.get_error() }
    }
}

/// Drains every pending error flag.
pub fn clear_errors<Q: GlErrorQueue + ?Sized>(queue: &Q) {
    while queue.pop_error() != glow::NO_ERROR {}
}

/// Logs the first pending error against `function` and returns `false`, or
/// returns `true` when the queue is empty.
pub fn log_call<Q: GlErrorQueue + ?Sized>(queue: &Q, function: &str, file: &str, line: u32) -> bool {
    match queue.pop_error() {
        glow::NO_ERROR => true,
        error => {
            log::error!("[OpenGL Error] ({error}): {function} {file}:{line}");
            false
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(debug_assertions)] {
        /// Halts the process so a debugger stops right after the failing call.
        pub fn trap() {
            std::process::abort();
        }
    } else {
        /// Release builds keep running; the error was already logged.
        #[inline(always)]
        pub fn trap() {}
    }
}

/// Runs a GL call with error checking and yields its value.
///
/// ```ignore
/// gl_call!(gl, gl.draw_elements(glow::TRIANGLES, 6, glow::UNSIGNED_INT, 0));
/// ```
macro_rules! gl_call {
    ($queue:expr, $call:expr) => {{
        $crate::gl_debug::clear_errors($queue);
        let result = $call;
        if !$crate::gl_debug::log_call($queue, stringify!($call), file!(), line!()) {
            $crate::gl_debug::trap();
        }
        result
    }};
}

pub(crate) use gl_call;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct FakeQueue(RefCell<VecDeque<u32>>);

    impl FakeQueue {
        fn with(errors: &[u32]) -> Self {
            Self(RefCell::new(errors.iter().copied().collect()))
        }

        fn pending(&self) -> usize {
            self.0.borrow().len()
        }
    }

    impl GlErrorQueue for FakeQueue {
        fn pop_error(&self) -> u32 {
            self.0.borrow_mut().pop_front().unwrap_or(glow::NO_ERROR)
        }
    }

    #[test]
    fn clear_drains_all_flags() {
        let queue = FakeQueue::with(&[glow::INVALID_ENUM, glow::INVALID_VALUE]);
        clear_errors(&queue);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn clean_queue_passes() {
        let queue = FakeQueue::with(&[]);
        assert!(log_call(&queue, "glClear", file!(), line!()));
    }

    #[test]
    fn pending_error_fails_and_reports_only_the_first() {
        let queue = FakeQueue::with(&[glow::INVALID_OPERATION, glow::OUT_OF_MEMORY]);
        assert!(!log_call(&queue, "glDrawElements", file!(), line!()));
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn gl_call_discards_stale_errors_and_yields_value() {
        let queue = FakeQueue::with(&[glow::INVALID_ENUM]);
        let value = gl_call!(&queue, 6 * 2);
        assert_eq!(value, 12);
        assert_eq!(queue.pending(), 0);
    }
}
