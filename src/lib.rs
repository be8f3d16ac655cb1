pub mod engine;
pub mod error;
pub mod loss;
pub mod nn;
pub mod sample;

use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide node id, used to key visited sets during graph traversal.
pub(crate) fn next_id() -> usize {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
