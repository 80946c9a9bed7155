// src/progress.rs
/// Lightweight progress reporting for a poll cycle.
/// Frontends implement this to surface status; all methods default to no-ops.
pub trait Progress {
    /// Called at the start with the number of pages in the cycle.
    fn begin(&mut self, _total: usize) {}

    /// One page was fetched and reconciled.
    fn page_done(&mut self, _page: usize) {}

    /// One page failed; the cycle continues.
    fn page_failed(&mut self, _page: usize, _reason: &str) {}

    /// Polled between pages; returning true abandons the rest of the cycle.
    fn cancelled(&self) -> bool {
        false
    }

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
