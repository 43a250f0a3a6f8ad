//! The `WorkBatch` trait — one unit of parallel work handed to the runner.

/// A batch of `count()` indexed work items plus lifecycle callbacks.
///
/// # Contract (enforced by [`JobRunner`][crate::JobRunner])
///
/// ```text
/// trigger_start()                      exactly once, before any item
/// do_work_item(i) for i in 0..count    each index exactly once, any order,
///                                      possibly in parallel
/// trigger_complete()                   exactly once, after the last item
///   or
/// trigger_abort()                      instead of complete if the pool shut
///                                      down (or an item panicked) mid-batch
/// ```
///
/// `count()` is read once per run, after `trigger_start`.
///
/// # Thread safety
///
/// Items run on pool threads concurrently, so per-index mutable state must be
/// partitioned by index (e.g. one `Mutex` per work item that only index `i`
/// ever locks).
pub trait WorkBatch: Send + Sync + 'static {
    /// Number of work items in the batch.
    fn count(&self) -> usize;

    /// Called on a pool thread before the first item.
    fn trigger_start(&self) {}

    /// Process item `index`.
    fn do_work_item(&self, index: usize);

    /// Called once after every item ran.
    fn trigger_complete(&self) {}

    /// Called once instead of `trigger_complete` when the batch was cut short.
    fn trigger_abort(&self) {}
}
