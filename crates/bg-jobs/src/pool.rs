//! `ItemPool` — recycled work items.
//!
//! Work items own scratch `Vec`s sized to the busiest cycle seen so far.
//! Recycling them keeps per-cycle allocation at zero once the pool is warm.

/// A work item that can be reset for reuse.
pub trait Reusable: Default + Send {
    /// Clear per-cycle state while keeping allocations.
    fn cleanup(&mut self);
}

/// A free list of [`Reusable`] items.
#[derive(Default)]
pub struct ItemPool<T: Reusable> {
    free:    Vec<T>,
    created: usize,
}

impl<T: Reusable> ItemPool<T> {
    pub fn new() -> Self {
        Self { free: Vec::new(), created: 0 }
    }

    /// Pop a recycled item, or create a fresh one.
    pub fn take(&mut self) -> T {
        match self.free.pop() {
            Some(item) => item,
            None => {
                self.created += 1;
                T::default()
            }
        }
    }

    pub fn take_many(&mut self, n: usize) -> Vec<T> {
        (0..n).map(|_| self.take()).collect()
    }

    /// Clean `item` and return it to the free list.
    pub fn give_back(&mut self, mut item: T) {
        item.cleanup();
        self.free.push(item);
    }

    pub fn give_back_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.give_back(item);
        }
    }

    /// Items ready for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total items ever allocated by this pool.
    pub fn created(&self) -> usize {
        self.created
    }
}
