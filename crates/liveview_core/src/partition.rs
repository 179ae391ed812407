use crate::{Notification, Task};

/// Fixed two-way split rule for one record kind.
pub trait Partition {
    /// `true` sends the record to [`BucketPair::matched`].
    fn matches(&self) -> bool;
}

impl Partition for Task {
    /// Completed tasks vs. everything still open.
    fn matches(&self) -> bool {
        self.status.is_completed()
    }
}

impl Partition for Notification {
    /// Already triggered notifications vs. pending actions.
    fn matches(&self) -> bool {
        self.triggered
    }
}

/// Two view buckets filled from one fetched list. Every record lands in
/// exactly one of them and keeps its fetched order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPair<T> {
    pub matched: Vec<T>,
    pub unmatched: Vec<T>,
}

impl<T> Default for BucketPair<T> {
    fn default() -> Self {
        Self {
            matched: Vec::new(),
            unmatched: Vec::new(),
        }
    }
}

impl<T: Partition> BucketPair<T> {
    pub fn partition(records: Vec<T>) -> Self {
        let (matched, unmatched) = records.into_iter().partition(T::matches);
        Self { matched, unmatched }
    }
}
