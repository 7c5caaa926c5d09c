//! The d-ary heap.
//!
//! Elements live in a single vector in level order: the children of index
//! `i` are `i * arity + 1 ..= i * arity + arity`. The queue tracks its own
//! logical capacity so that storage grows by doubling when full and shrinks
//! to half once fewer than a third of the slots are in use.
//!
//! All index arithmetic is checked; out-of-range positions simply end a
//! swim or sink instead of panicking.

use core::cmp::Ordering;

use crate::error::QueueError;

/// Smallest arity that forms a heap.
const MIN_ARITY: usize = 2;

/// Capacity of a freshly constructed queue, and the floor for shrinking.
const INITIAL_CAPACITY: usize = 3;

/// Comparator deciding the relative order of two elements.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Which end of the comparator's order sits at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapMode {
    /// The smallest element is the root.
    Min,
    /// The largest element is the root.
    Max,
}

impl HeapMode {
    /// Whether an element comparing `ord` against another belongs above it.
    const fn outranks(self, ord: Ordering) -> bool {
        match self {
            Self::Min => matches!(ord, Ordering::Less),
            Self::Max => matches!(ord, Ordering::Greater),
        }
    }
}

/// A d-ary heap ordered by an explicit comparator.
///
/// Ties are not reordered: an element only moves past another that strictly
/// outranks it, so the comparator alone decides how equal keys are
/// sequenced (the engine encodes a scheduling sequence number for that).
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    items: Vec<T>,
    capacity: usize,
    arity: usize,
    mode: HeapMode,
    compare: Comparator<T>,
}

impl<T> PriorityQueue<T> {
    /// Create an empty queue.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidArity`] if `arity < 2`.
    pub fn new(arity: usize, mode: HeapMode, compare: Comparator<T>) -> Result<Self, QueueError> {
        if arity < MIN_ARITY {
            return Err(QueueError::InvalidArity { arity });
        }
        Ok(Self {
            items: Vec::with_capacity(INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            arity,
            mode,
            compare,
        })
    }

    /// Create an empty min-heap.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidArity`] if `arity < 2`.
    pub fn min(arity: usize, compare: Comparator<T>) -> Result<Self, QueueError> {
        Self::new(arity, HeapMode::Min, compare)
    }

    /// Create an empty max-heap.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidArity`] if `arity < 2`.
    pub fn max(arity: usize, compare: Comparator<T>) -> Result<Self, QueueError> {
        Self::new(arity, HeapMode::Max, compare)
    }

    /// Number of elements in the queue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logical size of the backing storage.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum number of children per node.
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Whether this is a min- or max-heap.
    pub const fn mode(&self) -> HeapMode {
        self.mode
    }

    /// The root element, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// The element at `index` in backing (level) order.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// All elements in backing (level) order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the elements in backing (level) order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consume the queue, returning the backing vector in level order.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Add an element, growing the backing storage by doubling when full.
    pub fn insert(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.grow();
        }
        self.items.push(item);
        if let Some(last) = self.items.len().checked_sub(1) {
            self.swim(last);
        }
    }

    /// Remove and return the root.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if there is nothing to extract.
    pub fn extract_root(&mut self) -> Result<T, QueueError> {
        let last = self.items.len().checked_sub(1).ok_or(QueueError::Empty)?;
        self.items.swap(0, last);
        let root = self.items.pop().ok_or(QueueError::Empty)?;
        self.sink(0);
        self.maybe_shrink();
        Ok(root)
    }

    /// Adopt `items` as the backing storage and restore heap order bottom-up
    /// in O(n). Any previous contents are dropped.
    pub fn heapify_from_array(&mut self, items: Vec<T>) {
        self.items = items;
        self.capacity = self.items.len().max(INITIAL_CAPACITY);
        let last_parent = self.items.len().checked_div(2).unwrap_or(0);
        for index in (0..=last_parent).rev() {
            self.sink(index);
        }
    }

    /// Check the heap-order invariant: no child outranks its parent.
    pub fn is_heap(&self) -> bool {
        (1..self.items.len()).all(|index| {
            self.parent_of(index)
                .is_none_or(|parent| !self.outranks(index, parent))
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Whether the element at `first` belongs above the element at `second`.
    fn outranks(&self, first: usize, second: usize) -> bool {
        match (self.items.get(first), self.items.get(second)) {
            (Some(a), Some(b)) => self.mode.outranks((self.compare)(a, b)),
            _ => false,
        }
    }

    fn parent_of(&self, index: usize) -> Option<usize> {
        index
            .checked_sub(1)
            .and_then(|i| i.checked_div(self.arity))
    }

    fn first_child_of(&self, index: usize) -> Option<usize> {
        index
            .checked_mul(self.arity)
            .and_then(|i| i.checked_add(1))
    }

    /// The child of `index` that belongs highest, if `index` has children.
    fn best_child(&self, index: usize) -> Option<usize> {
        let first = self.first_child_of(index)?;
        if first >= self.items.len() {
            return None;
        }
        let end = first.saturating_add(self.arity).min(self.items.len());
        (first..end).reduce(|best, candidate| {
            if self.outranks(candidate, best) {
                candidate
            } else {
                best
            }
        })
    }

    fn swim(&mut self, mut index: usize) {
        while let Some(parent) = self.parent_of(index) {
            if !self.outranks(index, parent) {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn sink(&mut self, mut index: usize) {
        while let Some(child) = self.best_child(index) {
            if !self.outranks(child, index) {
                break;
            }
            self.items.swap(index, child);
            index = child;
        }
    }

    fn grow(&mut self) {
        let target = self.capacity.saturating_mul(2).max(INITIAL_CAPACITY);
        self.items
            .reserve_exact(target.saturating_sub(self.items.len()));
        self.capacity = target;
    }

    fn maybe_shrink(&mut self) {
        let threshold = self.capacity.checked_div(3).unwrap_or(0);
        if self.items.len() >= threshold || self.capacity <= INITIAL_CAPACITY {
            return;
        }
        let target = self
            .capacity
            .checked_div(2)
            .unwrap_or(INITIAL_CAPACITY)
            .max(INITIAL_CAPACITY);
        self.items.shrink_to(target);
        self.capacity = target;
    }
}
