//! Streaming frequent-item detection
//!
//! Two classical one-pass algorithms:
//!
//! - [`ApproximateTopK`]: Misra-Gries summary with at most `k` counters. Any
//!   item whose true count exceeds `n / (k + 1)` is guaranteed to be tracked,
//!   and every reported count undercounts the true count by at most
//!   `n / (k + 1)`. Counts are **approximate** once eviction has happened.
//! - [`majority_element`]: Boyer-Moore voting with a verification pass.
//!
//! # References
//!
//! - Misra, J., & Gries, D. (1982). Finding repeated elements.
//!   Science of Computer Programming, 2(2), 143-152.
//! - Boyer, R. S., & Moore, J. S. (1991). MJRTY: A fast majority vote
//!   algorithm. Automated Reasoning, 105-117.

use std::collections::HashMap;
use std::hash::Hash;

/// Misra-Gries frequent-item sketch bounded to `k` counters
///
/// # Example
///
/// ```
/// use cairn::frequent_items::ApproximateTopK;
///
/// let mut sketch = ApproximateTopK::new(2);
/// for item in ["read", "write", "read", "open", "read"] {
///     sketch.observe(item);
/// }
///
/// assert!(sketch.len() <= 2);
/// assert!(sketch.estimate(&"read") >= 1);
/// ```
#[derive(Debug, Clone)]
pub struct ApproximateTopK<T> {
    counters: HashMap<T, usize>,
    capacity: usize,
    processed: usize,
}

impl<T: Eq + Hash + Clone> ApproximateTopK<T> {
    /// Create a sketch holding at most `k` counters (`k` of 0 is treated as 1)
    pub fn new(k: usize) -> Self {
        let capacity = k.max(1);
        Self {
            counters: HashMap::with_capacity(capacity + 1),
            capacity,
            processed: 0,
        }
    }

    /// Feed one stream element
    pub fn observe(&mut self, item: T) {
        self.processed += 1;
        *self.counters.entry(item).or_insert(0) += 1;

        if self.counters.len() > self.capacity {
            self.counters.retain(|_, count| {
                *count -= 1;
                *count > 0
            });
        }
    }

    /// Feed every element of an iterator
    pub fn observe_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.observe(item);
        }
    }

    /// Estimated count of `item` (0 when not tracked)
    pub fn estimate(&self, item: &T) -> usize {
        self.counters.get(item).copied().unwrap_or(0)
    }

    /// Tracked items and their approximate counts
    pub fn counts(&self) -> &HashMap<T, usize> {
        &self.counters
    }

    pub fn into_counts(self) -> HashMap<T, usize> {
        self.counters
    }

    /// Number of tracked items (never exceeds `capacity`)
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stream elements observed so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Maximum undercount of any reported count, `processed / (k + 1)`
    pub fn error_bound(&self) -> usize {
        self.processed / (self.capacity + 1)
    }

    /// Up to `n` tracked items, highest estimate first
    pub fn top(&self, n: usize) -> Vec<(T, usize)> {
        let mut entries: Vec<(T, usize)> = self
            .counters
            .iter()
            .map(|(item, count)| (item.clone(), *count))
            .collect();

        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }
}

/// Approximate counts of the frequent items in `stream`
///
/// Every item occurring more than `stream.len() / (k + 1)` times is present in
/// the result. Items below that threshold may be missing or reported.
pub fn frequent_items<T, I>(stream: I, k: usize) -> HashMap<T, usize>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut sketch = ApproximateTopK::new(k);
    sketch.observe_all(stream);
    sketch.into_counts()
}

/// Element occurring more than `stream.len() / 2` times, if any
///
/// # Example
///
/// ```
/// use cairn::frequent_items::majority_element;
///
/// assert_eq!(majority_element(&[2, 2, 1, 1, 1, 2, 2]), Some(2));
/// assert_eq!(majority_element(&[1, 2, 3]), None);
/// ```
pub fn majority_element<T: PartialEq + Clone>(stream: &[T]) -> Option<T> {
    let mut candidate: Option<&T> = None;
    let mut count = 0usize;

    for item in stream {
        if count == 0 {
            candidate = Some(item);
        }
        if candidate == Some(item) {
            count += 1;
        } else {
            count -= 1;
        }
    }

    // Voting only yields a candidate; confirm it
    let candidate = candidate?;
    let occurrences = stream.iter().filter(|item| *item == candidate).count();
    (occurrences > stream.len() / 2).then(|| candidate.clone())
}
