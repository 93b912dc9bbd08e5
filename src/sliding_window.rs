//! Sliding-window extrema via a monotonic deque
//!
//! Computes the maximum (or minimum) of every contiguous window of a fixed
//! size in a single left-to-right pass.
//!
//! # Design
//!
//! ```text
//! values:  [1, 3, -1, -3, 5, 3, 6, 7]   window = 3
//!
//! i=2  deque(idx)=[1,2]     -> max 3
//! i=3  deque(idx)=[1,2,3]   -> max 3
//! i=4  deque(idx)=[4]       -> max 5
//! i=5  deque(idx)=[4,5]     -> max 5
//! i=6  deque(idx)=[6]       -> max 6
//! i=7  deque(idx)=[7]       -> max 7
//! ```
//!
//! The deque holds indices whose values are monotonically decreasing (for the
//! maximum). Every index is pushed and popped at most once, so the whole pass
//! is O(n) with O(window) extra space.
//!
//! # Example
//!
//! ```
//! use cairn::sliding_window::max_sliding_window;
//!
//! let maxima = max_sliding_window(&[1, 3, -1, -3, 5, 3, 6, 7], 3);
//! assert_eq!(maxima, vec![3, 3, 5, 5, 6, 7]);
//! ```

use std::collections::VecDeque;

/// Maximum of every window of `window_size` consecutive values
///
/// Returns one value per window, in order, for windows starting at every index
/// `i >= window_size - 1`. Empty input, a zero window, or a window larger than
/// the input all yield an empty vector.
pub fn max_sliding_window<T: PartialOrd + Copy>(values: &[T], window_size: usize) -> Vec<T> {
    monotonic_window(values, window_size, |queued, incoming| queued < incoming)
}

/// Minimum of every window of `window_size` consecutive values
pub fn min_sliding_window<T: PartialOrd + Copy>(values: &[T], window_size: usize) -> Vec<T> {
    monotonic_window(values, window_size, |queued, incoming| queued > incoming)
}

/// Shared deque pass
///
/// `dominated(queued, incoming)` decides whether a queued value can never be
/// the window extremum again once `incoming` has arrived. Comparisons are
/// strict, so equal values stay queued.
fn monotonic_window<T, F>(values: &[T], window_size: usize, dominated: F) -> Vec<T>
where
    T: PartialOrd + Copy,
    F: Fn(&T, &T) -> bool,
{
    if window_size == 0 || values.is_empty() || window_size > values.len() {
        return Vec::new();
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window_size);
    let mut result = Vec::with_capacity(values.len() - window_size + 1);

    for (i, value) in values.iter().enumerate() {
        // Evict indices that slid out of [i - window_size + 1, i]
        while let Some(&front) = deque.front() {
            if front + window_size <= i {
                deque.pop_front();
            } else {
                break;
            }
        }

        while let Some(&back) = deque.back() {
            if dominated(&values[back], value) {
                deque.pop_back();
            } else {
                break;
            }
        }

        deque.push_back(i);

        if i + 1 >= window_size {
            if let Some(&front) = deque.front() {
                result.push(values[front]);
            }
        }
    }

    result
}
