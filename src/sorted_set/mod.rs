//! Sorted-sequence helpers.
//!
//! Deduplicated keyword sets, stopword lists and normalized abstracts are all
//! kept as sorted vectors and probed with [`binary_search`]. [`merge_sort`] is
//! the single place that establishes that ordering, so every lookup in the
//! crate sees the same deterministic order.

use std::borrow::Borrow;
use std::cmp::Ordering;

/// Sort a slice in place with a stable top-down merge sort.
///
/// Equal elements keep their relative order. Runs in O(n log n) time and
/// allocates a scratch copy of each half while merging.
pub fn merge_sort<T: Ord + Clone>(items: &mut [T]) {
    let len = items.len();
    if len <= 1 {
        return;
    }

    let mid = len / 2;
    merge_sort(&mut items[..mid]);
    merge_sort(&mut items[mid..]);

    // Halves already in order
    if items[mid - 1] <= items[mid] {
        return;
    }

    let left = items[..mid].to_vec();
    let right = items[mid..].to_vec();
    let (mut i, mut j, mut k) = (0, 0, 0);

    while i < left.len() && j < right.len() {
        // Strict comparison keeps the left element on ties.
        if right[j] < left[i] {
            items[k] = right[j].clone();
            j += 1;
        } else {
            items[k] = left[i].clone();
            i += 1;
        }
        k += 1;
    }

    for item in &left[i..] {
        items[k] = item.clone();
        k += 1;
    }
    for item in &right[j..] {
        items[k] = item.clone();
        k += 1;
    }
}

/// Consume a vector and return it sorted with [`merge_sort`].
pub fn sorted<T: Ord + Clone>(mut items: Vec<T>) -> Vec<T> {
    merge_sort(&mut items);
    items
}

/// Locate `target` in an ascending slice.
///
/// Returns the index of a matching element, or `None` when the target is
/// absent (an empty slice is simply a miss). The slice must already be
/// sorted; on unsorted input the result is unspecified.
///
/// # Example
/// ```
/// use string_improver::sorted_set::binary_search;
///
/// let stems = vec!["privaci".to_string(), "secur".to_string()];
/// assert_eq!(binary_search(&stems, "secur"), Some(1));
/// assert_eq!(binary_search(&stems, "trust"), None);
/// ```
pub fn binary_search<T, Q>(sorted: &[T], target: &Q) -> Option<usize>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut low = 0;
    let mut high = sorted.len();

    while low < high {
        let mid = low + (high - low) / 2;
        match sorted[mid].borrow().cmp(target) {
            Ordering::Equal => return Some(mid),
            Ordering::Greater => high = mid,
            Ordering::Less => low = mid + 1,
        }
    }

    None
}

/// Membership test over an ascending slice.
pub fn contains<T, Q>(sorted: &[T], target: &Q) -> bool
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    binary_search(sorted, target).is_some()
}
