//! Top-down merge sort with an explicit comparator.

use std::cmp::Ordering;

/// Sort `items` with `cmp` in O(n log n).
///
/// On `Ordering::Equal` the element from the left run is taken first, so
/// the result is deterministic for any comparator.
pub fn merge_sort_by<T, F>(mut items: Vec<T>, cmp: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() < 2 {
        return items;
    }
    let mut scratch = items.clone();
    let len = items.len();
    sort_range(&mut items, &mut scratch, 0, len, &cmp);
    items
}

/// Sort `items[lo..hi]` using `scratch` as the merge buffer
fn sort_range<T, F>(items: &mut [T], scratch: &mut [T], lo: usize, hi: usize, cmp: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    if hi - lo < 2 {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    sort_range(items, scratch, lo, mid, cmp);
    sort_range(items, scratch, mid, hi, cmp);
    merge(items, scratch, lo, mid, hi, cmp);
}

/// Merge sorted runs `items[lo..mid]` and `items[mid..hi]`
fn merge<T, F>(items: &mut [T], scratch: &mut [T], lo: usize, mid: usize, hi: usize, cmp: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    // Already ordered across the seam
    if cmp(&items[mid - 1], &items[mid]) != Ordering::Greater {
        return;
    }

    scratch[lo..hi].clone_from_slice(&items[lo..hi]);

    let (mut i, mut j, mut k) = (lo, mid, lo);
    while i < mid && j < hi {
        if cmp(&scratch[i], &scratch[j]) != Ordering::Greater {
            items[k] = scratch[i].clone();
            i += 1;
        } else {
            items[k] = scratch[j].clone();
            j += 1;
        }
        k += 1;
    }
    while i < mid {
        items[k] = scratch[i].clone();
        i += 1;
        k += 1;
    }
    while j < hi {
        items[k] = scratch[j].clone();
        j += 1;
        k += 1;
    }
}
