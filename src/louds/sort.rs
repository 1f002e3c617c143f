//! Three-way radix quicksort over byte strings.
//!
//! Partitions on the byte at the current depth (with end-of-string sorting
//! before every byte), recursing one byte deeper into the equal partition.
//! Returns the number of distinct strings, which sizes the transition cache.

use std::cmp::Ordering;

const INSERTION_SORT_THRESHOLD: usize = 10;

/// A string that can be sorted byte by byte.
pub(crate) trait Sortable {
    fn len(&self) -> usize;
    fn byte(&self, i: usize) -> u8;
}

/// Byte at `depth`, or -1 past the end.
#[inline]
fn label<T: Sortable>(item: &T, depth: usize) -> i32 {
    if depth < item.len() {
        item.byte(depth) as i32
    } else {
        -1
    }
}

fn median<T: Sortable>(a: &T, b: &T, c: &T, depth: usize) -> i32 {
    let (x, y, z) = (label(a, depth), label(b, depth), label(c, depth));
    if x < y {
        if y < z {
            y
        } else if x < z {
            z
        } else {
            x
        }
    } else if x < z {
        x
    } else if y < z {
        z
    } else {
        y
    }
}

/// Compare two strings that agree on their first `depth` bytes.
fn compare<T: Sortable>(lhs: &T, rhs: &T, depth: usize) -> Ordering {
    let mut i = depth;
    loop {
        match (i < lhs.len(), i < rhs.len()) {
            (false, false) => return Ordering::Equal,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (true, true) => match lhs.byte(i).cmp(&rhs.byte(i)) {
                Ordering::Equal => i += 1,
                unequal => return unequal,
            },
        }
    }
}

fn insertion_sort<T: Sortable>(items: &mut [T], depth: usize) -> usize {
    let mut count = 1;
    for i in 1..items.len() {
        let mut result = Ordering::Equal;
        let mut j = i;
        while j > 0 {
            result = compare(&items[j - 1], &items[j], depth);
            if result != Ordering::Greater {
                break;
            }
            items.swap(j - 1, j);
            j -= 1;
        }
        if result != Ordering::Equal {
            count += 1;
        }
    }
    count
}

/// Sort `items` and return the number of distinct strings.
pub(crate) fn sort<T: Sortable>(items: &mut [T]) -> usize {
    let len = items.len();
    sort_range(items, 0, len, 0)
}

fn sort_range<T: Sortable>(items: &mut [T], mut l: usize, mut r: usize, mut depth: usize) -> usize {
    let mut count = 0;
    while r - l > INSERTION_SORT_THRESHOLD {
        let mut pl = l;
        let mut pr = r;
        let mut pivot_l = l;
        let mut pivot_r = r;

        let pivot = median(&items[l], &items[l + (r - l) / 2], &items[r - 1], depth);
        // Equal elements are parked at both ends while scanning.
        loop {
            while pl < pr {
                let current = label(&items[pl], depth);
                if current > pivot {
                    break;
                }
                if current == pivot {
                    items.swap(pl, pivot_l);
                    pivot_l += 1;
                }
                pl += 1;
            }
            while pl < pr {
                pr -= 1;
                let current = label(&items[pr], depth);
                if current < pivot {
                    break;
                }
                if current == pivot {
                    pivot_r -= 1;
                    items.swap(pr, pivot_r);
                }
            }
            if pl >= pr {
                break;
            }
            items.swap(pl, pr);
            pl += 1;
        }
        while pivot_l > l {
            pivot_l -= 1;
            pl -= 1;
            items.swap(pivot_l, pl);
        }
        while pivot_r < r {
            items.swap(pivot_r, pr);
            pivot_r += 1;
            pr += 1;
        }

        // [l, pl) < pivot, [pl, pr) == pivot, [pr, r) > pivot
        let (left, mid, right) = (pl - l, pr - pl, r - pr);
        if left > mid || right > mid {
            count += sort_equal(items, pl, pr, depth, pivot);
            // Recurse on the smaller side, loop on the larger.
            if left < right {
                count += sort_range(items, l, pl, depth);
                l = pr;
            } else {
                count += sort_range(items, pr, r, depth);
                r = pl;
            }
        } else {
            count += sort_range(items, l, pl, depth);
            count += sort_range(items, pr, r, depth);
            if pivot == -1 {
                // Every string in the middle ended at `depth`.
                count += usize::from(mid > 0);
                l = r;
            } else {
                l = pl;
                r = pr;
                depth += 1;
            }
        }
    }

    match r - l {
        0 => {}
        1 => count += 1,
        _ => count += insertion_sort(&mut items[l..r], depth),
    }
    count
}

fn sort_equal<T: Sortable>(items: &mut [T], l: usize, r: usize, depth: usize, pivot: i32) -> usize {
    if pivot == -1 {
        usize::from(r > l)
    } else {
        sort_range(items, l, r, depth + 1)
    }
}
