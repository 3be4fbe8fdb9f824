//! N-way partitioning of overlapping charsets. Given sets `S0..Sk`, the
//! alphabet region they cover is cut into fragments on which membership
//! is constant, and the fragments are grouped by their membership set.

use std::collections::BTreeMap;

use super::{CharRange, CharSet};

/// One partition of an overlap computation: the member sets, and only
/// they, cover `set` in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    members: Vec<usize>,
    set: CharSet,
}

impl Overlap {
    /// Input indices this partition belongs to, ascending.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn set(&self) -> &CharSet {
        &self.set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Edge {
    // Enter sorts before Leave so a range opening where another closes
    // is seen while the closing one is still active.
    Enter,
    Leave,
}

/// Computes the disjoint overlap partitions of `sets`.
///
/// The result is ordered by ascending lexicographic membership, contains
/// one entry per distinct non-empty membership, and its partitions are
/// pairwise disjoint with union equal to the union of the inputs.
pub fn compute_overlaps(sets: &[&CharSet]) -> Vec<Overlap> {
    let mut events: Vec<(u32, Edge, usize)> = Vec::new();
    for (i, s) in sets.iter().enumerate() {
        for r in s.ranges() {
            events.push((r.min(), Edge::Enter, i));
            events.push((r.max(), Edge::Leave, i));
        }
    }
    events.sort_unstable();

    // Sweep the endpoints. Membership is constant between events; a
    // fragment is emitted whenever it is about to change.
    let mut grouped: BTreeMap<Vec<usize>, Vec<CharRange>> = BTreeMap::new();
    let mut active: Vec<usize> = Vec::new();
    let mut seg_start = 0u32;
    let mut i = 0;
    while i < events.len() {
        let pos = events[i].0;

        if events[i].1 == Edge::Enter {
            // Close the fragment running up to this position under the
            // old membership, then bring the entering sets in.
            if !active.is_empty() && seg_start < pos {
                grouped
                    .entry(active.clone())
                    .or_default()
                    .push(CharRange::new(seg_start, pos - 1));
            }
            seg_start = pos;
            while i < events.len() && events[i].0 == pos && events[i].1 == Edge::Enter {
                let idx = events[i].2;
                if let Err(at) = active.binary_search(&idx) {
                    active.insert(at, idx);
                }
                i += 1;
            }
        }

        if i < events.len() && events[i].0 == pos && events[i].1 == Edge::Leave {
            // A closing bound is still covered, so the fragment extends
            // through it.
            grouped
                .entry(active.clone())
                .or_default()
                .push(CharRange::new(seg_start, pos));
            seg_start = pos + 1;
            while i < events.len() && events[i].0 == pos && events[i].1 == Edge::Leave {
                let idx = events[i].2;
                if let Ok(at) = active.binary_search(&idx) {
                    active.remove(at);
                }
                i += 1;
            }
        }
    }
    debug_assert!(active.is_empty());

    grouped
        .into_iter()
        .map(|(members, ranges)| Overlap {
            members,
            set: CharSet::from_ranges(ranges),
        })
        .collect()
}
