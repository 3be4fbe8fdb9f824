//! Sets of 16-bit code points, kept as ordered runs of disjoint closed
//! ranges. The canonical form is what makes set equality, complementation
//! and the overlap partitioning in [`overlaps`] cheap: ranges are sorted
//! by lower bound and two consecutive ranges are always separated by at
//! least one code point.

use std::fmt;

use rand::Rng;

use crate::error::{Error, Result};

mod overlaps;

pub use overlaps::{compute_overlaps, Overlap};

/// Highest code point of the alphabet.
pub const MAX_CODE: u32 = 0xFFFF;

/// A closed, non-empty range of code points.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharRange {
    min: u32,
    max: u32,
}

impl CharRange {
    /// Builds a range from two bounds, swapping them if they are given
    /// backwards. Bounds must already be within the alphabet.
    pub(crate) fn new(a: u32, b: u32) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Number of code points covered.
    pub fn len(&self) -> u32 {
        self.max - self.min + 1
    }

    pub fn contains(&self, c: u32) -> bool {
        self.min <= c && c <= self.max
    }
}

impl fmt::Debug for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{:#x}", self.min)
        } else {
            write!(f, "{:#x}..={:#x}", self.min, self.max)
        }
    }
}

/// A set of code points in canonical disjoint-range form.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CharSet {
    ranges: Vec<CharRange>,
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ranges.iter()).finish()
    }
}

impl CharSet {
    /// The set containing no code point.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The set containing every code point of the alphabet.
    pub fn all() -> Self {
        Self {
            ranges: vec![CharRange { min: 0, max: MAX_CODE }],
        }
    }

    /// Singleton set for one code point.
    pub fn char(c: u32) -> Result<Self> {
        if c > MAX_CODE {
            return Err(Error::InvalidCharCode(c));
        }
        Ok(Self {
            ranges: vec![CharRange { min: c, max: c }],
        })
    }

    /// Set covering the range between the two bounds, in either order.
    pub fn range(a: u32, b: u32) -> Result<Self> {
        if a > MAX_CODE {
            return Err(Error::InvalidCharCode(a));
        }
        if b > MAX_CODE {
            return Err(Error::InvalidCharCode(b));
        }
        Ok(Self {
            ranges: vec![CharRange::new(a, b)],
        })
    }

    /// Decimal digits.
    pub fn digits() -> Self {
        Self {
            ranges: vec![CharRange { min: '0' as u32, max: '9' as u32 }],
        }
    }

    /// ASCII letters, both cases.
    pub fn letters() -> Self {
        Self::from_ranges([
            CharRange { min: 'A' as u32, max: 'Z' as u32 },
            CharRange { min: 'a' as u32, max: 'z' as u32 },
        ])
    }

    /// Space, tab, carriage return and newline.
    pub fn whitespace() -> Self {
        Self::from_ranges([
            CharRange { min: '\t' as u32, max: '\n' as u32 },
            CharRange { min: '\r' as u32, max: '\r' as u32 },
            CharRange { min: ' ' as u32, max: ' ' as u32 },
        ])
    }

    /// Canonicalizes an arbitrary run of ranges: sorts them and merges
    /// every overlapping or adjacent pair.
    pub(crate) fn from_ranges(ranges: impl IntoIterator<Item = CharRange>) -> Self {
        let mut ranges: Vec<CharRange> = ranges.into_iter().collect();
        ranges.sort_by_key(|r| (r.min, r.max));
        let mut merged: Vec<CharRange> = Vec::with_capacity(ranges.len());
        for r in ranges {
            match merged.last_mut() {
                Some(prev) if r.min <= prev.max + 1 => prev.max = prev.max.max(r.max),
                _ => merged.push(r),
            }
        }
        Self { ranges: merged }
    }

    /// The ranges of this set, sorted and pairwise non-adjacent.
    pub fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of code points in the set.
    pub fn len(&self) -> u32 {
        self.ranges.iter().map(CharRange::len).sum()
    }

    pub fn contains(&self, c: u16) -> bool {
        let c = u32::from(c);
        let idx = self.ranges.partition_point(|r| r.max < c);
        self.ranges.get(idx).is_some_and(|r| r.contains(c))
    }

    /// Union of two sets.
    pub fn union(&self, other: &Self) -> Self {
        Self::from_ranges(self.ranges.iter().chain(&other.ranges).copied())
    }

    /// Union of any number of sets. The union of nothing is the empty set.
    pub fn union_of<'a>(sets: impl IntoIterator<Item = &'a Self>) -> Self {
        Self::from_ranges(sets.into_iter().flat_map(|s| s.ranges.iter().copied()))
    }

    /// Complement within the alphabet.
    pub fn complement(&self) -> Self {
        let mut ranges = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = 0u32;
        for r in &self.ranges {
            if r.min > next {
                ranges.push(CharRange { min: next, max: r.min - 1 });
            }
            next = r.max + 1;
        }
        if next <= MAX_CODE {
            ranges.push(CharRange { min: next, max: MAX_CODE });
        }
        Self { ranges }
    }

    /// Intersection, defined through De Morgan over the alphabet.
    pub fn intersect(&self, other: &Self) -> Self {
        self.complement().union(&other.complement()).complement()
    }

    /// Code points of this set not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.intersect(&other.complement())
    }

    /// Intersection of any number of sets. The intersection of nothing is
    /// the full set.
    pub fn intersection_of<'a>(sets: impl IntoIterator<Item = &'a Self>) -> Self {
        Self::union_of(sets.into_iter().map(Self::complement).collect::<Vec<_>>().iter())
            .complement()
    }

    /// Picks a code point by choosing a range by index, then a point
    /// within it. Selection is for test seeding, not statistical use.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<u16> {
        if self.ranges.is_empty() {
            return None;
        }
        let r = &self.ranges[rng.gen_range(0..self.ranges.len())];
        let c = rng.gen_range(r.min..=r.max);
        debug_assert!(c <= MAX_CODE);
        Some(c as u16)
    }
}
