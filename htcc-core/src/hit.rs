//! Hit traits and types for HTCC photosensor data.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of theta bins (rings).
pub const N_THETA: usize = 4;

/// Number of phi bins (twelve half-sectors around the beam axis).
pub const N_PHI: usize = 12;

/// Theta index of a ring (`ring - 1`).
///
/// Wraps instead of overflowing; any ring outside `1..=4` yields an index
/// outside `[0, 4)`.
#[inline]
#[must_use]
pub fn theta_index(ring: i32) -> i32 {
    ring.wrapping_sub(1)
}

/// Phi index of a sector half.
///
/// Sectors are numbered from 1 and each holds two halves, so
/// `2 * sector + half - 3` runs over `0..12` with 0 standing for the
/// wrap-around half, which takes the last bin. Out-of-range inputs
/// saturate to an index outside `[0, 12)`.
#[inline]
#[must_use]
pub fn phi_index(sector: i32, half: i32) -> i32 {
    let raw = 2 * i64::from(sector) + i64::from(half) - 3;
    let raw = if raw == 0 { N_PHI as i64 } else { raw };
    (raw - 1).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Cyclic distance between two phi indices on the 12-bin ring.
#[inline]
#[must_use]
pub fn phi_distance(a: i32, b: i32) -> i32 {
    let n = N_PHI as i64;
    let d = (i64::from(a) - i64::from(b)).rem_euclid(n);
    d.min(n - d) as i32
}

/// A raw hit record as read from the event store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawHit {
    /// Ring number, 1-based.
    pub ring: i32,
    /// Sector number, 1-based.
    pub sector: i32,
    /// Sector half, 1 or 2.
    pub half: i32,
    /// Photoelectron count.
    pub nphe: i32,
    /// Raw hit time (ns).
    pub time: f64,
}

impl RawHit {
    /// Creates a new raw hit.
    #[inline]
    #[must_use]
    pub fn new(ring: i32, sector: i32, half: i32, nphe: i32, time: f64) -> Self {
        Self {
            ring,
            sector,
            half,
            nphe,
            time,
        }
    }
}

/// Trait for hit data from the counter.
///
/// Gives the clustering engine a uniform view of hits independent of how
/// the detector indices were stored.
pub trait Hit {
    /// Returns the theta index.
    fn theta_index(&self) -> i32;

    /// Returns the phi index.
    fn phi_index(&self) -> i32;

    /// Returns the photoelectron count.
    fn nphe(&self) -> i32;

    /// Returns the raw (uncorrected) time.
    fn time(&self) -> f64;
}

impl Hit for RawHit {
    #[inline]
    fn theta_index(&self) -> i32 {
        theta_index(self.ring)
    }

    #[inline]
    fn phi_index(&self) -> i32 {
        phi_index(self.sector, self.half)
    }

    #[inline]
    fn nphe(&self) -> i32 {
        self.nphe
    }

    #[inline]
    fn time(&self) -> f64 {
        self.time
    }
}

/// Per-event hit table stored column-wise.
///
/// Theta and phi indices are derived once on insertion so the engine never
/// recomputes them while scanning candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitTable {
    /// Ring numbers.
    pub ring: Vec<i32>,
    /// Sector numbers.
    pub sector: Vec<i32>,
    /// Sector halves.
    pub half: Vec<i32>,
    /// Photoelectron counts.
    pub nphe: Vec<i32>,
    /// Raw hit times.
    pub time: Vec<f64>,
    /// Derived theta indices.
    pub theta_index: Vec<i32>,
    /// Derived phi indices.
    pub phi_index: Vec<i32>,
}

impl HitTable {
    /// Creates an empty table with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: Vec::with_capacity(capacity),
            sector: Vec::with_capacity(capacity),
            half: Vec::with_capacity(capacity),
            nphe: Vec::with_capacity(capacity),
            time: Vec::with_capacity(capacity),
            theta_index: Vec::with_capacity(capacity),
            phi_index: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if the table holds no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Appends a hit and derives its indices.
    pub fn push(&mut self, hit: RawHit) {
        self.ring.push(hit.ring);
        self.sector.push(hit.sector);
        self.half.push(hit.half);
        self.nphe.push(hit.nphe);
        self.time.push(hit.time);
        self.theta_index.push(hit.theta_index());
        self.phi_index.push(hit.phi_index());
    }

    /// Returns the raw record at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<RawHit> {
        (index < self.len()).then(|| {
            RawHit::new(
                self.ring[index],
                self.sector[index],
                self.half[index],
                self.nphe[index],
                self.time[index],
            )
        })
    }

    /// Iterates over the raw records in order.
    pub fn iter(&self) -> impl Iterator<Item = RawHit> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

impl From<&[RawHit]> for HitTable {
    fn from(hits: &[RawHit]) -> Self {
        hits.iter().copied().collect()
    }
}

impl FromIterator<RawHit> for HitTable {
    fn from_iter<I: IntoIterator<Item = RawHit>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = Self::with_capacity(iter.size_hint().0);
        for hit in iter {
            table.push(hit);
        }
        table
    }
}
