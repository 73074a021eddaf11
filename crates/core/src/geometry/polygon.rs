use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{CopyTransform, PolySweepError, Result};

/// Shape of the polygon shared by every copy of a layer.
///
/// `skip == 1` describes a regular polygon, `skip > 1` the star {n/k}.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonSpec {
    pub sides: u32,
    pub skip: i32,
    pub radius: f64,
}

impl PolygonSpec {
    pub fn new(sides: u32, skip: i32, radius: f64) -> Result<Self> {
        let spec = Self {
            sides,
            skip,
            radius,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn regular(sides: u32, radius: f64) -> Result<Self> {
        Self::new(sides, 1, radius)
    }

    pub fn validate(&self) -> Result<()> {
        let reason = if self.sides < 3 {
            "a polygon needs at least three vertices"
        } else if self.skip <= 0 {
            "skip value must be at least one"
        } else if !(self.radius.is_finite() && self.radius > 0.0) {
            "radius must be a positive finite number"
        } else {
            return Ok(());
        };

        Err(PolySweepError::InvalidPolygonSpec {
            sides: self.sides,
            skip: self.skip,
            radius: self.radius,
            reason,
        })
    }

    pub fn is_star(&self) -> bool {
        self.skip > 1
    }

    /// The same spec drawn as a plain regular polygon.
    pub fn as_regular(&self) -> Self {
        Self { skip: 1, ..*self }
    }

    pub fn has_self_intersections(&self) -> bool {
        has_self_intersections(self.sides, self.skip)
    }

    /// Number of closed cycles the connectivity walk splits into.
    pub fn cycle_count(&self) -> u32 {
        let step = self.skip.max(0) as u32 % self.sides.max(1);
        gcd(self.sides, step)
    }
}

pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Closed-form test for whether the star {n/k} crosses itself.
pub fn has_self_intersections(sides: u32, skip: i32) -> bool {
    if skip <= 1 {
        return false;
    }
    let skip = skip as u32;
    // 1 < k < n/2 without truncating the division
    skip.saturating_mul(2) < sides && gcd(sides, skip) == 1
}

/// Vertices of a polygon in connectivity order.
///
/// Consecutive points inside one cycle are drawn edges and every cycle closes
/// back on its first point. A star with `gcd(n, k) == 1` is a single cycle of
/// all `n` points; compound stars are stored as `gcd(n, k)` cycles back to back.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRing {
    points: Vec<DVec2>,
    cycle_len: usize,
}

impl PolygonRing {
    pub fn generate(spec: &PolygonSpec) -> Result<Self> {
        spec.validate()?;

        let n = spec.sides as usize;
        let base: Vec<DVec2> = (0..n)
            .map(|i| DVec2::from_angle(TAU * i as f64 / n as f64) * spec.radius)
            .collect();

        let step = spec.skip as usize % n;
        let cycles = gcd(spec.sides, step as u32) as usize;
        let cycle_len = n / cycles;

        let mut points = Vec::with_capacity(n);
        for start in 0..cycles {
            let mut current = start;
            for _ in 0..cycle_len {
                points.push(base[current]);
                current = (current + step) % n;
            }
        }

        Ok(Self { points, cycle_len })
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn cycles(&self) -> impl Iterator<Item = &[DVec2]> + '_ {
        self.points.chunks(self.cycle_len.max(1))
    }

    /// Drawn edges, never joining two cycles. A two-point cycle yields a
    /// single edge rather than the same segment twice.
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        self.cycles().flat_map(|cycle| {
            let count = match cycle.len() {
                0 | 1 => 0,
                2 => 1,
                len => len,
            };
            (0..count).map(move |i| (cycle[i], cycle[(i + 1) % cycle.len()]))
        })
    }

    /// Applies a copy's scale and rotation (plus any group rotation).
    pub fn transformed(&self, copy: &CopyTransform, group_rotation: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|point| copy.apply(*point, group_rotation))
                .collect(),
            cycle_len: self.cycle_len,
        }
    }
}
