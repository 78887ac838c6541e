use std::f32::consts::FRAC_PI_2;
use std::mem;

use glam::IVec2;

use crate::types::geometry::{angular_distance, compare, from_angle, quadrant, CellBounds};

/// One cell of a rasterized sensor wedge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcCell {
    pub cell: IVec2,
    /// Squared distance from the wedge apex, in cells².
    pub sqr_distance: f32,
}

/// Iterator over all grid cells inside a circular sector.
///
/// A cell belongs to the sector when its center is closer to the apex than
/// `radius` and lies on the inner side of both boundary rays; cells exactly
/// on a ray are included, so partially covered cells count whole. The swept
/// angle must stay strictly under 90° and the rounded boundary rays must be
/// distinct; violating either is a caller bug.
pub struct ArcIterator {
    apex: IVec2,
    /// Boundary rays relative to the apex, ordered so the sweep runs
    /// clockwise from `from` to `to`.
    from: IVec2,
    to: IVec2,
    sqr_radius: f32,
    bounds: CellBounds,
    y: i32,
    x: i32,
    found_in_row: bool,
}

impl ArcIterator {
    /// `apex` in grid cells, angles in radians, `radius` in cells.
    pub fn new(apex: IVec2, angle_from: f32, angle_to: f32, radius: f32) -> Self {
        assert!(
            angular_distance(angle_from, angle_to).abs() < FRAC_PI_2,
            "sector must sweep less than 90°"
        );

        let mut from = from_angle(angle_from, radius).round().as_ivec2();
        let mut to = from_angle(angle_to, radius).round().as_ivec2();
        assert!(
            compare(from, to) != 0,
            "sector boundary rays must be distinct"
        );

        if compare(from, to) < 0 {
            mem::swap(&mut from, &mut to);
        }

        let quadrant_from = quadrant(from);
        let quadrant_to = quadrant(to);
        assert!(
            quadrant_from == quadrant_to || quadrant_from == (quadrant_to + 1) % 4,
            "sector spans more than two quadrants"
        );

        let mut bounds = CellBounds::bound(&[IVec2::ZERO, from, to]);
        if quadrant_from != quadrant_to {
            // The sweep crosses an axis; the bulge reaches the extreme
            // radius point on that axis.
            let r = radius.round() as i32;
            let extreme = match quadrant_from {
                0 => IVec2::new(r, 0),
                1 => IVec2::new(0, r),
                2 => IVec2::new(-r, 0),
                _ => IVec2::new(0, -r),
            };
            bounds.include(extreme);
        }

        Self {
            apex,
            from,
            to,
            sqr_radius: radius * radius,
            bounds,
            y: bounds.min.y,
            x: bounds.min.x,
            found_in_row: false,
        }
    }

    /// Bound box of every cell this iterator can yield, in grid cells.
    pub fn bounds(&self) -> CellBounds {
        self.bounds.offset(self.apex)
    }

    #[inline]
    fn inside(&self, v: IVec2, sqr: f32) -> bool {
        sqr < self.sqr_radius && compare(self.from, v) >= 0 && compare(v, self.to) >= 0
    }
}

impl Iterator for ArcIterator {
    type Item = ArcCell;

    fn next(&mut self) -> Option<Self::Item> {
        while self.y <= self.bounds.max.y {
            while self.x <= self.bounds.max.x {
                let v = IVec2::new(self.x, self.y);
                let sqr = v.length_squared() as f32;
                self.x += 1;

                if self.inside(v, sqr) {
                    self.found_in_row = true;
                    return Some(ArcCell {
                        cell: self.apex + v,
                        sqr_distance: sqr,
                    });
                } else if self.found_in_row {
                    // The sector is convex along a row: once it exits it
                    // does not re-enter.
                    break;
                }
            }
            self.y += 1;
            self.x = self.bounds.min.x;
            self.found_in_row = false;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    const HALF_OPENING: f32 = PI / 24.0; // 7.5°

    /// Reconstruct the ordered boundary rays the same way the iterator does.
    fn boundary_rays(angle_from: f32, angle_to: f32, radius: f32) -> (IVec2, IVec2) {
        let mut from = from_angle(angle_from, radius).round().as_ivec2();
        let mut to = from_angle(angle_to, radius).round().as_ivec2();
        if compare(from, to) < 0 {
            mem::swap(&mut from, &mut to);
        }
        (from, to)
    }

    fn brute_force(
        apex: IVec2,
        angle_from: f32,
        angle_to: f32,
        radius: f32,
        bounds: CellBounds,
    ) -> HashSet<(i32, i32)> {
        let (from, to) = boundary_rays(angle_from, angle_to, radius);
        let mut cells = HashSet::new();
        for y in (bounds.min.y - apex.y)..=(bounds.max.y - apex.y) {
            for x in (bounds.min.x - apex.x)..=(bounds.max.x - apex.x) {
                let v = IVec2::new(x, y);
                let sqr = v.length_squared() as f32;
                if sqr < radius * radius && compare(from, v) >= 0 && compare(v, to) >= 0 {
                    cells.insert((apex.x + x, apex.y + y));
                }
            }
        }
        cells
    }

    #[test]
    fn matches_brute_force_scan() {
        let apex = IVec2::new(50, 50);
        for beam in [0.0f32, 0.4, 1.3, 2.2, -2.8, 3.1, -1.6] {
            for radius in [8.0f32, 12.5, 20.5] {
                let (angle_from, angle_to) = (beam - HALF_OPENING, beam + HALF_OPENING);
                let iter = ArcIterator::new(apex, angle_from, angle_to, radius);
                let bounds = iter.bounds();
                let emitted: HashSet<(i32, i32)> =
                    iter.map(|hit| (hit.cell.x, hit.cell.y)).collect();
                let expected = brute_force(apex, angle_from, angle_to, radius, bounds);
                assert_eq!(emitted, expected, "beam {beam} radius {radius}");
            }
        }
    }

    #[test]
    fn never_leaves_bound_box() {
        let iter = ArcIterator::new(IVec2::new(20, 30), 0.5, 0.5 + 2.0 * HALF_OPENING, 15.0);
        let bounds = iter.bounds();
        for hit in iter {
            assert!(bounds.contains(hit.cell), "{:?} outside {:?}", hit.cell, bounds);
        }
    }

    #[test]
    fn reports_squared_distances() {
        let apex = IVec2::new(10, 10);
        for hit in ArcIterator::new(apex, -HALF_OPENING, HALF_OPENING, 10.5) {
            let v = hit.cell - apex;
            assert_eq!(hit.sqr_distance, v.length_squared() as f32);
        }
    }

    #[test]
    fn apex_cell_is_included() {
        let apex = IVec2::new(7, 3);
        let cells: Vec<ArcCell> = ArcIterator::new(apex, 1.0, 1.0 + PI / 12.0, 9.0).collect();
        assert!(cells.iter().any(|hit| hit.cell == apex));
    }

    #[test]
    #[should_panic(expected = "less than 90")]
    fn rejects_wide_sweep() {
        let _ = ArcIterator::new(IVec2::ZERO, 0.0, FRAC_PI_2, 10.0);
    }

    #[test]
    #[should_panic(expected = "distinct")]
    fn rejects_degenerate_rays() {
        // At this radius both rays round to the same cell vector.
        let _ = ArcIterator::new(IVec2::ZERO, -HALF_OPENING, HALF_OPENING, 1.5);
    }
}
