use std::mem;

use glam::{IVec2, Vec2};

use crate::types::geometry::CellBounds;

/// Iterator over all grid cells covered by a rotated rectangle.
///
/// The four edges are rasterized with a single-step digital line, tracking
/// the minimum and maximum column per scanline; the rows are then emitted as
/// filled spans. Cross coordinates round down, so a boundary coordinate
/// always belongs to the lower-indexed cell.
pub struct FootprintIterator {
    /// Per-row `(min, max)` column spans, first entry at `bounds.min.y`.
    spans: Vec<(i32, i32)>,
    bounds: CellBounds,
    row: usize,
    x: i32,
}

impl FootprintIterator {
    /// `center` in grid cells, `size` in cells, `angle` in radians.
    pub fn new(center: IVec2, size: Vec2, angle: f32) -> Self {
        let half = size / 2.0;
        let rotation = Vec2::from_angle(angle);
        let corners = [
            center + rotation.rotate(Vec2::new(-half.x, -half.y)).round().as_ivec2(),
            center + rotation.rotate(Vec2::new(half.x, -half.y)).round().as_ivec2(),
            center + rotation.rotate(Vec2::new(half.x, half.y)).round().as_ivec2(),
            center + rotation.rotate(Vec2::new(-half.x, half.y)).round().as_ivec2(),
        ];

        let bounds = CellBounds::bound(&corners);
        let rows = (bounds.max.y - bounds.min.y + 1) as usize;
        let mut spans = vec![(i32::MAX, i32::MIN); rows];
        // Min/max accumulation is commutative, edge order does not matter.
        for i in 0..4 {
            rasterize_edge(corners[i], corners[(i + 1) % 4], |x, y| {
                let span = &mut spans[(y - bounds.min.y) as usize];
                span.0 = span.0.min(x);
                span.1 = span.1.max(x);
            });
        }

        Self {
            spans,
            bounds,
            row: 0,
            x: i32::MIN,
        }
    }

    /// Bound box of every cell this iterator can yield, in grid cells.
    pub fn bounds(&self) -> CellBounds {
        self.bounds
    }
}

impl Iterator for FootprintIterator {
    type Item = IVec2;

    fn next(&mut self) -> Option<Self::Item> {
        while self.row < self.spans.len() {
            let (min, max) = self.spans[self.row];
            if min <= max && self.x <= max {
                if self.x < min {
                    self.x = min;
                }
                let cell = IVec2::new(self.x, self.bounds.min.y + self.row as i32);
                self.x += 1;
                return Some(cell);
            }
            self.row += 1;
            self.x = i32::MIN;
        }
        None
    }
}

/// Digital line from `a` to `b`, stepping along the axis with the smaller
/// slope magnitude and flooring the cross coordinate.
fn rasterize_edge(mut a: IVec2, mut b: IVec2, mut emit: impl FnMut(i32, i32)) {
    if a.x == b.x {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            emit(a.x, y);
        }
        return;
    }

    if b.x < a.x {
        mem::swap(&mut a, &mut b);
    }
    let slope = f64::from(b.y - a.y) / f64::from(b.x - a.x);

    if slope.abs() <= 1.0 {
        for x in a.x..=b.x {
            let y = (f64::from(a.y) + slope * f64::from(x - a.x)).floor() as i32;
            emit(x, y);
        }
    } else {
        if b.y < a.y {
            mem::swap(&mut a, &mut b);
        }
        for y in a.y..=b.y {
            let x = (f64::from(a.x) + f64::from(y - a.y) / slope).floor() as i32;
            emit(x, y);
        }
    }
}
