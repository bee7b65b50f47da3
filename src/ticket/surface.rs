//! Erasure model of the cover layer.
//!
//! The cover is tracked as a coarse bitmap of `mask_cell`-sized cells in native
//! surface coordinates. A cell is cleared once any disc covers its centre and never
//! re-covers. The browser renderer paints the same discs returned by
//! [`ScratchSurface::scratch`] onto the cover canvas.

use rand::Rng;

use crate::config::{Point, Rect, ScratchConfig};

/// A filled circle in native coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disc {
    pub center: Point,
    pub radius: f64,
}

impl Disc {
    fn covers(&self, p: Point) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// The two discs cleared by one scratch: the brush itself and a smaller, jittered
/// neighbour that makes the stroke look ragged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScratchMark {
    pub brush: Disc,
    pub jitter: Disc,
}

/// Map a client-space position onto the native surface, given where the surface is
/// displayed (`display`, client coordinates) and its native size. `None` while the
/// surface has no displayed area.
pub fn to_native(client: Point, display: Rect, native_w: u32, native_h: u32) -> Option<Point> {
    if display.w <= 0.0 || display.h <= 0.0 {
        return None;
    }
    let scale_x = native_w as f64 / display.w;
    let scale_y = native_h as f64 / display.h;
    Some(Point::new(
        (client.x - display.x) * scale_x,
        (client.y - display.y) * scale_y,
    ))
}

pub struct ScratchSurface {
    brush: ScratchConfig,
    cell: u32,
    cols: usize,
    rows: usize,
    cleared: Vec<bool>,
    cleared_count: usize,
    stroke_active: bool,
}

impl ScratchSurface {
    pub fn new(width: u32, height: u32, brush: ScratchConfig) -> Self {
        let cell = brush.mask_cell.max(1);
        let cols = width.div_ceil(cell) as usize;
        let rows = height.div_ceil(cell) as usize;
        Self {
            brush,
            cell,
            cols,
            rows,
            cleared: vec![false; cols * rows],
            cleared_count: 0,
            stroke_active: false,
        }
    }

    pub fn stroke_active(&self) -> bool {
        self.stroke_active
    }

    pub fn begin_stroke(&mut self) {
        self.stroke_active = true;
    }

    pub fn end_stroke(&mut self) {
        self.stroke_active = false;
    }

    /// Erase around `at` if a stroke is active.
    pub fn scratch<R: Rng + ?Sized>(&mut self, at: Point, rng: &mut R) -> Option<ScratchMark> {
        if !self.stroke_active {
            return None;
        }
        let spread = self.brush.jitter_spread;
        let (jx, jy) = if spread > 0.0 {
            (rng.gen_range(-spread..spread), rng.gen_range(-spread..spread))
        } else {
            (0.0, 0.0)
        };
        let mark = ScratchMark {
            brush: Disc {
                center: at,
                radius: self.brush.radius,
            },
            jitter: Disc {
                center: Point::new(at.x + jx, at.y + jy),
                radius: self.brush.jitter_radius,
            },
        };
        self.erase(mark.brush);
        self.erase(mark.jitter);
        Some(mark)
    }

    /// Clear every cell whose centre lies inside `disc`.
    pub fn erase(&mut self, disc: Disc) {
        let cell = self.cell as f64;
        let lo_col = ((disc.center.x - disc.radius) / cell).floor().max(0.0) as usize;
        let lo_row = ((disc.center.y - disc.radius) / cell).floor().max(0.0) as usize;
        let hi_col = ((disc.center.x + disc.radius) / cell).ceil().max(0.0) as usize;
        let hi_row = ((disc.center.y + disc.radius) / cell).ceil().max(0.0) as usize;
        for row in lo_row..hi_row.min(self.rows) {
            for col in lo_col..hi_col.min(self.cols) {
                let center = Point::new((col as f64 + 0.5) * cell, (row as f64 + 0.5) * cell);
                let idx = row * self.cols + col;
                if !self.cleared[idx] && disc.covers(center) {
                    self.cleared[idx] = true;
                    self.cleared_count += 1;
                }
            }
        }
    }

    pub fn is_cleared(&self, p: Point) -> bool {
        if p.x < 0.0 || p.y < 0.0 {
            return false;
        }
        let col = (p.x / self.cell as f64) as usize;
        let row = (p.y / self.cell as f64) as usize;
        col < self.cols && row < self.rows && self.cleared[row * self.cols + col]
    }

    /// Fraction of the cover already scratched away, in `[0, 1]`.
    pub fn cleared_fraction(&self) -> f64 {
        if self.cleared.is_empty() {
            return 0.0;
        }
        self.cleared_count as f64 / self.cleared.len() as f64
    }
}
