//! Flat-top hexagon math in cube, axial and odd-column offset coordinates.
//!
//! Cube coordinates `(q, r, s)` always satisfy `q + r + s == 0`. Offset
//! coordinates index the grid as `(col, row)` with every odd column pushed
//! half a cell towards larger y.

use std::f64::consts::PI;

use crate::error::HexError;
use crate::geometry::{Point, ScreenSize};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl Hex {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionalHex {
    pub q: f64,
    pub r: f64,
    pub s: f64,
}

impl FractionalHex {
    /// Nearest whole hex. The component with the largest rounding error is
    /// recomputed from the other two so the result stays on the `q+r+s=0` plane.
    pub fn round(self) -> Hex {
        let mut q = self.q.round();
        let mut r = self.r.round();
        let mut s = self.s.round();
        let dq = (q - self.q).abs();
        let dr = (r - self.r).abs();
        let ds = (s - self.s).abs();
        if dq > dr && dq > ds {
            q = -r - s;
        } else if dr > ds {
            r = -q - s;
        } else {
            s = -q - r;
        }
        Hex {
            q: q as i32,
            r: r as i32,
            s: s as i32,
        }
    }
}

/// Which columns are shifted half a cell down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetParity {
    Even = 1,
    Odd = -1,
}

impl TryFrom<i32> for OffsetParity {
    type Error = HexError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OffsetParity::Even),
            -1 => Ok(OffsetParity::Odd),
            other => Err(HexError::InvalidArgument(other)),
        }
    }
}

/// Parity used by the playing surface.
pub const GRID_PARITY: OffsetParity = OffsetParity::Odd;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetCoord {
    pub col: i32,
    pub row: i32,
}

impl OffsetCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

pub fn qoffset_from_cube(parity: OffsetParity, hex: Hex) -> OffsetCoord {
    let offset = parity as i32;
    let col = hex.q;
    let row = hex.r + (hex.q + offset * (hex.q & 1)) / 2;
    OffsetCoord { col, row }
}

pub fn qoffset_to_cube(parity: OffsetParity, coord: OffsetCoord) -> Hex {
    let offset = parity as i32;
    let q = coord.col;
    let r = coord.row - (coord.col + offset * (coord.col & 1)) / 2;
    Hex::new(q, r)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        Self {
            x: p.x as f64,
            y: p.y as f64,
        }
    }
}

/// Flat-top layout: hexagon circumradius plus the pixel position of the
/// center of hex `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub radius: f64,
    pub origin: PointF,
}

impl HexLayout {
    /// Layout whose cells have a radius of half the grid size, shifted so that
    /// cell `(0, 0)` touches the top-left corner of the surface.
    pub fn for_grid_size(grid_size: u32) -> Self {
        let radius = (grid_size.max(2) / 2) as f64;
        Self {
            radius,
            origin: PointF {
                x: radius,
                y: radius * SQRT_3 / 2.0,
            },
        }
    }

    pub fn hex_to_pixel_cube(&self, hex: Hex) -> PointF {
        let q = hex.q as f64;
        let r = hex.r as f64;
        PointF {
            x: (1.5 * q) * self.radius + self.origin.x,
            y: (SQRT_3 / 2.0 * q + SQRT_3 * r) * self.radius + self.origin.y,
        }
    }

    pub fn pixel_to_fractional(&self, point: PointF) -> FractionalHex {
        let x = (point.x - self.origin.x) / self.radius;
        let y = (point.y - self.origin.y) / self.radius;
        let q = 2.0 / 3.0 * x;
        let r = -1.0 / 3.0 * x + SQRT_3 / 3.0 * y;
        FractionalHex { q, r, s: -q - r }
    }

    /// Offset coordinate of the cell containing `point`.
    pub fn pixel_to_hex(&self, point: Point) -> OffsetCoord {
        let hex = self.pixel_to_fractional(point.into()).round();
        qoffset_from_cube(GRID_PARITY, hex)
    }

    /// Pixel center of the cell at `(col, row)`.
    pub fn hex_to_pixel(&self, coord: OffsetCoord) -> PointF {
        self.hex_to_pixel_cube(qoffset_to_cube(GRID_PARITY, coord))
    }

    /// Vertices of the cell, clockwise on screen starting from
    /// the rightmost corner.
    pub fn cell_corners(&self, coord: OffsetCoord) -> [PointF; 6] {
        let center = self.hex_to_pixel(coord);
        std::array::from_fn(|i| {
            let angle = 2.0 * PI * i as f64 / 6.0;
            PointF {
                x: center.x + self.radius * angle.cos(),
                y: center.y + self.radius * angle.sin(),
            }
        })
    }

    /// `(cols, rows)` of cells touched by a surface of the given size.
    ///
    /// The bottom-right corner is projected onto the lattice one axis at a
    /// time: columns from its fractional `q`, rows from its continuous offset
    /// row, which only depends on y. Rounding each keeps the extent monotone in
    /// the surface size.
    pub fn grid_extent(&self, size: ScreenSize) -> (u32, u32) {
        if size.width == 0 || size.height == 0 {
            return (0, 0);
        }
        let frac_col = (size.width as f64 - self.origin.x) / (1.5 * self.radius);
        let frac_row = (size.height as f64 - self.origin.y) / (SQRT_3 * self.radius);
        let cols = frac_col.round() as i64 + 1;
        let rows = frac_row.round() as i64 + 1;
        (cols.max(0) as u32, rows.max(0) as u32)
    }
}
