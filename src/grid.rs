use crate::{Float, SystemError};

/// Number of ghost cells added beyond the physical domain on every side.
pub const GHOST_CELLS: usize = 2;

// corner[0] <-> lower - GHOST_CELLS * cell_size
// corner[origin] <-> 0
// cell i spans corner[i]..corner[i + 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    cell_size: Float,
    origin: (isize, isize),
}

// floor/ceil of `x / h`, snapping quotients that are integers up to round-off
fn snapped(x: Float, h: Float, round: fn(Float) -> Float) -> Float {
    let r = x / h;
    let n = r.round();
    if (r - n).abs() <= 1e-9 * n.abs().max(1.0) {
        n
    } else {
        round(r)
    }
}

// integral float to index, rejecting values an f64 cannot count exactly
fn corner_index(n: Float) -> Option<isize> {
    const EXACT: Float = 9_007_199_254_740_992.0;
    if n.abs() < EXACT {
        isize::try_from(n as i64).ok()
    } else {
        None
    }
}

fn check_bounds(axis: &str, (lower, upper): (Float, Float)) -> Result<(), SystemError> {
    if !lower.is_finite() || !upper.is_finite() {
        return Err(SystemError::InvalidDomain(format!(
            "{axis} bounds ({lower}, {upper}) are not finite"
        )));
    }
    if upper <= lower {
        return Err(SystemError::InvalidDomain(format!(
            "{axis} bounds ({lower}, {upper}) are empty or inverted"
        )));
    }
    Ok(())
}

// cell count (ghost cells included) and origin index along one axis
fn axis(
    name: &str,
    (lower, upper): (Float, Float),
    cell_size: Float,
) -> Result<(usize, isize), SystemError> {
    let too_fine = || {
        SystemError::InvalidDomain(format!(
            "{name} bounds ({lower}, {upper}) hold too many cells of size {cell_size}"
        ))
    };
    let first = corner_index(snapped(lower, cell_size, Float::floor)).ok_or_else(too_fine)?;
    let last = corner_index(snapped(upper, cell_size, Float::ceil)).ok_or_else(too_fine)?;

    let cells = last
        .checked_sub(first)
        .and_then(|c| usize::try_from(c).ok())
        .and_then(|c| c.checked_add(2 * GHOST_CELLS))
        .ok_or_else(too_fine)?;
    let origin = (GHOST_CELLS as isize)
        .checked_sub(first)
        .ok_or_else(too_fine)?;
    Ok((cells, origin))
}

impl Grid {
    /// Builds the grid covering `x_bounds × y_bounds` with square cells of size `cell_size`.
    ///
    /// Bounds are pushed outward to the nearest multiple of the cell size, then
    /// [`GHOST_CELLS`] cells are added on every side. The origin index is the corner
    /// located at the physical origin.
    pub fn from_bounds(
        x_bounds: (Float, Float),
        y_bounds: (Float, Float),
        cell_size: Float,
    ) -> Result<Self, SystemError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SystemError::InvalidDomain(format!(
                "cell size {cell_size} must be positive"
            )));
        }
        check_bounds("x", x_bounds)?;
        check_bounds("y", y_bounds)?;

        let (nx, ox) = axis("x", x_bounds, cell_size)?;
        let (ny, oy) = axis("y", y_bounds, cell_size)?;

        Ok(Self::new(nx, ny, cell_size, (ox, oy)))
    }

    pub fn new(nx: usize, ny: usize, cell_size: Float, origin: (isize, isize)) -> Self {
        Self {
            nx,
            ny,
            cell_size,
            origin,
        }
    }

    /// Number of cells (dual nodes) along each axis, ghost cells included.
    pub fn size(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn origin_index(&self) -> (isize, isize) {
        self.origin
    }

    pub fn cell_size(&self) -> Float {
        self.cell_size
    }

    pub fn corner(&self, i: isize, j: isize) -> [Float; 2] {
        [
            (i - self.origin.0) as Float * self.cell_size,
            (j - self.origin.1) as Float * self.cell_size,
        ]
    }

    pub fn cell_center(&self, i: usize, j: usize) -> [Float; 2] {
        let [x, y] = self.corner(i as isize, j as isize);
        [x + 0.5 * self.cell_size, y + 0.5 * self.cell_size]
    }

    /// Position of `p` in (fractional) corner index units.
    pub fn to_index(&self, p: [Float; 2]) -> [Float; 2] {
        [
            p[0] / self.cell_size + self.origin.0 as Float,
            p[1] / self.cell_size + self.origin.1 as Float,
        ]
    }

    /// Physical extent of the grid, ghost cells excluded.
    pub fn x_limits(&self) -> (Float, Float) {
        let g = GHOST_CELLS as isize;
        (self.corner(g, 0)[0], self.corner(self.nx as isize - g, 0)[0])
    }

    pub fn y_limits(&self) -> (Float, Float) {
        let g = GHOST_CELLS as isize;
        (self.corner(0, g)[1], self.corner(0, self.ny as isize - g)[1])
    }
}
