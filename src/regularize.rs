//! Transfer of data between boundary points and grid faces.
//!
//! Spreading (point → grid) and sampling (grid → point) share a single list of
//! kernel weights, which makes each the exact transpose of the other.

use std::marker::PhantomData;

use faer_core::{Mat, MatMut, MatRef};

use crate::{
    fields::{BoundaryPoints, EdgeKind, Edges, PointData, Primal},
    grid::Grid,
    Float,
};

/// Discrete delta function used to smear a point over nearby faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeltaKernel {
    /// Roma, Peskin & Berger three-point kernel.
    #[default]
    Roma,
    /// Monaghan's M4' kernel (four-point support).
    M4Prime,
}

impl DeltaKernel {
    /// Half-width of the kernel support, in cells.
    pub fn support(self) -> Float {
        match self {
            DeltaKernel::Roma => 1.5,
            DeltaKernel::M4Prime => 2.0,
        }
    }

    pub fn eval(self, r: Float) -> Float {
        let r = r.abs();
        match self {
            DeltaKernel::Roma => {
                if r <= 0.5 {
                    (1.0 + (1.0 - 3.0 * r * r).sqrt()) / 3.0
                } else if r <= 1.5 {
                    let s = 1.0 - r;
                    (5.0 - 3.0 * r - (1.0 - 3.0 * s * s).max(0.0).sqrt()) / 6.0
                } else {
                    0.0
                }
            }
            DeltaKernel::M4Prime => {
                if r <= 1.0 {
                    1.0 - 2.5 * r * r + 1.5 * r * r * r
                } else if r <= 2.0 {
                    0.5 * (2.0 - r) * (2.0 - r) * (1.0 - r)
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Weight {
    point: usize,
    i: usize,
    j: usize,
    value: Float,
}

/// Spreading/sampling pair for a fixed point cloud on a fixed grid.
#[derive(Clone, Debug)]
pub struct TransferOperators<K: EdgeKind = Primal> {
    points: usize,
    cells: (usize, usize),
    u: Vec<Weight>,
    v: Vec<Weight>,
    _kind: PhantomData<K>,
}

// weights of one point for one component whose entry (0, 0) sits at `offset`
fn component_weights(
    kernel: DeltaKernel,
    grid: &Grid,
    point: usize,
    p: [Float; 2],
    offset: [Float; 2],
    (rows, cols): (usize, usize),
    out: &mut Vec<Weight>,
) {
    let [xi, yi] = grid.to_index(p);
    // local index coordinates of the point within this component's array
    let (rx, ry) = (xi - offset[0], yi - offset[1]);
    let support = kernel.support();

    let range = |r: Float, len: usize| {
        let lo = (r - support).ceil().max(0.0) as usize;
        let hi = (r + support).floor().min(len as Float - 1.0);
        if hi < 0.0 {
            (1, 0)
        } else {
            (lo, hi as usize)
        }
    };

    let (i_lo, i_hi) = range(rx, rows);
    let (j_lo, j_hi) = range(ry, cols);

    for j in j_lo..=j_hi {
        let wy = kernel.eval(j as Float - ry);
        if wy == 0.0 {
            continue;
        }
        for i in i_lo..=i_hi {
            let value = kernel.eval(i as Float - rx) * wy;
            if value != 0.0 {
                out.push(Weight { point, i, j, value });
            }
        }
    }
}

impl<K: EdgeKind> TransferOperators<K> {
    pub fn new(points: &BoundaryPoints, grid: &Grid, kernel: DeltaKernel) -> Self {
        let (nx, ny) = grid.size();
        let (mut u, mut v) = (Vec::new(), Vec::new());

        for (k, p) in points.iter().enumerate() {
            component_weights(kernel, grid, k, p, K::U_OFFSET, K::u_shape(nx, ny), &mut u);
            component_weights(kernel, grid, k, p, K::V_OFFSET, K::v_shape(nx, ny), &mut v);
        }

        tracing::event!(
            tracing::Level::DEBUG,
            "built {:?} transfer operators for {} points ({} weights)",
            kernel,
            points.len(),
            u.len() + v.len()
        );

        Self {
            points: points.len(),
            cells: (nx, ny),
            u,
            v,
            _kind: PhantomData,
        }
    }

    pub fn point_count(&self) -> usize {
        self.points
    }

    /// `out = Eᵀ f`, overwriting `out`.
    pub fn spread_to(&self, f: &PointData, out: &mut Edges<K>) {
        assert_eq!(f.len(), self.points);
        assert_eq!(out.grid_shape(), self.cells);
        out.fill(0.0, 0.0);

        let f = f.as_ref();
        scatter(&self.u, f, 0, &mut out.u);
        scatter(&self.v, f, 1, &mut out.v);
    }

    pub fn spread(&self, f: &PointData) -> Edges<K> {
        let mut out = Edges::zeros(self.cells);
        self.spread_to(f, &mut out);
        out
    }

    /// `out = E q`, overwriting `out`.
    pub fn sample_to(&self, q: &Edges<K>, out: &mut PointData) {
        assert_eq!(out.len(), self.points);
        assert_eq!(q.grid_shape(), self.cells);

        out.fill([0.0, 0.0]);

        gather(&self.u, &q.u, 0, out.as_mut());
        gather(&self.v, &q.v, 1, out.as_mut());
    }

    pub fn sample(&self, q: &Edges<K>) -> PointData {
        let mut out = PointData::zeros(self.points);
        self.sample_to(q, &mut out);
        out
    }
}

fn gather(
    weights: &[Weight],
    q: &Mat<Float>,
    component: usize,
    mut out: MatMut<'_, Float>,
) {
    for w in weights {
        out[(w.point, component)] += w.value * q[(w.i, w.j)];
    }
}

fn scatter(
    weights: &[Weight],
    f: MatRef<'_, Float>,
    component: usize,
    out: &mut Mat<Float>,
) {
    for w in weights {
        out[(w.i, w.j)] += w.value * f[(w.point, component)];
    }
}
