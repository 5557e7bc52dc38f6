use std::f64::consts::PI;

use faer_core::{mul::matmul, zipped, Mat, MatMut, MatRef, Parallelism};
use reborrow::*;

use crate::{fields::Nodes, Float};

// orthogonal (up to a factor (n + 1) / 2) and symmetric sine basis
// S[k, i] = sin(π (k + 1) (i + 1) / (n + 1))
fn sine_basis(n: usize) -> Mat<Float> {
    let h = PI / (n + 1) as Float;
    Mat::from_fn(n, n, |k, i| (h * ((k + 1) * (i + 1)) as Float).sin())
}

// eigenvalues of the 1D second difference with homogeneous Dirichlet ends
fn eigenvalues(n: usize) -> impl Iterator<Item = Float> {
    let h = PI / (n + 1) as Float;
    (0..n).map(move |k| 2.0 * (h * (k + 1) as Float).cos() - 2.0)
}

/// Five-point Laplacian on an `nx × ny` node field, zero outside the array,
/// together with its exact inverse through a discrete sine transform.
///
/// The transforms and eigenvalues are planned once; every solve afterwards costs
/// four dense products and reuses the operator's own buffer.
#[derive(Clone, Debug)]
pub struct Laplacian {
    sx: Mat<Float>,
    sy: Mat<Float>,
    inv_eigen: Mat<Float>,
    normalization: Float,
    scratch: Mat<Float>,
}

impl Laplacian {
    pub fn new((nx, ny): (usize, usize)) -> Self {
        let lx: Vec<Float> = eigenvalues(nx).collect();
        let ly: Vec<Float> = eigenvalues(ny).collect();
        tracing::event!(
            tracing::Level::DEBUG,
            "planning Poisson solver on {}×{} nodes",
            nx,
            ny
        );
        Self {
            sx: sine_basis(nx),
            sy: sine_basis(ny),
            // every eigenvalue is strictly negative, so this never divides by zero
            inv_eigen: Mat::from_fn(nx, ny, |i, j| 1.0 / (lx[i] + ly[j])),
            normalization: 4.0 / ((nx + 1) * (ny + 1)) as Float,
            scratch: Mat::zeros(nx, ny),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.sx.nrows(), self.sy.nrows())
    }

    /// `out = L s`.
    pub fn apply_to(&self, s: &Nodes, out: &mut Nodes) {
        assert_eq!(s.shape(), self.shape());
        assert_eq!(out.shape(), self.shape());
        stencil(s.as_ref(), out.as_mut());
    }

    pub fn apply(&self, s: &Nodes) -> Nodes {
        let mut out = Nodes::zeros(s.shape());
        self.apply_to(s, &mut out);
        out
    }

    /// `out = L⁻¹ w`.
    pub fn solve_to(&mut self, w: &Nodes, out: &mut Nodes) {
        assert_eq!(w.shape(), self.shape());
        assert_eq!(out.shape(), self.shape());

        // forward transform: scratch = Sx w Sy
        matmul(
            out.as_mut(),
            self.sx.as_ref(),
            w.as_ref(),
            None,
            1.0,
            Parallelism::None,
        );
        matmul(
            self.scratch.as_mut(),
            out.as_ref(),
            self.sy.as_ref(),
            None,
            1.0,
            Parallelism::None,
        );

        // diagonal solve
        zipped!(self.scratch.as_mut(), self.inv_eigen.as_ref())
            .for_each(|mut s, e| s.write(s.read() * e.read()));

        // backward transform: out = c Sx scratch Sy
        let mut tmp = out.as_mut();
        matmul(
            tmp.rb_mut(),
            self.sx.as_ref(),
            self.scratch.as_ref(),
            None,
            1.0,
            Parallelism::None,
        );
        self.scratch.as_mut().clone_from(tmp.rb());
        matmul(
            out.as_mut(),
            self.scratch.as_ref(),
            self.sy.as_ref(),
            None,
            self.normalization,
            Parallelism::None,
        );
    }

    pub fn solve(&mut self, w: &Nodes) -> Nodes {
        let mut out = Nodes::zeros(w.shape());
        self.solve_to(w, &mut out);
        out
    }
}

fn stencil(s: MatRef<'_, Float>, mut out: MatMut<'_, Float>) {
    let (nx, ny) = (s.nrows(), s.ncols());
    for j in 0..ny {
        for i in 0..nx {
            let mut acc = -4.0 * s[(i, j)];
            if i > 0 {
                acc += s[(i - 1, j)];
            }
            if i + 1 < nx {
                acc += s[(i + 1, j)];
            }
            if j > 0 {
                acc += s[(i, j - 1)];
            }
            if j + 1 < ny {
                acc += s[(i, j + 1)];
            }
            out[(i, j)] = acc;
        }
    }
}
