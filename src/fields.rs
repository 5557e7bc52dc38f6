//! Grid and point data containers.
//!
//! Scalars live at cell centres (dual nodes). Vector quantities live on cell faces in
//! one of two staggered layouts, distinguished at the type level by an [`EdgeKind`].

use std::marker::PhantomData;

use faer_core::{zipped, Mat, MatMut, MatRef};

use crate::{Float, SystemError};

/// Scalar field on the `nx × ny` dual nodes (cell centres).
#[derive(Clone, Debug)]
pub struct Nodes {
    inner: Mat<Float>,
}

impl Nodes {
    pub fn zeros((nx, ny): (usize, usize)) -> Self {
        Self {
            inner: Mat::zeros(nx, ny),
        }
    }

    pub fn from_fn((nx, ny): (usize, usize), f: impl FnMut(usize, usize) -> Float) -> Self {
        Self {
            inner: Mat::from_fn(nx, ny, f),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.inner.nrows(), self.inner.ncols())
    }

    pub fn as_ref(&self) -> MatRef<'_, Float> {
        self.inner.as_ref()
    }

    pub fn as_mut(&mut self) -> MatMut<'_, Float> {
        self.inner.as_mut()
    }

    pub fn get(&self, i: usize, j: usize) -> Float {
        self.inner[(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: Float) {
        self.inner[(i, j)] = value;
    }

    pub fn copy_from(&mut self, other: &Nodes) {
        assert_eq!(self.shape(), other.shape());
        zipped!(self.inner.as_mut(), other.inner.as_ref()).for_each(|mut a, b| a.write(b.read()));
    }

    pub fn scale(&mut self, factor: Float) {
        scale_mat(self.inner.as_mut(), factor)
    }

    pub fn dot(&self, other: &Nodes) -> Float {
        assert_eq!(self.shape(), other.shape());
        dot_mat(self.inner.as_ref(), other.inner.as_ref())
    }

    pub fn sum(&self) -> Float {
        sum_mat(self.inner.as_ref())
    }

    pub fn max_abs(&self) -> Float {
        max_abs_mat(self.inner.as_ref())
    }
}

/// Placement of the two components of an [`Edges`] field.
pub trait EdgeKind: Copy + Default + std::fmt::Debug + 'static {
    /// Shape of the `u` component for a grid of `nx × ny` cells.
    fn u_shape(nx: usize, ny: usize) -> (usize, usize);
    fn v_shape(nx: usize, ny: usize) -> (usize, usize);

    /// Location of `u[(0, 0)]` in corner index units. Entry `(i, j)` sits at
    /// `U_OFFSET + (i, j)`.
    const U_OFFSET: [Float; 2];
    const V_OFFSET: [Float; 2];
}

/// Tangential layout: `u` on horizontal faces, `v` on vertical faces. Curls of
/// node fields land here.
#[derive(Clone, Copy, Debug, Default)]
pub struct Primal;

/// Flux layout: `u` on vertical faces, `v` on horizontal faces. Divergences are
/// taken from here.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dual;

impl EdgeKind for Primal {
    fn u_shape(nx: usize, ny: usize) -> (usize, usize) {
        (nx, ny + 1)
    }

    fn v_shape(nx: usize, ny: usize) -> (usize, usize) {
        (nx + 1, ny)
    }

    const U_OFFSET: [Float; 2] = [0.5, 0.0];
    const V_OFFSET: [Float; 2] = [0.0, 0.5];
}

impl EdgeKind for Dual {
    fn u_shape(nx: usize, ny: usize) -> (usize, usize) {
        (nx + 1, ny)
    }

    fn v_shape(nx: usize, ny: usize) -> (usize, usize) {
        (nx, ny + 1)
    }

    const U_OFFSET: [Float; 2] = [0.0, 0.5];
    const V_OFFSET: [Float; 2] = [0.5, 0.0];
}

/// Two-component face field for a grid of `nx × ny` cells.
#[derive(Clone, Debug)]
pub struct Edges<K: EdgeKind> {
    pub u: Mat<Float>,
    pub v: Mat<Float>,
    cells: (usize, usize),
    _kind: PhantomData<K>,
}

impl<K: EdgeKind> Edges<K> {
    pub fn zeros((nx, ny): (usize, usize)) -> Self {
        let (ur, uc) = K::u_shape(nx, ny);
        let (vr, vc) = K::v_shape(nx, ny);
        Self {
            u: Mat::zeros(ur, uc),
            v: Mat::zeros(vr, vc),
            cells: (nx, ny),
            _kind: PhantomData,
        }
    }

    /// Cell counts of the grid this field belongs to.
    pub fn grid_shape(&self) -> (usize, usize) {
        self.cells
    }

    pub fn fill(&mut self, u: Float, v: Float) {
        fill_mat(self.u.as_mut(), u);
        fill_mat(self.v.as_mut(), v);
    }

    pub fn scale(&mut self, factor: Float) {
        scale_mat(self.u.as_mut(), factor);
        scale_mat(self.v.as_mut(), factor);
    }

    /// Adds `du` to every `u` entry and `dv` to every `v` entry.
    pub fn offset(&mut self, du: Float, dv: Float) {
        offset_mat(self.u.as_mut(), du);
        offset_mat(self.v.as_mut(), dv);
    }

    /// Elementwise (Hadamard) product, in place.
    pub fn mul_assign(&mut self, other: &Edges<K>) {
        assert_eq!(self.grid_shape(), other.grid_shape());
        mul_mat(self.u.as_mut(), other.u.as_ref());
        mul_mat(self.v.as_mut(), other.v.as_ref());
    }

    pub fn dot(&self, other: &Edges<K>) -> Float {
        assert_eq!(self.grid_shape(), other.grid_shape());
        dot_mat(self.u.as_ref(), other.u.as_ref()) + dot_mat(self.v.as_ref(), other.v.as_ref())
    }

    pub fn max_abs(&self) -> Float {
        max_abs_mat(self.u.as_ref()).max(max_abs_mat(self.v.as_ref()))
    }
}

/// One `(x, y)` pair per boundary point, stored as an `n × 2` matrix.
#[derive(Clone, Debug)]
pub struct PointData {
    inner: Mat<Float>,
}

impl PointData {
    pub fn zeros(n: usize) -> Self {
        Self {
            inner: Mat::zeros(n, 2),
        }
    }

    pub fn from_fn(n: usize, mut f: impl FnMut(usize) -> [Float; 2]) -> Self {
        let mut out = Self::zeros(n);
        for k in 0..n {
            let [u, v] = f(k);
            out.set(k, [u, v]);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.inner.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, k: usize) -> [Float; 2] {
        [self.inner[(k, 0)], self.inner[(k, 1)]]
    }

    pub fn set(&mut self, k: usize, [u, v]: [Float; 2]) {
        self.inner[(k, 0)] = u;
        self.inner[(k, 1)] = v;
    }

    pub fn fill(&mut self, [u, v]: [Float; 2]) {
        fill_mat(self.inner.as_mut().col(0), u);
        fill_mat(self.inner.as_mut().col(1), v);
    }

    pub fn as_mut(&mut self) -> MatMut<'_, Float> {
        self.inner.as_mut()
    }

    pub fn scale(&mut self, factor: Float) {
        scale_mat(self.inner.as_mut(), factor)
    }

    pub fn dot(&self, other: &PointData) -> Float {
        assert_eq!(self.len(), other.len());
        dot_mat(self.inner.as_ref(), other.inner.as_ref())
    }

    pub fn as_ref(&self) -> MatRef<'_, Float> {
        self.inner.as_ref()
    }
}

/// Ordered cloud of boundary point positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryPoints {
    points: Vec<[Float; 2]>,
}

impl BoundaryPoints {
    pub fn new(points: Vec<[Float; 2]>) -> Self {
        Self { points }
    }

    /// Builds the point set from interleaved `x0, y0, x1, y1, ...` coordinates.
    pub fn from_flat(coords: &[Float]) -> Result<Self, SystemError> {
        if coords.len() % 2 != 0 {
            return Err(SystemError::DimensionMismatch {
                what: "flattened boundary coordinates",
                expected: (coords.len() / 2, 2),
                found: (coords.len(), 1),
            });
        }
        Ok(Self::new(
            coords.chunks_exact(2).map(|c| [c[0], c[1]]).collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = [Float; 2]> + '_ {
        self.points.iter().copied()
    }

    pub fn as_slice(&self) -> &[[Float; 2]] {
        &self.points
    }
}

impl FromIterator<[Float; 2]> for BoundaryPoints {
    fn from_iter<T: IntoIterator<Item = [Float; 2]>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub(crate) fn fill_mat(m: MatMut<'_, Float>, value: Float) {
    m.cwise().for_each(|mut c| c.write(value));
}

fn scale_mat(m: MatMut<'_, Float>, factor: Float) {
    m.cwise().for_each(|mut c| c.write(factor * c.read()));
}

fn offset_mat(m: MatMut<'_, Float>, delta: Float) {
    m.cwise().for_each(|mut c| c.write(c.read() + delta));
}

fn mul_mat(a: MatMut<'_, Float>, b: MatRef<'_, Float>) {
    zipped!(a, b).for_each(|mut a, b| a.write(a.read() * b.read()));
}

fn dot_mat(a: MatRef<'_, Float>, b: MatRef<'_, Float>) -> Float {
    let mut acc = 0.0;
    zipped!(a, b).for_each(|a, b| acc += a.read() * b.read());
    acc
}

fn sum_mat(a: MatRef<'_, Float>) -> Float {
    let mut acc = 0.0;
    a.cwise().for_each(|c| acc += c.read());
    acc
}

fn max_abs_mat(a: MatRef<'_, Float>) -> Float {
    let mut acc: Float = 0.0;
    a.cwise().for_each(|c| acc = acc.max(c.read().abs()));
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_layouts_match_grid() {
        let p = Edges::<Primal>::zeros((5, 3));
        assert_eq!((p.u.nrows(), p.u.ncols()), (5, 4));
        assert_eq!((p.v.nrows(), p.v.ncols()), (6, 3));
        assert_eq!(p.grid_shape(), (5, 3));

        let d = Edges::<Dual>::zeros((5, 3));
        assert_eq!((d.u.nrows(), d.u.ncols()), (6, 3));
        assert_eq!((d.v.nrows(), d.v.ncols()), (5, 4));
        assert_eq!(d.grid_shape(), (5, 3));
    }

    #[test]
    fn flat_coordinates() {
        let pts = BoundaryPoints::from_flat(&[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(pts.as_slice(), &[[0.0, 1.0], [2.0, 3.0]]);

        assert!(matches!(
            BoundaryPoints::from_flat(&[0.0, 1.0, 2.0]),
            Err(SystemError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn hadamard_and_dot() {
        let mut a = Edges::<Dual>::zeros((2, 2));
        let mut b = Edges::<Dual>::zeros((2, 2));
        a.fill(2.0, 3.0);
        b.fill(-1.0, 0.5);
        a.mul_assign(&b);
        // 6 u-entries at -2, 6 v-entries at 1.5
        assert_eq!(a.dot(&a), 6.0 * 4.0 + 6.0 * 2.25);
        assert_eq!(a.max_abs(), 2.0);
    }
}
