//! Discrete differential operators between [`Nodes`] and [`Edges`].
//!
//! Every operator works in index units (no cell-size scaling) and reads values
//! outside an array as zero.

use faer_core::MatRef;

use crate::{
    fields::{Dual, Edges, Nodes, Primal},
    Float,
};

#[inline]
fn at(m: MatRef<'_, Float>, i: isize, j: isize) -> Float {
    if i < 0 || j < 0 || i as usize >= m.nrows() || j as usize >= m.ncols() {
        0.0
    } else {
        m[(i as usize, j as usize)]
    }
}

/// `out = (∂s/∂y, -∂s/∂x)`.
pub fn curl_nodes_to(s: &Nodes, out: &mut Edges<Primal>) {
    assert_eq!(s.shape(), out.grid_shape());
    let s = s.as_ref();

    for j in 0..out.u.ncols() {
        for i in 0..out.u.nrows() {
            let (i, j) = (i as isize, j as isize);
            out.u[(i as usize, j as usize)] = at(s, i, j) - at(s, i, j - 1);
        }
    }
    for j in 0..out.v.ncols() {
        for i in 0..out.v.nrows() {
            let (i, j) = (i as isize, j as isize);
            out.v[(i as usize, j as usize)] = at(s, i - 1, j) - at(s, i, j);
        }
    }
}

/// `out = ∂v/∂x - ∂u/∂y`, the transpose of [`curl_nodes_to`].
pub fn curl_edges_to(q: &Edges<Primal>, out: &mut Nodes) {
    assert_eq!(q.grid_shape(), out.shape());
    let (nx, ny) = out.shape();
    for j in 0..ny {
        for i in 0..nx {
            let value = (q.v[(i + 1, j)] - q.v[(i, j)]) - (q.u[(i, j + 1)] - q.u[(i, j)]);
            out.set(i, j, value);
        }
    }
}

pub fn divergence_to(q: &Edges<Dual>, out: &mut Nodes) {
    assert_eq!(q.grid_shape(), out.shape());
    let (nx, ny) = out.shape();
    for j in 0..ny {
        for i in 0..nx {
            let value = (q.u[(i + 1, j)] - q.u[(i, j)]) + (q.v[(i, j + 1)] - q.v[(i, j)]);
            out.set(i, j, value);
        }
    }
}

/// Averages cell-centred values onto the faces of the flux layout.
pub fn shift_nodes_to(w: &Nodes, out: &mut Edges<Dual>) {
    assert_eq!(w.shape(), out.grid_shape());
    let w = w.as_ref();

    for j in 0..out.u.ncols() {
        for i in 0..out.u.nrows() {
            let (i, j) = (i as isize, j as isize);
            out.u[(i as usize, j as usize)] = 0.5 * (at(w, i - 1, j) + at(w, i, j));
        }
    }
    for j in 0..out.v.ncols() {
        for i in 0..out.v.nrows() {
            let (i, j) = (i as isize, j as isize);
            out.v[(i as usize, j as usize)] = 0.5 * (at(w, i, j - 1) + at(w, i, j));
        }
    }
}

/// Moves each velocity component from the tangential layout to the flux layout
/// by averaging its four nearest neighbours.
pub fn shift_edges_to(q: &Edges<Primal>, out: &mut Edges<Dual>) {
    assert_eq!(q.grid_shape(), out.grid_shape());
    let (qu, qv) = (q.u.as_ref(), q.v.as_ref());

    for j in 0..out.u.ncols() {
        for i in 0..out.u.nrows() {
            let (i, j) = (i as isize, j as isize);
            let sum = at(qu, i - 1, j) + at(qu, i - 1, j + 1) + at(qu, i, j) + at(qu, i, j + 1);
            out.u[(i as usize, j as usize)] = 0.25 * sum;
        }
    }
    for j in 0..out.v.ncols() {
        for i in 0..out.v.nrows() {
            let (i, j) = (i as isize, j as isize);
            let sum = at(qv, i, j - 1) + at(qv, i + 1, j - 1) + at(qv, i, j) + at(qv, i + 1, j);
            out.v[(i as usize, j as usize)] = 0.25 * sum;
        }
    }
}
