use std::borrow::Cow;

use crate::{
    fields::{Nodes, PointData, Primal},
    laplacian::Laplacian,
    ops,
    regularize::TransferOperators,
    system::Workspace,
    SystemError,
};

/// The pair of linear operators enforcing no-slip at the boundary points.
///
/// `apply` maps a surface traction to a vorticity tendency, `sample` maps a
/// vorticity field to the velocity it induces at the points (with the sign used
/// by the constraint equation). For a streamfunction `s`,
/// `⟨apply(f), s⟩ = ⟨f, -sample(L s)⟩`.
pub trait Constraint {
    fn grid_shape(&self) -> (usize, usize);
    fn point_count(&self) -> usize;

    fn apply_to(&mut self, f: &PointData, out: &mut Nodes) -> Result<(), SystemError>;
    fn sample_to(&mut self, w: &Nodes, out: &mut PointData) -> Result<(), SystemError>;

    fn apply(&mut self, f: &PointData) -> Result<Nodes, SystemError> {
        let mut out = Nodes::zeros(self.grid_shape());
        self.apply_to(f, &mut out)?;
        Ok(out)
    }

    fn sample(&mut self, w: &Nodes) -> Result<PointData, SystemError> {
        let mut out = PointData::zeros(self.point_count());
        self.sample_to(w, &mut out)?;
        Ok(out)
    }
}

/// Constraint operators bound to one set of transfer operators.
///
/// Borrows the system's Poisson solver and scratch space, so the system cannot be
/// evaluated again until this value is dropped.
pub struct ConstraintOperators<'a> {
    transfer: Cow<'a, TransferOperators<Primal>>,
    laplacian: &'a mut Laplacian,
    workspace: &'a mut Workspace,
}

impl<'a> ConstraintOperators<'a> {
    pub(crate) fn new(
        transfer: Cow<'a, TransferOperators<Primal>>,
        laplacian: &'a mut Laplacian,
        workspace: &'a mut Workspace,
    ) -> Self {
        Self {
            transfer,
            laplacian,
            workspace,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self.transfer, Cow::Borrowed(_))
    }

    fn check(&self, f_len: usize, nodes: (usize, usize)) -> Result<(), SystemError> {
        SystemError::check_shape("boundary data", (self.point_count(), 2), (f_len, 2))?;
        SystemError::check_shape("vorticity", self.grid_shape(), nodes)
    }
}

impl Constraint for ConstraintOperators<'_> {
    fn grid_shape(&self) -> (usize, usize) {
        self.laplacian.shape()
    }

    fn point_count(&self) -> usize {
        self.transfer.point_count()
    }

    /// `out = curl(Eᵀ f)`.
    fn apply_to(&mut self, f: &PointData, out: &mut Nodes) -> Result<(), SystemError> {
        self.check(f.len(), out.shape())?;
        let ws = &mut *self.workspace;
        self.transfer.spread_to(f, &mut ws.velocity);
        ops::curl_edges_to(&ws.velocity, out);
        Ok(())
    }

    /// `out = -E curl(L⁻¹ w)`.
    fn sample_to(&mut self, w: &Nodes, out: &mut PointData) -> Result<(), SystemError> {
        self.check(out.len(), w.shape())?;
        let ws = &mut *self.workspace;
        self.laplacian.solve_to(w, &mut ws.streamfunction);
        ops::curl_nodes_to(&ws.streamfunction, &mut ws.velocity);
        self.transfer.sample_to(&ws.velocity, out);
        out.scale(-1.0);
        Ok(())
    }
}
