use std::{borrow::Cow, fmt, marker::PhantomData};

use crate::{
    constraint::ConstraintOperators,
    fields::{BoundaryPoints, Dual, Edges, Nodes, PointData, Primal},
    grid::Grid,
    laplacian::Laplacian,
    motion::{FreeStream, Motion},
    ops,
    params::Parameters,
    regularize::{DeltaKernel, TransferOperators},
    rk::RkCoefficients,
    Float, SystemError,
};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Static {}
    impl Sealed for super::Moving {}
}

/// Whether boundary points stay put in the inertial frame.
pub trait BodyKinematics: sealed::Sealed {
    const STATIC: bool;
    const NAME: &'static str;
}

/// Body fixed in the inertial frame.
#[derive(Clone, Copy, Debug)]
pub struct Static;

/// Body whose inertial point positions are supplied at every call.
#[derive(Clone, Copy, Debug)]
pub struct Moving;

impl BodyKinematics for Static {
    const STATIC: bool = true;
    const NAME: &'static str = "static";
}

impl BodyKinematics for Moving {
    const STATIC: bool = false;
    const NAME: &'static str = "moving";
}

enum TransferPolicy {
    Cached(TransferOperators<Primal>),
    OnTheFly,
}

/// Scratch fields overwritten by every evaluation.
pub(crate) struct Workspace {
    pub(crate) streamfunction: Nodes,
    pub(crate) velocity: Edges<Primal>,
    pub(crate) flux: Edges<Dual>,
    pub(crate) shifted: Edges<Dual>,
}

impl Workspace {
    fn new(shape: (usize, usize)) -> Self {
        Self {
            streamfunction: Nodes::zeros(shape),
            velocity: Edges::zeros(shape),
            flux: Edges::zeros(shape),
            shifted: Edges::zeros(shape),
        }
    }
}

/// Vorticity-form Navier–Stokes system constrained by an immersed boundary.
///
/// The system owns the grid, the planned Poisson solver, the boundary points and
/// a set of scratch fields. Every evaluation overwrites that scratch space, so a
/// system must be driven from one thread, one call at a time. Independent runs
/// each need their own system.
pub struct NavierStokes<K: BodyKinematics> {
    reynolds: Float,
    grid: Grid,
    time_step: Float,
    free_stream: FreeStream,
    rk: RkCoefficients,
    laplacian: Laplacian,
    points: BoundaryPoints,
    kernel: DeltaKernel,
    policy: TransferPolicy,
    workspace: Workspace,
    _kinematics: PhantomData<K>,
}

/// A system whose body kinematics were chosen at run time.
pub enum System {
    Static(NavierStokes<Static>),
    Moving(NavierStokes<Moving>),
}

fn positive(what: &str, value: Float) -> Result<(), SystemError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SystemError::Configuration(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

impl<K: BodyKinematics> NavierStokes<K> {
    pub fn new(params: Parameters) -> Result<Self, SystemError> {
        let Parameters {
            reynolds,
            cell_size,
            x_bounds,
            y_bounds,
            time_step,
            free_stream,
            points,
            cache_transfer,
            static_boundary,
            kernel,
            rk,
        } = params;

        if static_boundary != K::STATIC {
            return Err(SystemError::Configuration(format!(
                "parameters describe a {} body, system expects a {} one",
                if static_boundary { "static" } else { "moving" },
                K::NAME
            )));
        }
        if cache_transfer && !K::STATIC {
            return Err(SystemError::Configuration(
                "transfer operators cannot be cached for a moving body".into(),
            ));
        }
        positive("Reynolds number", reynolds)?;
        positive("time step", time_step)?;

        let grid = Grid::from_bounds(x_bounds, y_bounds, cell_size)?;
        let policy = if cache_transfer {
            TransferPolicy::Cached(TransferOperators::new(&points, &grid, kernel))
        } else {
            TransferPolicy::OnTheFly
        };

        let system = Self {
            reynolds,
            grid,
            time_step,
            free_stream,
            rk,
            laplacian: Laplacian::new(grid.size()),
            points,
            kernel,
            policy,
            workspace: Workspace::new(grid.size()),
            _kinematics: PhantomData,
        };

        tracing::event!(tracing::Level::INFO, "built {system}");

        Ok(system)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_size(&self) -> (usize, usize) {
        self.grid.size()
    }

    pub fn origin_index(&self) -> (isize, isize) {
        self.grid.origin_index()
    }

    pub fn cell_size(&self) -> Float {
        self.grid.cell_size()
    }

    pub fn time_step(&self) -> Float {
        self.time_step
    }

    pub fn reynolds(&self) -> Float {
        self.reynolds
    }

    pub fn rk(&self) -> &RkCoefficients {
        &self.rk
    }

    pub fn kernel(&self) -> DeltaKernel {
        self.kernel
    }

    /// Configured boundary points; body-frame positions for a moving body.
    pub fn points(&self) -> &BoundaryPoints {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn caches_transfer_operators(&self) -> bool {
        matches!(self.policy, TransferPolicy::Cached(_))
    }

    pub fn free_stream(&self, t: Float) -> [Float; 2] {
        self.free_stream.velocity(t)
    }

    /// `Δt / (Re Δx²)`, the diffusion number of the integrating factor.
    pub fn integrating_factor_parameter(&self, time_step: Float) -> Float {
        let h = self.grid.cell_size();
        time_step / (self.reynolds * h * h)
    }

    /// Total circulation carried by the grid vorticity `w`.
    pub fn circulation(&self, w: &Nodes) -> Result<Float, SystemError> {
        self.check_nodes("vorticity", w)?;
        Ok(self.grid.cell_size() * w.sum())
    }

    /// Writes `-∇·(ω u) / Δx` into `out`, `u` being the velocity induced by `w`
    /// plus the free stream at time `t`.
    pub fn convective_rhs_to(
        &mut self,
        w: &Nodes,
        t: Float,
        out: &mut Nodes,
    ) -> Result<(), SystemError> {
        self.check_nodes("vorticity", w)?;
        self.check_nodes("convective tendency", out)?;
        tracing::event!(tracing::Level::TRACE, "convective rhs at t={t}");

        let [u_inf, v_inf] = self.free_stream.velocity(t);
        let ws = &mut self.workspace;

        // curl(L⁻¹ w) is minus the induced velocity
        self.laplacian.solve_to(w, &mut ws.streamfunction);
        ops::curl_nodes_to(&ws.streamfunction, &mut ws.velocity);
        ops::shift_edges_to(&ws.velocity, &mut ws.flux);
        ws.flux.offset(-u_inf, -v_inf);

        ops::shift_nodes_to(w, &mut ws.shifted);
        ws.shifted.mul_assign(&ws.flux);
        ops::divergence_to(&ws.shifted, out);
        out.scale(1.0 / self.grid.cell_size());

        Ok(())
    }

    pub fn convective_rhs(&mut self, w: &Nodes, t: Float) -> Result<Nodes, SystemError> {
        let mut out = Nodes::zeros(self.grid.size());
        self.convective_rhs_to(w, t, &mut out)?;
        Ok(out)
    }

    fn check_nodes(&self, what: &'static str, w: &Nodes) -> Result<(), SystemError> {
        SystemError::check_shape(what, self.grid.size(), w.shape())
    }

    fn check_points(&self, what: &'static str, found: usize) -> Result<(), SystemError> {
        SystemError::check_shape(what, (self.points.len(), 2), (found, 2))
    }

    fn require_points(&self) -> Result<(), SystemError> {
        if self.points.is_empty() {
            Err(SystemError::Configuration(
                "constraint operators requested but no boundary points were configured".into(),
            ))
        } else {
            Ok(())
        }
    }

    // relative surface velocity `body - free stream`, broadcast to every point
    fn fill_mismatch(
        &self,
        w: &Nodes,
        t: Float,
        body: [Float; 2],
        out: &mut PointData,
    ) -> Result<(), SystemError> {
        self.check_nodes("vorticity", w)?;
        self.check_points("surface velocity", out.len())?;
        let [u_inf, v_inf] = self.free_stream.velocity(t);
        out.fill([body[0] - u_inf, body[1] - v_inf]);
        Ok(())
    }
}

impl NavierStokes<Static> {
    /// Surface velocity the constraint must reproduce: minus the free stream.
    pub fn body_constraint_rhs_to(
        &self,
        w: &Nodes,
        t: Float,
        out: &mut PointData,
    ) -> Result<(), SystemError> {
        self.fill_mismatch(w, t, [0.0, 0.0], out)
    }

    pub fn body_constraint_rhs(&self, w: &Nodes, t: Float) -> Result<PointData, SystemError> {
        let mut out = PointData::zeros(self.points.len());
        self.body_constraint_rhs_to(w, t, &mut out)?;
        Ok(out)
    }

    /// Operators coupling the surface traction and the vorticity at the fixed
    /// boundary points, reusing the cached transfer operators when present.
    pub fn constraint_operators(
        &mut self,
        w: &Nodes,
        t: Float,
    ) -> Result<ConstraintOperators<'_>, SystemError> {
        self.require_points()?;
        self.check_nodes("vorticity", w)?;

        let transfer = match &self.policy {
            TransferPolicy::Cached(transfer) => Cow::Borrowed(transfer),
            TransferPolicy::OnTheFly => {
                tracing::event!(
                    tracing::Level::DEBUG,
                    "rebuilding transfer operators at t={t}"
                );
                Cow::Owned(TransferOperators::new(&self.points, &self.grid, self.kernel))
            }
        };

        Ok(ConstraintOperators::new(
            transfer,
            &mut self.laplacian,
            &mut self.workspace,
        ))
    }
}

impl NavierStokes<Moving> {
    /// Surface velocity the constraint must reproduce: the body velocity given by
    /// `motion` relative to the free stream.
    pub fn body_constraint_rhs_to(
        &self,
        w: &Nodes,
        t: Float,
        motion: &dyn Motion,
        out: &mut PointData,
    ) -> Result<(), SystemError> {
        self.fill_mismatch(w, t, motion.velocity(t), out)
    }

    pub fn body_constraint_rhs(
        &self,
        w: &Nodes,
        t: Float,
        motion: &dyn Motion,
    ) -> Result<PointData, SystemError> {
        let mut out = PointData::zeros(self.points.len());
        self.body_constraint_rhs_to(w, t, motion, &mut out)?;
        Ok(out)
    }

    /// Operators built from `current`, the inertial positions of the boundary
    /// points at time `t`.
    ///
    /// `current` must hold exactly as many points as the configured body; any
    /// other length is a [`SystemError::DimensionMismatch`].
    pub fn constraint_operators(
        &mut self,
        w: &Nodes,
        t: Float,
        current: &BoundaryPoints,
    ) -> Result<ConstraintOperators<'_>, SystemError> {
        self.require_points()?;
        self.check_nodes("vorticity", w)?;
        self.check_points("current boundary points", current.len())?;

        tracing::event!(
            tracing::Level::DEBUG,
            "building transfer operators for moved body at t={t}"
        );
        let transfer = TransferOperators::<Primal>::new(current, &self.grid, self.kernel);

        Ok(ConstraintOperators::new(
            Cow::Owned(transfer),
            &mut self.laplacian,
            &mut self.workspace,
        ))
    }
}

impl<K: BodyKinematics> fmt::Display for NavierStokes<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nx, ny) = self.grid.size();
        write!(
            f,
            "Navier-Stokes system (Re={}, Δx={:e}, Δt={:e}, {}×{} cells, {} {} points, {})",
            self.reynolds,
            self.grid.cell_size(),
            self.time_step,
            nx,
            ny,
            self.points.len(),
            K::NAME,
            if self.caches_transfer_operators() {
                "cached transfer operators"
            } else {
                "transfer operators built per call"
            }
        )
    }
}

impl System {
    pub fn is_static(&self) -> bool {
        matches!(self, System::Static(_))
    }

    pub fn grid(&self) -> &Grid {
        match self {
            System::Static(sys) => sys.grid(),
            System::Moving(sys) => sys.grid(),
        }
    }

    pub fn integrating_factor_parameter(&self, time_step: Float) -> Float {
        match self {
            System::Static(sys) => sys.integrating_factor_parameter(time_step),
            System::Moving(sys) => sys.integrating_factor_parameter(time_step),
        }
    }

    pub fn convective_rhs(&mut self, w: &Nodes, t: Float) -> Result<Nodes, SystemError> {
        match self {
            System::Static(sys) => sys.convective_rhs(w, t),
            System::Moving(sys) => sys.convective_rhs(w, t),
        }
    }
}
