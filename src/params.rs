use crate::{
    fields::BoundaryPoints,
    motion::{FreeStream, Motion},
    regularize::DeltaKernel,
    rk::RkCoefficients,
    system::{Moving, NavierStokes, Static, System},
    Float, SystemError,
};

/// Everything needed to build a [`NavierStokes`] system.
///
/// Optional settings default to: no free stream, no boundary points, transfer
/// operators rebuilt on every call, a static body, the Roma kernel and the
/// three-stage Runge–Kutta table.
#[derive(Debug)]
pub struct Parameters {
    pub(crate) reynolds: Float,
    pub(crate) cell_size: Float,
    pub(crate) x_bounds: (Float, Float),
    pub(crate) y_bounds: (Float, Float),
    pub(crate) time_step: Float,
    pub(crate) free_stream: FreeStream,
    pub(crate) points: BoundaryPoints,
    pub(crate) cache_transfer: bool,
    pub(crate) static_boundary: bool,
    pub(crate) kernel: DeltaKernel,
    pub(crate) rk: RkCoefficients,
}

impl Parameters {
    pub fn new(
        reynolds: Float,
        cell_size: Float,
        x_bounds: (Float, Float),
        y_bounds: (Float, Float),
        time_step: Float,
    ) -> Self {
        Self {
            reynolds,
            cell_size,
            x_bounds,
            y_bounds,
            time_step,
            free_stream: FreeStream::default(),
            points: BoundaryPoints::default(),
            cache_transfer: false,
            static_boundary: true,
            kernel: DeltaKernel::default(),
            rk: RkCoefficients::default(),
        }
    }

    pub fn with_free_stream(mut self, velocity: [Float; 2]) -> Self {
        self.free_stream = FreeStream::Uniform(velocity);
        self
    }

    /// Replaces the uniform free stream by one evaluated at every call.
    pub fn with_motion(mut self, motion: impl Motion + 'static) -> Self {
        self.free_stream = FreeStream::Prescribed(Box::new(motion));
        self
    }

    pub fn with_points(mut self, points: BoundaryPoints) -> Self {
        self.points = points;
        self
    }

    pub fn with_cached_transfer(mut self, cache: bool) -> Self {
        self.cache_transfer = cache;
        self
    }

    pub fn with_static_boundary(mut self, is_static: bool) -> Self {
        self.static_boundary = is_static;
        self
    }

    pub fn with_kernel(mut self, kernel: DeltaKernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_rk(mut self, rk: RkCoefficients) -> Self {
        self.rk = rk;
        self
    }

    /// Builds a static or moving system according to the boundary flag.
    pub fn build(self) -> Result<System, SystemError> {
        if self.static_boundary {
            NavierStokes::<Static>::new(self).map(System::Static)
        } else {
            NavierStokes::<Moving>::new(self).map(System::Moving)
        }
    }
}
