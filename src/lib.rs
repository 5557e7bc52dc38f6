//! Two-dimensional incompressible flow in vorticity form, coupled to bodies
//! represented by clouds of boundary points through a Lagrange-multiplier
//! (immersed-boundary projection) constraint.
//!
//! [`NavierStokes`] evaluates the pieces a constrained Runge–Kutta integrator
//! needs at every stage: the convective right-hand side, the no-slip right-hand
//! side, and the [`Constraint`] operators tying surface traction to vorticity.

pub type Float = f64;

mod error;
pub use error::SystemError;

pub mod constraint;
pub mod fields;
pub mod grid;
pub mod laplacian;
pub mod motion;
pub mod ops;
pub mod params;
pub mod regularize;
pub mod rk;
pub mod snapshot;
pub mod system;

pub use constraint::{Constraint, ConstraintOperators};
pub use fields::{BoundaryPoints, Dual, EdgeKind, Edges, Nodes, PointData, Primal};
pub use grid::Grid;
pub use laplacian::Laplacian;
pub use motion::{FreeStream, Motion};
pub use params::Parameters;
pub use regularize::{DeltaKernel, TransferOperators};
pub use rk::RkCoefficients;
pub use snapshot::SnapshotWriter;
pub use system::{BodyKinematics, Moving, NavierStokes, Static, System};
