use approx::assert_relative_eq;
use ibflow::{
    BoundaryPoints, Constraint, DeltaKernel, Float, Grid, Laplacian, Moving, NavierStokes, Nodes,
    Parameters, PointData, Static, System, SystemError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn circle(n: usize, radius: Float, center: [Float; 2]) -> BoundaryPoints {
    (0..n)
        .map(|k| {
            let theta = 2.0 * std::f64::consts::PI * k as Float / n as Float;
            [center[0] + radius * theta.cos(), center[1] + radius * theta.sin()]
        })
        .collect()
}

fn base() -> Parameters {
    Parameters::new(200.0, 0.04, (-1.0, 2.0), (-1.0, 1.0), 0.01)
}

fn random_nodes(rng: &mut StdRng, shape: (usize, usize)) -> Nodes {
    Nodes::from_fn(shape, |_, _| rng.gen_range(-1.0..1.0))
}

fn random_points(rng: &mut StdRng, n: usize) -> PointData {
    PointData::from_fn(n, |_| [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)])
}

#[test]
fn grid_contains_domain_with_ghost_margin() {
    for (xb, yb, h) in [
        ((-1.0, 1.0), (-1.0, 1.0), 0.02),
        ((-2.3, 5.1), (-0.7, 0.9), 0.05),
        ((0.25, 3.0), (1.0, 4.0), 0.1),
        ((-3.0, -1.0), (-0.01, 0.01), 0.003),
    ] {
        let grid = Grid::from_bounds(xb, yb, h).unwrap();
        let (nx, ny) = grid.size();

        let lower = grid.corner(0, 0);
        let upper = grid.corner(nx as isize, ny as isize);
        assert!(lower[0] <= xb.0 - h + 1e-12);
        assert!(lower[1] <= yb.0 - h + 1e-12);
        assert!(upper[0] >= xb.1 + h - 1e-12);
        assert!(upper[1] >= yb.1 + h - 1e-12);

        let (ox, oy) = grid.origin_index();
        let [x, y] = grid.corner(ox, oy);
        assert!(x.abs() < h && y.abs() < h);
    }
}

#[test]
fn constraint_operators_are_adjoint() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(42);
    let points = circle(60, 0.5, [0.0, 0.0]);
    let mut sys = NavierStokes::<Static>::new(
        base()
            .with_points(points.clone())
            .with_cached_transfer(true),
    )
    .unwrap();

    let shape = sys.grid_size();
    let lap = Laplacian::new(shape);
    let f = random_points(&mut rng, points.len());
    let s = random_nodes(&mut rng, shape);
    let w = lap.apply(&s);

    let mut ops = sys.constraint_operators(&w, 0.0).unwrap();
    assert!(ops.is_cached());
    let lhs = ops.apply(&f).unwrap().dot(&s);
    let mut sampled = ops.sample(&w).unwrap();
    sampled.scale(-1.0);
    let rhs = f.dot(&sampled);

    assert_relative_eq!(lhs, rhs, epsilon = 1e-9, max_relative = 1e-9);
}

#[test]
fn moving_constraint_operators_are_adjoint() {
    let mut rng = StdRng::seed_from_u64(8);
    let body = circle(40, 0.3, [0.0, 0.0]);
    let mut sys = NavierStokes::<Moving>::new(
        base()
            .with_static_boundary(false)
            .with_kernel(DeltaKernel::M4Prime)
            .with_points(body),
    )
    .unwrap();

    let shape = sys.grid_size();
    let lap = Laplacian::new(shape);
    let f = random_points(&mut rng, 40);
    let s = random_nodes(&mut rng, shape);
    let w = lap.apply(&s);

    let moved = circle(40, 0.3, [0.4, -0.1]);
    let mut ops = sys.constraint_operators(&w, 0.3, &moved).unwrap();
    assert!(!ops.is_cached());
    let lhs = ops.apply(&f).unwrap().dot(&s);
    let mut sampled = ops.sample(&w).unwrap();
    sampled.scale(-1.0);

    assert_relative_eq!(lhs, f.dot(&sampled), epsilon = 1e-9, max_relative = 1e-9);
}

#[test]
fn zero_vorticity_without_free_stream_is_a_fixed_point() {
    let mut sys = NavierStokes::<Static>::new(base()).unwrap();
    let w = Nodes::zeros(sys.grid_size());
    let dw = sys.convective_rhs(&w, 0.0).unwrap();
    assert_eq!(dw.max_abs(), 0.0);
}

#[test]
fn zero_vorticity_stays_fixed_in_a_free_stream() {
    let mut sys = NavierStokes::<Static>::new(base().with_free_stream([1.0, -0.5])).unwrap();
    let w = Nodes::zeros(sys.grid_size());
    assert_eq!(sys.convective_rhs(&w, 1.0).unwrap().max_abs(), 0.0);
}

// weak Gaussian vortex at the origin, scaled by the cell size like grid vorticity
fn weak_blob(sys: &NavierStokes<Static>, amplitude: Float) -> Nodes {
    let grid = *sys.grid();
    Nodes::from_fn(grid.size(), |i, j| {
        let [x, y] = grid.cell_center(i, j);
        amplitude * (-(x * x + y * y) / 0.04).exp()
    })
}

#[test]
fn free_stream_advects_vorticity_downstream() {
    let mut sys = NavierStokes::<Static>::new(base().with_free_stream([1.0, 0.0])).unwrap();
    let w = weak_blob(&sys, 1e-4);
    let dw = sys.convective_rhs(&w, 0.0).unwrap();

    // vorticity arrives downstream and leaves upstream
    let (ox, oy) = sys.origin_index();
    let (ox, oy) = (ox as usize, oy as usize);
    let downstream = dw.get(ox + 2, oy);
    let upstream = dw.get(ox - 3, oy);
    assert!(downstream > 0.0, "downstream tendency {downstream}");
    assert!(upstream < 0.0, "upstream tendency {upstream}");
    assert_relative_eq!(downstream, -upstream, max_relative = 1e-2);

    // -U ∂w/∂x by central differences, up to the blob's weak self-induced flow
    let h = sys.cell_size();
    let (nx, ny) = sys.grid_size();
    let mut expected = Nodes::zeros((nx, ny));
    for j in 0..ny {
        for i in 1..nx - 1 {
            expected.set(i, j, -(w.get(i + 1, j) - w.get(i - 1, j)) / (2.0 * h));
        }
    }
    let scale = expected.max_abs();
    for j in 0..ny {
        for i in 1..nx - 1 {
            assert_relative_eq!(dw.get(i, j), expected.get(i, j), epsilon = 1e-2 * scale);
        }
    }
}

#[test]
fn prescribed_free_stream_drives_convection() {
    let mut uniform = NavierStokes::<Static>::new(base().with_free_stream([1.0, 0.0])).unwrap();
    let mut prescribed =
        NavierStokes::<Static>::new(base().with_motion(|t: Float| [2.0 * t, 0.0])).unwrap();
    let w = weak_blob(&uniform, 1e-4);

    let expected = uniform.convective_rhs(&w, 0.0).unwrap();
    let dw = prescribed.convective_rhs(&w, 0.5).unwrap();
    let (nx, ny) = uniform.grid_size();
    for j in 0..ny {
        for i in 0..nx {
            assert_eq!(dw.get(i, j), expected.get(i, j));
        }
    }

    // at rest the blob only moves under its own, much weaker, induced flow
    let still = prescribed.convective_rhs(&w, 0.0).unwrap();
    assert!(still.max_abs() < 1e-2 * expected.max_abs());
}

#[test]
fn static_body_rhs_opposes_free_stream() {
    let points = circle(32, 0.5, [0.0, 0.0]);
    let sys = NavierStokes::<Static>::new(
        base().with_free_stream([1.0, 0.0]).with_points(points),
    )
    .unwrap();

    let w = Nodes::zeros(sys.grid_size());
    let rhs = sys.body_constraint_rhs(&w, 0.0).unwrap();
    assert_eq!(rhs.len(), 32);
    for k in 0..rhs.len() {
        assert_eq!(rhs.get(k), [-1.0, 0.0]);
    }
}

#[test]
fn prescribed_free_stream_is_evaluated_at_call_time() {
    let points = circle(8, 0.5, [0.0, 0.0]);
    let sys = NavierStokes::<Static>::new(
        base()
            .with_motion(|t: Float| [t, 2.0 * t])
            .with_points(points),
    )
    .unwrap();

    let w = Nodes::zeros(sys.grid_size());
    let rhs = sys.body_constraint_rhs(&w, 0.5).unwrap();
    for k in 0..rhs.len() {
        assert_eq!(rhs.get(k), [-0.5, -1.0]);
    }
}

#[test]
fn cached_and_rebuilt_operators_agree() {
    let mut rng = StdRng::seed_from_u64(1);
    let points = circle(48, 0.4, [0.2, 0.0]);
    let mut cached = NavierStokes::<Static>::new(
        base()
            .with_points(points.clone())
            .with_cached_transfer(true),
    )
    .unwrap();
    let mut rebuilt = NavierStokes::<Static>::new(base().with_points(points)).unwrap();
    assert!(cached.caches_transfer_operators());
    assert!(!rebuilt.caches_transfer_operators());

    let shape = cached.grid_size();
    let w = random_nodes(&mut rng, shape);
    let f = random_points(&mut rng, 48);

    let (a1, s1) = {
        let mut ops = cached.constraint_operators(&w, 0.0).unwrap();
        (ops.apply(&f).unwrap(), ops.sample(&w).unwrap())
    };
    let (a2, s2) = {
        let mut ops = rebuilt.constraint_operators(&w, 0.0).unwrap();
        (ops.apply(&f).unwrap(), ops.sample(&w).unwrap())
    };

    for j in 0..shape.1 {
        for i in 0..shape.0 {
            assert_relative_eq!(a1.get(i, j), a2.get(i, j), epsilon = 1e-12);
        }
    }
    for k in 0..48 {
        let (p, q) = (s1.get(k), s2.get(k));
        assert_relative_eq!(p[0], q[0], epsilon = 1e-12);
        assert_relative_eq!(p[1], q[1], epsilon = 1e-12);
    }
}

#[test]
fn moving_body_cannot_cache_transfer_operators() {
    let params = || {
        base()
            .with_points(circle(16, 0.3, [0.0, 0.0]))
            .with_static_boundary(false)
            .with_cached_transfer(true)
    };

    assert!(matches!(params().build(), Err(SystemError::Configuration(_))));
    assert!(matches!(
        NavierStokes::<Moving>::new(params()),
        Err(SystemError::Configuration(_))
    ));
}

#[test]
fn build_follows_boundary_flag() {
    let sys = base().build().unwrap();
    assert!(sys.is_static());
    let sys = base().with_static_boundary(false).build().unwrap();
    assert!(matches!(sys, System::Moving(_)));
}

#[test]
fn integrating_factor_parameter_is_diffusion_number() {
    for (re, h, dt) in [(100.0, 0.02, 0.01), (40.0, 0.05, 0.002), (1.0e3, 0.1, 0.5)] {
        let sys = NavierStokes::<Static>::new(Parameters::new(re, h, (-1.0, 1.0), (-1.0, 1.0), dt))
            .unwrap();
        assert_eq!(sys.integrating_factor_parameter(dt), dt / (re * h * h));
        assert_eq!(sys.integrating_factor_parameter(2.0 * dt), 2.0 * dt / (re * h * h));
    }
}

#[test]
fn sampled_velocity_matches_uniform_induced_flow() {
    // streamfunction linear in y away from the walls induces a uniform x-velocity
    let points = circle(24, 0.3, [0.0, 0.0]);
    let mut sys = NavierStokes::<Static>::new(base().with_points(points)).unwrap();
    let shape = sys.grid_size();
    let lap = Laplacian::new(shape);

    // minus the streamfunction, since curl(L⁻¹ w) is minus the velocity
    let s = Nodes::from_fn(shape, |_, j| -(j as Float));
    let w = lap.apply(&s);

    let mut ops = sys.constraint_operators(&w, 0.0).unwrap();
    let u = ops.sample(&w).unwrap();
    for k in 0..u.len() {
        let [uk, vk] = u.get(k);
        assert_relative_eq!(uk, 1.0, epsilon = 1e-8);
        assert_relative_eq!(vk, 0.0, epsilon = 1e-8);
    }
}
