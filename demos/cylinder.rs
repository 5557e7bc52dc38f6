use std::{f64::consts::PI, fs, io};

use tracing::info;

use ibflow::{
    BoundaryPoints, Constraint, Float, NavierStokes, Nodes, Parameters, SnapshotWriter, Static,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("setting up problem");

    // cylinder of unit diameter, points spaced about one cell apart
    let cell_size = 0.02;
    let n = (PI / cell_size) as usize;
    let body: BoundaryPoints = (0..n)
        .map(|k| {
            let theta = 2.0 * PI * k as Float / n as Float;
            [0.5 * theta.cos(), 0.5 * theta.sin()]
        })
        .collect();

    let mut sys = NavierStokes::<Static>::new(
        Parameters::new(200.0, cell_size, (-1.0, 3.0), (-1.5, 1.5), 0.01)
            .with_free_stream([1.0, 0.0])
            .with_points(body)
            .with_cached_transfer(true),
    )
    .expect("couldn't build system");

    info!("{sys}");
    info!(
        "integrating factor parameter: {:e}",
        sys.integrating_factor_parameter(sys.time_step())
    );

    // Lamb-Oseen vortex in the wake, scaled by the cell size like the grid vorticity
    let grid = *sys.grid();
    let w = Nodes::from_fn(grid.size(), |i, j| {
        let [x, y] = grid.cell_center(i, j);
        let r2 = (x - 1.5).powi(2) + y * y;
        cell_size * (-r2 / 0.04).exp() / (PI * 0.04)
    });
    info!("circulation: {:e}", sys.circulation(&w).expect("grid-sized field"));

    let dw = sys.convective_rhs(&w, 0.0).expect("grid-sized field");
    info!("max convective tendency: {:e}", dw.max_abs());

    let slip = {
        let target = sys.body_constraint_rhs(&w, 0.0).expect("grid-sized field");
        let mut ops = sys.constraint_operators(&w, 0.0).expect("points configured");
        let induced = ops.sample(&w).expect("grid-sized field");
        // no-slip residual: induced velocity minus the velocity the constraint asks for
        let mut worst: Float = 0.0;
        for k in 0..induced.len() {
            let ([u, v], [tu, tv]) = (induced.get(k), target.get(k));
            worst = worst.max((u - tu).hypot(v - tv));
        }
        worst
    };
    info!("largest slip velocity before projection: {:e}", slip);

    info!("writing snapshots");

    let output = io::BufWriter::new(
        fs::File::create("cylinder.ibvf1").expect("couldn't create output file"),
    );
    let mut writer = SnapshotWriter::new(output, &grid).expect("couldn't write header");
    writer.write(0.0, &w).expect("couldn't write snapshot");

    // one explicit convective step, enough to see the vortex drift
    let dt = sys.time_step();
    let advected = Nodes::from_fn(grid.size(), |i, j| w.get(i, j) + dt * dw.get(i, j));
    writer.write(dt, &advected).expect("couldn't write snapshot");
    writer.finish().expect("couldn't finish snapshot stream");

    info!("done");
}
