use std::io::Write;

use bytemuck::{bytes_of, cast_slice};

use crate::{fields::Nodes, grid::Grid, Float, SystemError};

const IBVF1_HEADER: &[u8] = b"IBVF1";
const MARKER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Writes a stream of vorticity snapshots in the `IBVF1` binary layout.
///
/// Header: magic bytes, float width, `nx`, `ny` (u32), origin index (i64 pair),
/// cell size, marker. Each frame: time, then the field in column-major order.
/// `finish` appends a closing marker. Numbers are written in the byte order of
/// the host.
pub struct SnapshotWriter<W> {
    output: W,
    shape: (usize, usize),
    column: Vec<Float>,
    frames: usize,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(mut output: W, grid: &Grid) -> Result<Self, SystemError> {
        let (nx, ny) = grid.size();
        let (ox, oy) = grid.origin_index();

        let header_size = |n: usize| {
            u32::try_from(n).map_err(|_| {
                SystemError::Configuration(format!("{nx}×{ny} grid does not fit an IBVF1 header"))
            })
        };
        let (nx32, ny32) = (header_size(nx)?, header_size(ny)?);

        output.write_all(IBVF1_HEADER)?;
        output.write_all(bytes_of(&(std::mem::size_of::<Float>() as u8)))?;
        output.write_all(bytes_of(&nx32))?;
        output.write_all(bytes_of(&ny32))?;
        output.write_all(bytes_of(&(ox as i64)))?;
        output.write_all(bytes_of(&(oy as i64)))?;
        output.write_all(bytes_of(&grid.cell_size()))?;
        output.write_all(&MARKER)?;

        Ok(Self {
            output,
            shape: (nx, ny),
            column: Vec::with_capacity(nx),
            frames: 0,
        })
    }

    pub fn write(&mut self, t: Float, w: &Nodes) -> Result<(), SystemError> {
        SystemError::check_shape("snapshot", self.shape, w.shape())?;
        self.output.write_all(bytes_of(&t))?;

        let w = w.as_ref();
        for j in 0..self.shape.1 {
            self.column.clear();
            self.column.extend((0..self.shape.0).map(|i| w[(i, j)]));
            self.output.write_all(cast_slice(&self.column))?;
        }

        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn finish(mut self) -> Result<W, SystemError> {
        self.output.write_all(&MARKER)?;
        self.output.flush()?;
        Ok(self.output)
    }
}
