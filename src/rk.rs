use crate::{Float, SystemError};

/// Butcher-style coefficients of an explicit Runge–Kutta scheme.
///
/// The system never interprets these; they are validated once and handed to
/// whichever integrator drives it.
#[derive(Clone, Debug, PartialEq)]
pub struct RkCoefficients {
    c: Vec<Float>,
    a: Vec<Vec<Float>>,
}

impl RkCoefficients {
    /// Stage `k` uses `a[k][0..=k]`; `c[k]` is its time fraction.
    pub fn new(c: Vec<Float>, a: Vec<Vec<Float>>) -> Result<Self, SystemError> {
        if c.is_empty() {
            return Err(SystemError::Configuration(
                "Runge-Kutta scheme needs at least one stage".into(),
            ));
        }
        if a.len() != c.len() {
            return Err(SystemError::Configuration(format!(
                "Runge-Kutta scheme has {} stage times but {} coefficient rows",
                c.len(),
                a.len()
            )));
        }
        if let Some((k, row)) = a.iter().enumerate().find(|(k, row)| row.len() != k + 1) {
            return Err(SystemError::Configuration(format!(
                "Runge-Kutta row {k} has {} entries, expected {}",
                row.len(),
                k + 1
            )));
        }
        Ok(Self { c, a })
    }

    /// Three-stage scheme of Liska & Colonius, designed for integrating-factor
    /// half-explicit treatment of the constraint.
    pub fn rk31() -> Self {
        let sq3 = Float::sqrt(3.0);
        Self {
            c: vec![0.5, 1.0, 1.0],
            a: vec![
                vec![0.5],
                vec![sq3 / 3.0, (3.0 - sq3) / 3.0],
                vec![(3.0 + sq3) / 6.0, -sq3 / 3.0, (3.0 + sq3) / 6.0],
            ],
        }
    }

    pub fn euler() -> Self {
        Self {
            c: vec![1.0],
            a: vec![vec![1.0]],
        }
    }

    pub fn stages(&self) -> usize {
        self.c.len()
    }

    pub fn c(&self) -> &[Float] {
        &self.c
    }

    pub fn a(&self) -> &[Vec<Float>] {
        &self.a
    }
}

impl Default for RkCoefficients {
    fn default() -> Self {
        Self::rk31()
    }
}
