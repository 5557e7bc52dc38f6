use std::fmt;

use crate::Float;

/// Prescribed rigid motion, reduced to its instantaneous translational velocity.
pub trait Motion {
    fn velocity(&self, t: Float) -> [Float; 2];
}

impl<T> Motion for T
where
    T: Fn(Float) -> [Float; 2],
{
    fn velocity(&self, t: Float) -> [Float; 2] {
        self(t)
    }
}

/// Velocity of the oncoming flow far from the body.
pub enum FreeStream {
    Uniform([Float; 2]),
    Prescribed(Box<dyn Motion>),
}

impl FreeStream {
    pub fn velocity(&self, t: Float) -> [Float; 2] {
        match self {
            FreeStream::Uniform(u) => *u,
            FreeStream::Prescribed(motion) => motion.velocity(t),
        }
    }
}

impl Default for FreeStream {
    fn default() -> Self {
        FreeStream::Uniform([0.0, 0.0])
    }
}

impl fmt::Debug for FreeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeStream::Uniform(u) => f.debug_tuple("Uniform").field(u).finish(),
            FreeStream::Prescribed(_) => f.debug_tuple("Prescribed").field(&"<dyn Motion>").finish(),
        }
    }
}
