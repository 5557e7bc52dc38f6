use thiserror::Error;

#[derive(Error, Debug)]
pub enum SystemError {
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("dimension mismatch in {what}: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("output error")]
    Io(#[from] std::io::Error),
}

impl SystemError {
    pub(crate) fn check_shape(
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Result<(), SystemError> {
        if expected == found {
            Ok(())
        } else {
            Err(SystemError::DimensionMismatch {
                what,
                expected,
                found,
            })
        }
    }
}
