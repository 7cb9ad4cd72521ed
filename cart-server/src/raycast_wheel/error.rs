use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum WheelError {
    /// Tuning values that would produce nonsense (negative travel, NaN, ...).
    InvalidConfig(String),
    /// The physics step duration was zero, negative or not finite.
    NonPositiveTimestep(f32),
    /// The wheel was attached to (or stepped against) a body that does not exist.
    MissingBody(String),
}

impl fmt::Display for WheelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelError::InvalidConfig(msg) => write!(f, "invalid wheel config: {msg}"),
            WheelError::NonPositiveTimestep(dt) => {
                write!(f, "physics step must be positive and finite, got dt = {dt}")
            }
            WheelError::MissingBody(owner) => write!(f, "no rigid body for `{owner}`"),
        }
    }
}

impl Error for WheelError {}
