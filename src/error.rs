//! Error types for the raycaster

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("grid size must be within 1..={max}, got {0}", max = crate::grid::MAX_SIZE)]
    InvalidGridSize(usize),

    #[error("wall probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, Error>;
