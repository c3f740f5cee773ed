use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChaseError {
    #[error("maze dimensions must be odd and at least 5, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChaseError>;
